//! Host (x86_64) half of `swtch`, adapted from the teacher's
//! `arch/x86_64/context_switch.rs::switch_context`/`switch_to_context`:
//! save/restore `rbx`/`rbp`/`r12`-`r15`/`rsp`/`rip`/`rflags` via
//! `naked_asm!`. This backend exists purely so the scheduler has real
//! stack switches to exercise in `cargo test`; it is never linked into the
//! riscv64 boot binary.

use super::context::Context;
use core::arch::naked_asm;

/// # Safety
/// `old` must be a valid, writable `Context`; `new` must be a valid,
/// fully-initialized `Context` whose `rsp` points into a live stack.
#[unsafe(naked)]
pub unsafe extern "C" fn swtch(old: *mut Context, new: *const Context) {
    naked_asm!(
        "mov [rdi + 0], rbx",
        "mov [rdi + 8], rbp",
        "mov [rdi + 16], r12",
        "mov [rdi + 24], r13",
        "mov [rdi + 32], r14",
        "mov [rdi + 40], r15",
        "mov [rdi + 48], rsp",
        "mov rax, [rsp]",
        "mov [rdi + 56], rax",
        "pushfq",
        "pop rax",
        "mov [rdi + 64], rax",
        "mov rbx, [rsi + 0]",
        "mov rbp, [rsi + 8]",
        "mov r12, [rsi + 16]",
        "mov r13, [rsi + 24]",
        "mov r14, [rsi + 32]",
        "mov r15, [rsi + 40]",
        "mov rax, [rsi + 64]",
        "push rax",
        "popfq",
        "mov rsp, [rsi + 48]",
        "jmp [rsi + 56]",
    );
}

/// # Safety
/// `new` must be a valid, fully-initialized `Context`.
#[unsafe(naked)]
pub unsafe extern "C" fn switch_to(new: *const Context) -> ! {
    naked_asm!(
        "mov rbx, [rdi + 0]",
        "mov rbp, [rdi + 8]",
        "mov r12, [rdi + 16]",
        "mov r13, [rdi + 24]",
        "mov r14, [rdi + 32]",
        "mov r15, [rdi + 40]",
        "mov rax, [rdi + 64]",
        "push rax",
        "popfq",
        "mov rsp, [rdi + 48]",
        "jmp [rdi + 56]",
    );
}
