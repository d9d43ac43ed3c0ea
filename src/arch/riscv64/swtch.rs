//! The riscv64 half of `swtch`: naked assembly saving/restoring the 12
//! callee-saved `s` registers plus `ra`/`sp`, modeled directly on the
//! register set in `struct thread_context` (`thread.c`) and the `sd`/`ld`
//! sequences in the green-thread exercise
//! (`02_green_threads/src/lib.rs::switch_context`), generalized from a
//! fixed `TaskContext` to this crate's [`super::context::Context`].
//!
//! Unlike the original's `_thread_swtch`, this routine does not return an
//! identity of the previously running thread via a register convention -
//! the scheduler tracks that itself (see
//! `crate::thread::scheduler::Scheduler::last_switched_from`), since
//! "current thread" here is ordinary scheduler state rather than the
//! RISC-V `tp` register (`spec.md` §9 flags the register-based
//! current-thread pointer as a candidate for an idiomatic ambient
//! accessor).

use super::context::Context;
use core::arch::naked_asm;

/// Saves the running thread's callee-saved registers into `*old`, loads
/// `*new`'s, and returns - to whatever `ra` `*new` holds, which is either
/// a never-before-run thread's entry trampoline or the instruction right
/// after some earlier call to `swtch`.
///
/// # Safety
/// `old` must be a valid, writable `Context`; `new` must be a valid,
/// fully-initialized `Context` whose `sp` points into a live stack.
#[unsafe(naked)]
pub unsafe extern "C" fn swtch(old: *mut Context, new: *const Context) {
    naked_asm!(
        "sd ra, 0(a0)",
        "sd sp, 8(a0)",
        "sd s0, 16(a0)",
        "sd s1, 24(a0)",
        "sd s2, 32(a0)",
        "sd s3, 40(a0)",
        "sd s4, 48(a0)",
        "sd s5, 56(a0)",
        "sd s6, 64(a0)",
        "sd s7, 72(a0)",
        "sd s8, 80(a0)",
        "sd s9, 88(a0)",
        "sd s10, 96(a0)",
        "sd s11, 104(a0)",
        "ld ra, 0(a1)",
        "ld sp, 8(a1)",
        "ld s0, 16(a1)",
        "ld s1, 24(a1)",
        "ld s2, 32(a1)",
        "ld s3, 40(a1)",
        "ld s4, 48(a1)",
        "ld s5, 56(a1)",
        "ld s6, 64(a1)",
        "ld s7, 72(a1)",
        "ld s8, 80(a1)",
        "ld s9, 88(a1)",
        "ld s10, 96(a1)",
        "ld s11, 104(a1)",
        "ret",
    );
}

/// Loads `*new` without saving anything first. Used the very first time
/// the scheduler gives up the boot stack to run a thread.
///
/// # Safety
/// `new` must be a valid, fully-initialized `Context`.
#[unsafe(naked)]
pub unsafe extern "C" fn switch_to(new: *const Context) -> ! {
    naked_asm!(
        "ld ra, 0(a0)",
        "ld sp, 8(a0)",
        "ld s0, 16(a0)",
        "ld s1, 24(a0)",
        "ld s2, 32(a0)",
        "ld s3, 40(a0)",
        "ld s4, 48(a0)",
        "ld s5, 56(a0)",
        "ld s6, 64(a0)",
        "ld s7, 72(a0)",
        "ld s8, 80(a0)",
        "ld s9, 88(a0)",
        "ld s10, 96(a0)",
        "ld s11, 104(a0)",
        "ret",
    );
}
