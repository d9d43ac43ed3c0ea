//! Bootable riscv64 kernel binary. Built only with `--features boot`
//! (`cargo test`/host tooling never links this; it builds against
//! `arch::sim`/`platform::sim` instead, where there is no bare-metal entry
//! point to provide).
#![no_std]
#![no_main]

extern crate alloc;

use coswitch::arch;
use coswitch::config::MAIN_TID;
use coswitch::io;
use coswitch::logging::{self, LogSink};
use coswitch::thread;
use log::LevelFilter;

/// Stack the bootloader hands control to `_start` on, before any thread's
/// own kernel stack exists. `main_task` runs on it exactly once.
const BOOT_STACK_SIZE: usize = 64 * 1024;

#[repr(align(16))]
struct BootStack([u8; BOOT_STACK_SIZE]);

static mut BOOT_STACK: BootStack = BootStack([0; BOOT_STACK_SIZE]);

/// Discards log output. A real UART driver is outside this crate's scope
/// (the thread core and I/O interface treat it as an external
/// collaborator, same as the memory manager); wiring `logging::init` to
/// one is a matter of implementing `io::IoDevice` over the board's MMIO
/// registers and handing it to `io::TerminalIo`, not something the
/// scheduler or I/O layer need to change for.
struct NullSink;

impl LogSink for NullSink {
    fn write_line(&mut self, _line: &str) {}
}

static mut NULL_SINK: NullSink = NullSink;

/// Entry point linked at the address the bootloader jumps to. Sets up a
/// stack and falls into [`main_task`] via [`arch::active::switch_to`] -
/// there is nothing on this stack worth preserving, so this is the one
/// place in the kernel that hands off control without first saving a
/// context to resume.
#[no_mangle]
pub unsafe extern "C" fn _start() -> ! {
    #[allow(static_mut_refs)]
    let stack_top = BOOT_STACK.0.as_mut_ptr().add(BOOT_STACK_SIZE) as usize;
    let ctx = arch::active::Context::for_entry(stack_top, main_task_trampoline);
    arch::active::switch_to(&ctx)
}

extern "C" fn main_task_trampoline() -> ! {
    main_task()
}

fn main_task() -> ! {
    #[allow(static_mut_refs)]
    logging::init(unsafe { &mut NULL_SINK }, LevelFilter::Info);

    thread::init("main");
    log::info!("thread core initialized, running as tid {}", MAIN_TID);

    let banner = io::handle(io::LiteralIo::new(alloc::vec![0u8; 64].into_boxed_slice()));
    let worker = spawn_banner_writer(banner);
    thread::join(worker).expect("banner writer is main's child");

    // No more boot-time work; fall in with the idle thread forever.
    loop {
        thread::yield_now();
    }
}

fn spawn_banner_writer(banner: io::Io) -> thread::ThreadId {
    thread::spawn("banner", move || {
        let _ = io::write_all(&banner, b"kernel up\n");
    })
}
