//! Idle thread body, spawned once by `scheduler::init` into the reserved
//! `IDLE_TID` slot. Mirrors `idle_thread_func`'s lost-wakeup-avoiding
//! shape exactly: check-yield while the ready queue has work, otherwise
//! disable interrupts, recheck (closing the race against an interrupt
//! handler that would enqueue new work between the first check and
//! sleeping), and only then wait for an interrupt.

use crate::platform;
use crate::thread::scheduler;

pub(crate) fn idle_loop() {
    loop {
        while scheduler::ready_queue_nonempty() {
            scheduler::yield_now();
        }
        let saved = platform::active::intr_disable();
        if !scheduler::ready_queue_nonempty() {
            // `wfi` still runs with interrupts masked: on riscv64 that's
            // exactly what lets it wake atomically on the interrupt that
            // populates the ready queue, instead of racing a handler that
            // could fire and return between re-enabling and sleeping.
            platform::active::wait_for_interrupt();
        }
        unsafe { platform::active::intr_restore(saved) };
    }
}
