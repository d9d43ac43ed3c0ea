//! Cooperative thread manager: thread lists, condition variables, the
//! thread table and scheduler, and fork-to-user. Rust counterpart of
//! `thread.c`, split across submodules by concern rather than kept in one
//! file, the way the teacher splits `process.rs`/`scheduler.rs`/`pcb.rs`.

mod condition;
mod idle;
mod kernel_stack;
mod list;
pub mod scheduler;
mod types;

pub use condition::Condition;
pub use scheduler::{
    condition_broadcast, condition_wait, exit, fork_to_user, init, join, join_any, jump_to_user, name, process, running,
    set_process, set_trap_return, spawn, yield_now, ThreadError, TrapReturn,
};
pub use types::{ThreadId, ThreadState};

/// Serializes any test that touches the global scheduler table - `init`
/// resets a process-wide static, so two tests racing on it (from this
/// module's own tests or from `crate::tests`) would clobber each other
/// under `cargo test`'s default parallel runner.
#[cfg(test)]
pub(crate) static SCHEDULER_TEST_LOCK: spin::Mutex<()> = spin::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use alloc::sync::Arc as StdArc;

    fn with_fresh_scheduler<F: FnOnce()>(f: F) {
        let _guard = SCHEDULER_TEST_LOCK.lock();
        init("main");
        f();
    }

    #[test]
    fn spawn_yield_exit_join_any() {
        with_fresh_scheduler(|| {
            let ran = StdArc::new(AtomicUsize::new(0));
            let ran2 = ran.clone();
            let t1 = spawn("t1", move || {
                yield_now();
                ran2.fetch_add(1, Ordering::SeqCst);
            });
            yield_now();
            yield_now();
            let joined = join_any();
            assert_eq!(joined, t1);
            assert_eq!(ran.load(Ordering::SeqCst), 1);
        });
    }

    #[test]
    fn join_by_id_recycles_slot() {
        with_fresh_scheduler(|| {
            let t1 = spawn("t1", || {});
            let joined = join(t1).expect("join should succeed");
            assert_eq!(joined, t1);
            // slot is gone: joining again fails, it is no longer our child
            assert!(join(t1).is_err());
        });
    }

    #[test]
    fn join_any_panics_when_childless() {
        with_fresh_scheduler(|| {
            let result = std::panic::catch_unwind(|| {
                join_any();
            });
            assert!(result.is_err());
        });
    }

    #[test]
    fn fifo_scheduling_order() {
        with_fresh_scheduler(|| {
            let order = StdArc::new(spin::Mutex::new(alloc::vec::Vec::new()));
            let mut ids = alloc::vec::Vec::new();
            for n in 0..3 {
                let order = order.clone();
                ids.push(spawn("worker", move || {
                    order.lock().push(n);
                }));
            }
            for _ in 0..3 {
                yield_now();
            }
            for id in ids {
                join(id).unwrap();
            }
            assert_eq!(*order.lock(), alloc::vec![0, 1, 2]);
        });
    }
}
