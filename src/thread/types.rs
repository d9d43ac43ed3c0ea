//! Thread identity and state, and the `Thread` record itself.

use alloc::boxed::Box;
use core::fmt;

use crate::arch;
use crate::config::NTHR;
use crate::platform::AddressSpaceTag;
use crate::thread::condition::Condition;
use crate::thread::kernel_stack::KernelStack;

/// Index into the fixed-size thread table, `[0, NTHR)`. Slot 0 is the
/// `main` thread, slot `NTHR - 1` is `idle` - the same reservations
/// `thread.c` makes with `MAIN_TID`/`IDLE_TID`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThreadId(pub usize);

impl ThreadId {
    pub const fn new(raw: usize) -> Self {
        debug_assert!(raw < NTHR);
        ThreadId(raw)
    }

    pub const fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tid:{}", self.0)
    }
}

/// Mirrors the state machine in `thread.c`: `UNINITIALIZED` is never
/// observed once a slot is populated (a populated slot starts `Ready`),
/// kept only so the variant order matches the original for readability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadState {
    Uninitialized,
    Stopped,
    Waiting,
    Running,
    Ready,
    Exited,
}

pub(crate) struct Thread {
    pub(crate) context: arch::active::Context,
    pub(crate) name: alloc::string::String,
    pub(crate) stack: Option<KernelStack>,
    pub(crate) state: ThreadState,
    pub(crate) id: ThreadId,
    pub(crate) process: AddressSpaceTag,
    pub(crate) parent: Option<ThreadId>,
    pub(crate) child_exit: Condition,
    /// Closure run the first time this thread is scheduled, recovered and
    /// called by `thread_entry_trampoline`. `None` for `main` (already
    /// running when `init` populates its slot) and for fork children
    /// (which resume through `fork_child_trampoline`/the trap-return hook
    /// instead).
    pub(crate) entry: Option<Box<dyn FnOnce() + Send>>,
    pub(crate) trapframe: arch::active::TrapFrame,
}

impl Thread {
    pub(crate) fn new(
        id: ThreadId,
        name: alloc::string::String,
        parent: Option<ThreadId>,
        process: AddressSpaceTag,
        stack: KernelStack,
        context: arch::active::Context,
        entry: Option<Box<dyn FnOnce() + Send>>,
    ) -> Self {
        Thread {
            context,
            name,
            stack: Some(stack),
            state: ThreadState::Ready,
            id,
            process,
            parent,
            child_exit: Condition::new("child_exit"),
            entry,
            trapframe: Default::default(),
        }
    }
}
