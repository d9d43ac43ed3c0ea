pub mod context;
pub mod swtch;
pub mod trap;

pub use context::Context;
pub use swtch::{swtch, switch_to};
pub use trap::TrapFrame;

/// Entry point written into a freshly spawned thread's [`Context::ra`].
/// Defined once, in arch-independent code, and referenced by both
/// backends so thread setup doesn't duplicate the "recover my entry
/// closure from the scheduler, run it, then exit" logic per architecture.
pub use crate::thread::scheduler::thread_entry_trampoline;

/// Entry point for a thread created by fork-to-user once it is first
/// scheduled; see [`crate::thread::scheduler::fork_child_trampoline`].
pub use crate::thread::scheduler::fork_child_trampoline;
