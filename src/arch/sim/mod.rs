pub mod context;
pub mod swtch;
pub mod trap;

pub use context::Context;
pub use swtch::{swtch, switch_to};
pub use trap::TrapFrame;

pub use crate::thread::scheduler::thread_entry_trampoline;
pub use crate::thread::scheduler::fork_child_trampoline;
