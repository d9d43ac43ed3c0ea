//! External collaborator contract: the memory manager, interrupt
//! controller and process layer that `spec.md` §6 requires the thread core
//! to assume exist, but does not ask this crate to build out fully.
//!
//! `platform::active` re-exports one concrete backend selected at compile
//! time: [`riscv64`] for the real target, [`sim`] everywhere else (used by
//! `cargo test` and by any host tool built against this crate).

use core::fmt;

#[cfg(target_arch = "riscv64")]
pub mod riscv64;
#[cfg(not(target_arch = "riscv64"))]
pub mod sim;

#[cfg(target_arch = "riscv64")]
pub use riscv64 as active;
#[cfg(not(target_arch = "riscv64"))]
pub use sim as active;

/// Opaque address-space identifier handed out by `space_clone` and
/// consumed by `space_switch`. The thread core never interprets the value,
/// matching `proc->mtag` in the original, which is likewise only ever
/// passed to `memory_space_switch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AddressSpaceTag(pub u64);

impl fmt::Display for AddressSpaceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asid:{}", self.0)
    }
}

/// Previous interrupt-enable state, returned by `intr_disable` and
/// consumed by `intr_restore` - the same role `saved_intr_state` plays
/// throughout `thread.c`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntrState(pub(crate) bool);
