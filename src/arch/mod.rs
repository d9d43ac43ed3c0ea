//! Architecture boundary. `spec.md` describes `swtch`, thread setup and
//! fork-to-user in terms of RISC-V registers (12 callee-saved `s`
//! registers, `ra`, `sp`). [`riscv64`] implements that directly; [`sim`]
//! implements the same contract against the host's own calling convention
//! so the scheduler can be exercised under `cargo test` with real
//! cooperative stack switches. Exactly one of the two is compiled in for
//! any given target, selected by `cfg(target_arch = "riscv64")`, mirroring
//! the teacher's per-target module layout (`arch::x86_64::*`) rather than
//! a trait-object HAL, since there's no runtime choice to make between
//! them.

#[cfg(target_arch = "riscv64")]
pub mod riscv64;
#[cfg(not(target_arch = "riscv64"))]
pub mod sim;

#[cfg(target_arch = "riscv64")]
pub use riscv64 as active;
#[cfg(not(target_arch = "riscv64"))]
pub use sim as active;
