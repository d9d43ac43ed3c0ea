//! Host-side thread context for the simulation backend. Same callee-saved
//! register set and layout the teacher uses for its own (x86_64, process-
//! level) context switch in `process/context.rs`'s `CpuContext`, reused
//! here so the scheduler can run real cooperative stack switches under
//! `cargo test` on an x86_64 host.

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Context {
    pub rbx: u64,
    pub rbp: u64,
    pub r12: u64,
    pub r13: u64,
    pub r14: u64,
    pub r15: u64,
    pub rsp: u64,
    pub rip: u64,
    pub rflags: u64,
}

impl Context {
    pub const fn zeroed() -> Self {
        Context {
            rbx: 0,
            rbp: 0,
            r12: 0,
            r13: 0,
            r14: 0,
            r15: 0,
            rsp: 0,
            rip: 0,
            rflags: 0x202,
        }
    }

    /// Builds the initial context for a thread that has never run: `rip`
    /// points at `entry`, `rsp` is the top of its stack (16-byte aligned,
    /// with room left for the "return address" slot a `ret`-based switch
    /// expects), matching `CpuContext::init_for_new_process` in the
    /// teacher.
    pub fn for_entry(stack_top: usize, entry: extern "C" fn() -> !) -> Self {
        let rsp = (stack_top - 8) & !0xf;
        Context {
            rbx: 0,
            rbp: 0,
            r12: 0,
            r13: 0,
            r14: 0,
            r15: 0,
            rsp: rsp as u64,
            rip: entry as usize as u64,
            rflags: 0x202,
        }
    }
}
