//! Host stand-in for the trap frame the real trap subsystem would hand to
//! `thread_fork_to_user`/`thread_jump_to_user`. Only the registers those
//! two operations actually touch (`a0`, the syscall return value; `sp`/
//! `pc`, the user continuation `jump_to_user` resumes) are modeled.

#[derive(Debug, Clone, Copy, Default)]
pub struct TrapFrame {
    a0: u64,
    sp: u64,
    pc: u64,
}

impl TrapFrame {
    pub fn new(a0: u64) -> Self {
        TrapFrame { a0, sp: 0, pc: 0 }
    }

    pub fn a0(&self) -> u64 {
        self.a0
    }

    pub fn set_a0(&mut self, value: u64) {
        self.a0 = value;
    }

    pub fn sp(&self) -> u64 {
        self.sp
    }

    pub fn set_sp(&mut self, value: u64) {
        self.sp = value;
    }

    pub fn pc(&self) -> u64 {
        self.pc
    }

    pub fn set_pc(&mut self, value: u64) {
        self.pc = value;
    }
}
