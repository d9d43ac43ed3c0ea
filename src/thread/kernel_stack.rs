//! Kernel stack allocation and the stack anchor record `spec.md` §3
//! requires at the top of every kernel stack (so the trap-return path can
//! recover the owning thread from the stack pointer alone). This crate
//! tracks "current thread" as ordinary scheduler state instead (see
//! `scheduler::Scheduler::current`), so nothing actually reads the anchor
//! back - it is still written, for the same reason a teaching kernel would
//! keep it: a future trap-entry path landing on a bare stack pointer needs
//! it to exist at a fixed, documented offset.

use core::mem::size_of;

use crate::config::{KERNEL_STACK_PAGES, PAGE_SIZE};
use crate::platform;
use crate::thread::types::ThreadId;

#[repr(C)]
struct StackAnchor {
    thread: ThreadId,
    _reserved: usize,
}

pub(crate) struct KernelStack {
    base: *mut u8,
    size: usize,
    freed: bool,
}

unsafe impl Send for KernelStack {}

impl KernelStack {
    /// Allocates `KERNEL_STACK_PAGES` worth of stack and writes the anchor
    /// at the top, recording `owner`.
    pub(crate) fn alloc(owner: ThreadId) -> Self {
        assert_eq!(KERNEL_STACK_PAGES, 1, "multi-page kernel stacks need contiguous allocation, not yet supported");
        let base = platform::active::alloc_page();
        let stack = KernelStack { base, size: PAGE_SIZE, freed: false };
        stack.anchor_mut().thread = owner;
        stack
    }

    fn anchor_mut(&self) -> &mut StackAnchor {
        let anchor_addr = self.base as usize + self.size - size_of::<StackAnchor>();
        unsafe { &mut *(anchor_addr as *mut StackAnchor) }
    }

    /// Owning thread recorded in this stack's anchor.
    pub(crate) fn anchor_owner(&self) -> ThreadId {
        self.anchor_mut().thread
    }

    /// Highest usable stack address, below the anchor record.
    pub(crate) fn top(&self) -> usize {
        self.base as usize + self.size - size_of::<StackAnchor>()
    }

    /// Releases the backing page. Idempotent: a stack is freed once its
    /// owning thread has exited and its successor has resumed (see
    /// `Scheduler::reap_predecessor`), well before the `Thread` record
    /// itself is dropped at `join`/`join_any` recycling.
    pub(crate) fn free(&mut self) {
        if self.freed {
            return;
        }
        unsafe { platform::active::free_page(self.base) };
        self.freed = true;
    }
}

impl Drop for KernelStack {
    fn drop(&mut self) {
        self.free();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_records_owner() {
        let stack = KernelStack::alloc(ThreadId::new(3));
        assert_eq!(stack.anchor_owner(), ThreadId::new(3));
    }

    #[test]
    fn top_is_below_the_anchor() {
        let stack = KernelStack::alloc(ThreadId::new(1));
        assert!(stack.top() < stack.base as usize + stack.size);
        assert_eq!(stack.base as usize + stack.size - stack.top(), size_of::<StackAnchor>());
    }

    #[test]
    fn free_is_idempotent() {
        let mut stack = KernelStack::alloc(ThreadId::new(2));
        stack.free();
        stack.free();
    }
}
