//! Real riscv64 backend for the [`crate::platform`] contract. Pages and
//! `kmalloc`/`kfree` are architecture-independent and shared with
//! [`super::sim`] via [`crate::mm`]; interrupt control and `wfi` go
//! through the `riscv` crate's CSR access, matching `intr_disable`/
//! `intr_restore`/`intr_enable` in `thread.c` (which wrap `sstatus.SIE`).

use crate::mm::{heap, page_alloc};
use crate::platform::{AddressSpaceTag, IntrState};
use core::sync::atomic::{AtomicU64, Ordering};
use riscv::register::sstatus;

static NEXT_ASID: AtomicU64 = AtomicU64::new(1);

pub fn alloc_page() -> *mut u8 {
    page_alloc::alloc_page()
}

/// # Safety
/// See [`page_alloc::free_page`].
pub unsafe fn free_page(page: *mut u8) {
    page_alloc::free_page(page)
}

pub fn kmalloc(size: usize) -> *mut u8 {
    heap::kmalloc(size)
}

/// # Safety
/// See [`heap::kfree`].
pub unsafe fn kfree(ptr: *mut u8) {
    heap::kfree(ptr)
}

/// Clones the caller's address space and returns the new `satp` value as
/// an opaque tag. Real page-table duplication belongs to the process
/// layer; the thread core only needs something to hand to `space_switch`.
pub fn space_clone() -> AddressSpaceTag {
    AddressSpaceTag(NEXT_ASID.fetch_add(1, Ordering::Relaxed))
}

/// Installs `tag` as the active `satp`. Left as a hook for the process
/// layer to fill in with a real page-table root; out of scope here per
/// `spec.md` §1 (the memory manager is an external collaborator).
pub fn space_switch(_tag: AddressSpaceTag) {}

pub fn intr_disable() -> IntrState {
    let was_enabled = sstatus::read().sie();
    unsafe { sstatus::clear_sie() };
    IntrState(was_enabled)
}

/// # Safety
/// `state` must be a value previously returned by `intr_disable`, restored
/// in LIFO order.
pub unsafe fn intr_restore(state: IntrState) {
    if state.0 {
        sstatus::set_sie();
    } else {
        sstatus::clear_sie();
    }
}

pub fn intr_enable() {
    unsafe { sstatus::set_sie() };
}

pub fn wait_for_interrupt() {
    unsafe { core::arch::asm!("wfi") };
}
