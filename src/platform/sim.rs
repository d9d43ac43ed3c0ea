//! Host test/dev backend for the [`crate::platform`] contract. Used for
//! every build that isn't targeting `riscv64` - in particular `cargo
//! test`, where it lets the scheduler and I/O backends run against real
//! memory without a riscv64 toolchain.
//!
//! Address-space switching has no MMU to drive here, so `space_clone`/
//! `space_switch` just hand out and record opaque tags; interrupt
//! enable/disable is modeled with a single `AtomicBool`, consistent with
//! the single-CPU, no-preemption assumption in `spec.md` §5 (a host test
//! process never actually takes an asynchronous interrupt while inside a
//! critical section here).

use crate::mm::{heap, page_alloc};
use crate::platform::{AddressSpaceTag, IntrState};
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

static INTERRUPTS_ENABLED: AtomicBool = AtomicBool::new(true);
static NEXT_ASID: AtomicU64 = AtomicU64::new(1);
static CURRENT_ASID: AtomicU64 = AtomicU64::new(0);

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

/// Allocates a fresh address-space tag, standing in for cloning the
/// caller's page tables.
pub fn space_clone() -> AddressSpaceTag {
    AddressSpaceTag(NEXT_ASID.fetch_add(1, Ordering::Relaxed))
}

/// Records `tag` as the active address space. There is no real MMU to
/// reprogram in the simulation backend.
pub fn space_switch(tag: AddressSpaceTag) {
    CURRENT_ASID.store(tag.0, Ordering::Relaxed);
}

/// Returns the tag most recently passed to [`space_switch`], for tests
/// that want to assert a switch happened.
pub fn current_address_space() -> AddressSpaceTag {
    AddressSpaceTag(CURRENT_ASID.load(Ordering::Relaxed))
}

pub fn intr_disable() -> IntrState {
    let was_enabled = INTERRUPTS_ENABLED.swap(false, Ordering::SeqCst);
    IntrState(was_enabled)
}

/// # Safety
/// `state` must be a value previously returned by `intr_disable` on this
/// same logical thread of control, restored in LIFO order.
pub unsafe fn intr_restore(state: IntrState) {
    INTERRUPTS_ENABLED.store(state.0, Ordering::SeqCst);
}

pub fn intr_enable() {
    INTERRUPTS_ENABLED.store(true, Ordering::SeqCst);
}

pub fn wait_for_interrupt() {
    core::hint::spin_loop();
}
