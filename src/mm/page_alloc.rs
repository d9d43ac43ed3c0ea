//! Fixed-size page pool backing `alloc_page`/`free_page`.
//!
//! Modeled on the teacher's `StackAllocator` (`process/stack.rs`): a
//! bitmap of free/allocated slots over a statically reserved region,
//! generalized from a guarded 64 KiB stack-slab allocator to plain
//! `PAGE_SIZE`-sized pages, since the thread core only ever asks the
//! memory manager for single pages (kernel stacks, fork-to-user stacks).

use crate::config::{PAGE_POOL_PAGES, PAGE_SIZE};
use spin::Mutex;

#[repr(align(4096))]
struct PagePool([u8; PAGE_SIZE * PAGE_POOL_PAGES]);

static POOL: PagePool = PagePool([0; PAGE_SIZE * PAGE_POOL_PAGES]);

struct Bitmap {
    used: [bool; PAGE_POOL_PAGES],
}

static BITMAP: Mutex<Bitmap> = Mutex::new(Bitmap { used: [false; PAGE_POOL_PAGES] });

fn pool_base() -> *mut u8 {
    POOL.0.as_ptr() as *mut u8
}

/// Allocates one zeroed page. Panics if the pool is exhausted; a real
/// memory manager would return an error, but `spec.md` treats page
/// exhaustion the same way `thread_spawn` treats a full thread table: a
/// structural bug in a teaching kernel sized for a handful of threads.
pub fn alloc_page() -> *mut u8 {
    let mut bitmap = BITMAP.lock();
    let slot = bitmap
        .used
        .iter()
        .position(|used| !used)
        .expect("page pool exhausted");
    bitmap.used[slot] = true;
    let ptr = unsafe { pool_base().add(slot * PAGE_SIZE) };
    unsafe { core::ptr::write_bytes(ptr, 0, PAGE_SIZE) };
    ptr
}

/// Returns a page previously obtained from [`alloc_page`] to the pool.
///
/// # Safety
/// `page` must be a pointer previously returned by `alloc_page` and not
/// already freed.
pub unsafe fn free_page(page: *mut u8) {
    let base = pool_base() as usize;
    let offset = (page as usize)
        .checked_sub(base)
        .expect("free_page: pointer outside page pool");
    let slot = offset / PAGE_SIZE;
    assert!(slot < PAGE_POOL_PAGES && offset % PAGE_SIZE == 0, "free_page: misaligned pointer");
    let mut bitmap = BITMAP.lock();
    assert!(bitmap.used[slot], "free_page: double free");
    bitmap.used[slot] = false;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_then_free_reuses_slot() {
        let a = alloc_page();
        unsafe { free_page(a) };
        let b = alloc_page();
        assert_eq!(a, b);
        unsafe { free_page(b) };
    }

    #[test]
    fn allocated_pages_are_distinct_and_zeroed() {
        let a = alloc_page();
        let b = alloc_page();
        assert_ne!(a, b);
        unsafe {
            assert_eq!(*a, 0);
            assert_eq!(*b, 0);
        }
        unsafe {
            free_page(a);
            free_page(b);
        }
    }
}
