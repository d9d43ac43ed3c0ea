//! `kmalloc`/`kfree`: a small-object heap backing `struct thread`
//! allocations and the like, mirroring `mm/heap.rs` in the teacher (a
//! `spin`-guarded `linked_list_allocator::Heap` registered as the crate's
//! `#[global_allocator]`) but exposing a malloc/free style API instead of
//! `GlobalAlloc`, since `kfree` in the original (`kfree(thr)`) takes only a
//! pointer, with no size passed back by the caller.

use core::alloc::{GlobalAlloc, Layout};
use core::mem;
use core::ptr;
use linked_list_allocator::Heap;
use spin::Mutex;

const HEAP_SIZE: usize = 4 * 1024 * 1024;

#[repr(align(4096))]
struct HeapArena([u8; HEAP_SIZE]);

static mut ARENA: HeapArena = HeapArena([0; HEAP_SIZE]);

struct LockedHeap(Mutex<Option<Heap>>);

unsafe impl GlobalAlloc for LockedHeap {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        self.ensure_init();
        match self.0.lock().as_mut().unwrap().allocate_first_fit(layout) {
            Ok(ptr) => ptr.as_ptr(),
            Err(_) => ptr::null_mut(),
        }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        if let Some(heap) = self.0.lock().as_mut() {
            heap.deallocate(ptr::NonNull::new_unchecked(ptr), layout);
        }
    }
}

impl LockedHeap {
    fn ensure_init(&self) {
        let mut guard = self.0.lock();
        if guard.is_none() {
            let mut heap = Heap::empty();
            unsafe {
                #[allow(static_mut_refs)]
                heap.init(ARENA.0.as_mut_ptr(), HEAP_SIZE);
            }
            *guard = Some(heap);
        }
    }
}

#[global_allocator]
static ALLOCATOR: LockedHeap = LockedHeap(Mutex::new(None));

/// Header stored immediately before each `kmalloc` allocation so `kfree`
/// can reconstruct the original `Layout` without the caller supplying one,
/// matching the original's single-argument `kfree(ptr)`.
#[repr(C)]
struct Header {
    size: usize,
    align: usize,
}

/// Allocates `size` bytes, 8-byte aligned, suitable for any `struct
/// thread`-sized object. Returns a null pointer on exhaustion, as the
/// underlying `GlobalAlloc` does.
pub fn kmalloc(size: usize) -> *mut u8 {
    kmalloc_aligned(size, mem::align_of::<usize>())
}

/// As [`kmalloc`], with an explicit minimum alignment (used for the
/// `struct thread` allocation, which must be at least pointer-aligned).
pub fn kmalloc_aligned(size: usize, align: usize) -> *mut u8 {
    let header_size = mem::size_of::<Header>();
    let align = align.max(mem::align_of::<Header>());
    let total = header_size + size;
    let layout = Layout::from_size_align(total, align).expect("kmalloc: invalid layout");
    unsafe {
        let raw = ALLOCATOR.alloc(layout);
        if raw.is_null() {
            return ptr::null_mut();
        }
        let header = raw as *mut Header;
        header.write(Header { size: total, align });
        raw.add(header_size)
    }
}

/// Frees memory obtained from [`kmalloc`].
///
/// # Safety
/// `ptr` must have been returned by `kmalloc`/`kmalloc_aligned` and not
/// already freed.
pub unsafe fn kfree(ptr: *mut u8) {
    let header_size = mem::size_of::<Header>();
    let raw = ptr.sub(header_size);
    let header = &*(raw as *const Header);
    let layout = Layout::from_size_align_unchecked(header.size, header.align);
    ALLOCATOR.dealloc(raw, layout);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kmalloc_roundtrip() {
        let p = kmalloc(64);
        assert!(!p.is_null());
        unsafe {
            core::ptr::write_bytes(p, 0xAB, 64);
            kfree(p);
        }
    }
}
