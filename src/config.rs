//! Compile-time parameters, carried over from the `#define`s at the top of
//! the original `thread.c`/`io.c` (`NTHR`, the page size, the literal
//! backend's reported block size).

/// Maximum number of threads, including the main and idle threads.
pub const NTHR: usize = 16;

/// Slot reserved for the thread that calls [`crate::thread::init`].
pub const MAIN_TID: usize = 0;

/// Slot reserved for the idle thread.
pub const IDLE_TID: usize = NTHR - 1;

/// Page size used by the platform page allocator.
pub const PAGE_SIZE: usize = 4096;

/// Number of pages backing a spawned thread's kernel stack.
pub const KERNEL_STACK_PAGES: usize = 1;

/// Value reported by [`crate::io::Ctl::GetBlockSize`] on the memory-literal
/// backend, matching `IOCTL_GETBLKSZ`'s fixed answer in `io_lit_ioctl`.
pub const LITERAL_BLOCK_SIZE: u64 = 4096;

/// Capacity of the terminal backend's line-editing buffer.
pub const MAX_LINE: usize = 256;

/// Number of physical pages made available by the simulated/real page pool.
pub const PAGE_POOL_PAGES: usize = 256;
