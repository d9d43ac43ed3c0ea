//! The polymorphic I/O interface. `spec.md` §3/§9 describes a concrete
//! backend embedding a `{close, read, write, ctl}` vtable pointer plus a
//! refcount at a fixed offset, recovered from the header by pointer
//! subtraction; §9's own design notes flag that as something "a clean
//! reimplementation should model as a tagged polymorphic dispatch... no
//! raw offset subtraction" - exactly what a trait object gives for free.
//! `Io` is the concrete "vtable pointer + refcount" pair: an [`Arc`] over
//! `spin::Mutex<Box<dyn IoDevice>>` (the mutex stands in for "no internal
//! concurrency, but callers share the handle" - `spec.md` §5 says callers
//! are responsible for not calling concurrently, and a spinlock not a raw
//! `RefCell` keeps that promise enforced rather than merely assumed; see
//! the `Io` type alias below for why the extra `Box` is there).

use core::fmt;

use alloc::boxed::Box;

use crate::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum IoError {
    /// Operation absent from the vtable, or rejected by policy (e.g.
    /// `SETPOS` on the terminal backend).
    Unsupported = -1,
    /// Position at end of a literal buffer; a bad id passed to `join`
    /// (see `thread::ThreadError` for the latter).
    Invalid = -2,
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoError::Unsupported => write!(f, "unsupported"),
            IoError::Invalid => write!(f, "invalid"),
        }
    }
}

pub type IoResult<T> = Result<T, IoError>;

/// Control commands recognized system-wide, plus an escape hatch for
/// backend-specific codes (`ctl`'s `cmd, arg` pair in `spec.md` §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ctl {
    GetLen,
    GetPos,
    SetPos(u64),
    GetBlockSize,
    Other(u64, i64),
}

pub trait IoDevice: Send {
    fn close(&mut self) {}

    fn read(&mut self, _buf: &mut [u8]) -> IoResult<usize> {
        Err(IoError::Unsupported)
    }

    fn write(&mut self, _buf: &[u8]) -> IoResult<usize> {
        Err(IoError::Unsupported)
    }

    /// Any command this backend doesn't recognize should return
    /// `Err(IoError::Unsupported)`, matching the original's generic `-1`
    /// for unrecognised `ioctl`s.
    fn ctl(&mut self, _cmd: Ctl) -> IoResult<i64> {
        Err(IoError::Unsupported)
    }
}

/// A shared handle to a concrete I/O backend. Cloning bumps the
/// refcount; the backend's `close` runs when the last handle is dropped.
///
/// The `Box<dyn IoDevice>` inside the mutex, rather than an unsized
/// `Mutex<dyn IoDevice>` directly, is what lets this crate's hand-rolled
/// `Arc` (no access to the unstable `CoerceUnsized`) hold a trait object:
/// `Arc::new` only ever sees the `Sized` `Mutex<Box<dyn IoDevice>>`, and
/// the unsizing happens in the ordinary, compiler-supported `Box::new(..)
/// as Box<dyn IoDevice>` coercion below.
pub type Io = Arc<spin::Mutex<Box<dyn IoDevice>>>;

/// Wraps a concrete backend in the shared handle type.
pub fn handle<T: IoDevice + 'static>(device: T) -> Io {
    Arc::new(spin::Mutex::new(Box::new(device) as Box<dyn IoDevice>))
}
