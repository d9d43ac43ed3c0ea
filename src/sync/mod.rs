//! Reference counting for the polymorphic I/O interface.
//!
//! `spec.md` §3 describes the I/O interface header as "a pointer to an
//! operation table... and a reference count"; an [`Arc`] over a trait
//! object *is* that pair (vtable pointer + refcount), so the I/O layer is
//! built directly on it instead of reimplementing manual refcounting.

pub mod arc;

pub use arc::{Arc, Weak};
