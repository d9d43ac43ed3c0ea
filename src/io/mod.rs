//! The polymorphic I/O abstraction: a shared, reference-counted handle
//! over any backend implementing [`IoDevice`], plus the two concrete
//! backends the kernel ships (`io.c`'s `io_lit`/`io_term` in the original)
//! and the transfer-loop helpers built on top of them.

mod device;
mod helpers;
mod literal;
mod terminal;

pub use device::{handle, Ctl, Io, IoDevice, IoError, IoResult};
pub use helpers::{getc, printf, puts, putc, read_full, vprintf, write_all, IoWriter};
pub use literal::LiteralIo;
pub use terminal::TerminalIo;
