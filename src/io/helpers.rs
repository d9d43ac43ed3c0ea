//! Backend-independent helpers layered on top of [`IoDevice`]: the
//! full-transfer loops (`ioread_full`/`iowrite_all` in the original),
//! single-byte `getc`/`putc`, and formatted output. None of these know
//! which concrete backend they're talking to.

use core::fmt;

use super::device::{Io, IoError, IoResult};

/// Calls `read` until `buf` is full, a short read (`Ok(0)`) signals no
/// more data is available right now, or an error propagates. Returns the
/// number of bytes actually delivered, which may be less than `buf.len()`.
///
/// The memory-literal backend reports `Ok(0)` on every successful call
/// regardless of how many bytes it actually copied (see `io::literal`),
/// so against that backend this loop always stops after its first call
/// and returns `Ok(0)` even though `buf` was filled - a quirk preserved
/// from the original rather than smoothed over here.
pub fn read_full(io: &Io, buf: &mut [u8]) -> IoResult<usize> {
    let mut got = 0;
    while got < buf.len() {
        match io.lock().read(&mut buf[got..]) {
            Ok(0) => break,
            Ok(n) => got += n,
            Err(e) => return if got > 0 { Ok(got) } else { Err(e) },
        }
    }
    Ok(got)
}

/// Calls `write` until all of `buf` has been accepted, or an error
/// propagates. See [`read_full`] for the literal backend's `Ok(0)` quirk,
/// which applies here symmetrically.
pub fn write_all(io: &Io, buf: &[u8]) -> IoResult<usize> {
    let mut sent = 0;
    while sent < buf.len() {
        match io.lock().write(&buf[sent..]) {
            Ok(0) => break,
            Ok(n) => sent += n,
            Err(e) => return if sent > 0 { Ok(sent) } else { Err(e) },
        }
    }
    Ok(sent)
}

pub fn putc(io: &Io, c: u8) -> IoResult<()> {
    write_all(io, &[c]).map(|_| ())
}

pub fn getc(io: &Io) -> IoResult<u8> {
    let mut buf = [0u8];
    read_full(io, &mut buf)?;
    Ok(buf[0])
}

/// Adapts an [`Io`] handle to [`core::fmt::Write`], latching the first
/// I/O error instead of trying to report it through `fmt::Result` (which
/// has no room for one). Used by [`printf`]/[`puts`].
pub struct IoWriter<'a> {
    io: &'a Io,
    error: Option<IoError>,
}

impl<'a> IoWriter<'a> {
    pub fn new(io: &'a Io) -> Self {
        IoWriter { io, error: None }
    }

    pub fn into_result(self) -> IoResult<()> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl fmt::Write for IoWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.error.is_some() {
            return Ok(());
        }
        for &b in s.as_bytes() {
            if let Err(e) = putc(self.io, b) {
                self.error = Some(e);
                break;
            }
        }
        Ok(())
    }
}

/// Writes `s` followed by a trailing `\n`, matching `ioputs` in the
/// original - the newline is the entire reason this exists instead of a
/// plain `write_all`.
pub fn puts(io: &Io, s: &str) -> IoResult<()> {
    let mut w = IoWriter::new(io);
    let _ = fmt::Write::write_str(&mut w, s);
    let _ = fmt::Write::write_str(&mut w, "\n");
    w.into_result()
}

pub fn vprintf(io: &Io, args: fmt::Arguments<'_>) -> IoResult<()> {
    let mut w = IoWriter::new(io);
    let _ = fmt::write(&mut w, args);
    w.into_result()
}

pub fn printf(io: &Io, args: fmt::Arguments<'_>) -> IoResult<()> {
    vprintf(io, args)
}

/// Formats and writes to an [`Io`] handle, the `fmt::Arguments` plumbing
/// of `kprintf`/`ioprintf` from the original hidden behind a macro.
#[macro_export]
macro_rules! ioprintf {
    ($io:expr, $($arg:tt)*) => {
        $crate::io::helpers::printf($io, core::format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::device::{handle, Ctl};
    use super::super::literal::LiteralIo;
    use alloc::vec;

    #[test]
    fn puts_appends_trailing_newline() {
        let io = handle(LiteralIo::new(vec![0u8; 16].into_boxed_slice()));
        puts(&io, "hi").unwrap();
        io.lock().ctl(Ctl::SetPos(0)).unwrap();
        let mut out = [0u8; 3];
        read_full(&io, &mut out).unwrap();
        assert_eq!(&out, b"hi\n");
    }
}
