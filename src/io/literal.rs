//! In-memory I/O backend, backing a fixed byte buffer with the same
//! interface as a device (`io_lit` in the original). Used for testing and
//! for exposing a boot-time blob (e.g. an initrd) through ordinary `Io`
//! calls.

use alloc::boxed::Box;

use super::device::{Ctl, IoDevice, IoError, IoResult};
use crate::config::LITERAL_BLOCK_SIZE;

pub struct LiteralIo {
    buf: Box<[u8]>,
    pos: u64,
}

impl LiteralIo {
    pub fn new(buf: Box<[u8]>) -> Self {
        LiteralIo { buf, pos: 0 }
    }
}

impl IoDevice for LiteralIo {
    fn read(&mut self, out: &mut [u8]) -> IoResult<usize> {
        let size = self.buf.len() as u64;
        if self.pos >= size {
            return Err(IoError::Invalid);
        }
        let start = self.pos as usize;
        let n = out.len().min(self.buf.len() - start);
        out[..n].copy_from_slice(&self.buf[start..start + n]);
        self.pos += n as u64;
        // Reports zero on success regardless of `n`, matching the
        // original's `io_lit_read`; `out[..n]` was still filled above.
        Ok(0)
    }

    fn write(&mut self, input: &[u8]) -> IoResult<usize> {
        let size = self.buf.len() as u64;
        if self.pos >= size {
            return Err(IoError::Invalid);
        }
        let start = self.pos as usize;
        let n = input.len().min(self.buf.len() - start);
        self.buf[start..start + n].copy_from_slice(&input[..n]);
        self.pos += n as u64;
        Ok(0)
    }

    fn ctl(&mut self, cmd: Ctl) -> IoResult<i64> {
        match cmd {
            Ctl::GetLen => Ok(self.buf.len() as i64),
            Ctl::GetPos => Ok(self.pos as i64),
            Ctl::SetPos(p) => {
                // Unbounded: a seek past the end just makes the next
                // read/write fail with `Invalid`, same as the original.
                self.pos = p;
                Ok(0)
            }
            Ctl::GetBlockSize => Ok(LITERAL_BLOCK_SIZE as i64),
            Ctl::Other(..) => Err(IoError::Unsupported),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{handle, helpers};
    use alloc::vec;

    #[test]
    fn round_trip_preserves_bytes_despite_zero_return() {
        let io = handle(LiteralIo::new(vec![0u8; 8].into_boxed_slice()));
        let n = helpers::write_all(&io, b"hello").unwrap();
        assert_eq!(n, 0);
        io.lock().ctl(Ctl::SetPos(0)).unwrap();
        let mut out = [0u8; 5];
        let n = helpers::read_full(&io, &mut out).unwrap();
        assert_eq!(n, 0);
        assert_eq!(&out, b"hello");
    }

    #[test]
    fn read_past_end_is_invalid() {
        let io = handle(LiteralIo::new(vec![b'a', b'b'].into_boxed_slice()));
        io.lock().ctl(Ctl::SetPos(2)).unwrap();
        let mut out = [0u8; 1];
        assert_eq!(io.lock().read(&mut out), Err(IoError::Invalid));
    }

    #[test]
    fn partial_read_stops_at_buffer_end() {
        let io = handle(LiteralIo::new(vec![b'a', b'b', b'c', b'd', b'e'].into_boxed_slice()));
        io.lock().ctl(Ctl::SetPos(2)).unwrap();
        let mut out = [0u8; 10];
        helpers::read_full(&io, &mut out).unwrap();
        assert_eq!(&out[..3], b"cde");
        assert_eq!(io.lock().ctl(Ctl::GetPos).unwrap(), 5);
    }
}
