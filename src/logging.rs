//! Structured logging, standing in for the ad hoc `debug()`/`trace()` calls
//! scattered through `thread.c`/`io.c` and the teacher's `debug_info!`
//! family of macros. Built on the `log` crate so the rest of the kernel
//! logs with `log::trace!`/`debug!`/`info!`/`warn!`/`error!` like any other
//! Rust codebase.

use log::{LevelFilter, Log, Metadata, Record};
use spin::Mutex;

/// Anything the logger can write formatted lines to. Implemented by the
/// console I/O device in production and by a stdout shim under
/// `cfg(test)`.
pub trait LogSink: Send {
    fn write_line(&mut self, line: &str);
}

static LOGGER: Mutex<Option<&'static mut dyn LogSink>> = Mutex::new(None);

struct Shim;

impl Log for Shim {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut line = LineBuf::new();
        let _ = core::fmt::write(
            &mut line,
            format_args!("[{:<5} {}] {}", record.level(), record.target(), record.args()),
        );
        if let Some(sink) = LOGGER.lock().as_deref_mut() {
            sink.write_line(line.as_str());
        }
    }

    fn flush(&self) {}
}

/// Small stack buffer for formatting a single log line; kernel log lines
/// are short and this avoids heap churn on every `debug!`/`trace!` call.
struct LineBuf {
    buf: [u8; 256],
    len: usize,
}

impl LineBuf {
    fn new() -> Self {
        LineBuf { buf: [0; 256], len: 0 }
    }

    fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("<non-utf8 log line>")
    }
}

impl core::fmt::Write for LineBuf {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let bytes = s.as_bytes();
        let room = self.buf.len() - self.len;
        let take = bytes.len().min(room);
        self.buf[self.len..self.len + take].copy_from_slice(&bytes[..take]);
        self.len += take;
        Ok(())
    }
}

static SHIM: Shim = Shim;

/// Installs the global logger with `sink` as its output and `level` as the
/// initial filter. Mirrors `debug::init()` setting the default level to
/// `Info` in the teacher.
pub fn init(sink: &'static mut dyn LogSink, level: LevelFilter) {
    *LOGGER.lock() = Some(sink);
    let _ = log::set_logger(&SHIM);
    log::set_max_level(level);
    log::info!("logging initialized at {:?}", level);
}

/// Raises or lowers the live filter level, equivalent to
/// `debug::set_debug_level`.
pub fn set_level(level: LevelFilter) {
    log::set_max_level(level);
}

#[cfg(test)]
pub(crate) struct StdoutSink;

#[cfg(test)]
impl LogSink for StdoutSink {
    fn write_line(&mut self, line: &str) {
        std::println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_and_set_level_do_not_panic() {
        #[allow(static_mut_refs)]
        static mut SINK: StdoutSink = StdoutSink;
        init(unsafe { &mut SINK }, LevelFilter::Trace);
        set_level(LevelFilter::Warn);
        log::warn!("logging smoke test");
        set_level(LevelFilter::Trace);
    }
}
