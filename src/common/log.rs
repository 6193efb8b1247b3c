//! Structured JSON-line logging routed through the `log` facade.
//!
//! [`log_event`] renders the documented event record (`ts, level, mod, ev,
//! code, dur_ms`) itself; any other record is wrapped by [`JsonLineLogger`]
//! as `ts, level, mod, msg`. Either way the sink receives one JSON object per
//! line.

use std::io::{self, Write};
use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record};
use serde_json::json;

/// Target used for pre-rendered event records.
pub const EVENT_TARGET: &str = "sidecar::event";

/// Render one event record in the documented line format.
pub fn event_line(level: Level, module: &str, event: &str, code: u32, dur_ms: u128) -> String {
    json!({
        "ts": crate::common::time::now_ms() as u64,
        "level": level.as_str().to_ascii_lowercase(),
        "mod": module,
        "ev": event,
        "code": code,
        "dur_ms": dur_ms as u64,
    })
    .to_string()
}

/// Emit a JSON line matching the documented schema.
pub fn log_event(level: Level, module: &str, event: &str, code: u32, dur_ms: u128) {
    if log::log_enabled!(target: EVENT_TARGET, level) {
        log::log!(target: EVENT_TARGET, level, "{}", event_line(level, module, event, code, dur_ms));
    }
}

/// `log` backend writing one JSON object per line to `sink`.
pub struct JsonLineLogger<W> {
    sink: Mutex<W>,
}

impl<W: Write + Send> JsonLineLogger<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }

    fn render(record: &Record<'_>) -> String {
        if record.target() == EVENT_TARGET {
            return record.args().to_string();
        }
        json!({
            "ts": crate::common::time::now_ms() as u64,
            "level": record.level().as_str().to_ascii_lowercase(),
            "mod": record.target(),
            "msg": record.args().to_string(),
        })
        .to_string()
    }
}

impl<W: Write + Send> Log for JsonLineLogger<W> {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = Self::render(record);
        if let Ok(mut sink) = self.sink.lock() {
            let _ = writeln!(sink, "{line}");
        }
    }

    fn flush(&self) {
        if let Ok(mut sink) = self.sink.lock() {
            let _ = sink.flush();
        }
    }
}

/// Install the stderr JSON-line backend and apply `filter`. Returns `false`
/// when another logger already owns the process; the filter is applied anyway.
pub fn install(filter: LevelFilter) -> bool {
    let installed = log::set_boxed_logger(Box::new(JsonLineLogger::new(io::stderr()))).is_ok();
    log::set_max_level(filter);
    installed
}

#[cfg(test)]
#[derive(Clone)]
pub(crate) struct SharedBuf(pub std::sync::Arc<Mutex<Vec<u8>>>);

#[cfg(test)]
impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| io::Error::other("poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Process-wide capturing backend for tests that assert on emitted lines.
#[cfg(test)]
pub(crate) fn capture() -> std::sync::Arc<Mutex<Vec<u8>>> {
    use std::sync::{Arc, OnceLock};

    static CAPTURED: OnceLock<Arc<Mutex<Vec<u8>>>> = OnceLock::new();
    CAPTURED
        .get_or_init(|| {
            let buf = Arc::new(Mutex::new(Vec::new()));
            let logger = JsonLineLogger::new(SharedBuf(buf.clone()));
            log::set_boxed_logger(Box::new(logger)).expect("no other logger in unit tests");
            log::set_max_level(LevelFilter::Trace);
            buf
        })
        .clone()
}
