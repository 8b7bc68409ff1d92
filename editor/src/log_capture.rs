use std::collections::VecDeque;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

/// Records kept until the project config says otherwise.
pub const DEFAULT_CAPACITY: usize = 10_000;

/// A single captured log entry.
pub struct LogEntry {
    pub level: log::Level,
    pub target: String,
    pub message: String,
}

/// Ring buffer of captured log entries.
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    max_capacity: usize,
}

impl LogBuffer {
    pub fn new(max_capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_capacity.min(1024)),
            max_capacity,
        }
    }

    pub fn entries(&self) -> &VecDeque<LogEntry> {
        &self.entries
    }

    pub fn push(&mut self, entry: LogEntry) {
        if self.max_capacity == 0 {
            return;
        }
        if self.entries.len() >= self.max_capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Changes the capacity, dropping the oldest entries that no longer fit.
    pub fn set_capacity(&mut self, max_capacity: usize) {
        self.max_capacity = max_capacity;
        while self.entries.len() > max_capacity {
            self.entries.pop_front();
        }
    }

    /// The last `n` entries formatted as `LEVEL target: message`.
    pub fn recent(&self, n: usize) -> Vec<String> {
        let entries = self.entries();
        entries
            .iter()
            .skip(entries.len().saturating_sub(n))
            .map(|e| format!("{:<5} {}: {}", e.level, e.target, e.message))
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Global shared log buffer.
static LOG_BUFFER: OnceLock<Arc<Mutex<LogBuffer>>> = OnceLock::new();

/// Returns the shared log buffer handle, if [`install`] has run.
pub fn log_buffer() -> Option<Arc<Mutex<LogBuffer>>> {
    LOG_BUFFER.get().cloned()
}

/// Logger that wraps `env_logger` and captures entries to the ring buffer.
struct LogCapture {
    inner: env_logger::Logger,
    buffer: Arc<Mutex<LogBuffer>>,
}

impl log::Log for LogCapture {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if self.inner.enabled(record.metadata()) {
            // Forward to env_logger (prints to stderr)
            self.inner.log(record);

            self.buffer.lock().push(LogEntry {
                level: record.level(),
                target: record.target().to_owned(),
                message: format!("{}", record.args()),
            });
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Installs the capturing logger. Fails if a logger is already set.
///
/// The filter defaults to `info` and is overridden by `RUST_LOG`.
pub fn install(capacity: usize) -> Result<(), log::SetLoggerError> {
    let buffer = LOG_BUFFER
        .get_or_init(|| Arc::new(Mutex::new(LogBuffer::new(capacity))))
        .clone();

    let inner = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).build();
    let max_level = inner.filter();

    log::set_boxed_logger(Box::new(LogCapture { inner, buffer }))?;
    log::set_max_level(max_level);
    Ok(())
}
