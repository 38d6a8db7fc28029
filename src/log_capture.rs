//! In-process log capture for the GUI log panel.
//!
//! Log output goes two ways: `env_logger` writes to stderr as usual, and a
//! second logger tees every record into a bounded in-memory [`LogBuffer`]
//! that the log panel renders. The two are combined with `multi_log`, so
//! ordinary `log::info!`/`log::warn!` calls everywhere in the crate feed
//! both sinks.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local};
use eframe::egui::Color32;
use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::error::AppResult;

/// Maximum retained entries; older entries are evicted first.
const LOG_CAPACITY: usize = 1000;

/// A single captured log record.
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Local wall-clock time the record was captured.
    pub timestamp: DateTime<Local>,
    /// Severity of the record.
    pub level: Level,
    /// Module path that emitted the record.
    pub target: String,
    /// Formatted message text.
    pub message: String,
}

impl LogEntry {
    /// Display colour for the severity tag.
    pub fn color(&self) -> Color32 {
        match self.level {
            Level::Error => Color32::LIGHT_RED,
            Level::Warn => Color32::YELLOW,
            Level::Info => Color32::LIGHT_GREEN,
            Level::Debug => Color32::LIGHT_BLUE,
            Level::Trace => Color32::GRAY,
        }
    }
}

/// Shared, bounded buffer of captured log entries.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
}

impl LogBuffer {
    /// An empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, evicting the oldest once at capacity.
    pub fn push(&self, entry: LogEntry) {
        let mut entries = self.lock();
        if entries.len() >= LOG_CAPACITY {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Borrow the captured entries for rendering.
    pub fn read(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        self.lock()
    }

    /// Drop all captured entries.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        // A panic while holding the lock only poisons display state;
        // recover the guard rather than propagating.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// `log::Log` implementation feeding a [`LogBuffer`].
struct BufferLogger {
    buffer: LogBuffer,
}

impl Log for BufferLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.buffer.push(LogEntry {
            timestamp: Local::now(),
            level: record.level(),
            target: record.target().to_string(),
            message: record.args().to_string(),
        });
    }

    fn flush(&self) {}
}

/// Install the combined stderr + buffer logger.
///
/// Returns the buffer handle for the GUI. Must be called once, before any
/// logging happens.
pub fn init(level: LevelFilter) -> AppResult<LogBuffer> {
    let buffer = LogBuffer::new();

    let stderr_logger = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .build();
    let buffer_logger = BufferLogger {
        buffer: buffer.clone(),
    };

    multi_log::MultiLogger::init(
        vec![Box::new(stderr_logger), Box::new(buffer_logger)],
        level.to_level().unwrap_or(Level::Info),
    )?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(level: Level, message: &str) -> LogEntry {
        LogEntry {
            timestamp: Local::now(),
            level,
            target: "test".to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_push_and_read() {
        let buffer = LogBuffer::new();
        buffer.push(entry(Level::Info, "hello"));
        let entries = buffer.read();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "hello");
    }

    #[test]
    fn test_capacity_eviction() {
        let buffer = LogBuffer::new();
        for i in 0..(LOG_CAPACITY + 5) {
            buffer.push(entry(Level::Debug, &format!("msg {i}")));
        }
        let entries = buffer.read();
        assert_eq!(entries.len(), LOG_CAPACITY);
        // The oldest entries were evicted.
        assert_eq!(entries[0].message, "msg 5");
    }

    #[test]
    fn test_clear() {
        let buffer = LogBuffer::new();
        buffer.push(entry(Level::Info, "x"));
        buffer.clear();
        assert!(buffer.read().is_empty());
    }

    #[test]
    fn test_buffer_logger_captures_records() {
        // The logger consults the global max level before capturing.
        log::set_max_level(LevelFilter::Trace);
        let buffer = LogBuffer::new();
        let logger = BufferLogger {
            buffer: buffer.clone(),
        };
        logger.log(
            &Record::builder()
                .level(Level::Warn)
                .target("ledcube_touch::selection")
                .args(format_args!("limit fallback"))
                .build(),
        );
        let entries = buffer.read();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, Level::Warn);
        assert_eq!(entries[0].target, "ledcube_touch::selection");
    }

    #[test]
    fn test_level_colors_distinct() {
        let error = entry(Level::Error, "").color();
        let info = entry(Level::Info, "").color();
        assert_ne!(error, info);
    }
}
