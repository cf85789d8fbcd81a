//! Logging port of the domain layer.
//!
//! Domain and application code log through `get_logger()`; the browser build
//! installs a console sink at start-up, tests install a `BufferLogger`, and
//! anything else falls back to a silent sink.

use derive_more::Display;
use std::sync::{Arc, Mutex, OnceLock};
use strum::AsRefStr;

/// Severity, ordered from chattiest to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, AsRefStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Layer and unit that produced an entry, rendered as `APP:Reconciler` etc.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum LogComponent {
    #[display(fmt = "DOM:{}", _0)]
    Domain(&'static str),
    #[display(fmt = "APP:{}", _0)]
    Application(&'static str),
    #[display(fmt = "INF:{}", _0)]
    Infrastructure(&'static str),
    #[display(fmt = "PRE:{}", _0)]
    Presentation(&'static str),
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Milliseconds since the Unix epoch, from the installed `TimeProvider`
    pub timestamp: u64,
    pub level: LogLevel,
    pub component: LogComponent,
    pub message: String,
    /// Optional `key=value` context appended after the message
    pub context: Option<String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, component: LogComponent, message: impl Into<String>) -> Self {
        Self {
            timestamp: get_time_provider().current_timestamp(),
            level,
            component,
            message: message.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// `[time] LEVEL component: message | context`
    pub fn render(&self, time_provider: &dyn TimeProvider) -> String {
        let stamp = time_provider.format_timestamp(self.timestamp);
        let head = format!("[{stamp}] {:>5} {}: {}", self.level.as_ref(), self.component, self.message);
        match &self.context {
            Some(context) => format!("{head} | {context}"),
            None => head,
        }
    }
}

/// Wall clock, in milliseconds since the Unix epoch.
///
/// The reconciler stamps detections through this trait so tests can pin "now".
pub trait TimeProvider: Send + Sync {
    fn current_timestamp(&self) -> u64;
    fn format_timestamp(&self, timestamp: u64) -> String;
}

/// Sink for log entries. Only `log` is required.
pub trait Logger: Send + Sync {
    fn log(&self, entry: LogEntry);

    fn log_at(&self, level: LogLevel, component: LogComponent, message: &str) {
        self.log(LogEntry::new(level, component, message));
    }

    fn trace(&self, component: LogComponent, message: &str) {
        self.log_at(LogLevel::Trace, component, message);
    }

    fn debug(&self, component: LogComponent, message: &str) {
        self.log_at(LogLevel::Debug, component, message);
    }

    fn info(&self, component: LogComponent, message: &str) {
        self.log_at(LogLevel::Info, component, message);
    }

    fn warn(&self, component: LogComponent, message: &str) {
        self.log_at(LogLevel::Warn, component, message);
    }

    fn error(&self, component: LogComponent, message: &str) {
        self.log_at(LogLevel::Error, component, message);
    }
}

type SharedLogger = Box<dyn Logger>;
type SharedClock = Box<dyn TimeProvider>;

static LOGGER: OnceLock<SharedLogger> = OnceLock::new();
static CLOCK: OnceLock<SharedClock> = OnceLock::new();

/// Install the process-wide logger. Later calls are ignored.
pub fn init_logger(logger: SharedLogger) {
    if LOGGER.set(logger).is_err() {
        get_logger().debug(LogComponent::Domain("Logging"), "logger already installed");
    }
}

/// Install the clock used for log timestamps. Later calls are ignored.
pub fn init_time_provider(time_provider: SharedClock) {
    let _ = CLOCK.set(time_provider);
}

pub fn get_logger() -> &'static dyn Logger {
    match LOGGER.get() {
        Some(logger) => logger.as_ref(),
        None => &SilentLogger,
    }
}

pub fn get_time_provider() -> &'static dyn TimeProvider {
    match CLOCK.get() {
        Some(clock) => clock.as_ref(),
        None => &SequenceClock,
    }
}

struct SilentLogger;

impl Logger for SilentLogger {
    fn log(&self, _entry: LogEntry) {}
}

/// Monotonic counter standing in for a clock before one is installed
struct SequenceClock;

impl TimeProvider for SequenceClock {
    fn current_timestamp(&self) -> u64 {
        use std::sync::atomic::{AtomicU64, Ordering};
        static TICKS: AtomicU64 = AtomicU64::new(0);
        TICKS.fetch_add(1, Ordering::Relaxed)
    }

    fn format_timestamp(&self, timestamp: u64) -> String {
        format!("#{timestamp:06}")
    }
}

/// In-memory logger. Clones share one buffer, so a copy can be installed
/// globally while another is inspected.
#[derive(Clone, Default)]
pub struct BufferLogger {
    min_level: Option<LogLevel>,
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl BufferLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_level(min_level: LogLevel) -> Self {
        Self { min_level: Some(min_level), entries: Arc::default() }
    }

    fn buffer(&self) -> std::sync::MutexGuard<'_, Vec<LogEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.buffer().clone()
    }

    /// Messages logged at exactly `level`.
    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.buffer()
            .iter()
            .filter(|entry| entry.level == level)
            .map(|entry| entry.message.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.buffer().clear();
    }
}

impl Logger for BufferLogger {
    fn log(&self, entry: LogEntry) {
        if self.min_level.is_some_and(|min| entry.level < min) {
            return;
        }
        self.buffer().push(entry);
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_at {
    ($method:ident, $component:expr, $($arg:tt)*) => {
        $crate::domain::logging::get_logger().$method($component, &format!($($arg)*))
    };
}

/// Compiled out of release builds.
#[macro_export]
macro_rules! log_trace {
    ($component:expr, $($arg:tt)*) => {
        #[cfg(debug_assertions)]
        {
            $crate::__log_at!(trace, $component, $($arg)*);
        }
    };
}

/// Compiled out of release builds.
#[macro_export]
macro_rules! log_debug {
    ($component:expr, $($arg:tt)*) => {
        #[cfg(debug_assertions)]
        {
            $crate::__log_at!(debug, $component, $($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($component:expr, $($arg:tt)*) => {
        $crate::__log_at!(info, $component, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($component:expr, $($arg:tt)*) => {
        $crate::__log_at!(warn, $component, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_error {
    ($component:expr, $($arg:tt)*) => {
        $crate::__log_at!(error, $component, $($arg)*)
    };
}
