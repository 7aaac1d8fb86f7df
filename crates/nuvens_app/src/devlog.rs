//! Development log
//!
//! A [`tracing_subscriber::Layer`] that keeps the most recent events in a
//! bounded ring buffer so a debug panel (or a test) can inspect them after the
//! fact. The [`DevLog`] handle is cheap to clone; every clone sees the same
//! buffer.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

pub const DEFAULT_CAPACITY: usize = 100;

/// Subsystem an entry belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogCategory {
    Theme,
    Animation,
    Transition,
    Store,
    Component,
    Bridge,
    Error,
    Info,
}

impl LogCategory {
    pub const ALL: [LogCategory; 8] = [
        LogCategory::Theme,
        LogCategory::Animation,
        LogCategory::Transition,
        LogCategory::Store,
        LogCategory::Component,
        LogCategory::Bridge,
        LogCategory::Error,
        LogCategory::Info,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LogCategory::Theme => "theme",
            LogCategory::Animation => "animation",
            LogCategory::Transition => "transition",
            LogCategory::Store => "store",
            LogCategory::Component => "component",
            LogCategory::Bridge => "bridge",
            LogCategory::Error => "error",
            LogCategory::Info => "info",
        }
    }

    /// Classify an event.
    ///
    /// An explicit `category` field wins, then errors, then the target's crate and module.
    pub fn classify(target: &str, level: LogLevel, explicit: Option<&str>) -> Self {
        if let Some(category) = explicit.and_then(|name| name.parse().ok()) {
            return category;
        }
        if level == LogLevel::Error {
            return LogCategory::Error;
        }
        let mut segments = target.split("::");
        match (segments.next(), segments.next()) {
            (Some("nuvens_animation"), Some("scheduler")) => LogCategory::Transition,
            (Some("nuvens_animation" | "nuvens_clouds"), _) => LogCategory::Animation,
            (Some("nuvens_theme"), Some("state" | "storage")) => LogCategory::Store,
            (Some("nuvens_theme"), _) => LogCategory::Theme,
            (Some("nuvens_bridge"), _) => LogCategory::Bridge,
            (Some("nuvens_app" | "nuvens_cli"), _) => LogCategory::Component,
            _ => LogCategory::Info,
        }
    }
}

impl fmt::Display for LogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LogCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

/// Severity, ordered from least to most severe
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl From<&Level> for LogLevel {
    fn from(level: &Level) -> Self {
        match *level {
            Level::ERROR => LogLevel::Error,
            Level::WARN => LogLevel::Warn,
            Level::INFO => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LogEntry {
    pub id: u64,
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: u64,
    pub category: LogCategory,
    pub level: LogLevel,
    pub target: String,
    pub message: String,
    pub fields: BTreeMap<String, String>,
    /// `[LEVEL] [category] message key=value ...`
    pub formatted: String,
}

/// What [`DevLog::entries`] lets through
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LogFilter {
    /// Empty means every category
    pub categories: BTreeSet<LogCategory>,
    pub min_level: Option<LogLevel>,
    pub search: Option<String>,
}

impl LogFilter {
    fn matches(&self, entry: &LogEntry) -> bool {
        if !self.categories.is_empty() && !self.categories.contains(&entry.category) {
            return false;
        }
        if self.min_level.is_some_and(|min| entry.level < min) {
            return false;
        }
        match &self.search {
            Some(term) => entry
                .formatted
                .to_lowercase()
                .contains(&term.to_lowercase()),
            None => true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LogStats {
    /// Entries recorded since the last clear, including evicted ones
    pub total: u64,
    pub retained: usize,
    pub by_category: BTreeMap<LogCategory, usize>,
    pub by_level: BTreeMap<LogLevel, usize>,
}

#[derive(Serialize)]
struct Export<'a> {
    exported_at_ms: u64,
    stats: LogStats,
    entries: Vec<&'a LogEntry>,
}

struct Buffer {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    next_id: u64,
    total: u64,
    enabled: bool,
    filter: LogFilter,
}

/// Shared handle to the ring buffer
#[derive(Clone)]
pub struct DevLog {
    inner: Arc<Mutex<Buffer>>,
}

impl DevLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Buffer {
                entries: VecDeque::with_capacity(capacity),
                capacity: capacity.max(1),
                next_id: 0,
                total: 0,
                enabled: true,
                filter: LogFilter::default(),
            })),
        }
    }

    /// A layer feeding this log
    pub fn layer(&self) -> DevLogLayer {
        DevLogLayer { log: self.clone() }
    }

    pub fn is_enabled(&self) -> bool {
        self.lock().enabled
    }

    /// Disabled logs drop new events but keep what they hold
    pub fn set_enabled(&self, enabled: bool) {
        self.lock().enabled = enabled;
    }

    pub fn filter(&self) -> LogFilter {
        self.lock().filter.clone()
    }

    pub fn set_filter(&self, filter: LogFilter) {
        self.lock().filter = filter;
    }

    pub fn set_categories(&self, categories: impl IntoIterator<Item = LogCategory>) {
        self.lock().filter.categories = categories.into_iter().collect();
    }

    pub fn set_min_level(&self, level: Option<LogLevel>) {
        self.lock().filter.min_level = level;
    }

    pub fn set_search(&self, term: Option<&str>) {
        self.lock().filter.search = term.filter(|t| !t.is_empty()).map(str::to_string);
    }

    /// Entries passing the current filter, oldest first
    pub fn entries(&self) -> Vec<LogEntry> {
        let buffer = self.lock();
        buffer
            .entries
            .iter()
            .filter(|e| buffer.filter.matches(e))
            .cloned()
            .collect()
    }

    pub fn by_category(&self, category: LogCategory) -> Vec<LogEntry> {
        self.lock()
            .entries
            .iter()
            .filter(|e| e.category == category)
            .cloned()
            .collect()
    }

    pub fn by_level(&self, level: LogLevel) -> Vec<LogEntry> {
        self.lock()
            .entries
            .iter()
            .filter(|e| e.level == level)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    pub fn stats(&self) -> LogStats {
        let buffer = self.lock();
        let mut stats = LogStats {
            total: buffer.total,
            retained: buffer.entries.len(),
            ..LogStats::default()
        };
        for entry in &buffer.entries {
            *stats.by_category.entry(entry.category).or_default() += 1;
            *stats.by_level.entry(entry.level).or_default() += 1;
        }
        stats
    }

    pub fn clear(&self) {
        let mut buffer = self.lock();
        buffer.entries.clear();
        buffer.total = 0;
    }

    /// Filtered entries plus statistics as pretty JSON
    pub fn export_json(&self) -> serde_json::Result<String> {
        let stats = self.stats();
        let buffer = self.lock();
        let export = Export {
            exported_at_ms: unix_millis(SystemTime::now()),
            stats,
            entries: buffer
                .entries
                .iter()
                .filter(|e| buffer.filter.matches(e))
                .collect(),
        };
        serde_json::to_string_pretty(&export)
    }

    fn record(&self, target: &str, level: LogLevel, mut fields: BTreeMap<String, String>) {
        let mut buffer = self.lock();
        if !buffer.enabled {
            return;
        }

        let message = fields.remove("message").unwrap_or_default();
        let category = LogCategory::classify(target, level, fields.remove("category").as_deref());
        let mut formatted = format!("[{level}] [{category}] {message}");
        for (key, value) in &fields {
            formatted.push_str(&format!(" {key}={value}"));
        }

        let id = buffer.next_id;
        buffer.next_id += 1;
        buffer.total += 1;
        if buffer.entries.len() == buffer.capacity {
            buffer.entries.pop_front();
        }
        buffer.entries.push_back(LogEntry {
            id,
            timestamp_ms: unix_millis(SystemTime::now()),
            category,
            level,
            target: target.to_string(),
            message,
            fields,
            formatted,
        });
    }

    fn lock(&self) -> MutexGuard<'_, Buffer> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for DevLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl fmt::Debug for DevLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let buffer = self.lock();
        f.debug_struct("DevLog")
            .field("entries", &buffer.entries.len())
            .field("capacity", &buffer.capacity)
            .field("enabled", &buffer.enabled)
            .finish()
    }
}

fn unix_millis(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}

#[derive(Default)]
struct FieldVisitor(BTreeMap<String, String>);

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.0.insert(field.name().to_string(), value.to_string());
    }
}

/// Layer half of [`DevLog`]
pub struct DevLogLayer {
    log: DevLog,
}

impl<S: Subscriber> Layer<S> for DevLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        let metadata = event.metadata();
        self.log
            .record(metadata.target(), metadata.level().into(), visitor.0);
    }
}
