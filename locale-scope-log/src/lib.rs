//! Logging for the locale-scope crates.
//!
//! A small, environment-controlled logger. Nothing is written below the
//! configured level, and disabled macros never format their arguments.
//!
//! # Usage
//!
//! ```rust
//! use locale_scope_log::{debug, info, trace, warn};
//!
//! debug!("mounting scope");
//! info!("switched locale to {}", "fr");
//! warn!(target: "locale_scope::hook", "toggle hook failed");
//! trace!("memo hit");
//! ```
//!
//! # Environment Variables
//!
//! - `LOCALE_SCOPE_DEBUG=1` - Enable debug logging
//! - `LOCALE_SCOPE_LOG_LEVEL=trace|debug|info|warn|error|off` - Minimum level
//! - `LOCALE_SCOPE_LOG_FORMAT=pretty|compact|json` - Output format
//! - `LOCALE_SCOPE_LOG_TIMESTAMPS=1|0` - Prefix lines with a timestamp
//! - `LOCALE_SCOPE_LOG_SINK=stderr|facade` - Write to stderr or forward to the
//!   `log` facade (for applications that install their own logger)

use once_cell::sync::Lazy;
use std::env;
use std::fmt::Write as _;
use std::io::Write as _;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

// ============================================================================
// Levels
// ============================================================================

/// Log level, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    /// Disables all output
    Off = 5,
}

impl Level {
    /// Parse a level name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Level::Trace),
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" | "warning" => Some(Level::Warn),
            "error" => Some(Level::Error),
            "off" | "none" => Some(Level::Off),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Off => "OFF",
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Level::Trace,
            1 => Level::Debug,
            2 => Level::Info,
            3 => Level::Warn,
            4 => Level::Error,
            _ => Level::Off,
        }
    }

    /// Matching `log` facade level; `Off` has none.
    pub fn to_log_level(self) -> Option<log::Level> {
        match self {
            Level::Trace => Some(log::Level::Trace),
            Level::Debug => Some(log::Level::Debug),
            Level::Info => Some(log::Level::Info),
            Level::Warn => Some(log::Level::Warn),
            Level::Error => Some(log::Level::Error),
            Level::Off => None,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output format for stderr logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `2026-01-01 12:00:00.000 DEBUG [target] message`
    Pretty,
    /// `12:00:00 D target: message`
    Compact,
    /// One JSON object per line
    Json,
}

impl Format {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Some(Format::Pretty),
            "compact" => Some(Format::Compact),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

/// Where log records go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sink {
    Stderr,
    /// Hand records to whatever logger is installed behind the `log` facade.
    Facade,
}

impl Sink {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stderr" => Some(Sink::Stderr),
            "facade" | "log" => Some(Sink::Facade),
            _ => None,
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);
static LOG_LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);

static CONFIG: Lazy<LogConfig> = Lazy::new(|| {
    let config = LogConfig::from_env();
    DEBUG_ENABLED.store(config.debug, Ordering::SeqCst);
    LOG_LEVEL.store(config.level as u8, Ordering::SeqCst);
    config
});

/// Logger configuration, read once from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub debug: bool,
    pub level: Level,
    pub format: Format,
    pub sink: Sink,
    pub timestamps: bool,
    pub color: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: Level::Info,
            format: Format::Pretty,
            sink: Sink::Stderr,
            timestamps: true,
            color: false,
        }
    }
}

impl LogConfig {
    /// Build the configuration from `LOCALE_SCOPE_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| lookup(key).map(|v| v == "1" || v.eq_ignore_ascii_case("true"));
        let defaults = Self::default();

        let debug = flag("LOCALE_SCOPE_DEBUG").unwrap_or(false);
        let level = lookup("LOCALE_SCOPE_LOG_LEVEL")
            .and_then(|s| Level::parse(&s))
            .unwrap_or(if debug { Level::Debug } else { defaults.level });

        Self {
            debug,
            level,
            format: lookup("LOCALE_SCOPE_LOG_FORMAT")
                .and_then(|s| Format::parse(&s))
                .unwrap_or(defaults.format),
            sink: lookup("LOCALE_SCOPE_LOG_SINK")
                .and_then(|s| Sink::parse(&s))
                .unwrap_or(defaults.sink),
            timestamps: flag("LOCALE_SCOPE_LOG_TIMESTAMPS").unwrap_or(defaults.timestamps),
            color: lookup("NO_COLOR").is_none() && lookup("TERM").is_some(),
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Force the environment to be read now rather than on first use.
pub fn init() {
    Lazy::force(&CONFIG);
}

/// Global configuration.
pub fn config() -> &'static LogConfig {
    &CONFIG
}

#[inline]
pub fn is_debug_enabled() -> bool {
    Lazy::force(&CONFIG);
    DEBUG_ENABLED.load(Ordering::Relaxed)
}

#[inline]
pub fn is_level_enabled(level: Level) -> bool {
    Lazy::force(&CONFIG);
    level != Level::Off && level as u8 >= LOG_LEVEL.load(Ordering::Relaxed)
}

/// Whether a record at `level` is written. Debug mode lets `Debug` records
/// through regardless of the minimum level.
fn passes(level: Level, min: Level, debug: bool) -> bool {
    if level == Level::Off {
        return false;
    }
    level >= min || (debug && level == Level::Debug)
}

pub fn current_level() -> Level {
    Lazy::force(&CONFIG);
    Level::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

/// Override the minimum level at runtime.
pub fn set_level(level: Level) {
    Lazy::force(&CONFIG);
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);
}

/// Toggle debug mode at runtime. Enabling it lowers the level to `Debug`.
pub fn set_debug(enabled: bool) {
    Lazy::force(&CONFIG);
    DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
    if enabled && current_level() > Level::Debug {
        set_level(Level::Debug);
    }
}

// ============================================================================
// Output
// ============================================================================

#[doc(hidden)]
pub fn log(level: Level, target: &str, message: &str) {
    if !passes(level, current_level(), is_debug_enabled()) {
        return;
    }

    let config = config();
    match config.sink {
        Sink::Facade => {
            if let Some(level) = level.to_log_level() {
                log::log!(target: target, level, "{}", message);
            }
        }
        Sink::Stderr => {
            let line = render(config, level, target, message);
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
        }
    }
}

/// Render one record as a single line according to `config.format`.
pub fn render(config: &LogConfig, level: Level, target: &str, message: &str) -> String {
    match config.format {
        Format::Pretty => render_pretty(config, level, target, message),
        Format::Compact => render_compact(config, level, target, message),
        Format::Json => render_json(level, target, message),
    }
}

fn render_pretty(config: &LogConfig, level: Level, target: &str, message: &str) -> String {
    let mut line = String::new();
    if config.timestamps {
        let _ = write!(line, "{} ", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"));
    }
    let _ = write!(line, "{} ", level_label(config, level));
    if !target.is_empty() {
        let _ = write!(line, "[{}] ", target);
    }
    line.push_str(message);
    line
}

fn render_compact(config: &LogConfig, level: Level, target: &str, message: &str) -> String {
    let mut line = String::new();
    if config.timestamps {
        let _ = write!(line, "{} ", chrono::Local::now().format("%H:%M:%S"));
    }
    line.push(level.as_str().chars().next().unwrap_or('?'));
    line.push(' ');
    if !target.is_empty() {
        let _ = write!(line, "{}: ", target);
    }
    line.push_str(message);
    line
}

#[cfg(feature = "color")]
fn level_label(config: &LogConfig, level: Level) -> String {
    use colored::Colorize;

    let label = format!("{:5}", level.as_str());
    if !config.color {
        return label;
    }
    match level {
        Level::Trace => label.magenta().to_string(),
        Level::Debug => label.blue().to_string(),
        Level::Info => label.green().to_string(),
        Level::Warn => label.yellow().to_string(),
        Level::Error => label.red().bold().to_string(),
        Level::Off => label,
    }
}

#[cfg(not(feature = "color"))]
fn level_label(_config: &LogConfig, level: Level) -> String {
    format!("{:5}", level.as_str())
}

#[cfg(feature = "json")]
fn render_json(level: Level, target: &str, message: &str) -> String {
    #[derive(serde::Serialize)]
    struct Entry<'a> {
        timestamp: String,
        level: &'a str,
        target: &'a str,
        message: &'a str,
    }

    let entry = Entry {
        timestamp: chrono::Utc::now().to_rfc3339(),
        level: level.as_str(),
        target,
        message,
    };
    serde_json::to_string(&entry).unwrap_or_else(|_| message.to_string())
}

#[cfg(not(feature = "json"))]
fn render_json(level: Level, target: &str, message: &str) -> String {
    format!(
        "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"target\":\"{}\",\"message\":\"{}\"}}",
        chrono::Utc::now().to_rfc3339(),
        level.as_str(),
        escape_json(target),
        escape_json(message)
    )
}

/// Escape a string for embedding in a JSON string literal.
#[cfg_attr(feature = "json", allow(dead_code))]
fn escape_json(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(escaped, "\\u{:04x}", c as u32);
            }
            c => escaped.push(c),
        }
    }
    escaped
}

// ============================================================================
// Macros
// ============================================================================

#[doc(hidden)]
#[macro_export]
macro_rules! __log_at {
    ($level:expr, $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($level) {
            $crate::log($level, $target, &format!($($arg)+));
        }
    };
}

/// Log a trace message.
#[macro_export]
macro_rules! trace {
    (target: $target:expr, $($arg:tt)+) => {
        $crate::__log_at!($crate::Level::Trace, $target, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__log_at!($crate::Level::Trace, module_path!(), $($arg)+)
    };
}

/// Log a debug message. Also emitted whenever debug mode is on.
#[macro_export]
macro_rules! debug {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_debug_enabled() || $crate::is_level_enabled($crate::Level::Debug) {
            $crate::log($crate::Level::Debug, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        $crate::debug!(target: module_path!(), $($arg)+)
    };
}

/// Log an info message.
#[macro_export]
macro_rules! info {
    (target: $target:expr, $($arg:tt)+) => {
        $crate::__log_at!($crate::Level::Info, $target, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__log_at!($crate::Level::Info, module_path!(), $($arg)+)
    };
}

/// Log a warning.
#[macro_export]
macro_rules! warn {
    (target: $target:expr, $($arg:tt)+) => {
        $crate::__log_at!($crate::Level::Warn, $target, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__log_at!($crate::Level::Warn, module_path!(), $($arg)+)
    };
}

/// Log an error.
#[macro_export]
macro_rules! error {
    (target: $target:expr, $($arg:tt)+) => {
        $crate::__log_at!($crate::Level::Error, $target, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__log_at!($crate::Level::Error, module_path!(), $($arg)+)
    };
}

// ============================================================================
// Tracing Integration
// ============================================================================

#[cfg(feature = "tracing")]
pub mod tracing_compat {
    //! A `tracing` subscriber honoring `LOCALE_SCOPE_LOG_LEVEL`.

    use super::*;

    /// Subscriber filtered by `RUST_LOG`, falling back to the configured level.
    pub fn subscriber() -> impl tracing::Subscriber {
        use tracing_subscriber::prelude::*;
        use tracing_subscriber::{EnvFilter, fmt};

        let config = config();
        let level = match config.level {
            Level::Off => "off".to_string(),
            other => other.as_str().to_ascii_lowercase(),
        };

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_ansi(config.color))
    }
}
