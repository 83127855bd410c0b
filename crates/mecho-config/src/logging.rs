//! Structured logging utilities for mecho components.
//!
//! Provides consistent logging with component prefixes and structured fields.
//!
//! # Usage
//!
//! ```ignore
//! use mecho_config::log_catalog_info;
//!
//! log_catalog_info!("Index rebuilt", entries = 42);
//! log_bot_debug!("Replaying stored blob", id = id.as_str());
//! ```

/// Component identifiers for log filtering
pub struct Component;

impl Component {
    pub const CATALOG: &'static str = "CATALOG";
    pub const BOT: &'static str = "BOT";
    pub const FETCH: &'static str = "FETCH";
    pub const CLI: &'static str = "CLI";
}

/// Log levels for runtime configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

// === CATALOG logging macros ===

#[macro_export]
macro_rules! log_catalog_error {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::error!(component = $crate::logging::Component::CATALOG, $($key = $value,)* $msg)
    };
}

#[macro_export]
macro_rules! log_catalog_warn {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::warn!(component = $crate::logging::Component::CATALOG, $($key = $value,)* $msg)
    };
}

#[macro_export]
macro_rules! log_catalog_info {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::info!(component = $crate::logging::Component::CATALOG, $($key = $value,)* $msg)
    };
}

#[macro_export]
macro_rules! log_catalog_debug {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::debug!(component = $crate::logging::Component::CATALOG, $($key = $value,)* $msg)
    };
}

// === BOT logging macros ===

#[macro_export]
macro_rules! log_bot_warn {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::warn!(component = $crate::logging::Component::BOT, $($key = $value,)* $msg)
    };
}

#[macro_export]
macro_rules! log_bot_info {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::info!(component = $crate::logging::Component::BOT, $($key = $value,)* $msg)
    };
}

#[macro_export]
macro_rules! log_bot_debug {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::debug!(component = $crate::logging::Component::BOT, $($key = $value,)* $msg)
    };
}

// === FETCH logging macros ===

#[macro_export]
macro_rules! log_fetch_warn {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::warn!(component = $crate::logging::Component::FETCH, $($key = $value,)* $msg)
    };
}

#[macro_export]
macro_rules! log_fetch_debug {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::debug!(component = $crate::logging::Component::FETCH, $($key = $value,)* $msg)
    };
}

/// Initialize logging with the given level filter.
///
/// `MECHO_LOG` wins over `RUST_LOG`; both win over `level`.
/// Call this once at application startup.
pub fn init_logging(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_env("MECHO_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(level.as_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
}
