//! Logging setup
//!
//! All crates log through the `log` facade. Binaries call
//! [`init_global_logging`] once; the default filter is `info` and can be
//! overridden with `RUST_LOG`.
//!
//! The `log_*!` macros take a message followed by `"key" => value` pairs:
//!
//! ```ignore
//! log_info!("Scan completed", "directories" => 12, "checked" => 340);
//! // Scan completed directories=12 checked=340
//! ```

use std::fmt::{Display, Write};

/// Initialize the global logger
pub fn init_global_logging() -> Result<(), log::SetLoggerError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init()
}

/// Render a message with its key/value fields
pub fn format_fields(message: &str, fields: &[(&str, &dyn Display)]) -> String {
    let mut out = String::from(message);
    for (key, value) in fields {
        let _ = write!(out, " {}={}", key, value);
    }
    out
}

#[macro_export]
macro_rules! log_debug {
    ($msg:expr $(, $key:expr => $val:expr)* $(,)?) => {
        ::log::debug!("{}", $crate::logging::format_fields(
            $msg,
            &[$(($key, &$val as &dyn ::std::fmt::Display)),*]
        ))
    };
}

#[macro_export]
macro_rules! log_info {
    ($msg:expr $(, $key:expr => $val:expr)* $(,)?) => {
        ::log::info!("{}", $crate::logging::format_fields(
            $msg,
            &[$(($key, &$val as &dyn ::std::fmt::Display)),*]
        ))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($msg:expr $(, $key:expr => $val:expr)* $(,)?) => {
        ::log::warn!("{}", $crate::logging::format_fields(
            $msg,
            &[$(($key, &$val as &dyn ::std::fmt::Display)),*]
        ))
    };
}

#[macro_export]
macro_rules! log_error {
    ($msg:expr $(, $key:expr => $val:expr)* $(,)?) => {
        ::log::error!("{}", $crate::logging::format_fields(
            $msg,
            &[$(($key, &$val as &dyn ::std::fmt::Display)),*]
        ))
    };
}
