//! CoBuild logging facade.
//!
//! This crate is a wrapper of the crate [`log`], so that the engine crates
//! share one logging surface which a host can wire to any `log`
//! implementation.
//!
//! [`log`]: https://docs.rs/log/*/log/index.html

pub use log::{self as internal, Level, SetLoggerError};

/// Logs a message at the trace level using the default target.
#[macro_export(local_inner_macros)]
macro_rules! trace {
    ($( $args:tt )*) => {
        $crate::internal::trace!($( $args )*);
    }
}

/// Logs a message at the debug level using the default target.
#[macro_export(local_inner_macros)]
macro_rules! debug {
    ($( $args:tt )*) => {
        $crate::internal::debug!($( $args )*);
    }
}

/// Logs a message at the info level using the default target.
#[macro_export(local_inner_macros)]
macro_rules! info {
    ($( $args:tt )*) => {
        $crate::internal::info!($( $args )*);
    }
}

/// Logs a message at the warn level using the default target.
#[macro_export(local_inner_macros)]
macro_rules! warn {
    ($( $args:tt )*) => {
        $crate::internal::warn!($( $args )*);
    }
}

/// Logs a message at the error level using the default target.
#[macro_export(local_inner_macros)]
macro_rules! error {
    ($( $args:tt )*) => {
        $crate::internal::error!($( $args )*);
    }
}

/// Checks if the log level is enabled, to avoid building costly arguments
/// for disabled levels.
pub fn log_enabled(level: Level) -> bool {
    log::log_enabled!(level)
}
