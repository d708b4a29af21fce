//! Diagnostic tracing, compiled out unless the `trace` feature is enabled.

/// Trace a parser decision through the `log` crate.
#[cfg(feature = "trace")]
macro_rules! trace_log {
    ($($arg:tt)*) => { log::trace!($($arg)*) };
}

/// No-op when the `trace` feature is disabled.
#[cfg(not(feature = "trace"))]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub(crate) use trace_log;
