/// Domain-aware logging macros.
///
/// Each macro injects a `domain` field automatically so callers never need to
/// remember the string literal. The domain value is one of: `sys` (lifecycle,
/// shutdown), `conn` (bus connect/reconnect/backoff), `pipe` (classify/cache/
/// grouping/decide pipeline), `res` (alert publish, storage, heartbeat), `conf`
/// (configuration loading).
///
/// # Usage
///
/// ```ignore
/// use crate::log_macros::*;
///
/// cx_info!(sys, sub_groups = 3, "bootstrap complete");
/// cx_warn!(conn, error = %e, "retryable transport error");
/// cx_debug!(pipe, tag = sub_group_tag, "sub-group repaired");
/// ```
///
/// The macros accept any tracing-compatible field syntax after the domain
/// identifier. The domain identifier is **not** a string — it is a bare
/// identifier that the macro converts to a `&str` literal.

// ---------------------------------------------------------------------------
// Core macro — dispatches to the matching tracing level macro.
// ---------------------------------------------------------------------------

/// Internal helper. Do not call directly; use `cx_error!` … `cx_trace!`.
#[doc(hidden)]
macro_rules! cx_log {
    ($level:ident, $domain:ident, $($field:tt)*) => {
        tracing::$level!(domain = stringify!($domain), $($field)*)
    };
}

// ---------------------------------------------------------------------------
// Public per-level macros
// ---------------------------------------------------------------------------

macro_rules! cx_error {
    ($domain:ident, $($rest:tt)*) => {
        cx_log!(error, $domain, $($rest)*)
    };
}

macro_rules! cx_warn {
    ($domain:ident, $($rest:tt)*) => {
        cx_log!(warn, $domain, $($rest)*)
    };
}

macro_rules! cx_info {
    ($domain:ident, $($rest:tt)*) => {
        cx_log!(info, $domain, $($rest)*)
    };
}

macro_rules! cx_debug {
    ($domain:ident, $($rest:tt)*) => {
        cx_log!(debug, $domain, $($rest)*)
    };
}

#[allow(unused_macros)]
macro_rules! cx_trace {
    ($domain:ident, $($rest:tt)*) => {
        cx_log!(trace, $domain, $($rest)*)
    };
}
