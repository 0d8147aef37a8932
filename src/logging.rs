//! Crate-internal logging macros.
//!
//! With the `tracing` feature every macro forwards to the matching `tracing` macro under the
//! `resilient_rpc` target. Without it the macros only borrow their field values, so call sites
//! compile identically and cost nothing at runtime.

#[cfg(feature = "tracing")]
macro_rules! log_event {
    ($level:ident, $($arg:tt)*) => {
        tracing::$level!(target: "resilient_rpc", $($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! log_event {
    ($level:ident, $($arg:tt)*) => {
        $crate::__discard_fields!($($arg)*)
    };
}

#[allow(unused_macros)]
macro_rules! error {
    ($($arg:tt)*) => { log_event!(error, $($arg)*) };
}

#[allow(unused_macros)]
macro_rules! warn {
    ($($arg:tt)*) => { log_event!(warn, $($arg)*) };
}

#[allow(unused_macros)]
macro_rules! info {
    ($($arg:tt)*) => { log_event!(info, $($arg)*) };
}

#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)*) => { log_event!(debug, $($arg)*) };
}

#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => { log_event!(trace, $($arg)*) };
}

#[doc(hidden)]
#[macro_export]
#[cfg(not(feature = "tracing"))]
macro_rules! __discard_fields {
    ($field:ident = % $value:expr, $($rest:tt)*) => {{
        let _ = &$value;
        $crate::__discard_fields!($($rest)*)
    }};
    ($field:ident = ? $value:expr, $($rest:tt)*) => {{
        let _ = &$value;
        $crate::__discard_fields!($($rest)*)
    }};
    ($field:ident = $value:expr, $($rest:tt)*) => {{
        let _ = &$value;
        $crate::__discard_fields!($($rest)*)
    }};
    ($message:literal $(, $arg:expr)* $(,)?) => {{
        $(let _ = &$arg;)*
    }};
    () => {};
}
