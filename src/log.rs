//! Internal logging shim.
//!
//! With the `tracing` feature the macros below forward to the `tracing`
//! macros of the same level. Without it they expand to a `format_args!` that
//! is never used, so the arguments are still type-checked but nothing is
//! emitted.
//!
//! The warn-level shim is named `warning!`: a re-exported `warn!` would be
//! ambiguous with the built-in `#[warn]` attribute.
//!
//! Only foreground operations and dropped interrupts are logged. The call
//! path of a callback never is.

#[cfg(feature = "tracing")]
macro_rules! trace {
    ($($arg:tt)+) => {
        ::tracing::trace!($($arg)+)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace {
    ($($arg:tt)+) => {{
        let _ = format_args!($($arg)+);
    }};
}

#[cfg(feature = "tracing")]
macro_rules! debug {
    ($($arg:tt)+) => {
        ::tracing::debug!($($arg)+)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! debug {
    ($($arg:tt)+) => {{
        let _ = format_args!($($arg)+);
    }};
}

#[cfg(feature = "tracing")]
macro_rules! warning {
    ($($arg:tt)+) => {
        ::tracing::warn!($($arg)+)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! warning {
    ($($arg:tt)+) => {{
        let _ = format_args!($($arg)+);
    }};
}

pub(crate) use {debug, trace, warning};
