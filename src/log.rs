// Logging shims over the optional `tracing` feature. With the feature off the
// macros expand to nothing.

macro_rules! trace_event {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        {
            ::tracing::trace!($($arg)*);
        }
    }};
}

macro_rules! warn_event {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        {
            ::tracing::warn!($($arg)*);
        }
    }};
}

pub(crate) use trace_event;
pub(crate) use warn_event;
