//! Logging shims.
//!
//! Every event goes through the [`log`] facade under the `h1wire` target. Without the `log`
//! feature the arguments are only type checked.
#![allow(unused, reason = "logger")]

macro_rules! info {
    ($($tt:tt)*) => {
        #[cfg(feature = "log")]
        ::log::info!(target: "h1wire", $($tt)*);
        #[cfg(not(feature = "log"))]
        let _ = format_args!($($tt)*);
    };
}

macro_rules! debug {
    ($($tt:tt)*) => {
        #[cfg(feature = "log")]
        ::log::debug!(target: "h1wire", $($tt)*);
        #[cfg(not(feature = "log"))]
        let _ = format_args!($($tt)*);
    };
}

macro_rules! warning {
    ($($tt:tt)*) => {
        #[cfg(feature = "log")]
        ::log::warn!(target: "h1wire", $($tt)*);
        #[cfg(not(feature = "log"))]
        let _ = format_args!($($tt)*);
    };
}

macro_rules! error {
    ($($tt:tt)*) => {
        #[cfg(feature = "log")]
        ::log::error!(target: "h1wire", $($tt)*);
        #[cfg(not(feature = "log"))]
        let _ = format_args!($($tt)*);
    };
}

pub(crate) use {debug, error, info, warning};
