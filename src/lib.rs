#![forbid(unsafe_code)]
#![deny(trivial_numeric_casts)]
#![deny(unused_qualifications)]
#![deny(unused_results)]
#![deny(unreachable_pub)]
#![deny(deprecated_in_future)]

// without the trace feature the diagnostics compile down to nothing
#[cfg(not(feature = "trace"))]
#[macro_use]
mod trace_stubs {
    macro_rules! debug {
        ($($arg:tt)*) => {{
            let _ = format_args!($($arg)*);
        }};
    }
    macro_rules! trace {
        ($($arg:tt)*) => {{
            let _ = format_args!($($arg)*);
        }};
    }
}

pub mod debug;
pub mod error;
pub mod norm;
mod traits;
pub mod vp8;

pub use error::{checked_probability, BoolCoderError, Result};
pub use traits::{BoolReader, BoolWriter, BYPASS_PROBABILITY};
pub use vp8::{VP8BoolReader, VP8BoolWriter};
