#![warn(missing_docs)]
//! Tubetrace specific error structures
use std::{error::Error, fmt::Display};

/// Tubetrace application specific Result type
pub type TtResult<T> = std::result::Result<T, TubeTraceError>;

/// Errors that can be returned by various TUBETRACE functions.
///
/// All variants represent hard failures. Expected per-trace outcomes such as a ray missing a
/// boundary or total internal reflection are *not* errors in this sense but are modelled by
/// [`TraceError`](crate::tracer::TraceError), which is returned by value from the tracer.
#[derive(Debug, PartialEq, Eq)]
pub enum TubeTraceError {
    /// errors console io
    Console(String),
    /// a precondition violation (angle out of range, non-positive refractive index or radius).
    /// This indicates a programming or configuration error and is never caught per sweep step.
    InvalidInput(String),
    /// errors while rendering the sweep chart
    Plot(String),
    /// errors not falling in one of the categories above
    Other(String),
}

impl Display for TubeTraceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Console(m) => {
                write!(f, "Console:{m}")
            }
            Self::InvalidInput(m) => {
                write!(f, "InvalidInput:{m}")
            }
            Self::Plot(m) => {
                write!(f, "Plot:{m}")
            }
            Self::Other(m) => write!(f, "Tubetrace Error:Other:{m}"),
        }
    }
}
impl Error for TubeTraceError {}

impl std::convert::From<String> for TubeTraceError {
    fn from(msg: String) -> Self {
        Self::Other(msg)
    }
}
