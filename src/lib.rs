//! This is the documentation for the **TUBETRACE** software package.
//!
//! TUBETRACE models how a light ray entering a cylindrical liquid-tube holder — an acrylic
//! holder wall, an air gap and a glass / liquid tube — refracts through the assembly's chain of
//! circular boundaries, and searches for the range of a lateral entry offset that keeps the exit
//! ray close to the parallel ideal. The resulting tolerance band supports the positioning /
//! tolerance analysis of the physical assembly.
//!
//! The crate is organized bottom-up:
//!  - [`geometry`]: 2D line / circle intersections and the surface bearing transform
//!  - [`refraction`]: Snell's law with critical-angle handling
//!  - [`assembly`]: the holder / tube scenario and its chain of refracting interfaces
//!  - [`tracer`]: the sequential multi-surface ray trace
//!  - [`sweep`]: the bidirectional offset scan and its tolerance band
//!  - [`plot`] and [`console`]: chart rendering and CLI / prompting
#![allow(clippy::module_name_repetitions)]

pub mod assembly;
pub mod console;
pub mod error;
pub mod geometry;
pub mod plot;
pub mod refraction;
pub mod sweep;
pub mod tracer;
pub mod utils;

pub use assembly::TubeAssembly;
pub use sweep::{OffsetSweep, SweepConfig, SweepResult};
pub use tracer::{trace, TraceResult};
