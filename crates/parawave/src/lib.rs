//! # ParaWave
//!
//! 2D scalar wave propagation with an explicit finite-difference solver.
//!
//! A time-limited Morlet pulse excites one cell of an N×N grid and the
//! field is advanced with a leapfrog scheme under a CFL-limited time step.
//! Runs produce time-stamped field snapshots plus peak amplitude and energy
//! per sample.
//!
//! ## Quick Start
//!
//! ```
//! use parawave::prelude::*;
//!
//! let mut sim = SimulationConfig::new()
//!     .with_grid_size(50)
//!     .with_frequency(1000.0)
//!     .build()?;
//!
//! let result = sim.run(100, 5)?;
//! assert_eq!(result.samples.len(), 20);
//! println!("{} steps/s on {}", result.metadata.steps_per_second, result.metadata.backend);
//! # Ok::<(), SolverError>(())
//! ```
//!
//! ## Backends
//!
//! - **Reference** - Sequential, always available
//! - **Native** - Row-parallel on the rayon pool (requires `native` feature, on by default)
//!
//! `Backend::Auto` checks the native engine once when a [`Simulation`] is
//! created and falls back to the reference engine. Both produce the same
//! fields up to floating-point rounding.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(hidden_glob_reexports)]

pub mod backend;
pub mod config;
pub mod recorder;

// Re-export core types
pub use parawave_core::*;

#[cfg(feature = "native")]
pub use parawave_native::NativeEngine;

pub use backend::{availability, Simulation};
pub use config::{Reflector, SimulationConfig};
pub use recorder::{ResultsRecorder, RunMetadata, RunResult, Sample};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::backend::{availability, Simulation};
    pub use crate::config::{Reflector, SimulationConfig};
    pub use crate::recorder::{ResultsRecorder, RunMetadata, RunResult, Sample};
    pub use parawave_core::prelude::*;
}
