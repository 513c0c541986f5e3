//! # ParaWave Core
//!
//! Building blocks of the ParaWave 2D scalar wave solver.
//!
//! The solver integrates `∂²u/∂t² = c²∇²u + s(t)·δ(x − x_s)` on a uniform
//! N×N grid with an explicit leapfrog scheme. A time-limited Morlet pulse
//! excites a single cell and the outer ring follows a [`BoundaryPolicy`].
//! An optional [`MaterialMap`] gives cells their own wave speed or makes them
//! rigid, and a damping factor turns the medium lossy.
//!
//! ## Core Abstractions
//!
//! - [`SolverEngine`] - The engine contract every backend implements
//! - [`GridEngine`] - Engine state machine around a [`StencilKernel`]
//! - [`ReferenceEngine`] - Portable sequential engine
//! - [`GridGeometry`] / [`FieldState`] - Lattice and rotating field buffers
//! - [`MorletSource`] - Source pulse
//! - [`MaterialMap`] / [`ParabolicShell`] - Per-cell materials and reflectors
//! - [`compute_time_step`] - CFL-limited time step
//!
//! ## Example
//!
//! ```
//! use parawave_core::prelude::*;
//!
//! let mut engine = ReferenceEngine::new();
//! engine.configure(64, 0.6, 343.0)?;
//! engine.step_n(10)?;
//! assert!(engine.field()?.max_amplitude() > 0.0);
//! # Ok::<(), SolverError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod boundary;
pub mod engine;
pub mod error;
pub mod grid;
pub mod integrator;
pub mod medium;
pub mod reference;
pub mod source;
pub mod stability;
pub mod state;

pub use boundary::BoundaryPolicy;
pub use engine::{Backend, EngineState, SimulationClock, SolverEngine, WaveParameters};
pub use error::{Result, SolverError};
pub use grid::{Domain, FieldSnapshot, FieldState, FieldView, GridGeometry};
pub use medium::{Material, MaterialMap, ParabolicShell};
pub use reference::ReferenceEngine;
pub use source::{MorletSource, SourceShape};
pub use stability::compute_time_step;
pub use state::{GridEngine, StencilKernel};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::boundary::BoundaryPolicy;
    pub use crate::engine::{
        Backend, EngineState, SimulationClock, SolverEngine, WaveParameters,
    };
    pub use crate::error::{Result, SolverError};
    pub use crate::grid::{Domain, FieldSnapshot, FieldView, GridGeometry};
    pub use crate::medium::{Material, MaterialMap, ParabolicShell};
    pub use crate::reference::ReferenceEngine;
    pub use crate::source::{MorletSource, SourceShape};
    pub use crate::stability::{compute_time_step, courant_number};
}
