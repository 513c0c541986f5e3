//! The engine contract shared by every solver backend.
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized --configure--> Ready --step/reset/set_*--> Ready
//!                                ^                            |
//!                                +-------- configure ---------+
//! ```
//!
//! `Stepping` only exists inside `step()`, which takes `&mut self`, so it is
//! never observable from outside. Dropping the engine is the terminal
//! `Disposed` state.

use crate::boundary::BoundaryPolicy;
use crate::error::{require_positive, Result, SolverError};
use crate::grid::{FieldView, GridGeometry};
use crate::medium::MaterialMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Solver backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Pick the native engine if available, else the reference engine.
    #[default]
    Auto,
    /// Row-parallel native engine.
    Native,
    /// Portable sequential reference engine.
    Reference,
}

impl Backend {
    /// Lowercase name, as used in configuration files and metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Auto => "auto",
            Backend::Native => "native",
            Backend::Reference => "reference",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Constructed, `configure` not yet called.
    Uninitialized,
    /// Configured and able to step.
    Ready,
}

/// Source and medium parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveParameters {
    /// Source frequency in Hz.
    pub frequency: f64,
    /// Source amplitude.
    pub amplitude: f64,
    /// Propagation speed (length units of the domain per second).
    pub wave_speed: f64,
    /// Damping factor per unit length; 0 is lossless.
    #[serde(default)]
    pub damping: f64,
}

impl Default for WaveParameters {
    fn default() -> Self {
        Self {
            frequency: 1000.0,
            amplitude: 1.0,
            wave_speed: 343.0,
            damping: 0.0,
        }
    }
}

impl WaveParameters {
    /// Validate a frequency (> 0).
    pub fn check_frequency(frequency: f64) -> Result<f64> {
        require_positive("frequency", frequency)
    }

    /// Validate an amplitude (finite, ≥ 0; zero silences the source).
    pub fn check_amplitude(amplitude: f64) -> Result<f64> {
        if amplitude.is_finite() && amplitude >= 0.0 {
            Ok(amplitude)
        } else {
            Err(SolverError::invalid_parameter(format!(
                "amplitude must be finite and non-negative, got {}",
                amplitude
            )))
        }
    }

    /// Validate a wave speed (> 0).
    pub fn check_wave_speed(wave_speed: f64) -> Result<f64> {
        require_positive("wave speed", wave_speed)
    }

    /// Validate a damping factor (finite, ≥ 0).
    pub fn check_damping(damping: f64) -> Result<f64> {
        if damping.is_finite() && damping >= 0.0 {
            Ok(damping)
        } else {
            Err(SolverError::invalid_parameter(format!(
                "damping must be finite and non-negative, got {}",
                damping
            )))
        }
    }

    /// Wavelength at the source frequency.
    pub fn wavelength(&self) -> f64 {
        self.wave_speed / self.frequency
    }
}

/// Elapsed simulation time and step counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationClock {
    /// Elapsed simulated time in seconds.
    pub current_time: f64,
    /// Successful `step()` calls since the last configure/reset.
    pub step_count: u64,
}

impl SimulationClock {
    /// Advance by one step of `dt`.
    #[inline]
    pub fn tick(&mut self, dt: f64) {
        self.current_time += dt;
        self.step_count += 1;
    }

    /// Back to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// The uniform solver contract.
///
/// Both engines implement identical semantics: the source is evaluated at
/// the clock time *before* the step, the interior is integrated, the
/// boundary policy is applied, buffer roles rotate and the clock advances
/// by `dt`.
pub trait SolverEngine: Send {
    /// Backend implemented by this engine.
    fn backend(&self) -> Backend;

    /// Current lifecycle state.
    fn state(&self) -> EngineState;

    /// Allocate zeroed fields for `geometry`, recompute `dt`, reset the clock
    /// and place the source at the grid centre.
    fn configure_geometry(&mut self, geometry: GridGeometry, wave_speed: f64) -> Result<()>;

    /// Configure a `grid_size`×`grid_size` lattice over a square domain of
    /// side `domain_size` centred on the origin.
    fn configure(&mut self, grid_size: usize, domain_size: f64, wave_speed: f64) -> Result<()> {
        let geometry = GridGeometry::square(grid_size, domain_size)?;
        self.configure_geometry(geometry, wave_speed)
    }

    /// Change the source frequency; time and field are untouched.
    fn set_frequency(&mut self, frequency: f64) -> Result<()>;

    /// Change the source amplitude; time and field are untouched.
    fn set_amplitude(&mut self, amplitude: f64) -> Result<()>;

    /// Change the damping factor; time and field are untouched.
    fn set_damping(&mut self, damping: f64) -> Result<()>;

    /// Move the source to an interior, non-rigid cell `(i, j)`.
    fn set_source_position(&mut self, i: usize, j: usize) -> Result<()>;

    /// Source location.
    fn source_position(&self) -> Result<(usize, usize)>;

    /// Install per-cell materials, or return to a uniform medium with `None`.
    ///
    /// `dt` is re-derived from the fastest speed present, so the fields and
    /// the clock are reset.
    fn set_material_map(&mut self, materials: Option<MaterialMap>) -> Result<()>;

    /// Materials in use, `None` for a uniform medium.
    fn material_map(&self) -> Result<Option<&MaterialMap>>;

    /// Select the edge condition used by subsequent steps.
    fn set_boundary_policy(&mut self, policy: BoundaryPolicy);

    /// Edge condition in use.
    fn boundary_policy(&self) -> BoundaryPolicy;

    /// Advance the field by one time step.
    fn step(&mut self) -> Result<()>;

    /// Zero the fields and the clock, keeping the configuration.
    fn reset(&mut self) -> Result<()>;

    /// Read-only view of the current field.
    fn field(&self) -> Result<FieldView<'_>>;

    /// Time step derived from the CFL condition.
    fn dt(&self) -> Result<f64>;

    /// Grid geometry in use.
    fn geometry(&self) -> Result<GridGeometry>;

    /// Elapsed time and step count.
    fn clock(&self) -> SimulationClock;

    /// Current wave parameters.
    fn wave_parameters(&self) -> WaveParameters;

    /// Advance by `n` steps, stopping at the first error.
    fn step_n(&mut self, n: usize) -> Result<()> {
        for _ in 0..n {
            self.step()?;
        }
        Ok(())
    }
}

/// Validate a source location against `geometry`.
///
/// The source must sit on an interior cell: the outer ring is rewritten by
/// the boundary policy after every step, so a source there never reaches
/// the field.
pub fn check_source_position(geometry: &GridGeometry, i: usize, j: usize) -> Result<(usize, usize)> {
    if !geometry.contains(i, j) {
        return Err(SolverError::invalid_parameter(format!(
            "source position ({}, {}) is outside the {}x{} grid",
            i,
            j,
            geometry.size(),
            geometry.size()
        )));
    }
    if geometry.is_boundary(i, j) {
        return Err(SolverError::invalid_parameter(format!(
            "source position ({}, {}) is on the boundary ring; use 1..={} in both axes",
            i,
            j,
            geometry.size().saturating_sub(2)
        )));
    }
    Ok((i, j))
}
