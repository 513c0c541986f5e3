//! Time-limited Morlet pulse injected at a single grid cell.
//!
//! The real Morlet wavelet is
//!
//! ```text
//! ψ(t) = π^(-1/4) · exp(-τ²/2) · (cos(σ·t_c) − exp(-σ²/2))
//! ```
//!
//! with `σ = 2π·f`, `t_c = t − t_center` and the dimensionless envelope
//! time `τ = t_c · f / w`, where `w` is the envelope width in periods. The
//! default pulse is centred three periods in and cut to `[0, 6 periods]`,
//! so it starts and ends at `exp(-4.5) ≈ 1%` of its peak and the hard cut
//! adds no visible step.
//!
//! The amplitude scale and the source-to-acceleration coupling are tuning
//! constants chosen for well-scaled field amplitudes, not physical units.
//! Both engines read them from the same [`SourceShape`] so their outputs
//! stay comparable. Re-tune them for very different grid or domain scales.

use crate::error::{require_positive, Result, SolverError};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Tuning constants of the injected pulse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceShape {
    /// Multiplier applied to the wavelet value.
    pub scale_factor: f64,
    /// Converts a source value into field acceleration at the source cell.
    pub coupling: f64,
    /// Pulse centre, in periods of the source frequency.
    pub center_periods: f64,
    /// Pulse support `[0, duration]`, in periods of the source frequency.
    pub duration_periods: f64,
    /// Standard deviation of the Gaussian envelope, in periods.
    pub envelope_periods: f64,
}

impl Default for SourceShape {
    fn default() -> Self {
        Self {
            scale_factor: 1000.0,
            coupling: 10_000.0,
            center_periods: 3.0,
            duration_periods: 6.0,
            envelope_periods: 1.0,
        }
    }
}

impl SourceShape {
    /// Check that every constant is usable.
    pub fn validate(&self) -> Result<()> {
        if !self.scale_factor.is_finite() || !self.coupling.is_finite() {
            return Err(SolverError::invalid_parameter(format!(
                "source scale ({}) and coupling ({}) must be finite",
                self.scale_factor, self.coupling
            )));
        }
        if !self.center_periods.is_finite() || self.center_periods < 0.0 {
            return Err(SolverError::invalid_parameter(format!(
                "source center must be a non-negative number of periods, got {}",
                self.center_periods
            )));
        }
        require_positive("source duration", self.duration_periods)?;
        require_positive("envelope width", self.envelope_periods)?;
        Ok(())
    }
}

/// Morlet pulse evaluator.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MorletSource {
    shape: SourceShape,
}

impl MorletSource {
    /// Create a source with custom tuning constants.
    pub fn new(shape: SourceShape) -> Result<Self> {
        shape.validate()?;
        Ok(Self { shape })
    }

    /// Tuning constants in use.
    pub fn shape(&self) -> &SourceShape {
        &self.shape
    }

    /// Source-to-acceleration coupling.
    pub fn coupling(&self) -> f64 {
        self.shape.coupling
    }

    /// Time of the pulse centre for `frequency`.
    pub fn center(&self, frequency: f64) -> Result<f64> {
        let frequency = require_positive("frequency", frequency)?;
        Ok(self.shape.center_periods / frequency)
    }

    /// Length of the pulse support for `frequency`.
    pub fn duration(&self, frequency: f64) -> Result<f64> {
        let frequency = require_positive("frequency", frequency)?;
        Ok(self.shape.duration_periods / frequency)
    }

    /// Excitation value at `elapsed_time`.
    ///
    /// Returns exactly `0.0` outside `[0, duration(frequency)]`.
    pub fn evaluate(&self, elapsed_time: f64, frequency: f64, amplitude: f64) -> Result<f64> {
        let frequency = require_positive("frequency", frequency)?;
        let duration = self.shape.duration_periods / frequency;

        if !(0.0..=duration).contains(&elapsed_time) {
            return Ok(0.0);
        }

        let sigma = 2.0 * PI * frequency;
        let shifted = elapsed_time - self.shape.center_periods / frequency;
        let tau = shifted * frequency / self.shape.envelope_periods;

        let normalization = PI.powf(-0.25);
        let envelope = (-0.5 * tau * tau).exp();
        // Admissibility correction; underflows to zero for audio frequencies.
        let correction = (-0.5 * sigma * sigma).exp();
        let wavelet = normalization * envelope * ((sigma * shifted).cos() - correction);

        Ok(amplitude * self.shape.scale_factor * wavelet)
    }
}
