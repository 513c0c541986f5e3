//! CFL time-step selection for the explicit 2D scheme.

use crate::error::{require_positive, Result};

/// Safety factor applied below the 2D CFL limit.
pub const SAFETY_FACTOR: f64 = 0.4;

/// Courant number limit of the explicit 5-point scheme in 2D (1/√2).
pub const CFL_LIMIT_2D: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// Largest time step this solver will use for the given spacing and speed.
///
/// `dt = 0.4 · min(dx, dy) / (c · √2)`, which keeps the Courant number
/// `c · dt / min(dx, dy)` at `0.4/√2 ≈ 0.283`.
pub fn compute_time_step(dx: f64, dy: f64, wave_speed: f64) -> Result<f64> {
    let dx = require_positive("dx", dx)?;
    let dy = require_positive("dy", dy)?;
    let wave_speed = require_positive("wave speed", wave_speed)?;

    Ok(SAFETY_FACTOR * dx.min(dy) / (wave_speed * std::f64::consts::SQRT_2))
}

/// Courant number `c · dt / min(dx, dy)`.
pub fn courant_number(dx: f64, dy: f64, wave_speed: f64, dt: f64) -> f64 {
    wave_speed * dt / dx.min(dy)
}

/// Check a Courant number against the 2D limit.
pub fn is_stable(courant: f64) -> bool {
    courant <= CFL_LIMIT_2D
}
