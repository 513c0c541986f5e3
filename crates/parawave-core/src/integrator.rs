//! Explicit leapfrog integration of the 2D wave equation.
//!
//! Uses the 2D wave equation: ∂²u/∂t² = c²∇²u + s(t)·δ(x − x_s)
//!
//! Discretized with a 5-point Laplacian:
//!
//! ```text
//! lap   = (u[i+1,j] − 2u[i,j] + u[i−1,j]) / dx² + (u[i,j+1] − 2u[i,j] + u[i,j−1]) / dy²
//! acc   = c² · lap  (+ s · coupling at the source cell)
//! u_new = 2u − u_prev + acc · dt²
//! ```
//!
//! With a damping factor `γ > 0` each cell loses energy at a rate set by its
//! own wave speed:
//!
//! ```text
//! q     = γ · c · dt
//! u_new = (2u − u_prev + q · u_prev + acc · dt²) / (1 + q)
//! ```
//!
//! `c` is the per-cell speed when a [`MaterialMap`] is supplied; rigid cells
//! are written as zero.

use crate::boundary::BoundaryPolicy;
use crate::error::Result;
use crate::grid::{FieldState, GridGeometry};
use crate::medium::{Material, MaterialMap};

/// Source term for one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceForcing {
    /// Value of the source signal at the current time.
    pub value: f64,
    /// `(i, j)` of the excited cell.
    pub position: (usize, usize),
    /// Converts `value` into field acceleration.
    pub coupling: f64,
}

impl SourceForcing {
    /// No excitation.
    pub fn none() -> Self {
        Self {
            value: 0.0,
            position: (0, 0),
            coupling: 0.0,
        }
    }

    /// Acceleration added at the source cell.
    #[inline]
    pub fn acceleration(&self) -> f64 {
        self.value * self.coupling
    }
}

/// Per-step inputs handed to a kernel.
#[derive(Debug, Clone, Copy)]
pub struct StepInputs<'a> {
    /// Time step.
    pub dt: f64,
    /// Propagation speed of background cells.
    pub wave_speed: f64,
    /// Source term for this step.
    pub forcing: SourceForcing,
    /// Edge condition for the new field.
    pub boundary: BoundaryPolicy,
    /// Per-cell materials; `None` means a uniform medium.
    pub materials: Option<&'a MaterialMap>,
    /// Damping factor `γ` (0 for a lossless medium).
    pub damping: f64,
}

impl StepInputs<'_> {
    /// Lossless uniform medium without materials.
    pub fn uniform(
        dt: f64,
        wave_speed: f64,
        forcing: SourceForcing,
        boundary: BoundaryPolicy,
    ) -> Self {
        Self {
            dt,
            wave_speed,
            forcing,
            boundary,
            materials: None,
            damping: 0.0,
        }
    }
}

/// Cell update shared by every kernel, so all engines produce the same bits.
#[derive(Debug, Clone, Copy)]
pub struct Stencil<'a> {
    size: usize,
    dx2: f64,
    dy2: f64,
    dt: f64,
    dt2: f64,
    wave_speed: f64,
    c2: f64,
    damping: f64,
    materials: Option<&'a MaterialMap>,
    source: (usize, usize),
    source_acceleration: f64,
}

impl<'a> Stencil<'a> {
    /// Precompute the constants of one step.
    pub fn new(geometry: &GridGeometry, inputs: &StepInputs<'a>) -> Self {
        Self {
            size: geometry.size(),
            dx2: geometry.dx() * geometry.dx(),
            dy2: geometry.dy() * geometry.dy(),
            dt: inputs.dt,
            dt2: inputs.dt * inputs.dt,
            wave_speed: inputs.wave_speed,
            c2: inputs.wave_speed * inputs.wave_speed,
            damping: inputs.damping,
            materials: inputs.materials,
            source: inputs.forcing.position,
            source_acceleration: inputs.forcing.acceleration(),
        }
    }

    /// Update the interior cells of row `i` into `out`, the full row `i` of
    /// the next field.
    #[inline]
    pub fn update_row(&self, i: usize, previous: &[f64], current: &[f64], out: &mut [f64]) {
        let size = self.size;
        let row_start = i * size;
        let (prev, curr) = (previous, current);

        for j in 1..size - 1 {
            let idx = row_start + j;

            let (c, c2) = match self.materials.map(|m| m.cell(idx)) {
                None | Some(Material::Background) => (self.wave_speed, self.c2),
                Some(Material::Medium { wave_speed }) => (wave_speed, wave_speed * wave_speed),
                Some(Material::Rigid) => {
                    out[j] = 0.0;
                    continue;
                }
            };

            let u = curr[idx];
            let d2x = (curr[idx + size] - 2.0 * u + curr[idx - size]) / self.dx2;
            let d2y = (curr[idx + 1] - 2.0 * u + curr[idx - 1]) / self.dy2;

            let mut acceleration = c2 * (d2x + d2y);
            if (i, j) == self.source {
                acceleration += self.source_acceleration;
            }

            out[j] = if self.damping > 0.0 {
                let q = self.damping * c * self.dt;
                (2.0 * u - prev[idx] + q * prev[idx] + acceleration * self.dt2) / (1.0 + q)
            } else {
                2.0 * u - prev[idx] + acceleration * self.dt2
            };
        }
    }
}

/// Advance `state` by one step, apply the boundary to the new field and
/// rotate buffer roles.
///
/// Fails with `InvalidState` if the buffers do not match `geometry`, or with
/// `InvalidParameter` if the material map does not.
pub fn advance(state: &mut FieldState, geometry: &GridGeometry, inputs: StepInputs<'_>) -> Result<()> {
    state.check_shape(geometry)?;
    if let Some(materials) = inputs.materials {
        materials.check_shape(geometry)?;
    }

    let size = geometry.size();
    let stencil = Stencil::new(geometry, &inputs);
    let buffers = state.step_buffers();
    let (prev, curr, next) = (buffers.previous, buffers.current, buffers.next);

    if size > 2 {
        // The first and last rows belong to the boundary.
        for (offset, row) in next[size..(size - 1) * size].chunks_mut(size).enumerate() {
            stencil.update_row(offset + 1, prev, curr, row);
        }
    }

    inputs.boundary.apply(next, size);
    state.rotate();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SolverError;
    use crate::stability::compute_time_step;

    fn setup(size: usize) -> (GridGeometry, FieldState, f64) {
        let geometry = GridGeometry::square(size, 1.0).unwrap();
        let dt = compute_time_step(geometry.dx(), geometry.dy(), 343.0).unwrap();
        (geometry, FieldState::for_geometry(&geometry), dt)
    }

    fn lossless(dt: f64, forcing: SourceForcing) -> StepInputs<'static> {
        StepInputs::uniform(dt, 343.0, forcing, BoundaryPolicy::ZeroDirichlet)
    }

    #[test]
    fn test_rest_state_stays_zero() {
        let (geometry, mut state, dt) = setup(8);
        for _ in 0..20 {
            advance(&mut state, &geometry, lossless(dt, SourceForcing::none())).unwrap();
        }
        assert!(state.current().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_source_injection_first_step() {
        let (geometry, mut state, dt) = setup(9);
        let forcing = SourceForcing {
            value: 2.0,
            position: (4, 4),
            coupling: 10.0,
        };
        advance(&mut state, &geometry, lossless(dt, forcing)).unwrap();

        let view = state.view();
        let expected = 20.0 * dt * dt;
        assert!((view.get(4, 4).unwrap() - expected).abs() < 1e-24);
        // Only the source cell is excited after one step.
        assert_eq!(view.as_slice().iter().filter(|&&v| v != 0.0).count(), 1);
    }

    #[test]
    fn test_stencil_matches_hand_computation() {
        let (geometry, mut state, dt) = setup(5);
        state.inject_impulse(2, 2, 1.0);
        advance(&mut state, &geometry, lossless(dt, SourceForcing::none())).unwrap();

        let c2dt2 = 343.0 * 343.0 * dt * dt;
        let cx = c2dt2 / (geometry.dx() * geometry.dx());
        let cy = c2dt2 / (geometry.dy() * geometry.dy());
        let view = state.view();
        // Centre: 2u - 0 + c²dt²(-2u/dx² - 2u/dy²)
        let centre = 2.0 - 2.0 * cx - 2.0 * cy;
        assert!((view.get(2, 2).unwrap() - centre).abs() < 1e-12);
        // Neighbours receive c²dt²/dx².
        assert!((view.get(1, 2).unwrap() - cx).abs() < 1e-12);
        assert!((view.get(2, 3).unwrap() - cy).abs() < 1e-12);
        // Previous now holds the impulse.
        assert_eq!(state.previous()[geometry.index(2, 2)], 1.0);
    }

    #[test]
    fn test_wave_propagates_symmetrically() {
        let (geometry, mut state, dt) = setup(21);
        state.inject_impulse(10, 10, 1.0);
        for _ in 0..8 {
            advance(&mut state, &geometry, lossless(dt, SourceForcing::none())).unwrap();
        }
        let view = state.view();
        let north = view.get(7, 10).unwrap();
        let south = view.get(13, 10).unwrap();
        let west = view.get(10, 7).unwrap();
        assert!(north.abs() > 0.0);
        assert!((north - south).abs() < 1e-12);
        assert!((north - west).abs() < 1e-12);
    }

    #[test]
    fn test_boundary_ring_is_zero() {
        let (geometry, mut state, dt) = setup(6);
        state.inject_impulse(1, 1, 5.0);
        state.inject_impulse(4, 4, -5.0);
        for _ in 0..10 {
            advance(&mut state, &geometry, lossless(dt, SourceForcing::none())).unwrap();
            let view = state.view();
            for k in 0..6 {
                assert_eq!(view.get(0, k), Some(0.0));
                assert_eq!(view.get(5, k), Some(0.0));
                assert_eq!(view.get(k, 0), Some(0.0));
                assert_eq!(view.get(k, 5), Some(0.0));
            }
        }
    }

    #[test]
    fn test_shape_mismatch_is_invalid_state() {
        let (geometry, _, dt) = setup(6);
        let mut wrong = FieldState::new(5);
        let err = advance(&mut wrong, &geometry, lossless(dt, SourceForcing::none())).unwrap_err();
        assert!(matches!(err, SolverError::InvalidState(_)));
    }

    #[test]
    fn test_two_by_two_grid_has_no_interior() {
        let (geometry, mut state, dt) = setup(2);
        let forcing = SourceForcing {
            value: 1.0,
            position: geometry.center(),
            coupling: 1.0,
        };
        advance(&mut state, &geometry, lossless(dt, forcing)).unwrap();
        assert!(state.current().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_background_map_matches_uniform_medium() {
        let (geometry, mut uniform, dt) = setup(15);
        let mut mapped = FieldState::for_geometry(&geometry);
        let mut materials = MaterialMap::for_geometry(&geometry);
        // A medium cell at the background speed must not change anything.
        materials
            .set(3, 3, Material::Medium { wave_speed: 343.0 })
            .unwrap();
        let forcing = SourceForcing {
            value: 1.0,
            position: (7, 7),
            coupling: 1000.0,
        };
        for _ in 0..25 {
            advance(&mut uniform, &geometry, lossless(dt, forcing)).unwrap();
            let inputs = StepInputs {
                materials: Some(&materials),
                ..lossless(dt, forcing)
            };
            advance(&mut mapped, &geometry, inputs).unwrap();
        }
        assert_eq!(uniform.current(), mapped.current());
    }

    #[test]
    fn test_rigid_cells_stay_zero() {
        let (geometry, mut state, dt) = setup(15);
        let mut materials = MaterialMap::for_geometry(&geometry);
        for j in 1..14 {
            materials.set(9, j, Material::Rigid).unwrap();
        }
        let forcing = SourceForcing {
            value: 1.0,
            position: (5, 7),
            coupling: 1000.0,
        };
        let inputs = StepInputs {
            materials: Some(&materials),
            ..lossless(dt, forcing)
        };
        for _ in 0..60 {
            advance(&mut state, &geometry, inputs).unwrap();
            let view = state.view();
            assert!((0..15).all(|j| view.get(9, j) == Some(0.0)));
        }
        let view = state.view();
        // The wall blocks everything behind it.
        assert!((10..14).all(|i| (1..14).all(|j| view.get(i, j) == Some(0.0))));
        assert!(view.get(6, 7).unwrap() != 0.0);
    }

    #[test]
    fn test_faster_medium_spreads_further() {
        let (geometry, mut slow, _) = setup(31);
        let mut fast = FieldState::for_geometry(&geometry);
        let fast_map = MaterialMap::from_fn(&geometry, |_, _| Material::Medium {
            wave_speed: 1500.0,
        })
        .unwrap();
        let dt = compute_time_step(geometry.dx(), geometry.dy(), 1500.0).unwrap();
        slow.inject_impulse(15, 15, 1.0);
        fast.inject_impulse(15, 15, 1.0);
        for _ in 0..10 {
            advance(&mut slow, &geometry, lossless(dt, SourceForcing::none())).unwrap();
            let inputs = StepInputs {
                materials: Some(&fast_map),
                ..lossless(dt, SourceForcing::none())
            };
            advance(&mut fast, &geometry, inputs).unwrap();
        }
        let far = |state: &FieldState| state.view().get(15, 24).unwrap().abs();
        assert!(far(&fast) > far(&slow));
    }

    #[test]
    fn test_damping_drains_energy() {
        let (geometry, mut lossless_state, dt) = setup(21);
        let mut damped = FieldState::for_geometry(&geometry);
        lossless_state.inject_impulse(10, 10, 1.0);
        damped.inject_impulse(10, 10, 1.0);
        for _ in 0..40 {
            let inputs = StepInputs {
                boundary: BoundaryPolicy::Reflecting,
                ..lossless(dt, SourceForcing::none())
            };
            advance(&mut lossless_state, &geometry, inputs).unwrap();
            advance(&mut damped, &geometry, StepInputs { damping: 50.0, ..inputs }).unwrap();
        }
        let energy = |state: &FieldState| state.view().energy();
        assert!(energy(&damped) < energy(&lossless_state));
        assert!(energy(&damped) > 0.0);
    }

    #[test]
    fn test_damped_update_matches_formula() {
        let (geometry, mut state, dt) = setup(5);
        state.inject_impulse(2, 2, 1.0);
        let damping = 10.0;
        let inputs = StepInputs {
            damping,
            ..lossless(dt, SourceForcing::none())
        };
        advance(&mut state, &geometry, inputs).unwrap();

        let c2dt2 = 343.0 * 343.0 * dt * dt;
        let cx = c2dt2 / (geometry.dx() * geometry.dx());
        let cy = c2dt2 / (geometry.dy() * geometry.dy());
        let q = damping * 343.0 * dt;
        // previous is zero, so only the undamped update is divided by 1 + q.
        let centre = (2.0 - 2.0 * cx - 2.0 * cy) / (1.0 + q);
        assert!((state.view().get(2, 2).unwrap() - centre).abs() < 1e-12);
    }

    #[test]
    fn test_material_shape_mismatch() {
        let (geometry, mut state, dt) = setup(6);
        let materials = MaterialMap::new(7);
        let inputs = StepInputs {
            materials: Some(&materials),
            ..lossless(dt, SourceForcing::none())
        };
        assert!(matches!(
            advance(&mut state, &geometry, inputs),
            Err(SolverError::InvalidParameter(_))
        ));
    }
}
