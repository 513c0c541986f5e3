//! The engine state machine shared by every backend.
//!
//! [`GridEngine`] owns everything except the interior update: parameters,
//! geometry, time step, materials, source placement, boundary policy, clock
//! and the rotating field buffers. A backend is a [`StencilKernel`] plugged
//! into it, so both engines run the exact same bookkeeping.

use crate::boundary::BoundaryPolicy;
use crate::engine::{
    check_source_position, Backend, EngineState, SimulationClock, SolverEngine, WaveParameters,
};
use crate::error::{Result, SolverError};
use crate::grid::{FieldState, FieldView, GridGeometry};
use crate::integrator::SourceForcing;
use crate::medium::MaterialMap;
use crate::source::MorletSource;
use crate::stability::{compute_time_step, courant_number, is_stable};
use std::marker::PhantomData;

pub use crate::integrator::StepInputs;

/// Interior update strategy of one backend.
pub trait StencilKernel {
    /// Backend reported by engines running this kernel.
    const BACKEND: Backend;

    /// Advance `fields` by one step, apply the boundary and rotate buffers.
    fn step(fields: &mut FieldState, geometry: &GridGeometry, inputs: StepInputs<'_>) -> Result<()>;
}

/// Everything that exists only after `configure`.
#[derive(Debug, Clone)]
struct Configured {
    geometry: GridGeometry,
    dt: f64,
    fields: FieldState,
    source_position: (usize, usize),
    materials: Option<MaterialMap>,
}

/// A [`SolverEngine`] running kernel `K`.
#[derive(Debug, Clone)]
pub struct GridEngine<K> {
    params: WaveParameters,
    source: MorletSource,
    boundary: BoundaryPolicy,
    clock: SimulationClock,
    configured: Option<Configured>,
    kernel: PhantomData<fn() -> K>,
}

impl<K: StencilKernel> Default for GridEngine<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: StencilKernel> GridEngine<K> {
    /// Create an unconfigured engine with the default source shape.
    pub fn new() -> Self {
        Self::with_source(MorletSource::default())
    }

    /// Create an unconfigured engine with a custom source.
    pub fn with_source(source: MorletSource) -> Self {
        Self {
            params: WaveParameters::default(),
            source,
            boundary: BoundaryPolicy::default(),
            clock: SimulationClock::default(),
            configured: None,
            kernel: PhantomData,
        }
    }

    /// Source model in use.
    pub fn source(&self) -> &MorletSource {
        &self.source
    }

    /// Evaluate the source at the current clock time, run `kernel` and
    /// advance the clock.
    ///
    /// The clock only moves when the kernel succeeds.
    pub fn step_with<F>(&mut self, kernel: F) -> Result<()>
    where
        F: FnOnce(&mut FieldState, &GridGeometry, StepInputs<'_>) -> Result<()>,
    {
        let params = self.params;
        let value = self
            .source
            .evaluate(self.clock.current_time, params.frequency, params.amplitude)?;

        let configured = self.configured.as_mut().ok_or(SolverError::NotConfigured)?;
        let inputs = StepInputs {
            dt: configured.dt,
            wave_speed: params.wave_speed,
            forcing: SourceForcing {
                value,
                position: configured.source_position,
                coupling: self.source.coupling(),
            },
            boundary: self.boundary,
            materials: configured.materials.as_ref(),
            damping: params.damping,
        };
        kernel(&mut configured.fields, &configured.geometry, inputs)?;

        let dt = configured.dt;
        self.clock.tick(dt);
        Ok(())
    }

    fn configured(&self) -> Result<&Configured> {
        self.configured.as_ref().ok_or(SolverError::NotConfigured)
    }

    fn configured_mut(&mut self) -> Result<&mut Configured> {
        self.configured.as_mut().ok_or(SolverError::NotConfigured)
    }

    /// Stable time step for the fastest speed on the grid.
    fn stable_dt(
        &self,
        geometry: &GridGeometry,
        wave_speed: f64,
        materials: Option<&MaterialMap>,
    ) -> Result<f64> {
        let fastest = materials.map_or(wave_speed, |m| m.max_wave_speed(wave_speed));
        let dt = compute_time_step(geometry.dx(), geometry.dy(), fastest)?;
        let courant = courant_number(geometry.dx(), geometry.dy(), fastest, dt);
        debug_assert!(is_stable(courant));

        tracing::debug!(
            backend = %K::BACKEND,
            grid_size = geometry.size(),
            dx = geometry.dx(),
            dy = geometry.dy(),
            fastest,
            dt,
            courant,
            "derived time step"
        );
        Ok(dt)
    }
}

impl<K: StencilKernel> SolverEngine for GridEngine<K> {
    fn backend(&self) -> Backend {
        K::BACKEND
    }

    fn state(&self) -> EngineState {
        if self.configured.is_some() {
            EngineState::Ready
        } else {
            EngineState::Uninitialized
        }
    }

    /// On error the previous configuration is left untouched.
    fn configure_geometry(&mut self, geometry: GridGeometry, wave_speed: f64) -> Result<()> {
        let wave_speed = WaveParameters::check_wave_speed(wave_speed)?;
        let dt = self.stable_dt(&geometry, wave_speed, None)?;

        self.params.wave_speed = wave_speed;
        self.clock.reset();
        self.configured = Some(Configured {
            source_position: geometry.center(),
            fields: FieldState::for_geometry(&geometry),
            geometry,
            dt,
            materials: None,
        });
        tracing::debug!(backend = %K::BACKEND, "configured engine");
        Ok(())
    }

    fn set_frequency(&mut self, frequency: f64) -> Result<()> {
        self.params.frequency = WaveParameters::check_frequency(frequency)?;
        Ok(())
    }

    fn set_amplitude(&mut self, amplitude: f64) -> Result<()> {
        self.params.amplitude = WaveParameters::check_amplitude(amplitude)?;
        Ok(())
    }

    fn set_damping(&mut self, damping: f64) -> Result<()> {
        self.params.damping = WaveParameters::check_damping(damping)?;
        Ok(())
    }

    fn set_source_position(&mut self, i: usize, j: usize) -> Result<()> {
        let configured = self.configured_mut()?;
        let position = check_source_position(&configured.geometry, i, j)?;
        if let Some(materials) = &configured.materials {
            if materials.is_rigid(i, j) {
                return Err(SolverError::invalid_parameter(format!(
                    "source position ({}, {}) is a rigid cell",
                    i, j
                )));
            }
        }
        configured.source_position = position;
        Ok(())
    }

    fn source_position(&self) -> Result<(usize, usize)> {
        Ok(self.configured()?.source_position)
    }

    fn set_material_map(&mut self, materials: Option<MaterialMap>) -> Result<()> {
        let configured = self.configured()?;
        if let Some(map) = &materials {
            map.check_shape(&configured.geometry)?;
            let (i, j) = configured.source_position;
            if map.is_rigid(i, j) {
                return Err(SolverError::invalid_parameter(format!(
                    "source position ({}, {}) would be inside a rigid cell",
                    i, j
                )));
            }
        }
        let geometry = configured.geometry;
        let dt = self.stable_dt(&geometry, self.params.wave_speed, materials.as_ref())?;

        if let Some(map) = &materials {
            tracing::debug!(
                backend = %K::BACKEND,
                rigid_cells = map.rigid_count(),
                "installed material map"
            );
        }
        let configured = self.configured_mut()?;
        configured.dt = dt;
        configured.materials = materials;
        configured.fields.reset();
        self.clock.reset();
        Ok(())
    }

    fn material_map(&self) -> Result<Option<&MaterialMap>> {
        Ok(self.configured()?.materials.as_ref())
    }

    fn set_boundary_policy(&mut self, policy: BoundaryPolicy) {
        self.boundary = policy;
    }

    fn boundary_policy(&self) -> BoundaryPolicy {
        self.boundary
    }

    fn step(&mut self) -> Result<()> {
        self.step_with(K::step)
    }

    fn reset(&mut self) -> Result<()> {
        let configured = self.configured_mut()?;
        configured.fields.reset();
        self.clock.reset();
        tracing::debug!(backend = %K::BACKEND, "engine reset");
        Ok(())
    }

    fn field(&self) -> Result<FieldView<'_>> {
        Ok(self.configured()?.fields.view())
    }

    fn dt(&self) -> Result<f64> {
        Ok(self.configured()?.dt)
    }

    fn geometry(&self) -> Result<GridGeometry> {
        Ok(self.configured()?.geometry)
    }

    fn clock(&self) -> SimulationClock {
        self.clock
    }

    fn wave_parameters(&self) -> WaveParameters {
        self.params
    }
}
