//! Backend selection and the [`Simulation`] handle.

use crate::recorder::{ResultsRecorder, RunResult};
use parawave_core::prelude::*;
use parawave_core::reference::ReferenceEngine;
use std::fmt;

/// A solver engine chosen once at construction.
///
/// The selected backend never changes for the lifetime of the value; to
/// switch, build a new `Simulation`.
pub struct Simulation {
    inner: Box<dyn SolverEngine>,
}

impl Simulation {
    /// Create an unconfigured simulation on the best available backend.
    pub fn new() -> Self {
        Self {
            inner: select_auto(MorletSource::default()),
        }
    }

    /// Create an unconfigured simulation on `backend`.
    ///
    /// Fails with `BackendUnavailable` if an explicitly requested backend is
    /// not compiled in or cannot run on this host.
    pub fn with_backend(backend: Backend) -> Result<Self> {
        Self::with_source(backend, MorletSource::default())
    }

    /// Like [`Simulation::with_backend`] with a custom source.
    pub fn with_source(backend: Backend, source: MorletSource) -> Result<Self> {
        let inner: Box<dyn SolverEngine> = match backend {
            Backend::Auto => select_auto(source),
            Backend::Reference => Box::new(ReferenceEngine::with_source(source)),
            #[cfg(feature = "native")]
            Backend::Native => {
                if !parawave_native::is_native_available() {
                    return Err(SolverError::backend_unavailable(
                        "native thread pool could not be started",
                    ));
                }
                Box::new(parawave_native::NativeEngine::with_source(source))
            }
            #[cfg(not(feature = "native"))]
            Backend::Native => {
                return Err(SolverError::backend_unavailable(
                    "native feature not enabled",
                ))
            }
        };
        tracing::info!(requested = %backend, selected = %inner.backend(), "created simulation");
        Ok(Self { inner })
    }

    /// Step `total_steps` times, sampling every `record_interval` steps.
    pub fn run(&mut self, total_steps: usize, record_interval: usize) -> Result<RunResult> {
        ResultsRecorder::new(self).run(total_steps, record_interval)
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("backend", &self.inner.backend())
            .field("state", &self.inner.state())
            .field("clock", &self.inner.clock())
            .finish()
    }
}

/// Pick the native engine when it is compiled in and usable.
fn select_auto(source: MorletSource) -> Box<dyn SolverEngine> {
    #[cfg(feature = "native")]
    if parawave_native::is_native_available() {
        tracing::info!(
            threads = parawave_native::worker_threads(),
            "Auto-selected native backend"
        );
        return Box::new(parawave_native::NativeEngine::with_source(source));
    }

    #[cfg(feature = "native")]
    tracing::warn!("Native backend unavailable, falling back to reference backend");
    #[cfg(not(feature = "native"))]
    tracing::warn!("Native backend not compiled in, falling back to reference backend");

    Box::new(ReferenceEngine::with_source(source))
}

impl SolverEngine for Simulation {
    fn backend(&self) -> Backend {
        self.inner.backend()
    }

    fn state(&self) -> EngineState {
        self.inner.state()
    }

    fn configure_geometry(&mut self, geometry: GridGeometry, wave_speed: f64) -> Result<()> {
        self.inner.configure_geometry(geometry, wave_speed)
    }

    fn set_frequency(&mut self, frequency: f64) -> Result<()> {
        self.inner.set_frequency(frequency)
    }

    fn set_amplitude(&mut self, amplitude: f64) -> Result<()> {
        self.inner.set_amplitude(amplitude)
    }

    fn set_damping(&mut self, damping: f64) -> Result<()> {
        self.inner.set_damping(damping)
    }

    fn set_source_position(&mut self, i: usize, j: usize) -> Result<()> {
        self.inner.set_source_position(i, j)
    }

    fn source_position(&self) -> Result<(usize, usize)> {
        self.inner.source_position()
    }

    fn set_material_map(&mut self, materials: Option<MaterialMap>) -> Result<()> {
        self.inner.set_material_map(materials)
    }

    fn material_map(&self) -> Result<Option<&MaterialMap>> {
        self.inner.material_map()
    }

    fn set_boundary_policy(&mut self, policy: BoundaryPolicy) {
        self.inner.set_boundary_policy(policy)
    }

    fn boundary_policy(&self) -> BoundaryPolicy {
        self.inner.boundary_policy()
    }

    fn step(&mut self) -> Result<()> {
        self.inner.step()
    }

    fn reset(&mut self) -> Result<()> {
        self.inner.reset()
    }

    fn field(&self) -> Result<FieldView<'_>> {
        self.inner.field()
    }

    fn dt(&self) -> Result<f64> {
        self.inner.dt()
    }

    fn geometry(&self) -> Result<GridGeometry> {
        self.inner.geometry()
    }

    fn clock(&self) -> SimulationClock {
        self.inner.clock()
    }

    fn wave_parameters(&self) -> WaveParameters {
        self.inner.wave_parameters()
    }
}

/// Check availability of backends at runtime.
pub mod availability {
    use parawave_core::engine::Backend;

    /// Check if the native engine is compiled in and usable.
    pub fn native() -> bool {
        #[cfg(feature = "native")]
        {
            parawave_native::is_native_available()
        }
        #[cfg(not(feature = "native"))]
        {
            false
        }
    }

    /// Get list of concrete backends usable on this host.
    pub fn available_backends() -> Vec<Backend> {
        let mut backends = vec![Backend::Reference];
        if native() {
            backends.push(Backend::Native);
        }
        backends
    }
}
