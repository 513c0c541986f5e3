//! Simulation settings, loadable from TOML.
//!
//! ```toml
//! grid_size = 200
//! domain_size = 0.6
//! wave_speed = 343.0
//! frequency = 1500.0
//! backend = "reference"
//! boundary = "reflecting"
//!
//! damping = 0.001
//! rigid_frame = 5
//!
//! [source]
//! duration_periods = 8.0
//!
//! [[reflectors]]
//! vertex = [0.0, -0.1]
//! focal_length = 0.1
//! aperture = 0.4
//! thickness = 0.04
//! opens_up = true
//! material = { kind = "medium", wave_speed = 1500.0 }
//! ```
//!
//! Missing keys take their defaults. Without an explicit `source_position`
//! the source sits at the focus of the first reflector, or at the grid
//! centre when there is none.

use crate::backend::Simulation;
use parawave_core::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A parabolic dish painted into the material map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reflector {
    /// Dish geometry.
    #[serde(flatten)]
    pub shell: ParabolicShell,
    /// Material of the dish cells.
    #[serde(default = "Reflector::default_material")]
    pub material: Material,
}

impl Reflector {
    fn default_material() -> Material {
        Material::Rigid
    }
}

/// Everything needed to build a ready-to-run [`Simulation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Cells per side.
    pub grid_size: usize,
    /// Side of the square domain (m).
    pub domain_size: f64,
    /// Speed of sound (m/s).
    pub wave_speed: f64,
    /// Source frequency (Hz).
    pub frequency: f64,
    /// Source amplitude.
    pub amplitude: f64,
    /// Engine backend.
    pub backend: Backend,
    /// Edge condition.
    pub boundary: BoundaryPolicy,
    /// Damping factor (0 is lossless).
    pub damping: f64,
    /// Width of a rigid band along every edge, in cells (0 for none).
    pub rigid_frame: usize,
    /// Source cell `[i, j]`; see the module docs for the default.
    pub source_position: Option<[usize; 2]>,
    /// Parabolic dishes, painted in order.
    pub reflectors: Vec<Reflector>,
    /// Source pulse constants.
    pub source: SourceShape,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let params = WaveParameters::default();
        Self {
            grid_size: 300,
            domain_size: 0.6,
            wave_speed: params.wave_speed,
            frequency: params.frequency,
            amplitude: params.amplitude,
            backend: Backend::Auto,
            boundary: BoundaryPolicy::ZeroDirichlet,
            damping: params.damping,
            rigid_frame: 0,
            source_position: None,
            reflectors: Vec::new(),
            source: SourceShape::default(),
        }
    }
}

impl SimulationConfig {
    /// Default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the grid size.
    pub fn with_grid_size(mut self, grid_size: usize) -> Self {
        self.grid_size = grid_size;
        self
    }

    /// Set the domain side length.
    pub fn with_domain_size(mut self, domain_size: f64) -> Self {
        self.domain_size = domain_size;
        self
    }

    /// Set the wave speed.
    pub fn with_wave_speed(mut self, wave_speed: f64) -> Self {
        self.wave_speed = wave_speed;
        self
    }

    /// Set the source frequency.
    pub fn with_frequency(mut self, frequency: f64) -> Self {
        self.frequency = frequency;
        self
    }

    /// Set the source amplitude.
    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Set the backend.
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Set the boundary policy.
    pub fn with_boundary(mut self, boundary: BoundaryPolicy) -> Self {
        self.boundary = boundary;
        self
    }

    /// Set the damping factor.
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Set the rigid edge band width.
    pub fn with_rigid_frame(mut self, cells: usize) -> Self {
        self.rigid_frame = cells;
        self
    }

    /// Place the source at `(i, j)`.
    pub fn with_source_position(mut self, i: usize, j: usize) -> Self {
        self.source_position = Some([i, j]);
        self
    }

    /// Add a parabolic dish.
    pub fn with_reflector(mut self, reflector: Reflector) -> Self {
        self.reflectors.push(reflector);
        self
    }

    /// Set the source constants.
    pub fn with_source(mut self, source: SourceShape) -> Self {
        self.source = source;
        self
    }

    /// Parse TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| SolverError::config(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SolverError::config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Serialize to TOML text.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| SolverError::config(e.to_string()))
    }

    /// Check every value without building anything.
    pub fn validate(&self) -> Result<()> {
        GridGeometry::square(self.grid_size, self.domain_size)?;
        WaveParameters::check_wave_speed(self.wave_speed)?;
        WaveParameters::check_frequency(self.frequency)?;
        WaveParameters::check_amplitude(self.amplitude)?;
        WaveParameters::check_damping(self.damping)?;
        for reflector in &self.reflectors {
            reflector.shell.validate()?;
            reflector.material.validate()?;
        }
        self.source.validate()
    }

    /// Material map described by `rigid_frame` and `reflectors`, or `None`
    /// when the medium is uniform.
    pub fn material_map(&self, geometry: &GridGeometry) -> Result<Option<MaterialMap>> {
        if self.reflectors.is_empty() && self.rigid_frame == 0 {
            return Ok(None);
        }
        let mut map = MaterialMap::for_geometry(geometry);
        for reflector in &self.reflectors {
            let shell = reflector.shell;
            map.paint(geometry, reflector.material, |x, y| shell.contains(x, y))?;
        }
        map.add_rigid_frame(self.rigid_frame);
        Ok(Some(map))
    }

    fn resolve_source_position(&self, geometry: &GridGeometry) -> Result<Option<(usize, usize)>> {
        if let Some([i, j]) = self.source_position {
            return Ok(Some((i, j)));
        }
        match self.reflectors.first() {
            Some(reflector) => {
                let (x, y) = reflector.shell.focus();
                geometry.cell_at(x, y).map(Some).ok_or_else(|| {
                    SolverError::invalid_parameter(format!(
                        "reflector focus ({}, {}) is outside the domain",
                        x, y
                    ))
                })
            }
            None => Ok(None),
        }
    }

    /// Build and configure a simulation.
    pub fn build(&self) -> Result<Simulation> {
        self.validate()?;
        let source = MorletSource::new(self.source)?;
        let mut sim = Simulation::with_source(self.backend, source)?;
        sim.configure(self.grid_size, self.domain_size, self.wave_speed)?;
        sim.set_frequency(self.frequency)?;
        sim.set_amplitude(self.amplitude)?;
        sim.set_damping(self.damping)?;
        sim.set_boundary_policy(self.boundary);

        let geometry = sim.geometry()?;
        if let Some((i, j)) = self.resolve_source_position(&geometry)? {
            sim.set_source_position(i, j)?;
        }
        if let Some(materials) = self.material_map(&geometry)? {
            sim.set_material_map(Some(materials))?;
        }
        Ok(sim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimulationConfig::default();
        assert_eq!(config.grid_size, 300);
        assert_eq!(config.domain_size, 0.6);
        assert_eq!(config.wave_speed, 343.0);
        assert_eq!(config.frequency, 1000.0);
        assert_eq!(config.backend, Backend::Auto);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = SimulationConfig::from_toml_str(
            r#"
            grid_size = 64
            backend = "reference"
            boundary = "reflecting"

            [source]
            duration_periods = 8.0
            "#,
        )
        .unwrap();
        assert_eq!(config.grid_size, 64);
        assert_eq!(config.backend, Backend::Reference);
        assert_eq!(config.boundary, BoundaryPolicy::Reflecting);
        assert_eq!(config.source.duration_periods, 8.0);
        assert_eq!(config.source.coupling, 10_000.0);
        assert_eq!(config.frequency, 1000.0);
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(
            SimulationConfig::from_toml_str("grid_size = \"large\""),
            Err(SolverError::Config(_))
        ));
        assert!(matches!(
            SimulationConfig::from_toml_str("backend = \"quantum\""),
            Err(SolverError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            SimulationConfig::from_file("/nonexistent/parawave.toml"),
            Err(SolverError::Config(_))
        ));
    }

    #[test]
    fn test_validate_rejects() {
        assert!(SimulationConfig::new().with_grid_size(1).validate().is_err());
        assert!(SimulationConfig::new().with_frequency(0.0).validate().is_err());
        assert!(SimulationConfig::new().with_amplitude(-1.0).validate().is_err());
        assert!(SimulationConfig::new().with_wave_speed(-343.0).validate().is_err());
        assert!(SimulationConfig::new().with_domain_size(0.0).validate().is_err());
        assert!(SimulationConfig::new().with_damping(-0.1).validate().is_err());
        let flat_dish = Reflector {
            shell: ParabolicShell {
                vertex: (0.0, 0.0),
                focal_length: 0.0,
                aperture: 0.2,
                thickness: 0.02,
                opens_up: true,
            },
            material: Material::Rigid,
        };
        assert!(SimulationConfig::new()
            .with_reflector(flat_dish)
            .validate()
            .is_err());
    }

    #[test]
    fn test_build() {
        let sim = SimulationConfig::new()
            .with_grid_size(32)
            .with_frequency(2000.0)
            .with_amplitude(0.5)
            .with_backend(Backend::Reference)
            .with_boundary(BoundaryPolicy::Reflecting)
            .build()
            .unwrap();
        assert_eq!(sim.backend(), Backend::Reference);
        assert_eq!(sim.state(), EngineState::Ready);
        assert_eq!(sim.geometry().unwrap().size(), 32);
        assert_eq!(sim.wave_parameters().frequency, 2000.0);
        assert_eq!(sim.wave_parameters().amplitude, 0.5);
        assert_eq!(sim.boundary_policy(), BoundaryPolicy::Reflecting);
    }

    #[test]
    fn test_reflector_toml_and_focus_source() {
        let config = SimulationConfig::from_toml_str(
            r#"
            grid_size = 61
            backend = "reference"
            damping = 0.001
            rigid_frame = 5

            [[reflectors]]
            vertex = [0.0, -0.1]
            focal_length = 0.1
            aperture = 0.4
            thickness = 0.04
            opens_up = true
            material = { kind = "medium", wave_speed = 1500.0 }
            "#,
        )
        .unwrap();
        assert_eq!(config.reflectors.len(), 1);
        assert_eq!(
            config.reflectors[0].material,
            Material::Medium { wave_speed: 1500.0 }
        );

        let sim = config.build().unwrap();
        // Focus at the origin is the centre cell of a 61-cell grid.
        assert_eq!(sim.source_position(), Ok((30, 30)));
        assert_eq!(sim.wave_parameters().damping, 0.001);
        let map = sim.material_map().unwrap().unwrap();
        assert!(map.is_rigid(0, 0));
        assert!(map.is_rigid(4, 30));
        assert!(!map.is_rigid(5, 30));
        let geometry = sim.geometry().unwrap();
        assert_eq!(
            sim.dt().unwrap(),
            compute_time_step(geometry.dx(), geometry.dy(), 1500.0).unwrap()
        );
    }

    #[test]
    fn test_reflector_defaults_to_rigid() {
        let config = SimulationConfig::from_toml_str(
            r#"
            [[reflectors]]
            vertex = [0.0, 0.1]
            focal_length = 0.1
            aperture = 0.3
            thickness = 0.03
            opens_up = false
            "#,
        )
        .unwrap();
        assert_eq!(config.reflectors[0].material, Material::Rigid);
        assert_eq!(config.reflectors[0].shell.focus(), (0.0, 0.0));
    }

    #[test]
    fn test_explicit_source_position_wins() {
        let sim = SimulationConfig::new()
            .with_grid_size(40)
            .with_backend(Backend::Reference)
            .with_source_position(12, 25)
            .build()
            .unwrap();
        assert_eq!(sim.source_position(), Ok((12, 25)));
        assert_eq!(sim.material_map(), Ok(None));

        let err = SimulationConfig::new()
            .with_grid_size(40)
            .with_source_position(0, 25)
            .build()
            .unwrap_err();
        assert!(matches!(err, SolverError::InvalidParameter(_)));
    }
}
