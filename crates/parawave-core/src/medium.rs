//! Per-cell materials.
//!
//! A [`MaterialMap`] assigns every cell either the engine's background
//! medium, a medium with its own wave speed, or a rigid wall. Rigid cells are
//! held at zero displacement, so waves reflect off them. Engines without a
//! map treat every cell as background.

use crate::error::{require_positive, Result, SolverError};
use crate::grid::GridGeometry;
use serde::{Deserialize, Serialize};

/// Material of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Material {
    /// Propagates at the engine's wave speed.
    #[default]
    Background,
    /// Propagates at its own speed.
    Medium {
        /// Wave speed inside this material.
        wave_speed: f64,
    },
    /// Zero displacement at all times.
    Rigid,
}

impl Material {
    /// Check that the material can be stepped.
    pub fn validate(&self) -> Result<()> {
        if let Material::Medium { wave_speed } = self {
            require_positive("material wave speed", *wave_speed)?;
        }
        Ok(())
    }

    /// Wave speed in this material, `None` for rigid cells.
    #[inline]
    pub fn wave_speed(&self, background: f64) -> Option<f64> {
        match *self {
            Material::Background => Some(background),
            Material::Medium { wave_speed } => Some(wave_speed),
            Material::Rigid => None,
        }
    }
}

/// Materials of an N×N grid, in the same storage order as the field.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialMap {
    size: usize,
    cells: Vec<Material>,
}

impl MaterialMap {
    /// All-background map for a `size`×`size` grid.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Material::Background; size * size],
        }
    }

    /// All-background map matching `geometry`.
    pub fn for_geometry(geometry: &GridGeometry) -> Self {
        Self::new(geometry.size())
    }

    /// Build a map by evaluating `material_at(x, y)` at every cell centre.
    pub fn from_fn<F>(geometry: &GridGeometry, mut material_at: F) -> Result<Self>
    where
        F: FnMut(f64, f64) -> Material,
    {
        let mut map = Self::for_geometry(geometry);
        for i in 0..geometry.size() {
            let x = geometry.x_coord(i);
            for j in 0..geometry.size() {
                let material = material_at(x, geometry.y_coord(j));
                material.validate()?;
                map.cells[geometry.index(i, j)] = material;
            }
        }
        Ok(map)
    }

    /// Cells per side.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Material at `(i, j)`, or `None` outside the grid.
    pub fn get(&self, i: usize, j: usize) -> Option<Material> {
        if i < self.size && j < self.size {
            Some(self.cells[i * self.size + j])
        } else {
            None
        }
    }

    /// Material at a storage index.
    #[inline(always)]
    pub fn cell(&self, index: usize) -> Material {
        self.cells[index]
    }

    /// Assign `material` to `(i, j)`.
    pub fn set(&mut self, i: usize, j: usize, material: Material) -> Result<()> {
        material.validate()?;
        if i >= self.size || j >= self.size {
            return Err(SolverError::invalid_parameter(format!(
                "cell ({}, {}) is outside the {}x{} material map",
                i, j, self.size, self.size
            )));
        }
        self.cells[i * self.size + j] = material;
        Ok(())
    }

    /// Assign `material` to every cell whose centre satisfies `inside(x, y)`.
    ///
    /// Returns the number of cells painted.
    pub fn paint<F>(&mut self, geometry: &GridGeometry, material: Material, inside: F) -> Result<usize>
    where
        F: Fn(f64, f64) -> bool,
    {
        self.check_shape(geometry)?;
        material.validate()?;
        let mut painted = 0;
        for i in 0..self.size {
            let x = geometry.x_coord(i);
            for j in 0..self.size {
                if inside(x, geometry.y_coord(j)) {
                    self.cells[i * self.size + j] = material;
                    painted += 1;
                }
            }
        }
        Ok(painted)
    }

    /// Make a band of `width` cells along every edge rigid.
    pub fn add_rigid_frame(&mut self, width: usize) {
        let size = self.size;
        for i in 0..size {
            for j in 0..size {
                if i < width || j < width || i + width >= size || j + width >= size {
                    self.cells[i * size + j] = Material::Rigid;
                }
            }
        }
    }

    /// True if `(i, j)` is a rigid cell.
    pub fn is_rigid(&self, i: usize, j: usize) -> bool {
        matches!(self.get(i, j), Some(Material::Rigid))
    }

    /// Number of rigid cells.
    pub fn rigid_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|m| matches!(m, Material::Rigid))
            .count()
    }

    /// Fastest speed present, with background cells moving at `background`.
    ///
    /// The stable time step has to be derived from this value.
    pub fn max_wave_speed(&self, background: f64) -> f64 {
        self.cells
            .iter()
            .filter_map(|m| m.wave_speed(background))
            .fold(background, f64::max)
    }

    /// Verify the map matches `geometry`.
    pub fn check_shape(&self, geometry: &GridGeometry) -> Result<()> {
        if self.size != geometry.size() {
            return Err(SolverError::invalid_parameter(format!(
                "material map is {}x{} but the grid is {}x{}",
                self.size,
                self.size,
                geometry.size(),
                geometry.size()
            )));
        }
        Ok(())
    }
}

/// A solid shell following a parabola `y = vertex_y ± (x − vertex_x)² / (4f)`.
///
/// The shell lies on the convex side of the curve, spans `aperture` in x and
/// is `thickness` deep in y. A source at [`ParabolicShell::focus`] is
/// reflected into a plane wave by the inner surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParabolicShell {
    /// Vertex `(x, y)`.
    pub vertex: (f64, f64),
    /// Vertex-to-focus distance.
    pub focal_length: f64,
    /// Full width of the dish in x.
    pub aperture: f64,
    /// Shell depth measured in y.
    pub thickness: f64,
    /// True for a bowl (opens towards +y), false for an umbrella.
    pub opens_up: bool,
}

impl ParabolicShell {
    /// Check that every dimension is positive.
    pub fn validate(&self) -> Result<()> {
        require_positive("focal length", self.focal_length)?;
        require_positive("aperture", self.aperture)?;
        require_positive("shell thickness", self.thickness)?;
        Ok(())
    }

    /// Height of the inner surface at `x`.
    pub fn surface_y(&self, x: f64) -> f64 {
        let dx = x - self.vertex.0;
        let rise = dx * dx / (4.0 * self.focal_length);
        if self.opens_up {
            self.vertex.1 + rise
        } else {
            self.vertex.1 - rise
        }
    }

    /// Focal point `(x, y)`.
    pub fn focus(&self) -> (f64, f64) {
        let offset = if self.opens_up {
            self.focal_length
        } else {
            -self.focal_length
        };
        (self.vertex.0, self.vertex.1 + offset)
    }

    /// True if `(x, y)` lies inside the shell material.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        if (x - self.vertex.0).abs() > 0.5 * self.aperture {
            return false;
        }
        let surface = self.surface_y(x);
        if self.opens_up {
            y <= surface && y > surface - self.thickness
        } else {
            y >= surface && y < surface + self.thickness
        }
    }
}
