//! Grid geometry and the triple-buffered field state.
//!
//! Cells are addressed as `(i, j)` with `i` running along x and `j` along y,
//! stored in flat `Vec<f64>` buffers at `index = i * size + j`.
//!
//! The three time levels live in a fixed array of slots; advancing a step
//! only moves the "current" slot index, so no buffer is ever copied or
//! reallocated while stepping.

use crate::error::{require_positive, Result, SolverError};
use serde::{Deserialize, Serialize};

/// Smallest accepted number of cells per side.
pub const MIN_GRID_SIZE: usize = 2;

/// Physical extent of the simulated domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    /// x of `i = 0`.
    pub x_min: f64,
    /// x of `i = N-1`.
    pub x_max: f64,
    /// y of `j = 0`.
    pub y_min: f64,
    /// y of `j = N-1`.
    pub y_max: f64,
}

impl Domain {
    /// Square domain of side `size` centred on the origin.
    pub fn centered_square(size: f64) -> Self {
        let half = 0.5 * size;
        Self {
            x_min: -half,
            x_max: half,
            y_min: -half,
            y_max: half,
        }
    }

    /// Width of the domain in x.
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Height of the domain in y.
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }
}

/// Geometry of an N×N lattice mapped onto a [`Domain`].
///
/// Deserialization goes through [`GridGeometry::new`], so a decoded geometry
/// has the same guarantees as a constructed one and stored spacings are
/// recomputed rather than trusted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GeometryRepr")]
pub struct GridGeometry {
    size: usize,
    domain: Domain,
    dx: f64,
    dy: f64,
}

#[derive(Deserialize)]
struct GeometryRepr {
    size: usize,
    domain: Domain,
}

impl TryFrom<GeometryRepr> for GridGeometry {
    type Error = SolverError;

    fn try_from(repr: GeometryRepr) -> Result<Self> {
        Self::new(repr.size, repr.domain)
    }
}

impl GridGeometry {
    /// Create a geometry with `size` cells per side spanning `domain`.
    pub fn new(size: usize, domain: Domain) -> Result<Self> {
        if size < MIN_GRID_SIZE {
            return Err(SolverError::invalid_parameter(format!(
                "grid size must be at least {}, got {}",
                MIN_GRID_SIZE, size
            )));
        }
        let width = require_positive("domain width", domain.width())?;
        let height = require_positive("domain height", domain.height())?;
        let intervals = (size - 1) as f64;

        Ok(Self {
            size,
            domain,
            dx: width / intervals,
            dy: height / intervals,
        })
    }

    /// Square domain of side `domain_size` centred on the origin.
    pub fn square(size: usize, domain_size: f64) -> Result<Self> {
        require_positive("domain size", domain_size)?;
        Self::new(size, Domain::centered_square(domain_size))
    }

    /// Number of cells per side.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total number of cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.size * self.size
    }

    /// Grid spacing in x.
    #[inline]
    pub fn dx(&self) -> f64 {
        self.dx
    }

    /// Grid spacing in y.
    #[inline]
    pub fn dy(&self) -> f64 {
        self.dy
    }

    /// The physical domain.
    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Linear index of `(i, j)`.
    #[inline(always)]
    pub fn index(&self, i: usize, j: usize) -> usize {
        i * self.size + j
    }

    /// Physical x coordinate of index `i`.
    pub fn x_coord(&self, i: usize) -> f64 {
        self.domain.x_min + i as f64 * self.dx
    }

    /// Physical y coordinate of index `j`.
    pub fn y_coord(&self, j: usize) -> f64 {
        self.domain.y_min + j as f64 * self.dy
    }

    /// Cell nearest to the physical point `(x, y)`, or `None` if the point
    /// lies outside the domain.
    pub fn cell_at(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let d = &self.domain;
        if !(d.x_min..=d.x_max).contains(&x) || !(d.y_min..=d.y_max).contains(&y) {
            return None;
        }
        let last = self.size - 1;
        let i = (((x - d.x_min) / self.dx).round() as usize).min(last);
        let j = (((y - d.y_min) / self.dy).round() as usize).min(last);
        Some((i, j))
    }

    /// True if `(i, j)` lies on the grid.
    pub fn contains(&self, i: usize, j: usize) -> bool {
        i < self.size && j < self.size
    }

    /// True if `(i, j)` lies on the outermost ring.
    pub fn is_boundary(&self, i: usize, j: usize) -> bool {
        i == 0 || j == 0 || i == self.size - 1 || j == self.size - 1
    }

    /// Centre cell `(N/2, N/2)`, the default source location.
    pub fn center(&self) -> (usize, usize) {
        (self.size / 2, self.size / 2)
    }
}

/// Read-only view of one field buffer.
#[derive(Debug, Clone, Copy)]
pub struct FieldView<'a> {
    size: usize,
    data: &'a [f64],
}

impl<'a> FieldView<'a> {
    /// Wrap a buffer of `size * size` values.
    pub fn new(size: usize, data: &'a [f64]) -> Self {
        debug_assert_eq!(data.len(), size * size);
        Self { size, data }
    }

    /// Cells per side.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Values in storage order.
    pub fn as_slice(&self) -> &'a [f64] {
        self.data
    }

    /// Value at `(i, j)`, or `None` outside the grid.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i < self.size && j < self.size {
            Some(self.data[i * self.size + j])
        } else {
            None
        }
    }

    /// Maximum absolute cell value.
    pub fn max_amplitude(&self) -> f64 {
        max_amplitude(self.data)
    }

    /// Sum of squared cell values.
    pub fn energy(&self) -> f64 {
        energy(self.data)
    }

    /// Owned copy of the field.
    pub fn to_snapshot(&self) -> FieldSnapshot {
        FieldSnapshot {
            size: self.size,
            data: self.data.to_vec(),
        }
    }
}

/// Owned copy of a field at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SnapshotRepr")]
pub struct FieldSnapshot {
    size: usize,
    data: Vec<f64>,
}

#[derive(Deserialize)]
struct SnapshotRepr {
    size: usize,
    data: Vec<f64>,
}

impl TryFrom<SnapshotRepr> for FieldSnapshot {
    type Error = SolverError;

    fn try_from(repr: SnapshotRepr) -> Result<Self> {
        Self::new(repr.size, repr.data)
    }
}

impl FieldSnapshot {
    /// Wrap `size * size` values in storage order.
    pub fn new(size: usize, data: Vec<f64>) -> Result<Self> {
        if size == 0 || size.checked_mul(size) != Some(data.len()) {
            return Err(SolverError::invalid_parameter(format!(
                "snapshot of size {} needs {} values, got {}",
                size,
                size.saturating_mul(size),
                data.len()
            )));
        }
        Ok(Self { size, data })
    }

    /// Cells per side.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Values in storage order.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Value at `(i, j)`, or `None` outside the grid.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.view().get(i, j)
    }

    /// Borrow as a [`FieldView`].
    pub fn view(&self) -> FieldView<'_> {
        FieldView::new(self.size, &self.data)
    }

    /// Nested `[i][j]` vectors, for consumers that want a 2D layout.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data.chunks(self.size).map(<[f64]>::to_vec).collect()
    }
}

/// Maximum absolute value of a buffer (0 for an empty buffer).
///
/// A NaN anywhere in the buffer makes the result NaN, so a diverged field
/// is never reported as quiet.
pub fn max_amplitude(data: &[f64]) -> f64 {
    data.iter()
        .map(|v| v.abs())
        .fold(0.0, |max, v| if v > max || v.is_nan() { v } else { max })
}

/// Sum of squares of a buffer.
pub fn energy(data: &[f64]) -> f64 {
    data.iter().map(|v| v * v).sum()
}

/// Borrowed buffers for one integration step.
pub struct StepBuffers<'a> {
    /// Field at `t - dt`.
    pub previous: &'a [f64],
    /// Field at `t`.
    pub current: &'a [f64],
    /// Field at `t + dt`, overwritten by the step.
    pub next: &'a mut [f64],
}

/// Three same-shaped buffers playing the previous/current/next roles.
#[derive(Debug, Clone)]
pub struct FieldState {
    size: usize,
    slots: [Vec<f64>; 3],
    /// Slot holding `current`; `next` is `current + 1`, `previous` is `current + 2` (mod 3).
    current: usize,
}

impl FieldState {
    /// Zero-filled state for a `size`×`size` grid.
    pub fn new(size: usize) -> Self {
        let cells = size * size;
        Self {
            size,
            slots: [vec![0.0; cells], vec![0.0; cells], vec![0.0; cells]],
            current: 0,
        }
    }

    /// Zero-filled state matching a geometry.
    pub fn for_geometry(geometry: &GridGeometry) -> Self {
        Self::new(geometry.size())
    }

    /// Cells per side.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Verify that every buffer matches `geometry`.
    pub fn check_shape(&self, geometry: &GridGeometry) -> Result<()> {
        let expected = geometry.cell_count();
        if self.size != geometry.size() || self.slots.iter().any(|s| s.len() != expected) {
            return Err(SolverError::invalid_state(format!(
                "field buffers are {}x{} but the grid is {}x{}",
                self.size,
                self.size,
                geometry.size(),
                geometry.size()
            )));
        }
        Ok(())
    }

    /// The field at the current time.
    pub fn current(&self) -> &[f64] {
        &self.slots[self.current]
    }

    /// The field one step back.
    pub fn previous(&self) -> &[f64] {
        &self.slots[(self.current + 2) % 3]
    }

    /// Read-only view of `current`.
    pub fn view(&self) -> FieldView<'_> {
        FieldView::new(self.size, self.current())
    }

    /// Split into the three role buffers for one step.
    pub fn step_buffers(&mut self) -> StepBuffers<'_> {
        let [a, b, c] = &mut self.slots;
        let (previous, current, next) = match self.current {
            0 => (c, a, b),
            1 => (a, b, c),
            _ => (b, c, a),
        };
        StepBuffers {
            previous: previous.as_slice(),
            current: current.as_slice(),
            next: next.as_mut_slice(),
        }
    }

    /// Rotate roles: previous <- current, current <- next, next <- old previous.
    #[inline]
    pub fn rotate(&mut self) {
        self.current = (self.current + 1) % 3;
    }

    /// Zero every buffer.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.fill(0.0);
        }
        self.current = 0;
    }

    /// Add `amplitude` to the current field at `(i, j)`.
    pub fn inject_impulse(&mut self, i: usize, j: usize, amplitude: f64) {
        if i < self.size && j < self.size {
            let idx = i * self.size + j;
            self.slots[self.current][idx] += amplitude;
        }
    }
}
