//! Edge conditions applied to the freshly computed field.

use serde::{Deserialize, Serialize};

/// Boundary condition for the outermost ring of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Clamp the ring to zero.
    ///
    /// Cheap stand-in for an absorbing boundary: it prevents energy from
    /// building up at the edges, at the cost of some spurious reflection and
    /// absorption (a true absorbing layer needs impedance matching).
    #[default]
    ZeroDirichlet,
    /// Copy the inward neighbour onto the ring (hard wall, zero normal gradient).
    Reflecting,
}

impl BoundaryPolicy {
    /// Apply the policy to a row-major `size`×`size` buffer.
    pub fn apply(self, field: &mut [f64], size: usize) {
        debug_assert_eq!(field.len(), size * size);
        match self {
            BoundaryPolicy::ZeroDirichlet => apply_zero_dirichlet(field, size),
            BoundaryPolicy::Reflecting => apply_reflecting(field, size),
        }
    }
}

/// `field[0,:] = field[N-1,:] = field[:,0] = field[:,N-1] = 0`.
pub fn apply_zero_dirichlet(field: &mut [f64], size: usize) {
    if size == 0 {
        return;
    }
    let last = size - 1;

    field[..size].fill(0.0);
    field[last * size..].fill(0.0);

    for row in 1..last {
        field[row * size] = 0.0;
        field[row * size + last] = 0.0;
    }
}

/// Mirror the first interior ring outwards.
///
/// Grids smaller than 3×3 have no interior and are clamped to zero instead.
pub fn apply_reflecting(field: &mut [f64], size: usize) {
    if size < 3 {
        apply_zero_dirichlet(field, size);
        return;
    }
    let last = size - 1;

    // Left and right columns first, then full top and bottom rows so the
    // corners pick up the already mirrored column values.
    for row in 1..last {
        let start = row * size;
        field[start] = field[start + 1];
        field[start + last] = field[start + last - 1];
    }
    field.copy_within(size..2 * size, 0);
    field.copy_within((last - 1) * size..last * size, last * size);
}
