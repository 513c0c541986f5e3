//! Stencil update, one row at a time.

use parawave_core::error::Result;
use parawave_core::grid::{FieldState, GridGeometry};
use parawave_core::integrator::Stencil;
use parawave_core::state::StepInputs;
use rayon::prelude::*;

/// Grids with at least this many cells per side are stepped in parallel.
///
/// Below it the per-task overhead outweighs the work in each row.
pub const PARALLEL_THRESHOLD: usize = 128;

/// Advance `fields` by one step, apply the boundary and rotate buffers.
pub(crate) fn step_rows(
    fields: &mut FieldState,
    geometry: &GridGeometry,
    inputs: StepInputs<'_>,
) -> Result<()> {
    fields.check_shape(geometry)?;
    if let Some(materials) = inputs.materials {
        materials.check_shape(geometry)?;
    }

    let size = geometry.size();
    let stencil = Stencil::new(geometry, &inputs);
    let buffers = fields.step_buffers();
    let (previous, current, next) = (buffers.previous, buffers.current, buffers.next);

    if size > 2 {
        // Skip the first and last rows; they belong to the boundary.
        let interior = &mut next[size..(size - 1) * size];
        if size >= PARALLEL_THRESHOLD {
            interior
                .par_chunks_mut(size)
                .enumerate()
                .for_each(|(offset, row)| stencil.update_row(offset + 1, previous, current, row));
        } else {
            interior
                .chunks_mut(size)
                .enumerate()
                .for_each(|(offset, row)| stencil.update_row(offset + 1, previous, current, row));
        }
    }

    inputs.boundary.apply(next, size);
    fields.rotate();
    Ok(())
}
