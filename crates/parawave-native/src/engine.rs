//! [`SolverEngine`](parawave_core::engine::SolverEngine) backed by the
//! row-parallel kernel.

use crate::kernel::step_rows;
use parawave_core::engine::Backend;
use parawave_core::error::Result;
use parawave_core::grid::{FieldState, GridGeometry};
use parawave_core::state::{GridEngine, StencilKernel, StepInputs};

/// Interior rows spread over the rayon pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowParallelKernel;

impl StencilKernel for RowParallelKernel {
    const BACKEND: Backend = Backend::Native;

    fn step(fields: &mut FieldState, geometry: &GridGeometry, inputs: StepInputs<'_>) -> Result<()> {
        step_rows(fields, geometry, inputs)
    }
}

/// Native engine.
///
/// Same contract and numerics as the reference engine; only the interior
/// update is spread over worker threads. `step()` returns once every row is
/// written.
pub type NativeEngine = GridEngine<RowParallelKernel>;
