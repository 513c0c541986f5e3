//! Portable sequential engine.
//!
//! Integrates with [`crate::integrator::advance`] on the calling thread. It
//! is always available and is the baseline every other engine is checked
//! against.

use crate::engine::Backend;
use crate::error::Result;
use crate::grid::{FieldState, GridGeometry};
use crate::integrator::advance;
use crate::state::{GridEngine, StencilKernel, StepInputs};

/// Row-by-row update on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialKernel;

impl StencilKernel for SequentialKernel {
    const BACKEND: Backend = Backend::Reference;

    fn step(fields: &mut FieldState, geometry: &GridGeometry, inputs: StepInputs<'_>) -> Result<()> {
        advance(fields, geometry, inputs)
    }
}

/// Sequential reference engine.
pub type ReferenceEngine = GridEngine<SequentialKernel>;
