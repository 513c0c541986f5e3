//! # ParaWave Native
//!
//! Row-parallel engine for the ParaWave solver.
//!
//! Interior rows of the new field are independent of each other, so each
//! step splits them across the rayon thread pool. Small grids run
//! sequentially where the scheduling overhead would dominate.
//!
//! ## Example
//!
//! ```
//! use parawave_core::prelude::*;
//! use parawave_native::NativeEngine;
//!
//! let mut engine = NativeEngine::new();
//! engine.configure(64, 0.6, 343.0)?;
//! engine.step_n(10)?;
//! assert_eq!(engine.backend(), Backend::Native);
//! # Ok::<(), SolverError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod engine;
mod kernel;

pub use engine::{NativeEngine, RowParallelKernel};
pub use kernel::PARALLEL_THRESHOLD;

/// Check whether the native engine can run on this host.
///
/// Queries the rayon global pool. Building the pool panics if worker threads
/// cannot be spawned, so that is caught and reported as unavailable.
pub fn is_native_available() -> bool {
    std::panic::catch_unwind(rayon::current_num_threads)
        .map(|threads| threads > 0)
        .unwrap_or(false)
}

/// Number of worker threads the native engine spreads a step over.
pub fn worker_threads() -> usize {
    rayon::current_num_threads()
}
