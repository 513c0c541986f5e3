//! Fixed-length runs with periodic field sampling.

use parawave_core::engine::{Backend, SolverEngine};
use parawave_core::error::{Result, SolverError};
use parawave_core::grid::FieldSnapshot;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// One captured time level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// 0-based index of the step after which the sample was taken.
    pub step_index: usize,
    /// Simulated time after that step.
    pub time: f64,
    /// Owned copy of the field.
    pub field: FieldSnapshot,
    /// Largest absolute field value.
    pub max_amplitude: f64,
    /// Sum of squared field values.
    pub energy: f64,
}

/// Description of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Cells per side.
    pub grid_size: usize,
    /// Steps performed.
    pub total_steps: usize,
    /// Steps between samples.
    pub record_interval: usize,
    /// Wall-clock duration of the stepping loop, in seconds.
    pub elapsed_wall_time: f64,
    /// `total_steps / elapsed_wall_time`, or 0 when no time was measured.
    pub steps_per_second: f64,
    /// Time step.
    pub dt: f64,
    /// Simulated time at the end of the run.
    pub final_time: f64,
    /// Source frequency at the end of the run.
    pub frequency: f64,
    /// Source amplitude at the end of the run.
    pub amplitude: f64,
    /// Backend that produced the samples.
    pub backend: Backend,
}

/// Samples and metadata of one run, in capture order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Captured samples, ordered by time.
    pub samples: Vec<Sample>,
    /// Run description.
    pub metadata: RunMetadata,
}

impl RunResult {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Field of the last sample.
    pub fn final_field(&self) -> Option<&FieldSnapshot> {
        self.samples.last().map(|s| &s.field)
    }

    /// Sample times.
    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.time).collect()
    }

    /// Peak amplitude per sample.
    pub fn max_amplitudes(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.max_amplitude).collect()
    }

    /// Energy per sample.
    pub fn energies(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.energy).collect()
    }

    /// `(time, value)` of cell `(i, j)` across all samples.
    ///
    /// Empty if the cell is outside the grid.
    pub fn time_series(&self, i: usize, j: usize) -> Vec<(f64, f64)> {
        self.samples
            .iter()
            .filter_map(|s| s.field.get(i, j).map(|v| (s.time, v)))
            .collect()
    }
}

/// Drives an engine for a fixed number of steps and collects samples.
pub struct ResultsRecorder<'a> {
    engine: &'a mut dyn SolverEngine,
}

impl<'a> ResultsRecorder<'a> {
    /// Record from `engine`, which must already be configured.
    pub fn new(engine: &'a mut dyn SolverEngine) -> Self {
        Self { engine }
    }

    /// Step exactly `total_steps` times, capturing a sample after every step
    /// index `k` with `k % record_interval == 0`.
    ///
    /// Any engine error aborts the run and no partial result is returned.
    pub fn run(&mut self, total_steps: usize, record_interval: usize) -> Result<RunResult> {
        if record_interval == 0 {
            return Err(SolverError::invalid_parameter(
                "record interval must be at least 1",
            ));
        }
        let dt = self.engine.dt()?;
        let grid_size = self.engine.geometry()?.size();

        let mut samples = Vec::with_capacity(total_steps.div_ceil(record_interval));
        let start = Instant::now();

        for step_index in 0..total_steps {
            self.engine.step().map_err(|err| {
                if !err.is_caller_error() {
                    tracing::error!(step_index, error = %err, "run aborted");
                }
                err
            })?;

            if step_index % record_interval == 0 {
                let time = self.engine.clock().current_time;
                let view = self.engine.field()?;
                let sample = Sample {
                    step_index,
                    time,
                    max_amplitude: view.max_amplitude(),
                    energy: view.energy(),
                    field: view.to_snapshot(),
                };
                tracing::trace!(
                    step_index,
                    time,
                    max_amplitude = sample.max_amplitude,
                    energy = sample.energy,
                    "captured sample"
                );
                samples.push(sample);
            }
        }

        let elapsed_wall_time = start.elapsed().as_secs_f64();
        let steps_per_second = if elapsed_wall_time > 0.0 {
            total_steps as f64 / elapsed_wall_time
        } else {
            0.0
        };
        let params = self.engine.wave_parameters();
        let metadata = RunMetadata {
            grid_size,
            total_steps,
            record_interval,
            elapsed_wall_time,
            steps_per_second,
            dt,
            final_time: self.engine.clock().current_time,
            frequency: params.frequency,
            amplitude: params.amplitude,
            backend: self.engine.backend(),
        };

        tracing::info!(
            backend = %metadata.backend,
            grid_size,
            total_steps,
            samples = samples.len(),
            elapsed_wall_time,
            steps_per_second,
            "run complete"
        );

        Ok(RunResult { samples, metadata })
    }
}
