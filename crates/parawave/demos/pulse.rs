//! Run a single Morlet pulse and print per-sample metrics.
//!
//! ```bash
//! cargo run -p parawave --example pulse
//! cargo run -p parawave --example pulse -- my_config.toml
//! RUST_LOG=parawave_core=debug cargo run -p parawave --example pulse
//! ```

use parawave::prelude::*;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("parawave=info".parse().expect("valid directive")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::from_file(path)?,
        None => SimulationConfig::new().with_grid_size(200),
    };

    let mut sim = config.build()?;
    tracing::info!(
        backend = %sim.backend(),
        dt = sim.dt()?,
        "Starting pulse run"
    );

    let result = sim.run(600, 50)?;

    println!("{:>6} {:>12} {:>14} {:>14}", "step", "time (ms)", "max |u|", "energy");
    for sample in &result.samples {
        println!(
            "{:>6} {:>12.4} {:>14.6e} {:>14.6e}",
            sample.step_index,
            sample.time * 1e3,
            sample.max_amplitude,
            sample.energy
        );
    }

    let centre = config.grid_size / 2;
    let trace = result.time_series(centre, centre / 2);
    if let Some((time, value)) = trace.last() {
        println!("cell ({}, {}) at {:.4} ms: {:.6e}", centre, centre / 2, time * 1e3, value);
    }

    let meta = &result.metadata;
    println!(
        "{} steps on {} in {:.3} s ({:.0} steps/s)",
        meta.total_steps, meta.backend, meta.elapsed_wall_time, meta.steps_per_second
    );
    Ok(())
}
