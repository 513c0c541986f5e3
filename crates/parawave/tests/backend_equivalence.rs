//! Integration tests comparing the native and reference engines.

use parawave::prelude::*;

fn reference_and(backend: Backend) -> (Simulation, Simulation) {
    let mut reference = Simulation::with_backend(Backend::Reference).unwrap();
    let mut other = Simulation::with_backend(backend).unwrap();
    for sim in [&mut reference, &mut other] {
        sim.configure(50, 0.6, 343.0).unwrap();
        sim.set_frequency(1000.0).unwrap();
        sim.set_amplitude(1.0).unwrap();
    }
    (reference, other)
}

fn metadata_keys(result: &RunResult) -> Vec<String> {
    let value = serde_json::to_value(&result.metadata).unwrap();
    let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
    keys.sort();
    keys
}

/// Every backend agrees on dt, sample count and metadata layout.
#[test]
fn test_backends_report_identically() {
    for backend in availability::available_backends() {
        let (mut reference, mut other) = reference_and(backend);
        assert_eq!(reference.dt(), other.dt());

        let a = reference.run(100, 5).unwrap();
        let b = other.run(100, 5).unwrap();
        assert_eq!(a.samples.len(), b.samples.len());
        assert_eq!(metadata_keys(&a), metadata_keys(&b));
        assert_eq!(a.metadata.backend, Backend::Reference);
        assert_eq!(b.metadata.backend, backend);
        assert_eq!(a.metadata.dt, b.metadata.dt);
        assert_eq!(a.times(), b.times());
    }
}

/// Metadata carries every documented key.
#[test]
fn test_metadata_keys() {
    let (mut reference, _) = reference_and(Backend::Reference);
    let result = reference.run(10, 2).unwrap();
    let expected = [
        "amplitude",
        "backend",
        "dt",
        "elapsed_wall_time",
        "final_time",
        "frequency",
        "grid_size",
        "record_interval",
        "steps_per_second",
        "total_steps",
    ];
    assert_eq!(metadata_keys(&result), expected);

    let value = serde_json::to_value(&result.metadata).unwrap();
    assert_eq!(value["backend"], "reference");
    assert_eq!(value["grid_size"], 50);
    assert_eq!(value["total_steps"], 10);
    assert_eq!(value["record_interval"], 2);
}

/// The native engine reproduces the reference field.
#[cfg(feature = "native")]
#[test]
fn test_native_field_matches_reference() {
    let (mut reference, mut native) = reference_and(Backend::Native);
    reference.step_n(150).unwrap();
    native.step_n(150).unwrap();

    let a = reference.field().unwrap();
    let b = native.field().unwrap();
    let scale = a.max_amplitude().max(1e-300);
    for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
        assert!((x - y).abs() <= 1e-12 * scale, "{} vs {}", x, y);
    }
}

/// Both engines agree on a grid large enough for the parallel path.
#[cfg(feature = "native")]
#[test]
fn test_native_parallel_path_matches_reference() {
    let size = parawave_native::PARALLEL_THRESHOLD * 2;
    let mut reference = Simulation::with_backend(Backend::Reference).unwrap();
    let mut native = Simulation::with_backend(Backend::Native).unwrap();
    reference.configure(size, 0.6, 343.0).unwrap();
    native.configure(size, 0.6, 343.0).unwrap();

    let a = reference.run(40, 10).unwrap();
    let b = native.run(40, 10).unwrap();
    assert_eq!(a.energies(), b.energies());
    assert_eq!(a.final_field(), b.final_field());
}

/// Both engines agree with a parabolic dish, a rigid frame and damping.
#[cfg(feature = "native")]
#[test]
fn test_native_matches_reference_with_reflector() {
    let config = SimulationConfig::new()
        .with_grid_size(80)
        .with_damping(0.001)
        .with_rigid_frame(5)
        .with_reflector(Reflector {
            shell: ParabolicShell {
                vertex: (0.0, -0.1),
                focal_length: 0.1,
                aperture: 0.4,
                thickness: 0.04,
                opens_up: true,
            },
            material: Material::Medium { wave_speed: 1500.0 },
        });
    let mut reference = config.clone().with_backend(Backend::Reference).build().unwrap();
    let mut native = config.with_backend(Backend::Native).build().unwrap();
    assert_eq!(reference.source_position(), native.source_position());
    assert_eq!(reference.dt(), native.dt());

    let a = reference.run(150, 30).unwrap();
    let b = native.run(150, 30).unwrap();
    assert_eq!(a.samples, b.samples);
    assert!(a.max_amplitudes().iter().any(|&m| m > 0.0));
}

/// Run results serialize for downstream consumers.
#[test]
fn test_run_result_serializes() {
    let (mut reference, _) = reference_and(Backend::Reference);
    let result = reference.run(6, 3).unwrap();
    let json = serde_json::to_string(&result).unwrap();
    let back: RunResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back.samples.len(), 2);
    assert_eq!(back.metadata.backend, Backend::Reference);
    assert_eq!(back.samples[1].step_index, 3);
}
