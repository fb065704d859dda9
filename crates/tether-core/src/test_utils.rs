//! Fixtures shared by unit tests.

use crate::core::models::ids::ParticleIndex;
use crate::core::models::model::Model;
use crate::core::models::xyz::Xyz;
use nalgebra::Point3;
use std::sync::{Arc, Once};

static TRACING: Once = Once::new();

/// Routes `tracing` output through the test harness; set `RUST_LOG` to see it.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn model_with_particles_at(positions: &[Point3<f64>]) -> (Arc<Model>, Vec<ParticleIndex>) {
    init_tracing();
    let model = Arc::new(Model::new("TestModel%1%"));
    let particles = positions
        .iter()
        .enumerate()
        .map(|(i, position)| {
            let particle = model.add_particle(&format!("p{}", i)).unwrap();
            Xyz::setup_particle(&model, particle, *position).unwrap();
            particle
        })
        .collect();
    (model, particles)
}

pub fn model_with_particle_at(position: Point3<f64>) -> (Arc<Model>, ParticleIndex) {
    let (model, particles) = model_with_particles_at(&[position]);
    (model, particles[0])
}
