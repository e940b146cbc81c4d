use std::hint::black_box;
use std::sync::Arc;
use std::time::Instant;

use glam::Vec3;
use tileview_assets::{ModelLibrary, TextureSet};
use tileview_common::GridPos;
use tileview_render::RecordingBackend;
use tileview_stream::{CullingConfig, ModelId, ModelInstancer, Placement};

fn make_instancer(count: usize, spacing: f32, config: CullingConfig) -> ModelInstancer {
    let library = ModelLibrary::builtin().expect("builtin models");
    let palm = Arc::clone(library.get("palm").expect("palm model"));
    let side = (count as f32).sqrt().ceil() as usize;
    let mut instancer = ModelInstancer::new(config);
    for i in 0..count {
        let pos = GridPos::new((i % side) as i32, (i / side) as i32);
        instancer.register(Placement {
            id: ModelId::at(pos),
            model: Arc::clone(&palm),
            origin: Vec3::new(pos.x as f32 * spacing, pos.y as f32 * spacing, 0.0),
            voxel_size: spacing / 10.0,
        });
    }
    instancer
}

fn bench_steady_state(count: usize, iterations: usize) {
    let textures = TextureSet::standard();
    let mut backend = RecordingBackend::new();
    let mut instancer = make_instancer(count, 30.0, CullingConfig::default());
    let eye = Vec3::new(0.0, 0.0, 1000.0);
    instancer.reconcile(eye, &textures, &mut backend);

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = black_box(instancer.reconcile(black_box(eye), &textures, &mut backend));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  steady reconcile ({count} placements, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_sweep(count: usize, iterations: usize) {
    let textures = TextureSet::standard();
    let mut backend = RecordingBackend::new();
    let config = CullingConfig {
        threshold: 1200.0,
        realize_budget: 64,
    };
    let mut instancer = make_instancer(count, 30.0, config);

    let start = Instant::now();
    for i in 0..iterations {
        // Eye sweeps back and forth across the map
        let eye = Vec3::new((i % 20) as f32 * 150.0, 1500.0, 1000.0);
        let _ = black_box(instancer.reconcile(black_box(eye), &textures, &mut backend));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  sweeping reconcile ({count} placements, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn main() {
    println!("=== Model Reconcile Benchmarks ===\n");

    println!("Steady state (nothing to do):");
    bench_steady_state(100, 10000);
    bench_steady_state(1000, 1000);

    println!("\nSweeping eye (budgeted realize):");
    bench_sweep(100, 1000);
    bench_sweep(1000, 100);

    println!("\n=== Done ===");
}
