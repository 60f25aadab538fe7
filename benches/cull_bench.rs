//! Benchmarks for the box test and the CPU kernel.
#![allow(missing_docs, unused_results)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cullpass::camera::{Camera, Frustum};
use cullpass::cull::{CpuCuller, CullParams, Culler, DEFAULT_BOUNDING_EXTENT};
use cullpass::options::CameraOptions;
use cullpass::scene::grid_layout;
use glam::Vec3;

fn aabb_test_benchmark(c: &mut Criterion) {
    let frustum = Camera::from_options(&CameraOptions::default()).frustum();
    c.bench_function("is_aabb_in_frustum", |b| {
        b.iter(|| {
            black_box(frustum.is_aabb_in_frustum(
                black_box(Vec3::new(1.0, 2.0, 3.0)),
                black_box(DEFAULT_BOUNDING_EXTENT),
            ))
        })
    });
}

fn plane_extraction_benchmark(c: &mut Criterion) {
    let vp = Camera::from_options(&CameraOptions::default()).build_matrix();
    c.bench_function("frustum_from_view_projection", |b| {
        b.iter(|| black_box(Frustum::from_view_projection(black_box(vp))))
    });
}

fn cpu_cull_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_cull");
    let frustum = Camera::from_options(&CameraOptions::default()).frustum();

    for dim in [8_u32, 16, 32, 48] {
        let records = grid_layout(dim, 1.0);
        let params = CullParams::explicit(records.len() as u32);
        let mut culler = CpuCuller::new(records.len());

        group.bench_function(format!("{}_instances", records.len()), |b| {
            b.iter(|| {
                black_box(culler.cull(&frustum, &records, &params).unwrap())
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    aabb_test_benchmark,
    plane_extraction_benchmark,
    cpu_cull_benchmark
);
criterion_main!(benches);
