use criterion::{Criterion, black_box, criterion_group, criterion_main};
use gridcover_datatypes::operations::AffineTransform;
use gridcover_datatypes::primitives::Envelope;
use gridcover_datatypes::raster::{GridExtent, GridGeometry, PixelAnchor};
use gridcover_datatypes::spatial_reference::SpatialReferenceOption;
use std::sync::Arc;

fn envelope_derivation(c: &mut Criterion) {
    let extent = GridExtent::from_inclusive_bounds(vec![0, 0], vec![599, 399]).unwrap();
    let transform =
        AffineTransform::from_scale_and_translation(&[0.2, -0.2], &[-59.9, 39.9]).unwrap();

    c.bench_function("derive envelope from extent and transform", |b| {
        b.iter(|| {
            let geometry = GridGeometry::new(
                extent.clone(),
                PixelAnchor::CellCenter,
                Arc::new(transform.clone()),
                None,
            )
            .unwrap();

            black_box(geometry.envelope().unwrap())
        })
    });
}

fn transform_synthesis(c: &mut Criterion) {
    let extent = GridExtent::from_inclusive_bounds(vec![0, 0], vec![599, 399]).unwrap();
    let envelope = Envelope::new(
        vec![-60.0, -40.0],
        vec![60.0, 40.0],
        SpatialReferenceOption::Unreferenced,
    )
    .unwrap();

    c.bench_function("synthesize transform from extent and envelope", |b| {
        b.iter(|| {
            black_box(
                GridGeometry::from_extent_and_envelope(extent.clone(), envelope.clone()).unwrap(),
            )
        })
    });
}

fn grid_world_round_trip(c: &mut Criterion) {
    let transform =
        AffineTransform::from_scale_and_translation(&[0.2, -0.2], &[-59.9, 39.9]).unwrap();
    let inverse = transform.inverted().unwrap();

    c.bench_function("grid to world and back", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for cell in 0..512 {
                let world = transform.apply_affine(&[cell as f64, cell as f64]);
                let grid = inverse.apply_affine(&world);
                acc += grid[0] + grid[1];
            }
            black_box(acc)
        })
    });
}

criterion_group!(
    benches,
    envelope_derivation,
    transform_synthesis,
    grid_world_round_trip
);
criterion_main!(benches);
