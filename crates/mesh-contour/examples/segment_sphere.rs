//! Example: segmenting a spherical cap
//!
//! Places four seeds on a ring near the top of an icosphere, joins them into
//! a closed contour and lets the contour expand for a few dozen steps.
//!
//! Run with: `cargo run --example segment_sphere`

use mesh_contour::{
    ContourResult, Direction, PathInitializer, Segmentation, SegmentationParams, shapes,
    snap_to_vertices,
};
use nalgebra::Point3;

fn main() -> ContourResult<()> {
    let mesh = shapes::icosphere(3, 1.0);

    // Seed points about 0.55 rad below the north pole, one per quadrant.
    let (s, c) = 0.55_f64.sin_cos();
    let points = [
        Point3::new(s, 0.0, c),
        Point3::new(0.0, s, c),
        Point3::new(-s, 0.0, c),
        Point3::new(0.0, -s, c),
    ];
    let seeds = snap_to_vertices(&mesh, &points)?;
    println!("Seeds: {:?}", seeds);

    for initializer in [PathInitializer::Greedy, PathInitializer::Basins] {
        let params = SegmentationParams::default()
            .with_iterations(50)
            .with_mesh_smoothing(0, 0.1)
            .with_direction(Direction::Expand)
            .with_initializer(initializer);
        let segmentation = Segmentation::new(&mesh, params)?;

        match segmentation.run(&seeds) {
            Ok(result) => {
                println!("{:?} initializer:", initializer);
                println!("  initial contour: {} vertices", result.initial_contour.len());
                println!("  final contour:   {} vertices", result.contour.len());
                println!(
                    "  regions:         {} inside, {} outside",
                    result.inside_count(),
                    result.outside_count()
                );
                println!("  energy:          {:.4}", result.summary.energy);
            }
            Err(e) => println!("{:?} initializer failed: {} ({})", initializer, e, e.code()),
        }
    }

    Ok(())
}
