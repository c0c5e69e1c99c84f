//! Accuracy tests for the local differential geometry estimates.
//!
//! Analytic surfaces with known curvature are sampled on icospheres and
//! grids and compared against the per-vertex estimates.

use mesh_contour::{
    AdjacencyList, Handedness, Mesh, SurfaceGeometry, compute_curvature,
    compute_curvature_gradient, compute_normals, shapes, smooth_curvature,
};
use nalgebra::Point3;

/// 9x9 grid centered on the origin, lifted by `height(x, y)`.
fn height_field(height: impl Fn(f64, f64) -> f64) -> Mesh {
    let mut mesh = shapes::grid(9, 9, 1.0);
    for p in &mut mesh.vertices {
        let (x, y) = (p.x - 4.0, p.y - 4.0);
        *p = Point3::new(x, y, height(x, y));
    }
    mesh
}

const CENTER: u32 = 40;

fn curvature_at_depth(mesh: &Mesh, depth: usize) -> Vec<f64> {
    let adjacency = AdjacencyList::build(mesh, depth).unwrap();
    let normals = compute_normals(mesh);
    compute_curvature(mesh, &normals, &adjacency).unwrap()
}

#[test]
fn test_sphere_curvature_matches_inverse_radius() {
    for radius in [0.5, 1.0, 2.0, 4.0] {
        let mesh = shapes::icosphere(3, radius);
        for depth in [1, 2] {
            let expected = 1.0 / radius;
            for (v, h) in curvature_at_depth(&mesh, depth).iter().enumerate() {
                let error = (h - expected).abs() / expected;
                assert!(
                    error < 0.05,
                    "radius {} depth {} vertex {}: {} vs {}",
                    radius,
                    depth,
                    v,
                    h,
                    expected
                );
            }
        }
    }
}

#[test]
fn test_left_handed_sphere_is_negative() {
    let mesh = shapes::icosphere(2, 1.0).with_handedness(Handedness::Left);
    assert!(curvature_at_depth(&mesh, 1).iter().all(|&h| h < 0.0));
}

#[test]
fn test_dome_and_bowl() {
    // z = -k r^2 has curvature 2k at the apex seen from above.
    let dome = height_field(|x, y| -0.05 * (x * x + y * y));
    let bowl = height_field(|x, y| 0.05 * (x * x + y * y));

    let h_dome = curvature_at_depth(&dome, 1)[CENTER as usize];
    let h_bowl = curvature_at_depth(&bowl, 1)[CENTER as usize];
    assert!((h_dome - 0.1).abs() < 0.005, "dome {}", h_dome);
    assert!((h_bowl + 0.1).abs() < 0.005, "bowl {}", h_bowl);

    let h_dome_wide = curvature_at_depth(&dome, 2)[CENTER as usize];
    assert!((h_dome_wide - 0.1).abs() < 0.005, "dome depth 2 {}", h_dome_wide);
}

#[test]
fn test_saddle_has_zero_mean_curvature() {
    let saddle = height_field(|x, y| 0.05 * (x * x - y * y));
    let h = curvature_at_depth(&saddle, 1)[CENTER as usize];
    assert!(h.abs() < 1e-6, "saddle {}", h);
}

#[test]
fn test_gradient_of_linear_field() {
    let mesh = shapes::grid(9, 9, 1.0);
    let adjacency = AdjacencyList::immediate(&mesh).unwrap();
    let normals = compute_normals(&mesh);
    let field: Vec<f64> = mesh.vertices.iter().map(|p| 0.3 * p.x - 0.2 * p.y).collect();

    let gradient = compute_curvature_gradient(&mesh, &normals, &adjacency, &field).unwrap();
    let g = gradient.at(CENTER);
    assert!((g.x - 0.3).abs() < 0.005, "de1 {}", g.x);
    assert!((g.y + 0.2).abs() < 0.005, "de2 {}", g.y);
}

#[test]
fn test_smoothing_keeps_sphere_curvature() {
    let mesh = shapes::icosphere(3, 1.0);
    let adjacency = AdjacencyList::immediate(&mesh).unwrap();
    let raw = curvature_at_depth(&mesh, 1);
    let smoothed = smooth_curvature(&raw, &adjacency, 100).unwrap();

    let spread = |k: &[f64]| {
        let lo = k.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = k.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        hi - lo
    };
    assert!(spread(&smoothed) < spread(&raw));
    assert!(smoothed.iter().all(|h| (h - 1.0).abs() < 0.02));
}

#[test]
fn test_surface_geometry_bundle() {
    let mesh = shapes::icosphere(2, 1.0);
    let adjacency = AdjacencyList::immediate(&mesh).unwrap();
    let geometry = SurfaceGeometry::compute(&mesh, &adjacency, 10).unwrap();

    assert_eq!(geometry.vertex_count(), mesh.vertex_count());
    assert_eq!(geometry.gradient.len(), mesh.vertex_count());
    assert!(geometry.check(&mesh).is_ok());
    // Normals of a sphere point away from its center.
    for (p, n) in mesh.vertices.iter().zip(&geometry.normals) {
        assert!(p.coords.normalize().dot(n) > 0.99);
    }
    assert!(geometry.check(&shapes::icosphere(1, 1.0)).is_err());
}
