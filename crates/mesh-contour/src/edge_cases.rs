//! Edge case tests for contour evolution robustness.
//!
//! Unusual meshes, seeds and fields must produce an error or a sensible
//! result, never a panic or a NaN.

#[cfg(test)]
mod tests {
    use nalgebra::Point3;

    use crate::adjacency::AdjacencyList;
    use crate::force::{CurvatureForceModel, ForceModel};
    use crate::geometry::{SurfaceGeometry, compute_curvature, compute_normals};
    use crate::level_set::{EvolveParams, Layers, SparseFieldLevelSet};
    use crate::path::{PathInitializer, init_path};
    use crate::pipeline::{Segmentation, SegmentationParams};
    use crate::shapes;
    use crate::{ContourError, ContourResult, Handedness, Mesh};

    struct UnitForce;

    impl ForceModel for UnitForce {
        fn energy(&self, _contour: &[u32]) -> f64 {
            0.0
        }

        fn force(&self, layers: &Layers, _phi: &[f64]) -> ContourResult<Vec<f64>> {
            Ok(vec![1.0; layers.zero.len()])
        }
    }

    /// Two 3x3 grids ten units apart along x.
    fn two_patches() -> Mesh {
        let left = shapes::grid(3, 3, 1.0);
        let offset = left.vertex_count() as u32;
        let mut vertices = left.vertices.clone();
        vertices.extend(left.vertices.iter().map(|p| p + nalgebra::Vector3::x() * 10.0));
        let mut faces = left.faces.clone();
        faces.extend(left.faces.iter().map(|f| f.map(|v| v + offset)));
        Mesh::from_parts(vertices, faces)
    }

    // ==================== Degenerate Geometry ====================

    #[test]
    fn test_isolated_vertex_gets_zero_normal_and_curvature() {
        let mut mesh = shapes::grid(4, 4, 1.0);
        mesh.vertices.push(Point3::new(9.0, 9.0, 9.0));
        let adjacency = AdjacencyList::immediate(&mesh).unwrap();

        let normals = compute_normals(&mesh);
        assert_eq!(normals[16].norm(), 0.0);
        let curvature = compute_curvature(&mesh, &normals, &adjacency).unwrap();
        assert_eq!(curvature[16], 0.0);
        assert!(curvature.iter().all(|k| k.is_finite()));
    }

    #[test]
    fn test_collinear_face_stays_finite() {
        let mesh = Mesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 1, 3]],
        );
        let adjacency = AdjacencyList::immediate(&mesh).unwrap();
        let geometry = SurfaceGeometry::compute(&mesh, &adjacency, 3).unwrap();

        // Vertex 2 only touches the collinear face.
        assert_eq!(geometry.normals[2].norm(), 0.0);
        assert!(geometry.curvature.iter().all(|k| k.is_finite()));
        for v in 0..4 {
            assert!(geometry.gradient.at(v).iter().all(|g| g.is_finite()));
        }
    }

    #[test]
    fn test_handedness_override_flips_curvature() {
        let mesh = shapes::icosphere(2, 1.0);
        let params = SegmentationParams::quick();
        let right = Segmentation::new(&mesh, params.clone()).unwrap();
        let left = Segmentation::new(&mesh, params.with_handedness(Handedness::Left)).unwrap();

        assert_eq!(left.smoothed_mesh().handedness, Handedness::Left);
        for (a, b) in right
            .geometry()
            .curvature
            .iter()
            .zip(&left.geometry().curvature)
        {
            assert!((a + b).abs() < 1e-12, "{} vs {}", a, b);
        }
    }

    // ==================== Seeds and Paths ====================

    #[test]
    fn test_seeds_on_disconnected_patches() {
        let mesh = two_patches();
        let adjacency = AdjacencyList::immediate(&mesh).unwrap();
        let result = init_path(&mesh, &adjacency, &[0, 1, 9]);
        assert!(matches!(
            result,
            Err(ContourError::DegenerateTopology { .. })
        ));
    }

    #[test]
    fn test_basins_on_disconnected_patches() {
        let mesh = two_patches();
        let adjacency = AdjacencyList::immediate(&mesh).unwrap();
        let result = PathInitializer::Basins.run(&mesh, &adjacency, &[0, 8, 13]);
        assert!(result.is_err());
    }

    #[test]
    fn test_seed_list_on_tiny_mesh() {
        let mesh = Mesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        );
        let adjacency = AdjacencyList::immediate(&mesh).unwrap();
        // A triangle closes into a contour, but it leaves nothing to segment.
        let contour = init_path(&mesh, &adjacency, &[0, 1, 2]).unwrap();
        assert_eq!(contour, vec![0, 1, 2]);
        assert!(matches!(
            SparseFieldLevelSet::new(&adjacency, &contour),
            Err(ContourError::DegenerateTopology { .. })
        ));
    }

    // ==================== Level Set ====================

    #[test]
    fn test_contour_covering_every_vertex() {
        let mesh = shapes::icosphere(0, 1.0);
        let adjacency = AdjacencyList::immediate(&mesh).unwrap();
        let all: Vec<u32> = (0..12).collect();
        assert!(SparseFieldLevelSet::new(&adjacency, &all).is_err());
    }

    #[test]
    fn test_contour_with_out_of_range_vertex() {
        let mesh = shapes::icosphere(1, 1.0);
        let adjacency = AdjacencyList::immediate(&mesh).unwrap();
        assert!(matches!(
            SparseFieldLevelSet::new(&adjacency, &[0, 1, 500]),
            Err(ContourError::DegenerateTopology {
                vertex: Some(500),
                ..
            })
        ));
    }

    #[test]
    fn test_zero_iterations_changes_nothing() {
        let mesh = shapes::grid(8, 8, 1.0);
        let adjacency = AdjacencyList::immediate(&mesh).unwrap();
        let contour = [18, 19, 20, 21, 29, 37, 45, 44, 43, 42, 34, 26];
        let mut level_set = SparseFieldLevelSet::new(&adjacency, &contour).unwrap();
        let before = level_set.phi().to_vec();

        let summary = level_set
            .evolve(0, &UnitForce, &EvolveParams::default())
            .unwrap();
        assert_eq!(summary.iterations, 0);
        assert_eq!(summary.full_relayers, 0);
        assert!(!summary.stopped_early);
        assert_eq!(level_set.phi(), before.as_slice());
    }

    #[test]
    fn test_field_without_sign_change_stops_immediately() {
        let mesh = shapes::grid(5, 5, 1.0);
        let adjacency = AdjacencyList::immediate(&mesh).unwrap();
        let mut level_set = SparseFieldLevelSet::from_field(&adjacency, vec![3.0; 25]).unwrap();
        assert!(level_set.zero_layer().is_empty());

        let summary = level_set
            .evolve(10, &UnitForce, &EvolveParams::default())
            .unwrap();
        assert_eq!(summary.iterations, 0);
        assert!(summary.stopped_early);
        assert_eq!(summary.contour_len, 0);
    }

    #[test]
    fn test_non_finite_field_is_rejected() {
        let mesh = shapes::grid(3, 3, 1.0);
        let adjacency = AdjacencyList::immediate(&mesh).unwrap();
        let mut phi = vec![1.0; 9];
        phi[4] = f64::NAN;
        assert!(matches!(
            SparseFieldLevelSet::from_field(&adjacency, phi),
            Err(ContourError::InvalidParameter { name: "phi", .. })
        ));
        assert!(matches!(
            SparseFieldLevelSet::from_field(&adjacency, vec![1.0; 4]),
            Err(ContourError::FieldMismatch { .. })
        ));
    }

    #[test]
    fn test_rebuild_every_iteration() {
        let mesh = shapes::grid(12, 12, 1.0);
        let adjacency = AdjacencyList::immediate(&mesh).unwrap();
        let contour = [
            52, 53, 54, 55, 56, 68, 80, 92, 91, 90, 89, 88, 76, 64,
        ];
        let mut level_set = SparseFieldLevelSet::new(&adjacency, &contour).unwrap();
        let params = EvolveParams {
            recompute_interval: 1,
            ..Default::default()
        };
        let summary = level_set.evolve(6, &UnitForce, &params).unwrap();
        assert_eq!(summary.iterations, 6);
        assert_eq!(summary.full_relayers, 6);
        assert!(level_set.layers().is_partition());
    }

    // ==================== Force Model ====================

    #[test]
    fn test_force_on_flat_mesh_is_zero() {
        let mesh = shapes::grid(6, 6, 1.0);
        let adjacency = AdjacencyList::immediate(&mesh).unwrap();
        let geometry = SurfaceGeometry::compute(&mesh, &adjacency, 2).unwrap();
        let model = CurvatureForceModel::new(&mesh, &adjacency, &geometry).unwrap();

        let contour = [14, 15, 16, 22, 28, 27, 26, 20];
        let level_set = SparseFieldLevelSet::new(&adjacency, &contour).unwrap();
        let force = model.force(level_set.layers(), level_set.phi()).unwrap();
        assert_eq!(force.len(), level_set.zero_layer().len());
        assert!(force.iter().all(|f| f.abs() < 1e-9));
    }

    #[test]
    fn test_force_model_rejects_foreign_geometry() {
        let small = shapes::grid(3, 3, 1.0);
        let large = shapes::grid(4, 4, 1.0);
        let adjacency = AdjacencyList::immediate(&large).unwrap();
        let small_adjacency = AdjacencyList::immediate(&small).unwrap();
        let geometry = SurfaceGeometry::compute(&small, &small_adjacency, 0).unwrap();
        assert!(matches!(
            CurvatureForceModel::new(&large, &adjacency, &geometry),
            Err(ContourError::FieldMismatch { .. })
        ));
    }
}
