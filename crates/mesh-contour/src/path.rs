//! Initial contours from seed vertices.
//!
//! Seeds are treated as an ordered cycle and consecutive seeds are joined by
//! a greedy walk over the mesh graph: from the current vertex, step to the
//! unvisited neighbor closest (in straight-line distance) to the next seed.
//! The walk approximates a geodesic and is not a true shortest path.
//!
//! The basin variant first runs a multi-source Dijkstra from all seeds. Each
//! vertex records its distance to the nearest seed and which seed that is.
//! Where the basins of two consecutive seeds meet, a waypoint is inserted
//! before the greedy walk.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use hashbrown::HashSet;
use nalgebra::Point3;
use tracing::{debug, warn};

use crate::adjacency::AdjacencyList;
use crate::error::{ContourError, ContourResult, ensure_len};
use crate::types::Mesh;

/// Minimum number of seeds that can enclose a region.
pub const MIN_SEEDS: usize = 3;

/// Strategy for turning seeds into a closed contour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "config",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum PathInitializer {
    /// Greedy walk between consecutive seeds.
    #[default]
    Greedy,
    /// Greedy walk through basin-boundary waypoints.
    Basins,
}

impl PathInitializer {
    /// Build the closed contour for `seeds`.
    pub fn run(
        self,
        mesh: &Mesh,
        adjacency: &AdjacencyList,
        seeds: &[u32],
    ) -> ContourResult<Vec<u32>> {
        match self {
            PathInitializer::Greedy => init_path(mesh, adjacency, seeds),
            PathInitializer::Basins => init_closed_path(mesh, adjacency, seeds),
        }
    }
}

/// Check seed count, range and uniqueness.
pub fn validate_seeds(vertex_count: usize, seeds: &[u32]) -> ContourResult<()> {
    if seeds.len() < MIN_SEEDS {
        return Err(ContourError::insufficient_seeds(seeds.len()));
    }
    let mut seen = HashSet::with_capacity(seeds.len());
    for (position, &vertex) in seeds.iter().enumerate() {
        if vertex as usize >= vertex_count {
            return Err(ContourError::SeedOutOfRange {
                position,
                vertex,
                vertex_count,
            });
        }
        if !seen.insert(vertex) {
            return Err(ContourError::DuplicateSeed { position, vertex });
        }
    }
    Ok(())
}

/// Join the seeds into a closed vertex cycle by greedy walks.
///
/// The result starts at `seeds[0]`, visits every seed in order, and does not
/// repeat the first vertex at the end; the last vertex is adjacent to the
/// first. Consecutive vertices are always adjacent.
///
/// # Errors
///
/// - [`ContourError::InsufficientSeeds`] for fewer than three seeds
/// - [`ContourError::SeedOutOfRange`] / [`ContourError::DuplicateSeed`]
/// - [`ContourError::DegenerateTopology`] when a walk runs into a vertex the
///   path already uses or has no unvisited neighbor left
pub fn init_path(mesh: &Mesh, adjacency: &AdjacencyList, seeds: &[u32]) -> ContourResult<Vec<u32>> {
    validate_seeds(mesh.vertex_count(), seeds)?;
    ensure_len("adjacency", mesh.vertex_count(), adjacency.vertex_count())?;

    let first = seeds[0];
    let mut visited = vec![false; mesh.vertex_count()];
    visited[first as usize] = true;
    let mut path = vec![first];

    for (i, &start) in seeds.iter().enumerate() {
        let closing = i + 1 == seeds.len();
        let target = seeds[(i + 1) % seeds.len()];
        let target_pos = mesh.position(target);
        let mut current = start;

        while current != target {
            let next = if adjacency.contains(current, target) {
                target
            } else {
                closest_unvisited(mesh, adjacency, &visited, current, &target_pos).ok_or_else(|| {
                    warn!(vertex = current, target, "Greedy walk reached a dead end");
                    ContourError::degenerate(
                        format!(
                            "walk from seed {} toward seed {} has no unvisited neighbor at vertex {}",
                            start, target, current
                        ),
                        Some(current),
                    )
                })?
            };

            if closing && next == first {
                break;
            }
            if visited[next as usize] {
                warn!(vertex = next, "Greedy walk revisited a vertex");
                return Err(ContourError::degenerate(
                    format!(
                        "walk from seed {} toward seed {} crosses the path at vertex {}",
                        start, target, next
                    ),
                    Some(next),
                ));
            }
            visited[next as usize] = true;
            path.push(next);
            current = next;
        }
    }

    debug!(seeds = seeds.len(), length = path.len(), "Built greedy seed path");
    Ok(path)
}

/// Unvisited neighbor of `v` nearest to `target`, ties to the lower index.
fn closest_unvisited(
    mesh: &Mesh,
    adjacency: &AdjacencyList,
    visited: &[bool],
    v: u32,
    target: &Point3<f64>,
) -> Option<u32> {
    adjacency
        .neighbors(v)
        .iter()
        .filter(|&&u| !visited[u as usize])
        .map(|&u| (nalgebra::distance(&mesh.position(u), target), u))
        .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
        .map(|(_, u)| u)
}

/// Nearest-seed basins over the mesh graph.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedBasins {
    /// Graph distance (sum of edge lengths) to the nearest seed. Infinite for
    /// vertices no seed can reach.
    pub distance: Vec<f64>,
    /// Position in the seed list of the nearest seed.
    pub nearest: Vec<Option<usize>>,
}

impl SeedBasins {
    /// Whether any edge joins basin `a` to basin `b`.
    pub fn touches(&self, adjacency: &AdjacencyList, a: usize, b: usize) -> bool {
        self.boundary_edges(adjacency, a, b).next().is_some()
    }

    /// Edges `(v, u)` with `v` in basin `a` and `u` in basin `b`.
    pub fn boundary_edges<'s>(
        &'s self,
        adjacency: &'s AdjacencyList,
        a: usize,
        b: usize,
    ) -> impl Iterator<Item = (u32, u32)> + 's {
        adjacency.iter().flat_map(move |(v, neighbors)| {
            neighbors
                .iter()
                .filter(move |&&u| {
                    self.nearest[v as usize] == Some(a) && self.nearest[u as usize] == Some(b)
                })
                .map(move |&u| (v, u))
        })
    }
}

/// Frontier entry for the multi-source expansion.
#[derive(Debug, Clone, Copy)]
struct FrontEntry {
    distance: f64,
    vertex: u32,
    seed: usize,
}

impl PartialEq for FrontEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontEntry {}

impl PartialOrd for FrontEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior (closer = higher priority),
        // ties popped by vertex then seed
        other
            .distance
            .total_cmp(&self.distance)
            .then(other.vertex.cmp(&self.vertex))
            .then(other.seed.cmp(&self.seed))
    }
}

/// Distance to, and identity of, the nearest seed for every vertex.
pub fn nearest_seed_basins(
    mesh: &Mesh,
    adjacency: &AdjacencyList,
    seeds: &[u32],
) -> ContourResult<SeedBasins> {
    ensure_len("adjacency", mesh.vertex_count(), adjacency.vertex_count())?;
    let n = mesh.vertex_count();
    let mut distance = vec![f64::INFINITY; n];
    let mut nearest = vec![None; n];
    let mut heap = BinaryHeap::with_capacity(seeds.len());

    for (seed, &v) in seeds.iter().enumerate() {
        if v as usize >= n {
            return Err(ContourError::SeedOutOfRange {
                position: seed,
                vertex: v,
                vertex_count: n,
            });
        }
        distance[v as usize] = 0.0;
        nearest[v as usize] = Some(seed);
        heap.push(FrontEntry {
            distance: 0.0,
            vertex: v,
            seed,
        });
    }

    while let Some(FrontEntry {
        distance: d,
        vertex: v,
        seed,
    }) = heap.pop()
    {
        if d > distance[v as usize] || nearest[v as usize] != Some(seed) {
            continue;
        }
        let p = mesh.position(v);
        for &u in adjacency.neighbors(v) {
            let candidate = d + nalgebra::distance(&p, &mesh.position(u));
            if candidate < distance[u as usize] {
                distance[u as usize] = candidate;
                nearest[u as usize] = Some(seed);
                heap.push(FrontEntry {
                    distance: candidate,
                    vertex: u,
                    seed,
                });
            }
        }
    }

    Ok(SeedBasins { distance, nearest })
}

/// Closed contour through basin-boundary waypoints.
///
/// For each consecutive seed pair whose basins touch, the boundary edge with
/// the shortest seed-to-seed route through it is found and its endpoint
/// farther from its own seed is inserted between the two seeds. The greedy
/// walk of [`init_path`] then joins the augmented list.
pub fn init_closed_path(
    mesh: &Mesh,
    adjacency: &AdjacencyList,
    seeds: &[u32],
) -> ContourResult<Vec<u32>> {
    validate_seeds(mesh.vertex_count(), seeds)?;
    let basins = nearest_seed_basins(mesh, adjacency, seeds)?;

    let mut used: HashSet<u32> = seeds.iter().copied().collect();
    let mut waypoints = Vec::with_capacity(seeds.len() * 2);
    for (i, &seed) in seeds.iter().enumerate() {
        waypoints.push(seed);
        let j = (i + 1) % seeds.len();
        let best = basins
            .boundary_edges(adjacency, i, j)
            .map(|(v, u)| {
                let route = basins.distance[v as usize]
                    + nalgebra::distance(&mesh.position(v), &mesh.position(u))
                    + basins.distance[u as usize];
                (route, v, u)
            })
            .min_by(|a, b| a.0.total_cmp(&b.0).then((a.1, a.2).cmp(&(b.1, b.2))));

        if let Some((_, v, u)) = best {
            let waypoint = if basins.distance[v as usize] >= basins.distance[u as usize] {
                v
            } else {
                u
            };
            if used.insert(waypoint) {
                waypoints.push(waypoint);
            }
        }
    }

    debug!(
        seeds = seeds.len(),
        waypoints = waypoints.len() - seeds.len(),
        "Inserted basin waypoints"
    );
    init_path(mesh, adjacency, &waypoints)
}

/// Nearest mesh vertex for each point.
pub fn snap_to_vertices(mesh: &Mesh, points: &[Point3<f64>]) -> ContourResult<Vec<u32>> {
    if mesh.vertices.is_empty() {
        return Err(ContourError::empty_mesh("cannot snap points to a mesh without vertices"));
    }
    Ok(points
        .iter()
        .map(|point| {
            mesh.vertices
                .iter()
                .enumerate()
                .map(|(v, p)| (nalgebra::distance_squared(p, point), v as u32))
                .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
                .map(|(_, v)| v)
                .unwrap_or(0)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes;

    fn grid10() -> (Mesh, AdjacencyList) {
        let mesh = shapes::grid(10, 10, 1.0);
        let adjacency = AdjacencyList::immediate(&mesh).unwrap();
        (mesh, adjacency)
    }

    fn assert_closed_cycle(adjacency: &AdjacencyList, path: &[u32]) {
        for pair in path.windows(2) {
            assert!(adjacency.contains(pair[0], pair[1]), "{:?} not adjacent", pair);
        }
        let (first, last) = (path[0], path[path.len() - 1]);
        assert!(adjacency.contains(last, first));
        let unique: HashSet<u32> = path.iter().copied().collect();
        assert_eq!(unique.len(), path.len());
    }

    #[test]
    fn test_greedy_path_on_grid() {
        let (mesh, adjacency) = grid10();
        let path = init_path(&mesh, &adjacency, &[22, 27, 75]).unwrap();
        assert_eq!(
            path,
            vec![22, 23, 24, 25, 26, 27, 37, 47, 57, 56, 66, 65, 75, 64, 53, 42, 32]
        );
        assert_closed_cycle(&adjacency, &path);
    }

    #[test]
    fn test_basin_path_on_grid() {
        let (mesh, adjacency) = grid10();
        let seeds = [22, 27, 75];
        let path = init_closed_path(&mesh, &adjacency, &seeds).unwrap();
        assert_eq!(path[0], 22);
        for seed in seeds {
            assert!(path.contains(&seed));
        }
        assert_closed_cycle(&adjacency, &path);
    }

    #[test]
    fn test_basins_partition_vertices() {
        let (mesh, adjacency) = grid10();
        let seeds = [0, 9, 99];
        let basins = nearest_seed_basins(&mesh, &adjacency, &seeds).unwrap();
        assert_eq!(basins.nearest[0], Some(0));
        assert_eq!(basins.nearest[8], Some(1));
        assert_eq!(basins.nearest[88], Some(2));
        assert_eq!(basins.distance[9], 0.0);
        assert!((basins.distance[2] - 2.0).abs() < 1e-12);
        assert!(basins.nearest.iter().all(Option::is_some));
        assert!(basins.touches(&adjacency, 0, 1));
        assert!(basins.touches(&adjacency, 1, 2));
    }

    #[test]
    fn test_unreachable_vertices_stay_unassigned() {
        let mut mesh = shapes::grid(4, 4, 1.0);
        mesh.vertices.push(Point3::new(10.0, 10.0, 0.0));
        let adjacency = AdjacencyList::immediate(&mesh).unwrap();
        let basins = nearest_seed_basins(&mesh, &adjacency, &[0, 3, 15]).unwrap();
        assert_eq!(basins.nearest[16], None);
        assert!(basins.distance[16].is_infinite());
    }

    #[test]
    fn test_too_few_seeds() {
        let (mesh, adjacency) = grid10();
        let err = init_path(&mesh, &adjacency, &[1, 2]).unwrap_err();
        assert!(matches!(
            err,
            ContourError::InsufficientSeeds {
                count: 2,
                required: 3
            }
        ));
    }

    #[test]
    fn test_bad_seeds() {
        let (mesh, adjacency) = grid10();
        assert!(matches!(
            init_path(&mesh, &adjacency, &[1, 2, 100]),
            Err(ContourError::SeedOutOfRange {
                position: 2,
                vertex: 100,
                ..
            })
        ));
        assert!(matches!(
            init_path(&mesh, &adjacency, &[1, 5, 1]),
            Err(ContourError::DuplicateSeed {
                position: 2,
                vertex: 1
            })
        ));
    }

    #[test]
    fn test_walk_through_later_seed_is_degenerate() {
        let (mesh, adjacency) = grid10();
        // The first walk runs straight over seed 3 on its way to seed 5.
        let err = init_path(&mesh, &adjacency, &[1, 5, 3]).unwrap_err();
        assert!(matches!(
            err,
            ContourError::DegenerateTopology {
                vertex: Some(3),
                ..
            }
        ));
    }

    #[test]
    fn test_initializer_dispatch() {
        let (mesh, adjacency) = grid10();
        let greedy = PathInitializer::Greedy
            .run(&mesh, &adjacency, &[22, 27, 75])
            .unwrap();
        assert_eq!(greedy, init_path(&mesh, &adjacency, &[22, 27, 75]).unwrap());
        assert_eq!(PathInitializer::default(), PathInitializer::Greedy);
    }

    #[test]
    fn test_snap_to_vertices() {
        let (mesh, _) = grid10();
        let snapped = snap_to_vertices(
            &mesh,
            &[Point3::new(2.1, 1.9, 0.3), Point3::new(-5.0, -5.0, 0.0)],
        )
        .unwrap();
        assert_eq!(snapped, vec![22, 0]);
        assert!(snap_to_vertices(&Mesh::new(), &[Point3::origin()]).is_err());
    }
}
