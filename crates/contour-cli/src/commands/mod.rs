//! Subcommands and the input handling they share.

pub mod curvature;
pub mod path;
pub mod segment;

use anyhow::{Context, Result, bail};
use mesh_contour::{Mesh, PathInitializer, shapes, snap_to_vertices};
use nalgebra::Point3;
use tracing::info;

use crate::{InitializerArg, MeshSource, SeedArgs};

/// Load or generate the mesh described by `source`.
pub fn load_mesh(source: &MeshSource) -> Result<Mesh> {
    if let Some(subdivisions) = source.icosphere {
        info!(subdivisions, radius = source.radius, "Generating icosphere");
        return Ok(shapes::icosphere(subdivisions, source.radius));
    }
    if let Some(n) = source.grid {
        info!(n, "Generating grid");
        return Ok(shapes::grid(n, n, 1.0));
    }
    let Some(path) = &source.input else {
        bail!("No input mesh given");
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read mesh from {:?}", path))?;
    let mesh: Mesh = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse mesh JSON in {:?}", path))?;
    mesh.validate()?;
    Ok(mesh)
}

/// Resolve seeds to vertex indices.
pub fn resolve_seeds(mesh: &Mesh, seeds: &SeedArgs) -> Result<Vec<u32>> {
    if seeds.seed_point.is_empty() {
        return Ok(seeds.seeds.clone());
    }
    let points = seeds
        .seed_point
        .iter()
        .map(|s| parse_point(s))
        .collect::<Result<Vec<_>>>()?;
    Ok(snap_to_vertices(mesh, &points)?)
}

fn parse_point(text: &str) -> Result<Point3<f64>> {
    let coords = text
        .split(',')
        .map(|c| c.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Invalid seed point {:?}", text))?;
    match coords.as_slice() {
        &[x, y, z] => Ok(Point3::new(x, y, z)),
        _ => bail!("Seed point {:?} needs three coordinates", text),
    }
}

impl From<InitializerArg> for PathInitializer {
    fn from(arg: InitializerArg) -> Self {
        match arg {
            InitializerArg::Greedy => PathInitializer::Greedy,
            InitializerArg::Basins => PathInitializer::Basins,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        let p = parse_point("1.5, -2,0").unwrap();
        assert_eq!(p, Point3::new(1.5, -2.0, 0.0));
        assert!(parse_point("1,2").is_err());
        assert!(parse_point("a,b,c").is_err());
    }
}
