//! contour curvature command - estimate mean curvature.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use mesh_contour::{AdjacencyList, SurfaceGeometry};
use serde::Serialize;

use super::load_mesh;
use crate::{Cli, MeshSource, OutputFormat, output};

#[derive(Serialize)]
struct CurvatureStats {
    vertices: usize,
    adjacency_depth: usize,
    smoothing: usize,
    min: f64,
    max: f64,
    mean: f64,
    convex: usize,
    concave: usize,
}

#[derive(Serialize)]
struct CurvatureField<'a> {
    curvature: &'a [f64],
    gradient_e1: &'a [f64],
    gradient_e2: &'a [f64],
}

pub fn run(
    source: &MeshSource,
    smoothing: usize,
    adjacency_depth: usize,
    output_path: Option<&Path>,
    cli: &Cli,
) -> Result<()> {
    let mesh = load_mesh(source)?;
    let adjacency = AdjacencyList::build(&mesh, adjacency_depth)?;
    let geometry = SurfaceGeometry::compute(&mesh, &adjacency, smoothing)?;
    let k = &geometry.curvature;

    let stats = CurvatureStats {
        vertices: k.len(),
        adjacency_depth,
        smoothing,
        min: k.iter().copied().fold(f64::INFINITY, f64::min),
        max: k.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        mean: k.iter().sum::<f64>() / k.len().max(1) as f64,
        convex: k.iter().filter(|&&v| v > 0.0).count(),
        concave: k.iter().filter(|&&v| v < 0.0).count(),
    };

    if let Some(path) = output_path {
        output::write_json(
            &CurvatureField {
                curvature: k,
                gradient_e1: &geometry.gradient.de1,
                gradient_e2: &geometry.gradient.de2,
            },
            path,
        )?;
    }

    match cli.format {
        OutputFormat::Json => output::print(&stats, cli.format, cli.quiet),
        OutputFormat::Text => {
            if !cli.quiet {
                println!("{}", "Mean Curvature".bold().underline());
                println!("  {}: {}", "Vertices".cyan(), stats.vertices);
                println!(
                    "  {}: depth {}, {} smoothing passes",
                    "Fit".cyan(),
                    stats.adjacency_depth,
                    stats.smoothing
                );
                println!("  {}: {:.6}", "Min".cyan(), stats.min);
                println!("  {}: {:.6}", "Max".cyan(), stats.max);
                println!("  {}: {:.6}", "Mean".cyan(), stats.mean);
                println!(
                    "  {}: {} convex, {} concave",
                    "Sign".cyan(),
                    stats.convex,
                    stats.concave
                );
                if let Some(path) = output_path {
                    println!("  {}: {}", "Saved".green(), path.display());
                }
            }
        }
    }

    Ok(())
}
