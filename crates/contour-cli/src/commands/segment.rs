//! contour segment command - evolve a contour from seeds.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use mesh_contour::{Direction, Segmentation, SegmentationParams};
use serde::Serialize;

use super::{load_mesh, resolve_seeds};
use crate::{Cli, InitializerArg, MeshSource, OutputFormat, SeedArgs, output};

/// Command-line adjustments on top of the parameter file.
pub struct Overrides<'a> {
    pub config: Option<&'a Path>,
    pub iterations: Option<usize>,
    pub shrink: bool,
    pub initializer: Option<InitializerArg>,
    pub adjacency_depth: Option<usize>,
}

#[derive(Serialize)]
struct SegmentSummary {
    vertices: usize,
    faces: usize,
    seeds: Vec<u32>,
    initial_contour_len: usize,
    contour_len: usize,
    inside: usize,
    outside: usize,
    iterations: usize,
    full_relayers: usize,
    energy: f64,
    stopped_early: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
}

fn build_params(overrides: &Overrides<'_>) -> Result<SegmentationParams> {
    let mut params = match overrides.config {
        Some(path) => SegmentationParams::from_toml_file(path)
            .with_context(|| format!("Failed to load parameters from {:?}", path))?,
        None => SegmentationParams::default(),
    };
    if let Some(iterations) = overrides.iterations {
        params.iterations = iterations;
    }
    if overrides.shrink {
        params.evolve.direction = Direction::Shrink;
    }
    if let Some(initializer) = overrides.initializer {
        params.initializer = initializer.into();
    }
    if let Some(depth) = overrides.adjacency_depth {
        params.adjacency_depth = depth;
    }
    Ok(params)
}

pub fn run(
    source: &MeshSource,
    seed_args: &SeedArgs,
    overrides: Overrides<'_>,
    output_path: Option<&Path>,
    cli: &Cli,
) -> Result<()> {
    let mesh = load_mesh(source)?;
    let seeds = resolve_seeds(&mesh, seed_args)?;
    let params = build_params(&overrides)?;

    let segmentation = Segmentation::new(&mesh, params)?;
    let result = segmentation.run(&seeds)?;

    if let Some(path) = output_path {
        output::write_json(&result, path)?;
    }

    let summary = SegmentSummary {
        vertices: mesh.vertex_count(),
        faces: mesh.face_count(),
        seeds,
        initial_contour_len: result.initial_contour.len(),
        contour_len: result.contour.len(),
        inside: result.inside_count(),
        outside: result.outside_count(),
        iterations: result.summary.iterations,
        full_relayers: result.summary.full_relayers,
        energy: result.summary.energy,
        stopped_early: result.summary.stopped_early,
        output: output_path.map(|p| p.display().to_string()),
    };

    match cli.format {
        OutputFormat::Json => output::print(&summary, cli.format, cli.quiet),
        OutputFormat::Text => {
            if !cli.quiet {
                println!("{}", "Segmentation".bold().underline());
                println!(
                    "  {}: {} vertices, {} faces",
                    "Mesh".cyan(),
                    summary.vertices,
                    summary.faces
                );
                println!("  {}: {:?}", "Seeds".cyan(), summary.seeds);
                println!(
                    "  {}: {} -> {} vertices",
                    "Contour".cyan(),
                    summary.initial_contour_len,
                    summary.contour_len
                );
                println!(
                    "  {}: {} inside, {} outside",
                    "Regions".cyan(),
                    summary.inside,
                    summary.outside
                );
                println!(
                    "  {}: {} ({} full rebuilds)",
                    "Iterations".cyan(),
                    summary.iterations,
                    summary.full_relayers
                );
                println!("  {}: {:.6}", "Energy".cyan(), summary.energy);
                if summary.stopped_early {
                    println!("  {}", "Contour vanished before the last iteration".yellow());
                }
                if let Some(path) = &summary.output {
                    println!("  {}: {}", "Saved".green(), path);
                }
            }
        }
    }

    Ok(())
}
