//! contour path command - build the initial contour through seeds.

use anyhow::Result;
use colored::Colorize;
use mesh_contour::{AdjacencyList, PathInitializer};
use serde::Serialize;

use super::{load_mesh, resolve_seeds};
use crate::{Cli, InitializerArg, MeshSource, OutputFormat, SeedArgs, output};

#[derive(Serialize)]
struct PathResult {
    seeds: Vec<u32>,
    length: usize,
    contour: Vec<u32>,
}

pub fn run(
    source: &MeshSource,
    seed_args: &SeedArgs,
    initializer: InitializerArg,
    cli: &Cli,
) -> Result<()> {
    let mesh = load_mesh(source)?;
    let seeds = resolve_seeds(&mesh, seed_args)?;
    let adjacency = AdjacencyList::immediate(&mesh)?;
    let contour = PathInitializer::from(initializer).run(&mesh, &adjacency, &seeds)?;

    let result = PathResult {
        seeds,
        length: contour.len(),
        contour,
    };

    match cli.format {
        OutputFormat::Json => output::print(&result, cli.format, cli.quiet),
        OutputFormat::Text => {
            if !cli.quiet {
                println!("{}", "Initial Contour".bold().underline());
                println!("  {}: {:?}", "Seeds".cyan(), result.seeds);
                println!("  {}: {}", "Length".cyan(), result.length);
                println!("  {}: {:?}", "Vertices".cyan(), result.contour);
            }
        }
    }

    Ok(())
}
