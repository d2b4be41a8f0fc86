use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tectogen::config::{ElevationMethod, GrowthStrategy, Params};
use tectogen::export::{ObjPart, write_obj_mtl};
use tectogen::mesh::{IcosphereStats, Mesh};
use tectogen::render;

/// Tectonic elevation for subdivided icosphere planets.
#[derive(Parser)]
#[command(name = "tectogen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a planet and write OBJ/MTL plus PNG previews.
    Generate {
        /// JSON parameter file; flags below override its fields.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Random seed.
        #[arg(short, long)]
        seed: Option<u64>,

        /// Icosphere subdivision depth.
        #[arg(short, long)]
        depth: Option<u32>,

        /// Planet radius in km.
        #[arg(short, long)]
        radius: Option<f32>,

        /// Explicit craton count (otherwise estimated from mesh size).
        #[arg(long)]
        cratons: Option<usize>,

        #[arg(long)]
        oceanic_fraction: Option<f32>,

        /// Craton growth strategy: bfs or voronoi.
        #[arg(long)]
        growth: Option<GrowthStrategy>,

        /// Elevation method: tectonic or noise.
        #[arg(long)]
        method: Option<ElevationMethod>,

        /// Add an ocean sphere object to the OBJ.
        #[arg(long)]
        ocean: bool,

        /// Output directory.
        #[arg(short, long, default_value = "artifacts")]
        output: PathBuf,

        /// Base name for output files.
        #[arg(short, long, default_value = "planet")]
        name: String,

        /// Width of the equirectangular previews (height is half).
        #[arg(short, long, default_value = "2048")]
        width: usize,
    },
    /// Print icosphere statistics for a radius and depth.
    Stats {
        #[arg(short, long, default_value = "25500")]
        radius: f32,

        #[arg(short, long, default_value = "5")]
        depth: u32,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Generate {
            config,
            seed,
            depth,
            radius,
            cratons,
            oceanic_fraction,
            growth,
            method,
            ocean,
            output,
            name,
            width,
        } => {
            let params = match config {
                Some(path) => Params::from_json_file(&path),
                None => Ok(Params::default()),
            };
            params.and_then(|mut params| {
                if let Some(v) = seed {
                    params.seed = v;
                }
                if let Some(v) = depth {
                    params.subdivision_depth = v;
                }
                if let Some(v) = radius {
                    params.radius = v;
                }
                if let Some(v) = oceanic_fraction {
                    params.oceanic_fraction = v;
                }
                if let Some(v) = growth {
                    params.growth = v;
                }
                if let Some(v) = method {
                    params.method = v;
                }
                params.craton_count = cratons.or(params.craton_count);
                params.ocean |= ocean;
                run_generate(&params, &output, &name, width)
            })
        }
        Commands::Stats { radius, depth } => {
            print_stats(&IcosphereStats::new(radius, depth));
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_generate(params: &Params, out_dir: &Path, name: &str, width: usize) -> tectogen::Result<()> {
    std::fs::create_dir_all(out_dir)?;

    eprintln!(
        "Generating planet: seed={}, radius={} km, depth={}, method={:?}, growth={:?}",
        params.seed, params.radius, params.subdivision_depth, params.method, params.growth
    );

    let (planet, timings) = tectogen::generate(params)?;

    eprintln!("\nTimings:");
    for t in &timings {
        eprintln!("  {:20} {:8.1} ms", t.name, t.ms);
    }

    // OBJ / MTL
    let ocean_mesh;
    let ocean_colors;
    let mut parts = vec![ObjPart {
        name: "terrain",
        mesh: &planet.mesh,
        colors: &planet.colors,
    }];
    if params.ocean {
        ocean_mesh = Mesh::uv_sphere(
            params.radius + params.sea_level,
            params.ocean_u_resolution,
            params.ocean_v_resolution,
        );
        ocean_colors = render::ocean_colors(&ocean_mesh, params);
        parts.push(ObjPart {
            name: "ocean",
            mesh: &ocean_mesh,
            colors: &ocean_colors,
        });
    }
    let (obj, mtl) = write_obj_mtl(out_dir, name, &parts, params.posterize_levels, params.y_up)?;
    eprintln!("Saved {}", obj.display());
    eprintln!("Saved {}", mtl.display());

    // PNG previews
    let (width, height) = preview_size(width);
    let save = |file: &str, rgba: &[u8]| -> tectogen::Result<()> {
        let path = out_dir.join(file);
        image::save_buffer(&path, rgba, width as u32, height as u32, image::ColorType::Rgba8)?;
        eprintln!("Saved {}", path.display());
        Ok(())
    };

    save(
        &format!("{name}_elevation.png"),
        &render::render_equirect(&planet.mesh, &planet.colors, width, height),
    )?;
    if !planet.assignment.is_empty() {
        let palette = render::craton_colors(&planet.adjacency, &planet.assignment);
        save(
            &format!("{name}_cratons.png"),
            &render::render_equirect(&planet.mesh, &palette, width, height),
        )?;
    }

    eprintln!("\nDone.");
    Ok(())
}

/// Equirectangular preview dimensions, 2:1, with the width kept in 16..=4096.
fn preview_size(width: usize) -> (usize, usize) {
    let width = width.clamp(16, 4096);
    (width, width / 2)
}

fn print_stats(s: &IcosphereStats) {
    println!("radius:            {} km", s.radius);
    println!("subdivision depth: {}", s.depth);
    println!("faces:             {}", s.faces);
    println!("edges:             {}", s.edges);
    println!("vertices:          {}", s.vertices);
    println!("surface area:      {:.1} km^2", s.surface_area);
    println!("mean face area:    {:.3} km^2", s.mean_face_area);
    println!("approx edge:       {:.3} km", s.approx_edge_length);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_width_is_clamped() {
        assert_eq!(preview_size(0), (16, 8));
        assert_eq!(preview_size(1), (16, 8));
        assert_eq!(preview_size(2048), (2048, 1024));
        assert_eq!(preview_size(100_000), (4096, 2048));
    }
}
