use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{Level, info};

use terrain_forge::export::{GlbTerrainExporter, PlacementLog};
use terrain_forge::{GeneratorConfig, generate};

#[derive(Parser, Debug)]
#[command(name = "terrain-forge")]
#[command(about = "Build terrain, texture and object placements from a heightmap and an object map")]
struct Args {
    /// TOML generator configuration; relative paths inside resolve against its directory
    #[arg(short, long)]
    config: PathBuf,

    /// Output directory for the mesh, texture and placement list
    #[arg(short, long, default_value = "out")]
    out: PathBuf,

    /// Placement seed, overrides the one in the configuration
    #[arg(short, long)]
    seed: Option<u64>,

    /// Only report warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Report per-stage details
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.quiet {
        Level::WARN
    } else if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    let config = GeneratorConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let base_dir = args.config.parent().unwrap_or(Path::new("."));
    let settings = config
        .resolve(base_dir)
        .context("environment can not be generated")?;

    let mut rng = match args.seed.or(config.seed) {
        Some(seed) => {
            info!(seed, "using fixed placement seed");
            ChaCha8Rng::seed_from_u64(seed)
        }
        None => ChaCha8Rng::from_entropy(),
    };

    let generation = generate(&settings, &mut rng).context("environment can not be generated")?;

    let mut terrain = GlbTerrainExporter::new(&args.out);
    let mut objects = PlacementLog::default();
    generation.deliver(&mut terrain, &mut objects)?;
    objects.save(&args.out.join("placements.json"))?;

    info!(
        out = %args.out.display(),
        placements = objects.placements().len(),
        "done"
    );
    Ok(())
}
