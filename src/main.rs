use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use radio_coverage::coverage::{CoverageEngine, EngineConfig};
use radio_coverage::io;
use radio_coverage::landcover::split_classes;
use radio_coverage::physics::models::ModelRegistry;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        anyhow::bail!(
            "usage: {} <landcover.txt> <antenna.txt> <result.txt> [threshold_m]",
            args[0]
        );
    }
    let threshold = args
        .get(4)
        .map(|raw| raw.parse::<f64>())
        .transpose()
        .context("threshold must be a distance in meters")?;

    let landcover = io::load_raster(&args[1])?;
    let antenna = io::load_raster(&args[2])?;

    let mut engine = CoverageEngine::new(EngineConfig::default());
    for (layer, model) in split_classes(&landcover.grid, &ModelRegistry::with_defaults())? {
        engine.add_land_cover(layer, model)?;
    }

    let result = engine.run(&antenna.grid, threshold)?;
    io::save_raster(&args[3], &result)?;

    Ok(())
}
