use radio_coverage::coverage::{CoverageEngine, EngineConfig};
use radio_coverage::grid::Grid;
use radio_coverage::physics::models::egli;

fn main() {
    let config = EngineConfig::default();
    let mut engine = CoverageEngine::new(config);
    engine
        .add_land_cover(Grid::filled(11, 11, 1.0), egli)
        .unwrap();

    println!(
        "Engine: {} m cells, {} MHz, {} ray directions",
        config.cell_size_m,
        config.frequency_mhz,
        engine.routes().len()
    );

    let result = engine.fill(5, 5, None).unwrap();

    println!("Loss profile along row 5 (transmitter at col 5):");
    for col in 0..11 {
        let dist = (col as f64 - 5.0).abs() * config.cell_size_m;
        println!("  col {:2} ({:5.1} m): {:9.4}", col, dist, result.get(5, col));
    }
}
