use anyhow::{Result, ensure};
use clap::Parser;
use dungen::region::open_regions;
use dungen::{Algorithm, GeneratorConfig, generate_map};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use std::io;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Seed for the sequence of map seeds
    #[arg(long, default_value_t = 42)]
    base_seed: u64,
    /// Map seeds to try per algorithm
    #[arg(short = 'n', long, default_value_t = 100)]
    seeds: u32,
    /// Draw random map sizes instead of the configured ones
    #[arg(long)]
    vary_size: bool,
}

fn check(algorithm: Algorithm, seed: u64, config: &GeneratorConfig) -> Result<u64> {
    let generated = generate_map(algorithm, seed, config)?;
    let map = &generated.map;
    let label = format!("{algorithm} seed={seed} {}x{}", config.width, config.height);

    ensure!(map.count_open() > 0, "Invariant failed: nothing carved ({label})");
    ensure!(
        !map.positions().any(|pos| map.is_edge(pos) && map.tile_at(pos).is_open()),
        "Invariant failed: open tile on the map edge ({label})"
    );
    let regions = open_regions(map).len();
    ensure!(regions == 1, "Invariant failed: {regions} disconnected regions ({label})");
    ensure!(
        generated.anchors.iter().all(|&anchor| map.in_bounds(anchor)),
        "Invariant failed: anchor off the map ({label})"
    );

    let again = generate_map(algorithm, seed, config)?;
    ensure!(again == generated, "Invariant failed: rerun differs ({label})");
    Ok(generated.fingerprint())
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    println!("Starting map fuzz from base seed {} over {} seeds...", args.base_seed, args.seeds);
    let mut rng = ChaCha8Rng::seed_from_u64(args.base_seed);
    let mut config = GeneratorConfig::default();

    for run in 0..args.seeds {
        let map_seed = rng.next_u64();
        if args.vary_size {
            config.width = 8 + (rng.next_u64() % 120) as usize;
            config.height = 8 + (rng.next_u64() % 80) as usize;
        }
        for algorithm in Algorithm::ALL {
            let fingerprint = check(algorithm, map_seed, &config)?;
            debug!(run, %algorithm, map_seed, fingerprint, "map passed");
        }
        info!(run, map_seed, width = config.width, height = config.height, "run passed");
    }

    println!("Fuzzing completed successfully.");
    Ok(())
}
