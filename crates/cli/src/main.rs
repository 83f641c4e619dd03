use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rirscene::array::ArrayTopology;
use rirscene::dataset::generate_scenes;
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::fmt::SubscriberBuilder;

mod config;
mod output;
mod provenance;

use config::GenerationCfg;
use output::{write_manifest, write_table, Manifest};
use provenance::Payload;

#[derive(Parser)]
#[command(name = "rirscene")]
#[command(about = "Randomized array/source scenes for room-impulse-response datasets")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Sample one scene per DOA and write a manifest (plus optional table)
    Scenes {
        /// JSON generation config
        #[arg(long)]
        config: PathBuf,
        /// Manifest output path (.json)
        #[arg(long)]
        out: PathBuf,
        /// Optional per-microphone table (.csv or .parquet)
        #[arg(long)]
        table: Option<PathBuf>,
        /// Overrides the config seed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the DOA grid of an array topology as JSON
    Grid {
        /// ULA, CUA or SUA
        #[arg(long)]
        array: String,
        #[arg(long, default_value_t = 37)]
        count: usize,
        /// Report angles in degrees instead of radians
        #[arg(long)]
        degrees: bool,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Scenes {
            config,
            out,
            table,
            seed,
        } => scenes(config, out, table, seed),
        Action::Grid {
            array,
            count,
            degrees,
        } => grid(&array, count, degrees),
        Action::Report => report(),
    }
}

fn scenes(
    config: PathBuf,
    out: PathBuf,
    table: Option<PathBuf>,
    seed: Option<u64>,
) -> Result<()> {
    let cfg = GenerationCfg::load(&config)?;
    let seed = seed.or(cfg.seed).unwrap_or_else(rand::random);
    tracing::info!(
        config = %config.display(),
        array = %cfg.array_type,
        num_mics = cfg.num_mics,
        seed,
        "scenes"
    );
    let scenes = generate_scenes(cfg.to_request()?, seed)
        .with_context(|| format!("sampling scenes for {}", config.display()))?;

    write_manifest(&out, &Manifest::new(&cfg, seed, &scenes))?;
    let mut payload = Payload::new(serde_json::to_value(&cfg)?).with_seed(seed);
    if let Some(table) = table {
        write_table(&table, &scenes)?;
        payload = payload.with_output(table);
    }
    let prov = provenance::write_sidecar(&out, payload)?;
    tracing::info!(
        scenes = scenes.len(),
        out = %out.display(),
        provenance = %prov.display(),
        "done"
    );
    Ok(())
}

fn grid(array: &str, count: usize, degrees: bool) -> Result<()> {
    let topology: ArrayTopology = array.parse()?;
    let scale = if degrees { 180.0 / std::f64::consts::PI } else { 1.0 };
    let points: Vec<_> = topology
        .doa_grid(count)?
        .iter()
        .map(|d| json!({"azimuth": d.azimuth * scale, "elevation": d.elevation * scale}))
        .collect();
    let doc = json!({
        "array_type": topology.tag(),
        "unit": if degrees { "deg" } else { "rad" },
        "points": points,
    });
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

fn report() -> Result<()> {
    let doc = provenance::document(&Payload::new(json!({})), None);
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
