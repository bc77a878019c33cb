//! Trains the affinity regression forest and writes it as JSON.
//!
//! Run with: cargo run -p biostructx-affinity --bin train-affinity-model -- --output models/affinity_forest.json

use std::path::PathBuf;

use biostructx_affinity::ligand::provider_from_config;
use biostructx_affinity::train::{build_training_set, load_pairs_csv, sample_pairs, train_forest, ForestParams};
use biostructx_common::{AppConfig, HttpClient};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "train-affinity-model", about = "Train the BioStructX binding-affinity forest")]
struct Cli {
    /// `smiles,sequence,affinity` CSV; the built-in sample pairs when omitted
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Where to write the model (defaults to `[model].path` from the config)
    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long, default_value_t = 100)]
    trees: usize,

    #[arg(long)]
    max_depth: Option<usize>,

    #[arg(long, default_value_t = 1)]
    min_samples_leaf: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Config file, overriding BIOSTRUCTX_CONFIG
    #[arg(long, env = "BIOSTRUCTX_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("biostructx=debug,info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    let pairs = match &cli.csv {
        Some(path) => load_pairs_csv(path)?,
        None => sample_pairs(),
    };
    info!(pairs = pairs.len(), provider = ?config.descriptors.provider, "Extracting training features");

    let http = HttpClient::from_config(&config)?;
    let provider = provider_from_config(&config, http);
    let (features, affinities) = build_training_set(provider.as_ref(), &pairs).await?;

    let params = ForestParams {
        n_trees: cli.trees,
        max_depth: cli.max_depth,
        min_samples_leaf: cli.min_samples_leaf,
        seed: cli.seed,
        ..Default::default()
    };
    let forest = train_forest(&features, &affinities, &params);

    let output = cli.output.unwrap_or_else(|| PathBuf::from(&config.model.path));
    forest.save(&output)?;
    info!(path = %output.display(), trees = forest.trees.len(), "Model written");
    Ok(())
}
