use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use shopforge_generate::{GenerateError, GenerateOptions, GenerationEngine, Profile};
use shopforge_load::{LoadError, LoadOptions, Loader};
use thiserror::Error;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum CliError {
    #[error("generation error: {0}")]
    Generate(#[from] GenerateError),
    #[error("load error: {0}")]
    Load(#[from] LoadError),
}

#[derive(Parser, Debug)]
#[command(name = "shopforge", version, about = "Synthetic e-commerce dataset tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the dataset CSV files from a profile.
    Generate(GenerateArgs),
    /// Load generated CSV files into a SQLite database.
    Load(LoadArgs),
    /// Generate and load in one pass.
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Profile TOML file; built-in defaults apply when omitted.
    #[arg(long, value_name = "FILE")]
    profile: Option<PathBuf>,
    /// Output directory for CSV files and run artifacts.
    #[arg(long, default_value = "data")]
    out: PathBuf,
    /// Override the profile's seed.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct LoadArgs {
    /// Directory holding the generated CSV files.
    #[arg(long, default_value = "data")]
    csv_dir: PathBuf,
    /// SQLite database file, created when missing.
    #[arg(long, default_value = "ecom.db")]
    db: PathBuf,
    /// Keep existing rows instead of dropping and recreating tables.
    #[arg(long, default_value_t = false)]
    append: bool,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Profile TOML file; built-in defaults apply when omitted.
    #[arg(long, value_name = "FILE")]
    profile: Option<PathBuf>,
    /// Directory the CSV files pass through.
    #[arg(long, default_value = "data")]
    out: PathBuf,
    /// SQLite database file, created when missing.
    #[arg(long, default_value = "ecom.db")]
    db: PathBuf,
    /// Keep existing rows instead of dropping and recreating tables.
    #[arg(long, default_value_t = false)]
    append: bool,
    /// Override the profile's seed.
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Load(args) => run_load(args).await,
        Command::Run(args) => run_pipeline(args).await,
    };

    if let Err(err) = result {
        error!(error = %err, "shopforge failed");
        std::process::exit(1);
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let profile = load_profile(args.profile.as_deref(), args.seed)?;
    let engine = GenerationEngine::new(GenerateOptions { out_dir: args.out });
    engine.run(&profile)?;
    Ok(())
}

async fn run_load(args: LoadArgs) -> Result<(), CliError> {
    let mut loader = Loader::connect(LoadOptions {
        database: args.db,
        csv_dir: args.csv_dir,
        append: args.append,
    })
    .await?;
    loader.run().await?;
    Ok(())
}

async fn run_pipeline(args: RunArgs) -> Result<(), CliError> {
    let profile = load_profile(args.profile.as_deref(), args.seed)?;
    let engine = GenerationEngine::new(GenerateOptions {
        out_dir: args.out.clone(),
    });
    engine.run(&profile)?;

    let mut loader = Loader::connect(LoadOptions {
        database: args.db,
        csv_dir: args.out,
        append: args.append,
    })
    .await?;
    loader.run().await?;
    Ok(())
}

fn load_profile(path: Option<&Path>, seed: Option<u64>) -> Result<Profile, CliError> {
    let mut profile = match path {
        Some(path) => Profile::from_path(path)?,
        None => Profile::default(),
    };
    if let Some(seed) = seed {
        profile.seed = seed;
    }
    Ok(profile)
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
