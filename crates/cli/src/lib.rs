pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use wardrobe_core::config::{AppConfig, LoadOptions, LogFormat};
use wardrobe_core::{Occasion, Season};

use commands::generate::GenerateRequest;
use commands::outfit::OutfitRequest;

#[derive(Debug, Parser)]
#[command(
    name = "wardrobe",
    about = "Wardrobe outfit generator CLI",
    long_about = "Generate scored outfit suggestions from a clothing catalog, assemble named outfits, and inspect engine configuration.",
    after_help = "Examples:\n  wardrobe generate --catalog closet.json --occasion work\n  wardrobe outfit --catalog closet.json --items tee,jeans,sneakers --name Weekend\n  wardrobe config"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a wardrobe.toml config file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Generate ranked outfits from a catalog and return them as JSON")]
    Generate(GenerateArgs),
    #[command(about = "Assemble a named outfit from catalog item ids")]
    Outfit {
        #[arg(long, help = "Catalog JSON file")]
        catalog: PathBuf,
        #[arg(long, value_delimiter = ',', required = true, help = "Comma-separated item ids")]
        items: Vec<String>,
        #[arg(long, default_value = "", help = "Outfit name")]
        name: String,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    #[arg(long, help = "Catalog JSON file (array of items or {\"items\": [...]})")]
    catalog: PathBuf,
    #[arg(long, help = "Generation options JSON file")]
    options: Option<PathBuf>,
    #[arg(long)]
    occasion: Option<Occasion>,
    #[arg(long)]
    season: Option<Season>,
    #[arg(long, help = "Item id to leave out (repeatable)")]
    exclude: Vec<String>,
    #[arg(long, help = "Item id every outfit must contain (repeatable)")]
    force: Vec<String>,
    #[arg(long)]
    max_results: Option<usize>,
    #[arg(long)]
    min_score: Option<f64>,
    #[arg(long, help = "Try to use every catalog item at least once")]
    all_items: bool,
    #[arg(long, help = "Recency history JSON file, read before and written after generation")]
    history: Option<PathBuf>,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.config.clone());

    let result = match cli.command {
        Command::Generate(args) => commands::generate::run(&GenerateRequest {
            config_path: cli.config,
            catalog: args.catalog,
            options_file: args.options,
            occasion: args.occasion,
            season: args.season,
            exclude: args.exclude,
            force: args.force,
            max_results: args.max_results,
            min_score: args.min_score,
            all_items: args.all_items,
            history: args.history,
        }),
        Command::Outfit { catalog, items, name } => {
            commands::outfit::run(&OutfitRequest { catalog, item_ids: items, name })
        }
        Command::Config => commands::CommandResult {
            exit_code: 0,
            output: commands::config::run(cli.config.as_deref()),
        },
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr so stdout stays a single JSON payload.
fn init_logging(config_path: Option<PathBuf>) {
    use tracing::Level;
    use LogFormat::*;

    // Config errors are reported by the command itself; logging falls back to defaults.
    let config = AppConfig::load(LoadOptions { config_path, ..LoadOptions::default() })
        .unwrap_or_default();
    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);
    let _ = match config.logging.format {
        Compact => builder.compact().try_init(),
        Pretty => builder.pretty().try_init(),
        Json => builder.json().try_init(),
    };
}
