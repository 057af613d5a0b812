use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use wardrobe_core::config::LoadOptions;
use wardrobe_core::{
    ApplicationError, DomainError, GeneratedOutfit, GenerationOptions, ItemId, Occasion,
    OutfitEngine, RecencyTracker, Season,
};

use super::{load_catalog, load_config, read_json, CommandResult};

const COMMAND: &str = "generate";

/// Inputs for one `wardrobe generate` run. Flags win over the options file.
#[derive(Clone, Debug, Default)]
pub struct GenerateRequest {
    pub config_path: Option<PathBuf>,
    pub catalog: PathBuf,
    pub options_file: Option<PathBuf>,
    pub occasion: Option<Occasion>,
    pub season: Option<Season>,
    pub exclude: Vec<String>,
    pub force: Vec<String>,
    pub max_results: Option<usize>,
    pub min_score: Option<f64>,
    pub all_items: bool,
    pub history: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct GeneratePayload<'a> {
    catalog_items: usize,
    history_entries: usize,
    outfits: &'a [GeneratedOutfit],
}

pub fn run(request: &GenerateRequest) -> CommandResult {
    match execute(request) {
        Ok(result) => result,
        Err(error) => CommandResult::from_error(COMMAND, &error),
    }
}

fn execute(request: &GenerateRequest) -> Result<CommandResult, ApplicationError> {
    let config = load_config(LoadOptions {
        config_path: request.config_path.clone(),
        ..LoadOptions::default()
    })?;
    let catalog = load_catalog(&request.catalog)?;
    let options = build_options(request)?;

    let tracker = match request.history.as_deref() {
        Some(path) => load_history(path)?,
        None => RecencyTracker::new(),
    };

    let mut engine = OutfitEngine::with_tracker(config.engine(), tracker);
    let outfits = engine.generate(&catalog, &options)?;

    if let Some(path) = request.history.as_deref() {
        save_history(path, engine.tracker()).map_err(|error| history_error(path, &error))?;
    }

    let payload = GeneratePayload {
        catalog_items: catalog.len(),
        history_entries: engine.tracker().len(),
        outfits: &outfits,
    };
    Ok(CommandResult::success_with_data(
        COMMAND,
        format!("generated {} outfit(s) from {} item(s)", outfits.len(), catalog.len()),
        &payload,
    ))
}

fn build_options(request: &GenerateRequest) -> Result<GenerationOptions, ApplicationError> {
    let mut options = match request.options_file.as_deref() {
        Some(path) => read_json::<GenerationOptions>(path).map_err(|error| {
            ApplicationError::Domain(DomainError::InvalidOptions(format!("{error:#}")))
        })?,
        None => GenerationOptions::new(),
    };

    if request.occasion.is_some() {
        options.occasion = request.occasion;
    }
    if request.season.is_some() {
        options.season = request.season;
    }
    if request.max_results.is_some() {
        options.max_results = request.max_results;
    }
    if request.min_score.is_some() {
        options.min_score = request.min_score;
    }
    if request.all_items {
        options.use_all_items = true;
    }
    options.excluded_items.extend(request.exclude.iter().map(|id| ItemId::from(id.as_str())));
    options.force_include_items.extend(request.force.iter().map(|id| ItemId::from(id.as_str())));

    Ok(options)
}

fn load_history(path: &Path) -> Result<RecencyTracker, ApplicationError> {
    if !path.exists() {
        return Ok(RecencyTracker::new());
    }
    read_json(path).map_err(|error| history_error(path, &error))
}

fn history_error(path: &Path, error: &anyhow::Error) -> ApplicationError {
    ApplicationError::History(format!("history file `{}`: {error:#}", path.display()))
}

fn save_history(path: &Path, tracker: &RecencyTracker) -> anyhow::Result<()> {
    let raw = serde_json::to_string_pretty(tracker).context("failed to serialize history")?;
    fs::write(path, raw).with_context(|| format!("failed to write `{}`", path.display()))
}
