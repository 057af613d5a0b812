use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use toml::Value;
use wardrobe_core::config::{AppConfig, LoadOptions, DEFAULT_CONFIG_FILE};

pub fn run(config_path: Option<&Path>) -> String {
    let options =
        LoadOptions { config_path: config_path.map(Path::to_path_buf), ..LoadOptions::default() };
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path(config_path);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let search = &config.search;
    let scoring = &config.scoring;
    let weights = &scoring.weights;
    let fields = [
        field("search.max_depth", search.max_depth, &["WARDROBE_SEARCH_MAX_DEPTH"]),
        field("search.max_outfits", search.max_outfits, &["WARDROBE_SEARCH_MAX_OUTFITS"]),
        field(
            "search.max_items_per_category",
            search.max_items_per_category,
            &["WARDROBE_SEARCH_MAX_ITEMS_PER_CATEGORY"],
        ),
        field("search.completing_fan_out", search.completing_fan_out, &[]),
        field("search.max_coordinating_items", search.max_coordinating_items, &[]),
        field("search.star_outfits_per_item", search.star_outfits_per_item, &[]),
        field(
            "scoring.default_min_score",
            scoring.default_min_score,
            &["WARDROBE_SCORING_DEFAULT_MIN_SCORE"],
        ),
        field("scoring.score_floor", scoring.score_floor, &["WARDROBE_SCORING_SCORE_FLOOR"]),
        field("scoring.score_ceiling", scoring.score_ceiling, &[]),
        field(
            "scoring.diversity_threshold",
            scoring.diversity_threshold,
            &["WARDROBE_SCORING_DIVERSITY_THRESHOLD"],
        ),
        field("scoring.weights.color_harmony", weights.color_harmony, &[]),
        field("scoring.weights.style_matching", weights.style_matching, &[]),
        field("scoring.weights.occasion_suitability", weights.occasion_suitability, &[]),
        field("scoring.weights.season_suitability", weights.season_suitability, &[]),
        field("scoring.weights.weather_suitability", weights.weather_suitability, &[]),
        field("scoring.weights.user_preference", weights.user_preference, &[]),
        field("scoring.weights.variety", weights.variety, &[]),
        field("recency.window_days", config.recency.window_days, &["WARDROBE_RECENCY_WINDOW_DAYS"]),
        field("recency.repeat_penalty", config.recency.repeat_penalty, &[]),
        field(
            "logging.level",
            &config.logging.level,
            &["WARDROBE_LOGGING_LEVEL", "WARDROBE_LOG_LEVEL"],
        ),
        field(
            "logging.format",
            format!("{:?}", config.logging.format),
            &["WARDROBE_LOGGING_FORMAT", "WARDROBE_LOG_FORMAT"],
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key_path, value, env_keys) in fields {
        let source = field_source(
            key_path,
            env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(key_path, &value, source));
    }

    lines.join("\n")
}

type Field = (&'static str, String, &'static [&'static str]);

fn field(
    key_path: &'static str,
    value: impl ToString,
    env_keys: &'static [&'static str],
) -> Field {
    (key_path, value.to_string(), env_keys)
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    let root = PathBuf::from(DEFAULT_CONFIG_FILE);
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config").join(DEFAULT_CONFIG_FILE);
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
