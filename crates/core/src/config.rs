use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::outfits::ScoringWeights;

pub const DEFAULT_CONFIG_FILE: &str = "wardrobe.toml";

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub scoring: ScoringConfig,
    pub recency: RecencyConfig,
    pub logging: LoggingConfig,
}

/// The subset of configuration the engine itself consumes.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EngineConfig {
    pub search: SearchConfig,
    pub scoring: ScoringConfig,
    pub recency: RecencyConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchConfig {
    pub max_depth: usize,
    pub max_outfits: usize,
    pub max_items_per_category: usize,
    pub completing_fan_out: usize,
    pub max_coordinating_items: usize,
    pub undergarment_threshold: f64,
    pub coordinating_threshold: f64,
    pub star_outfits_per_item: usize,
    pub challenge_pairings: usize,
    pub relaxed_score_margin: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoringConfig {
    pub weights: ScoringWeights,
    pub score_floor: f64,
    pub score_ceiling: f64,
    pub default_min_score: f64,
    pub neutral_weather_score: f64,
    pub missing_base_multiplier: f64,
    pub missing_shoes_multiplier: f64,
    pub four_category_bonus: f64,
    pub five_category_bonus: f64,
    pub diversity_threshold: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecencyConfig {
    pub window_days: i64,
    pub near_duplicate_threshold: f64,
    pub variety_penalty: f64,
    pub repeat_penalty: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub max_outfits: Option<usize>,
    pub default_min_score: Option<f64>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 12,
            max_outfits: 500,
            max_items_per_category: 10,
            completing_fan_out: 2,
            max_coordinating_items: 2,
            undergarment_threshold: 0.2,
            coordinating_threshold: 0.45,
            star_outfits_per_item: 3,
            challenge_pairings: 2,
            relaxed_score_margin: 0.15,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            score_floor: 0.6,
            score_ceiling: 1.0,
            default_min_score: 0.65,
            neutral_weather_score: 0.9,
            missing_base_multiplier: 0.5,
            missing_shoes_multiplier: 0.85,
            four_category_bonus: 1.03,
            five_category_bonus: 1.05,
            diversity_threshold: 0.7,
        }
    }
}

impl Default for RecencyConfig {
    fn default() -> Self {
        Self { window_days: 7, near_duplicate_threshold: 0.8, variety_penalty: 0.5, repeat_penalty: 0.15 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::Compact }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            search: self.search.clone(),
            scoring: self.scoring.clone(),
            recency: self.recency.clone(),
        }
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(search) = patch.search {
            let target = &mut self.search;
            set(&mut target.max_depth, search.max_depth);
            set(&mut target.max_outfits, search.max_outfits);
            set(&mut target.max_items_per_category, search.max_items_per_category);
            set(&mut target.completing_fan_out, search.completing_fan_out);
            set(&mut target.max_coordinating_items, search.max_coordinating_items);
            set(&mut target.undergarment_threshold, search.undergarment_threshold);
            set(&mut target.coordinating_threshold, search.coordinating_threshold);
            set(&mut target.star_outfits_per_item, search.star_outfits_per_item);
            set(&mut target.challenge_pairings, search.challenge_pairings);
            set(&mut target.relaxed_score_margin, search.relaxed_score_margin);
        }

        if let Some(scoring) = patch.scoring {
            let target = &mut self.scoring;
            if let Some(weights) = scoring.weights {
                let current = &mut target.weights;
                set(&mut current.color_harmony, weights.color_harmony);
                set(&mut current.style_matching, weights.style_matching);
                set(&mut current.occasion_suitability, weights.occasion_suitability);
                set(&mut current.season_suitability, weights.season_suitability);
                set(&mut current.weather_suitability, weights.weather_suitability);
                set(&mut current.user_preference, weights.user_preference);
                set(&mut current.variety, weights.variety);
            }
            set(&mut target.score_floor, scoring.score_floor);
            set(&mut target.score_ceiling, scoring.score_ceiling);
            set(&mut target.default_min_score, scoring.default_min_score);
            set(&mut target.neutral_weather_score, scoring.neutral_weather_score);
            set(&mut target.missing_base_multiplier, scoring.missing_base_multiplier);
            set(&mut target.missing_shoes_multiplier, scoring.missing_shoes_multiplier);
            set(&mut target.four_category_bonus, scoring.four_category_bonus);
            set(&mut target.five_category_bonus, scoring.five_category_bonus);
            set(&mut target.diversity_threshold, scoring.diversity_threshold);
        }

        if let Some(recency) = patch.recency {
            let target = &mut self.recency;
            set(&mut target.window_days, recency.window_days);
            set(&mut target.near_duplicate_threshold, recency.near_duplicate_threshold);
            set(&mut target.variety_penalty, recency.variety_penalty);
            set(&mut target.repeat_penalty, recency.repeat_penalty);
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("WARDROBE_SEARCH_MAX_DEPTH") {
            self.search.max_depth = parse_usize("WARDROBE_SEARCH_MAX_DEPTH", &value)?;
        }
        if let Some(value) = read_env("WARDROBE_SEARCH_MAX_OUTFITS") {
            self.search.max_outfits = parse_usize("WARDROBE_SEARCH_MAX_OUTFITS", &value)?;
        }
        if let Some(value) = read_env("WARDROBE_SEARCH_MAX_ITEMS_PER_CATEGORY") {
            self.search.max_items_per_category =
                parse_usize("WARDROBE_SEARCH_MAX_ITEMS_PER_CATEGORY", &value)?;
        }

        if let Some(value) = read_env("WARDROBE_SCORING_DEFAULT_MIN_SCORE") {
            self.scoring.default_min_score =
                parse_f64("WARDROBE_SCORING_DEFAULT_MIN_SCORE", &value)?;
        }
        if let Some(value) = read_env("WARDROBE_SCORING_SCORE_FLOOR") {
            self.scoring.score_floor = parse_f64("WARDROBE_SCORING_SCORE_FLOOR", &value)?;
        }
        if let Some(value) = read_env("WARDROBE_SCORING_DIVERSITY_THRESHOLD") {
            self.scoring.diversity_threshold =
                parse_f64("WARDROBE_SCORING_DIVERSITY_THRESHOLD", &value)?;
        }

        if let Some(value) = read_env("WARDROBE_RECENCY_WINDOW_DAYS") {
            self.recency.window_days = parse_i64("WARDROBE_RECENCY_WINDOW_DAYS", &value)?;
        }

        let log_level =
            read_env("WARDROBE_LOGGING_LEVEL").or_else(|| read_env("WARDROBE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("WARDROBE_LOGGING_FORMAT").or_else(|| read_env("WARDROBE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(max_outfits) = overrides.max_outfits {
            self.search.max_outfits = max_outfits;
        }
        if let Some(default_min_score) = overrides.default_min_score {
            self.scoring.default_min_score = default_min_score;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_search(&self.search)?;
        validate_scoring(&self.scoring)?;
        validate_recency(&self.recency)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_search(&self.search)?;
        validate_scoring(&self.scoring)?;
        validate_recency(&self.recency)?;
        Ok(())
    }
}

fn set<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from("config").join(DEFAULT_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn unit_interval(name: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!("{name} must be in range 0.0..=1.0")))
    }
}

fn validate_search(search: &SearchConfig) -> Result<(), ConfigError> {
    if search.max_depth == 0 {
        return Err(ConfigError::Validation(
            "search.max_depth must be greater than zero".to_string(),
        ));
    }
    if search.max_outfits == 0 {
        return Err(ConfigError::Validation(
            "search.max_outfits must be greater than zero".to_string(),
        ));
    }
    if search.max_items_per_category == 0 {
        return Err(ConfigError::Validation(
            "search.max_items_per_category must be greater than zero".to_string(),
        ));
    }
    if search.completing_fan_out == 0 {
        return Err(ConfigError::Validation(
            "search.completing_fan_out must be greater than zero".to_string(),
        ));
    }
    unit_interval("search.undergarment_threshold", search.undergarment_threshold)?;
    unit_interval("search.coordinating_threshold", search.coordinating_threshold)?;
    unit_interval("search.relaxed_score_margin", search.relaxed_score_margin)?;
    Ok(())
}

fn validate_scoring(scoring: &ScoringConfig) -> Result<(), ConfigError> {
    if scoring.weights.as_array().iter().any(|weight| *weight < 0.0) {
        return Err(ConfigError::Validation(
            "scoring.weights must all be non-negative".to_string(),
        ));
    }
    let sum = scoring.weights.sum();
    if (sum - 1.0).abs() > 0.01 {
        return Err(ConfigError::Validation(format!(
            "scoring.weights must sum to 1.0 (got {sum:.3})"
        )));
    }

    unit_interval("scoring.score_floor", scoring.score_floor)?;
    unit_interval("scoring.score_ceiling", scoring.score_ceiling)?;
    if scoring.score_floor >= scoring.score_ceiling {
        return Err(ConfigError::Validation(
            "scoring.score_floor must be below scoring.score_ceiling".to_string(),
        ));
    }

    unit_interval("scoring.default_min_score", scoring.default_min_score)?;
    unit_interval("scoring.neutral_weather_score", scoring.neutral_weather_score)?;
    unit_interval("scoring.missing_base_multiplier", scoring.missing_base_multiplier)?;
    unit_interval("scoring.missing_shoes_multiplier", scoring.missing_shoes_multiplier)?;
    unit_interval("scoring.diversity_threshold", scoring.diversity_threshold)?;

    if scoring.four_category_bonus < 1.0 || scoring.five_category_bonus < 1.0 {
        return Err(ConfigError::Validation(
            "scoring category bonuses must be at least 1.0".to_string(),
        ));
    }
    Ok(())
}

fn validate_recency(recency: &RecencyConfig) -> Result<(), ConfigError> {
    if recency.window_days <= 0 {
        return Err(ConfigError::Validation(
            "recency.window_days must be greater than zero".to_string(),
        ));
    }
    unit_interval("recency.near_duplicate_threshold", recency.near_duplicate_threshold)?;
    unit_interval("recency.variety_penalty", recency.variety_penalty)?;
    unit_interval("recency.repeat_penalty", recency.repeat_penalty)?;
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_i64(key: &str, value: &str) -> Result<i64, ConfigError> {
    value.trim().parse::<i64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.trim().parse::<f64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    search: Option<SearchPatch>,
    scoring: Option<ScoringPatch>,
    recency: Option<RecencyPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchPatch {
    max_depth: Option<usize>,
    max_outfits: Option<usize>,
    max_items_per_category: Option<usize>,
    completing_fan_out: Option<usize>,
    max_coordinating_items: Option<usize>,
    undergarment_threshold: Option<f64>,
    coordinating_threshold: Option<f64>,
    star_outfits_per_item: Option<usize>,
    challenge_pairings: Option<usize>,
    relaxed_score_margin: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct ScoringPatch {
    weights: Option<WeightsPatch>,
    score_floor: Option<f64>,
    score_ceiling: Option<f64>,
    default_min_score: Option<f64>,
    neutral_weather_score: Option<f64>,
    missing_base_multiplier: Option<f64>,
    missing_shoes_multiplier: Option<f64>,
    four_category_bonus: Option<f64>,
    five_category_bonus: Option<f64>,
    diversity_threshold: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct WeightsPatch {
    color_harmony: Option<f64>,
    style_matching: Option<f64>,
    occasion_suitability: Option<f64>,
    season_suitability: Option<f64>,
    weather_suitability: Option<f64>,
    user_preference: Option<f64>,
    variety: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct RecencyPatch {
    window_days: Option<i64>,
    near_duplicate_threshold: Option<f64>,
    variety_penalty: Option<f64>,
    repeat_penalty: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
