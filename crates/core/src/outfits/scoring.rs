//! Multi-factor outfit scoring

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{RecencyConfig, ScoringConfig};
use crate::domain::item::{Category, ClothingItem, Occasion, Season};
use crate::domain::options::{GenerationOptions, StylePreference};
use crate::domain::outfit::{OutfitKey, OutfitScore, ScoreBreakdown};
use crate::domain::weather::{TemperatureBand, WeatherCondition, WeatherData};

use super::color::{analyze_harmony, colors_are_close};
use super::compatibility::has_complete_base;
use super::recency::RecencyTracker;
use super::style::outfit_profile;

const LONG_SLEEVE_TAGS: &[&str] =
    &["long sleeve", "long-sleeve", "sweater", "knit", "hoodie", "turtleneck", "cardigan", "fleece"];
const LIGHT_TAGS: &[&str] =
    &["short sleeve", "short-sleeve", "tank", "linen", "shorts", "sleeveless", "breathable"];
const HEAVY_TAGS: &[&str] = &["wool", "down", "puffer", "heavy", "parka", "insulated"];
const WATER_RESISTANT_TAGS: &[&str] = &["waterproof", "water-resistant", "water resistant", "rain"];
const WIND_RESISTANT_TAGS: &[&str] = &["windproof", "wind-resistant", "windbreaker"];

/// Weights for scoring components
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Weight for color harmony (default: 0.25)
    pub color_harmony: f64,
    /// Weight for style matching (default: 0.20)
    pub style_matching: f64,
    /// Weight for occasion suitability (default: 0.15)
    pub occasion_suitability: f64,
    /// Weight for season suitability (default: 0.15)
    pub season_suitability: f64,
    /// Weight for weather suitability (default: 0.10)
    pub weather_suitability: f64,
    /// Weight for user color preference (default: 0.08)
    pub user_preference: f64,
    /// Weight for variety against recent outfits (default: 0.07)
    pub variety: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        super::DEFAULT_WEIGHTS
    }
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }

    pub fn as_array(&self) -> [f64; 7] {
        [
            self.color_harmony,
            self.style_matching,
            self.occasion_suitability,
            self.season_suitability,
            self.weather_suitability,
            self.user_preference,
            self.variety,
        ]
    }

    pub fn weighted_sum(&self, breakdown: &ScoreBreakdown) -> f64 {
        breakdown.color_harmony * self.color_harmony
            + breakdown.style_matching * self.style_matching
            + breakdown.occasion_suitability * self.occasion_suitability
            + breakdown.season_suitability * self.season_suitability
            + breakdown.weather_suitability * self.weather_suitability
            + breakdown.user_preference * self.user_preference
            + breakdown.variety * self.variety
    }
}

/// Per-call inputs the scorer reads but does not own.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub options: &'a GenerationOptions,
    pub preference: StylePreference,
    pub tracker: &'a RecencyTracker,
    pub now: DateTime<Utc>,
}

/// A generated item set with its key and score, before it becomes a [`GeneratedOutfit`].
///
/// [`GeneratedOutfit`]: crate::domain::outfit::GeneratedOutfit
#[derive(Debug, Clone)]
pub(crate) struct ScoredCandidate<'a> {
    pub key: OutfitKey,
    pub items: Vec<&'a ClothingItem>,
    pub score: OutfitScore,
}

/// Score calculator for outfit candidates
#[derive(Debug, Clone, Default)]
pub struct OutfitScorer {
    scoring: ScoringConfig,
    recency: RecencyConfig,
}

impl OutfitScorer {
    pub fn new(scoring: ScoringConfig, recency: RecencyConfig) -> Self {
        Self { scoring, recency }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.scoring
    }

    pub fn score(&self, items: &[&ClothingItem], context: &ScoringContext<'_>) -> OutfitScore {
        let key = OutfitKey::from_ids(items.iter().map(|item| &item.id));
        let options = context.options;
        let colors: Vec<&str> = items.iter().map(|item| item.color.as_str()).collect();

        let breakdown = ScoreBreakdown {
            color_harmony: analyze_harmony(&colors).score,
            style_matching: self.style_matching(items, &context.preference),
            occasion_suitability: occasion_suitability(items, options.occasion),
            season_suitability: season_suitability(items, options.season),
            weather_suitability: self.weather_suitability(items, options.weather.as_ref()),
            user_preference: user_preference(items, &options.preferred_colors),
            variety: 1.0 - context.tracker.near_duplicate_penalty(&key, context.now, &self.recency),
        };

        let weighted = self.scoring.weights.weighted_sum(&breakdown);
        let adjusted = (weighted * self.completeness_multiplier(items)).clamp(0.0, 1.0);
        let complete = has_complete_base(items);

        let distributed =
            if complete { self.distribute(adjusted) } else { adjusted * self.scoring.score_floor };
        let repeated = context.tracker.repeat_penalty(&key, context.now, &self.recency);
        let penalized = distributed * (1.0 - repeated);

        let total = if complete {
            penalized.clamp(self.scoring.score_floor, self.scoring.score_ceiling)
        } else {
            penalized.clamp(0.0, self.scoring.score_floor)
        };

        OutfitScore { total, breakdown }
    }

    pub fn style_matching(&self, items: &[&ClothingItem], preference: &StylePreference) -> f64 {
        let profile = outfit_profile(items);
        let formality_gap = (profile.formality - preference.formality).abs();
        let boldness_gap = (profile.boldness - preference.boldness).abs();
        (1.0 - (formality_gap + boldness_gap) / 2.0).clamp(0.0, 1.0)
    }

    /// Temperature, precipitation and wind sub-scores weighted 0.6 / 0.3 / 0.1.
    pub fn weather_suitability(
        &self,
        items: &[&ClothingItem],
        weather: Option<&WeatherData>,
    ) -> f64 {
        let Some(weather) = weather else {
            return self.scoring.neutral_weather_score;
        };

        let temperature = temperature_score(items, weather);
        let precipitation = precipitation_score(items, weather);
        let wind = wind_score(items, weather);

        (0.6 * temperature + 0.3 * precipitation + 0.1 * wind).clamp(0.0, 1.0)
    }

    pub fn completeness_multiplier(&self, items: &[&ClothingItem]) -> f64 {
        let mut multiplier = 1.0;
        if !has_complete_base(items) {
            multiplier *= self.scoring.missing_base_multiplier;
        }
        if !items.iter().any(|item| item.category == Category::Shoes) {
            multiplier *= self.scoring.missing_shoes_multiplier;
        }

        let mut categories: Vec<Category> = items.iter().map(|item| item.category).collect();
        categories.sort_unstable();
        categories.dedup();
        if categories.len() >= 5 {
            multiplier *= self.scoring.five_category_bonus;
        } else if categories.len() >= 4 {
            multiplier *= self.scoring.four_category_bonus;
        }

        multiplier
    }

    /// Spreads raw weighted scores, which cluster between roughly 0.6 and 0.9,
    /// across the configured output range.
    pub fn distribute(&self, adjusted: f64) -> f64 {
        let normalized = ((adjusted - 0.3) / 0.75).clamp(0.0, 1.0);
        let smooth = normalized * normalized * (3.0 - 2.0 * normalized);
        let curve = 0.5 * normalized + 0.5 * smooth;
        self.scoring.score_floor + (self.scoring.score_ceiling - self.scoring.score_floor) * curve
    }
}

fn fraction(items: &[&ClothingItem], predicate: impl Fn(&ClothingItem) -> bool) -> f64 {
    if items.is_empty() {
        return 0.0;
    }
    items.iter().filter(|item| predicate(item)).count() as f64 / items.len() as f64
}

pub fn occasion_suitability(items: &[&ClothingItem], occasion: Option<Occasion>) -> f64 {
    match occasion {
        Some(occasion) => fraction(items, |item| item.occasion.contains(&occasion)),
        None => 1.0,
    }
}

pub fn season_suitability(items: &[&ClothingItem], season: Option<Season>) -> f64 {
    match season {
        Some(season) => fraction(items, |item| item.season.contains(&season)),
        None => 1.0,
    }
}

pub fn user_preference(items: &[&ClothingItem], preferred_colors: &[String]) -> f64 {
    if preferred_colors.is_empty() {
        return 1.0;
    }
    fraction(items, |item| {
        preferred_colors.iter().any(|preferred| colors_are_close(&item.color, preferred))
    })
}

fn temperature_score(items: &[&ClothingItem], weather: &WeatherData) -> f64 {
    let outerwear = items.iter().any(|item| item.category == Category::Outerwear);
    let heavy_outerwear = items
        .iter()
        .any(|item| item.category == Category::Outerwear && item.has_any_tag_like(HEAVY_TAGS));
    let long_sleeves = items.iter().any(|item| item.has_any_tag_like(LONG_SLEEVE_TAGS));
    let light = items.iter().any(|item| {
        item.has_any_tag_like(LIGHT_TAGS)
            || matches!(item.category, Category::Dresses | Category::Swimwear)
    });

    let score: f64 = match weather.band() {
        TemperatureBand::VeryCold => match (outerwear, long_sleeves) {
            (true, true) => 1.0,
            (true, false) => 0.7,
            (false, true) => 0.3,
            (false, false) => 0.1,
        },
        TemperatureBand::Cold => {
            if outerwear {
                1.0
            } else if long_sleeves {
                0.5
            } else {
                0.2
            }
        }
        TemperatureBand::Cool => {
            if outerwear || long_sleeves {
                1.0
            } else {
                0.6
            }
        }
        TemperatureBand::Mild => {
            if heavy_outerwear {
                0.7
            } else {
                1.0
            }
        }
        TemperatureBand::Warm => {
            if outerwear {
                0.5
            } else if long_sleeves {
                0.7
            } else {
                1.0
            }
        }
        TemperatureBand::Hot => {
            if outerwear {
                0.2
            } else if long_sleeves {
                0.5
            } else if light {
                1.0
            } else {
                0.8
            }
        }
    };

    let muggy = matches!(weather.band(), TemperatureBand::Warm | TemperatureBand::Hot)
        && weather.humidity >= 0.7
        && !light;
    if muggy {
        score * 0.9
    } else {
        score
    }
}

fn precipitation_score(items: &[&ClothingItem], weather: &WeatherData) -> f64 {
    let resistant = items.iter().any(|item| item.has_any_tag_like(WATER_RESISTANT_TAGS));
    let outerwear = items.iter().any(|item| item.category == Category::Outerwear);

    if weather.expects_precipitation() {
        if resistant {
            1.0
        } else if outerwear {
            0.6
        } else {
            0.3
        }
    } else if weather.precipitation_probability >= 0.2 {
        if resistant {
            1.0
        } else {
            0.8
        }
    } else {
        1.0
    }
}

fn wind_score(items: &[&ClothingItem], weather: &WeatherData) -> f64 {
    let resistant = items.iter().any(|item| item.has_any_tag_like(WIND_RESISTANT_TAGS));
    let outerwear = items.iter().any(|item| item.category == Category::Outerwear);
    let windy = weather.wind_speed_kmh >= 30.0
        || weather.condition == WeatherCondition::Windy;

    if windy {
        if resistant {
            1.0
        } else if outerwear {
            0.8
        } else {
            0.5
        }
    } else if weather.wind_speed_kmh >= 15.0 {
        if resistant || outerwear {
            1.0
        } else {
            0.85
        }
    } else {
        1.0
    }
}
