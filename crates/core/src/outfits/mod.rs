//! Outfit generation and scoring engine
//!
//! Builds complete outfits from a flat wardrobe catalog with a bounded
//! backtracking search over category tiers, scores every candidate across
//! seven criteria, and ranks the survivors with a pairwise diversity filter.
//! The only state carried between calls is the [`RecencyTracker`].

mod all_items;
pub mod classifier;
pub mod color;
pub mod compatibility;
mod engine;
mod generator;
pub mod ranking;
pub mod recency;
pub mod scoring;
pub mod style;

pub use classifier::CategoryBuckets;
pub use color::{HarmonyAnalysis, HarmonyType, Hsl};
pub use engine::OutfitEngine;
pub use recency::RecencyTracker;
pub use scoring::{OutfitScorer, ScoringContext, ScoringWeights};

use crate::errors::DomainError;

/// Result type for outfit engine operations
pub type OutfitResult<T> = Result<T, DomainError>;

/// Default scoring weights
pub const DEFAULT_WEIGHTS: ScoringWeights = ScoringWeights {
    color_harmony: 0.25,
    style_matching: 0.20,
    occasion_suitability: 0.15,
    season_suitability: 0.15,
    weather_suitability: 0.10,
    user_preference: 0.08,
    variety: 0.07,
};

/// Maximum number of items of a single multi-item category in one outfit
pub const MULTI_ITEM_CAP: usize = 3;

/// In all-items mode at least `ceil(items / ALL_ITEMS_COVERAGE_DIVISOR)` outfits are returned
pub const ALL_ITEMS_COVERAGE_DIVISOR: usize = 3;

/// Fewer usable items than this yields an empty result
pub const MIN_USABLE_ITEMS: usize = 2;
