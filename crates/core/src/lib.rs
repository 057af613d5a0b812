pub mod config;
pub mod domain;
pub mod errors;
pub mod outfits;

pub use config::{AppConfig, EngineConfig};
pub use domain::item::{Category, ClothingItem, ItemId, Occasion, Season};
pub use domain::options::{GenerationOptions, StylePreference};
pub use domain::outfit::{
    create_outfit, GeneratedOutfit, Outfit, OutfitKey, OutfitScore, OutfitStyle, ScoreBreakdown,
};
pub use domain::weather::{WeatherCondition, WeatherData};
pub use errors::{ApplicationError, DomainError};
pub use outfits::{OutfitEngine, OutfitResult, RecencyTracker};
