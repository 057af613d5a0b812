use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::item::{Category, ClothingItem, ItemId, Occasion, Season};
use crate::domain::weather::WeatherData;
use crate::errors::DomainError;

/// Caller style preference, every axis in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StylePreference {
    pub formality: f64,
    pub boldness: f64,
    pub layering: f64,
    pub colorfulness: f64,
}

impl Default for StylePreference {
    fn default() -> Self {
        Self { formality: 0.5, boldness: 0.5, layering: 0.5, colorfulness: 0.5 }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    pub occasion: Option<Occasion>,
    pub season: Option<Season>,
    pub weather: Option<WeatherData>,
    pub preferred_colors: Vec<String>,
    pub excluded_items: Vec<ItemId>,
    pub style_preference: Option<StylePreference>,
    pub force_include_items: Vec<ItemId>,
    pub max_results: Option<usize>,
    pub min_score: Option<f64>,
    pub use_all_items: bool,
}

impl GenerationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_occasion(mut self, occasion: Occasion) -> Self {
        self.occasion = Some(occasion);
        self
    }

    pub fn with_season(mut self, season: Season) -> Self {
        self.season = Some(season);
        self
    }

    pub fn with_weather(mut self, weather: WeatherData) -> Self {
        self.weather = Some(weather);
        self
    }

    pub fn with_preferred_colors<I, S>(mut self, colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preferred_colors = colors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_style_preference(mut self, preference: StylePreference) -> Self {
        self.style_preference = Some(preference);
        self
    }

    pub fn excluding(mut self, id: impl Into<String>) -> Self {
        self.excluded_items.push(ItemId(id.into()));
        self
    }

    pub fn forcing(mut self, id: impl Into<String>) -> Self {
        self.force_include_items.push(ItemId(id.into()));
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = Some(min_score);
        self
    }

    pub fn using_all_items(mut self) -> Self {
        self.use_all_items = true;
        self
    }

    /// Rejects options that no search could honor. Runs before any candidate is built.
    pub fn validate(&self, catalog: &[ClothingItem]) -> Result<(), DomainError> {
        if self.max_results == Some(0) {
            return Err(DomainError::InvalidOptions(
                "max_results must be greater than zero".to_string(),
            ));
        }

        if let Some(min_score) = self.min_score {
            if !(0.0..=1.0).contains(&min_score) {
                return Err(DomainError::InvalidOptions(format!(
                    "min_score must be in range 0..=1, got {min_score}"
                )));
            }
        }

        if let Some(preference) = &self.style_preference {
            let axes = [
                ("formality", preference.formality),
                ("boldness", preference.boldness),
                ("layering", preference.layering),
                ("colorfulness", preference.colorfulness),
            ];
            for (axis, value) in axes {
                if !(0.0..=1.0).contains(&value) {
                    return Err(DomainError::InvalidOptions(format!(
                        "style_preference.{axis} must be in range 0..=1, got {value}"
                    )));
                }
            }
        }

        let excluded: BTreeSet<&ItemId> = self.excluded_items.iter().collect();
        if let Some(conflict) = self.force_include_items.iter().find(|id| excluded.contains(id)) {
            return Err(DomainError::InvalidOptions(format!(
                "item `{conflict}` is both forced and excluded"
            )));
        }

        // Duplicate catalog ids resolve to their first occurrence, as in generation.
        let forced: BTreeSet<&ItemId> = self.force_include_items.iter().collect();
        let mut seen: BTreeSet<&ItemId> = BTreeSet::new();
        let forced_items: Vec<&ClothingItem> = catalog
            .iter()
            .filter(|item| seen.insert(&item.id) && forced.contains(&item.id))
            .collect();

        let mut forced_per_category: BTreeMap<Category, usize> = BTreeMap::new();
        for item in &forced_items {
            *forced_per_category.entry(item.category).or_insert(0) += 1;
        }
        for (category, count) in forced_per_category {
            let cap = if category.is_multi_item() { crate::outfits::MULTI_ITEM_CAP } else { 1 };
            if count > cap {
                return Err(DomainError::InvalidOptions(format!(
                    "{count} forced items share category `{category}` (at most {cap} allowed)"
                )));
            }
        }

        let forced_dress = forced_items.iter().any(|item| item.category == Category::Dresses);
        let forced_separates = forced_items
            .iter()
            .any(|item| matches!(item.category, Category::Tops | Category::Bottoms));
        if forced_dress && forced_separates {
            return Err(DomainError::InvalidOptions(
                "a forced dress cannot be combined with forced tops or bottoms".to_string(),
            ));
        }

        Ok(())
    }

    /// Fills the catalog-relative defaults.
    pub fn resolve(&self, catalog_size: usize, default_min_score: f64) -> ResolvedOptions {
        let max_results = self.max_results.unwrap_or_else(|| default_max_results(catalog_size));
        let max_results = if self.use_all_items {
            max_results.max(catalog_size.div_ceil(crate::outfits::ALL_ITEMS_COVERAGE_DIVISOR))
        } else {
            max_results
        };

        ResolvedOptions {
            max_results,
            min_score: self.min_score.unwrap_or(default_min_score),
            style_preference: self.style_preference.unwrap_or_default(),
        }
    }
}

/// Default result count grows with the catalog: half the items, between 5 and 30.
pub fn default_max_results(catalog_size: usize) -> usize {
    catalog_size.div_ceil(2).clamp(5, 30)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedOptions {
    pub max_results: usize,
    pub min_score: f64,
    pub style_preference: StylePreference,
}

#[cfg(test)]
mod tests {
    use super::{default_max_results, GenerationOptions, StylePreference};
    use crate::domain::item::{Category, ClothingItem};
    use crate::errors::DomainError;

    fn catalog() -> Vec<ClothingItem> {
        vec![
            ClothingItem::new("top", Category::Tops, "#ffffff"),
            ClothingItem::new("top-2", Category::Tops, "#eeeeee"),
            ClothingItem::new("dress", Category::Dresses, "#aa0000"),
            ClothingItem::new("bottom", Category::Bottoms, "#000000"),
        ]
    }

    #[test]
    fn zero_max_results_is_rejected() {
        let error = GenerationOptions::new().with_max_results(0).validate(&catalog());
        assert!(matches!(error, Err(DomainError::InvalidOptions(ref m)) if m.contains("max_results")));
    }

    #[test]
    fn min_score_must_be_a_unit_interval_value() {
        assert!(GenerationOptions::new().with_min_score(1.5).validate(&catalog()).is_err());
        assert!(GenerationOptions::new().with_min_score(0.7).validate(&catalog()).is_ok());
    }

    #[test]
    fn style_preference_axes_are_checked() {
        let options = GenerationOptions::new()
            .with_style_preference(StylePreference { boldness: -0.1, ..StylePreference::default() });
        let error = options.validate(&catalog());
        assert!(matches!(error, Err(DomainError::InvalidOptions(ref m)) if m.contains("boldness")));
    }

    #[test]
    fn forced_and_excluded_conflict_is_rejected() {
        let options = GenerationOptions::new().forcing("top").excluding("top");
        assert!(options.validate(&catalog()).is_err());
    }

    #[test]
    fn two_forced_tops_break_the_category_cap() {
        let options = GenerationOptions::new().forcing("top").forcing("top-2");
        let error = options.validate(&catalog());
        assert!(matches!(error, Err(DomainError::InvalidOptions(ref m)) if m.contains("tops")));
    }

    #[test]
    fn forced_dress_with_forced_bottom_is_rejected() {
        let options = GenerationOptions::new().forcing("dress").forcing("bottom");
        assert!(options.validate(&catalog()).is_err());
    }

    #[test]
    fn duplicate_catalog_ids_count_once_for_forced_caps() {
        let mut items = catalog();
        items.push(ClothingItem::new("top", Category::Tops, "#ffffff"));
        items.push(ClothingItem::new("bottom", Category::Dresses, "#000000"));

        let options = GenerationOptions::new().forcing("top").forcing("bottom");
        assert_eq!(options.validate(&items), Ok(()));
    }

    #[test]
    fn defaults_scale_with_catalog_size() {
        assert_eq!(default_max_results(2), 5);
        assert_eq!(default_max_results(21), 11);
        assert_eq!(default_max_results(500), 30);

        let resolved = GenerationOptions::new().resolve(20, 0.65);
        assert_eq!(resolved.max_results, 10);
        assert!((resolved.min_score - 0.65).abs() < f64::EPSILON);
    }

    #[test]
    fn all_items_mode_covers_a_third_of_the_catalog() {
        let resolved = GenerationOptions::new().with_max_results(3).using_all_items().resolve(30, 0.65);
        assert_eq!(resolved.max_results, 10);
    }
}
