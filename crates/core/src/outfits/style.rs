//! Item formality/boldness profiles and outfit style inference

use crate::domain::item::{Category, ClothingItem, Occasion};
use crate::domain::outfit::OutfitStyle;

const BOLD_TAGS: &[&str] =
    &["bold", "statement", "bright", "neon", "sequin", "animal", "graphic", "metallic", "print"];
const CONSERVATIVE_TAGS: &[&str] =
    &["classic", "basic", "minimal", "neutral", "conservative", "plain", "simple"];

const FORMAL_TAGS: &[&str] = &["formal", "evening", "tuxedo", "gown", "black tie", "cocktail"];
const BUSINESS_TAGS: &[&str] = &["business", "office", "blazer", "tailored", "suit"];
const PARTY_TAGS: &[&str] = &["party", "club", "sequin", "glitter", "festive"];
const ATHLETIC_TAGS: &[&str] = &["athletic", "gym", "running", "sport", "training", "yoga"];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StyleProfile {
    pub formality: f64,
    pub boldness: f64,
}

fn base_formality(category: Category) -> f64 {
    match category {
        Category::Dresses | Category::Outerwear | Category::Jewelry => 0.6,
        Category::Hats => 0.3,
        Category::Activewear | Category::Swimwear => 0.1,
        Category::Sleepwear => 0.05,
        _ => 0.5,
    }
}

fn base_boldness(category: Category) -> f64 {
    match category {
        Category::Jewelry | Category::Hats => 0.6,
        Category::Dresses | Category::Scarves | Category::Accessories => 0.5,
        _ => 0.4,
    }
}

pub fn item_profile(item: &ClothingItem) -> StyleProfile {
    let mut formality = base_formality(item.category);
    for occasion in &item.occasion {
        formality += match occasion {
            Occasion::Formal => 0.3,
            Occasion::Work => 0.2,
            Occasion::Casual => -0.2,
            Occasion::Sport => -0.3,
            _ => 0.0,
        };
    }

    let mut boldness = base_boldness(item.category);
    let bold_hits = BOLD_TAGS.iter().filter(|tag| item.has_tag_like(tag)).count();
    let conservative_hits = CONSERVATIVE_TAGS.iter().filter(|tag| item.has_tag_like(tag)).count();
    boldness += 0.2 * bold_hits.min(2) as f64;
    boldness -= 0.15 * conservative_hits.min(2) as f64;

    StyleProfile { formality: formality.clamp(0.0, 1.0), boldness: boldness.clamp(0.0, 1.0) }
}

/// Mean profile of the outfit; a neutral midpoint for an empty slice.
pub fn outfit_profile(items: &[&ClothingItem]) -> StyleProfile {
    if items.is_empty() {
        return StyleProfile { formality: 0.5, boldness: 0.5 };
    }

    let (formality, boldness) = items.iter().map(|item| item_profile(item)).fold(
        (0.0, 0.0),
        |(formality, boldness), profile| {
            (formality + profile.formality, boldness + profile.boldness)
        },
    );
    let count = items.len() as f64;
    StyleProfile { formality: formality / count, boldness: boldness / count }
}

/// Votes across item occasions and tags. Ties resolve toward the more formal style.
pub fn infer_style(items: &[&ClothingItem]) -> OutfitStyle {
    let mut votes = [0usize; 5];
    for item in items {
        for occasion in &item.occasion {
            match occasion {
                Occasion::Formal | Occasion::Special => votes[0] += 1,
                Occasion::Work => votes[1] += 1,
                Occasion::Party | Occasion::Date => votes[2] += 1,
                Occasion::Sport => votes[3] += 1,
                Occasion::Casual | Occasion::Travel => votes[4] += 1,
            }
        }
        if item.has_any_tag_like(FORMAL_TAGS) {
            votes[0] += 1;
        }
        if item.has_any_tag_like(BUSINESS_TAGS) {
            votes[1] += 1;
        }
        if item.has_any_tag_like(PARTY_TAGS) {
            votes[2] += 1;
        }
        if item.has_any_tag_like(ATHLETIC_TAGS) || item.category == Category::Activewear {
            votes[3] += 1;
        }
    }

    let styles = [
        OutfitStyle::Formal,
        OutfitStyle::Business,
        OutfitStyle::Party,
        OutfitStyle::Athletic,
        OutfitStyle::Casual,
    ];

    let mut best = (OutfitStyle::Casual, 0usize);
    for (style, count) in styles.into_iter().zip(votes) {
        if count > best.1 {
            best = (style, count);
        }
    }
    best.0
}

/// Coordinating categories in the order a given style reaches for them.
pub fn coordinating_priority(style: OutfitStyle) -> &'static [Category] {
    match style {
        OutfitStyle::Formal => &[
            Category::Jewelry,
            Category::Bags,
            Category::Belts,
            Category::Scarves,
            Category::Outerwear,
            Category::Hats,
        ],
        OutfitStyle::Business => &[
            Category::Belts,
            Category::Bags,
            Category::Jewelry,
            Category::Outerwear,
            Category::Scarves,
            Category::Hats,
        ],
        OutfitStyle::Party => &[
            Category::Jewelry,
            Category::Bags,
            Category::Hats,
            Category::Belts,
            Category::Scarves,
            Category::Outerwear,
        ],
        OutfitStyle::Athletic => &[Category::Hats, Category::Bags, Category::Outerwear],
        OutfitStyle::Casual => &[
            Category::Hats,
            Category::Bags,
            Category::Scarves,
            Category::Belts,
            Category::Jewelry,
            Category::Outerwear,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::{coordinating_priority, infer_style, item_profile, outfit_profile};
    use crate::domain::item::{Category, ClothingItem, Occasion};
    use crate::domain::outfit::OutfitStyle;

    #[test]
    fn work_occasion_raises_formality() {
        let plain = ClothingItem::new("t1", Category::Tops, "#ffffff");
        let work = plain.clone().with_occasions([Occasion::Work]);

        assert!((item_profile(&plain).formality - 0.5).abs() < 1e-9);
        assert!((item_profile(&work).formality - 0.7).abs() < 1e-9);
    }

    #[test]
    fn sport_and_casual_push_formality_down_to_zero() {
        let item = ClothingItem::new("a1", Category::Activewear, "#ffffff")
            .with_occasions([Occasion::Sport, Occasion::Casual]);
        assert_eq!(item_profile(&item).formality, 0.0);
    }

    #[test]
    fn bold_tags_raise_and_classic_tags_lower_boldness() {
        let bold = ClothingItem::new("t1", Category::Tops, "#ff00ff").with_tags(["Neon", "graphic"]);
        let classic = ClothingItem::new("t2", Category::Tops, "#ffffff").with_tags(["classic"]);

        assert!(item_profile(&bold).boldness > 0.7);
        assert!(item_profile(&classic).boldness < 0.3);
    }

    #[test]
    fn outfit_profile_is_the_mean() {
        let formal = ClothingItem::new("d1", Category::Dresses, "#000000")
            .with_occasions([Occasion::Formal]);
        let casual = ClothingItem::new("s1", Category::Shoes, "#ffffff")
            .with_occasions([Occasion::Casual]);

        let profile = outfit_profile(&[&formal, &casual]);
        assert!((profile.formality - 0.6).abs() < 1e-9);
    }

    #[test]
    fn infers_business_from_work_occasions() {
        let top = ClothingItem::new("t1", Category::Tops, "#ffffff").with_occasions([Occasion::Work]);
        let bottom =
            ClothingItem::new("b1", Category::Bottoms, "#000000").with_tags(["tailored"]);

        assert_eq!(infer_style(&[&top, &bottom]), OutfitStyle::Business);
    }

    #[test]
    fn defaults_to_casual_without_signals() {
        let top = ClothingItem::new("t1", Category::Tops, "#ffffff");
        assert_eq!(infer_style(&[&top]), OutfitStyle::Casual);
    }

    #[test]
    fn athletic_priorities_skip_jewelry() {
        assert!(!coordinating_priority(OutfitStyle::Athletic).contains(&Category::Jewelry));
        assert_eq!(coordinating_priority(OutfitStyle::Formal)[0], Category::Jewelry);
    }
}
