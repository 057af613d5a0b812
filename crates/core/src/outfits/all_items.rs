//! Catalog-coverage strategy: every item gets a turn as the star piece

use std::collections::BTreeSet;

use crate::config::SearchConfig;
use crate::domain::item::{Category, ClothingItem, ItemId};
use crate::domain::outfit::OutfitKey;

use super::color::color_match_score;
use super::compatibility::is_compatible;
use super::generator::{CombinationGenerator, EssentialTier};
use super::scoring::{OutfitScorer, ScoredCandidate, ScoringContext};

#[derive(Debug, Default)]
pub(crate) struct CoverageOutcome<'a> {
    pub candidates: Vec<ScoredCandidate<'a>>,
    /// Minimum the ranker should apply; second-pass and challenge outfits sit at or above it.
    pub relaxed_min_score: f64,
    pub second_pass: usize,
    pub challenges: usize,
}

struct Coverage<'a, 'g> {
    scorer: &'g OutfitScorer,
    context: &'g ScoringContext<'g>,
    seen: BTreeSet<OutfitKey>,
    accepted: Vec<ScoredCandidate<'a>>,
}

impl<'a> Coverage<'a, '_> {
    fn score(&self, items: Vec<&'a ClothingItem>) -> ScoredCandidate<'a> {
        let score = self.scorer.score(&items, self.context);
        let key = OutfitKey::from_ids(items.iter().map(|item| &item.id));
        ScoredCandidate { key, items, score }
    }

    fn accept(&mut self, candidate: ScoredCandidate<'a>) -> bool {
        if !self.seen.insert(candidate.key.clone()) {
            return false;
        }
        self.accepted.push(candidate);
        true
    }

    fn used_ids(&self) -> BTreeSet<&'a ItemId> {
        self.accepted
            .iter()
            .flat_map(|candidate| candidate.items.iter().copied().map(|item| &item.id))
            .collect()
    }
}

/// Builds candidates so that most of `catalog` appears in at least one outfit.
pub(crate) fn generate_covering<'a>(
    generator: &CombinationGenerator<'a>,
    catalog: &[&'a ClothingItem],
    forced: &[&'a ClothingItem],
    search: &SearchConfig,
    scorer: &OutfitScorer,
    context: &ScoringContext<'_>,
    min_score: f64,
) -> CoverageOutcome<'a> {
    let relaxed_min_score = (min_score - search.relaxed_score_margin).max(0.0);
    let mut coverage =
        Coverage { scorer, context, seen: BTreeSet::new(), accepted: Vec::new() };
    let mut below_threshold: Vec<(&'a ItemId, Vec<ScoredCandidate<'a>>)> = Vec::new();

    for &star in catalog {
        let Some(pinned) = pin(forced, &[star]) else {
            continue;
        };
        let tiers = star_tiers(generator, star, &pinned);
        if tiers.is_empty() {
            continue;
        }

        let outcome = generator.generate(&pinned, &tiers, search.star_outfits_per_item);
        let mut rejected = Vec::new();
        for items in outcome.outfits {
            let candidate = coverage.score(items);
            if candidate.score.total >= min_score {
                coverage.accept(candidate);
            } else {
                rejected.push(candidate);
            }
        }
        below_threshold.push((&star.id, rejected));
    }

    let used = coverage.used_ids();
    let mut second_pass = 0;
    for (star_id, rejected) in below_threshold {
        if used.contains(star_id) {
            continue;
        }
        let best = rejected
            .into_iter()
            .filter(|candidate| candidate.score.total >= relaxed_min_score)
            .fold(None::<ScoredCandidate<'a>>, |best, candidate| match best {
                Some(current) if current.score.total >= candidate.score.total => Some(current),
                _ => Some(candidate),
            });
        if let Some(candidate) = best {
            if coverage.accept(candidate) {
                second_pass += 1;
            }
        }
    }

    let mut challenges = 0;
    for (top, bottom) in challenge_pairs(catalog, &coverage.accepted, search.challenge_pairings) {
        let Some(pinned) = pin(forced, &[top, bottom]) else {
            continue;
        };
        let outcome = generator.generate(&pinned, &[EssentialTier::Separates], 1);
        for items in outcome.outfits {
            let candidate = coverage.score(items);
            if candidate.score.total >= relaxed_min_score && coverage.accept(candidate) {
                challenges += 1;
            }
        }
    }

    tracing::debug!(
        event_name = "outfits.search.coverage",
        stars = catalog.len(),
        accepted = coverage.accepted.len(),
        second_pass,
        challenges,
        "all-items coverage pass finished"
    );

    CoverageOutcome { candidates: coverage.accepted, relaxed_min_score, second_pass, challenges }
}

/// `forced` plus `extra`, or `None` when an extra item would break a category cap.
fn pin<'a>(
    forced: &[&'a ClothingItem],
    extra: &[&'a ClothingItem],
) -> Option<Vec<&'a ClothingItem>> {
    let mut pinned = forced.to_vec();
    for item in extra {
        if pinned.iter().any(|existing| existing.id == item.id) {
            continue;
        }
        if !is_compatible(item, &pinned) {
            return None;
        }
        pinned.push(*item);
    }
    Some(pinned)
}

/// Dresses stand alone, separates need their counterpart, anything else prefers separates.
fn star_tiers(
    generator: &CombinationGenerator<'_>,
    star: &ClothingItem,
    pinned: &[&ClothingItem],
) -> Vec<EssentialTier> {
    let tiers = generator.essential_tiers(pinned);
    match star.category {
        Category::Dresses | Category::Tops | Category::Bottoms => tiers,
        _ if tiers.contains(&EssentialTier::Separates) => vec![EssentialTier::Separates],
        _ => tiers,
    }
}

/// Top and bottom pairs with the weakest color match that no accepted outfit already combines.
fn challenge_pairs<'a>(
    catalog: &[&'a ClothingItem],
    accepted: &[ScoredCandidate<'a>],
    limit: usize,
) -> Vec<(&'a ClothingItem, &'a ClothingItem)> {
    if limit == 0 {
        return Vec::new();
    }

    let together = |top: &ClothingItem, bottom: &ClothingItem| {
        accepted.iter().any(|candidate| {
            candidate.items.iter().any(|item| item.id == top.id)
                && candidate.items.iter().any(|item| item.id == bottom.id)
        })
    };

    let tops = catalog.iter().filter(|item| item.category == Category::Tops);
    let mut pairs: Vec<(f64, &'a ClothingItem, &'a ClothingItem)> = Vec::new();
    for top in tops {
        for bottom in catalog.iter().filter(|item| item.category == Category::Bottoms) {
            if together(top, bottom) {
                continue;
            }
            pairs.push((color_match_score(&top.color, &[bottom.color.as_str()]), *top, *bottom));
        }
    }

    pairs.sort_by(|left, right| {
        left.0.partial_cmp(&right.0).unwrap_or(std::cmp::Ordering::Equal)
    });
    pairs.into_iter().take(limit).map(|(_, top, bottom)| (top, bottom)).collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::generate_covering;
    use crate::config::{RecencyConfig, ScoringConfig, SearchConfig};
    use crate::domain::item::{Category, ClothingItem, ItemId};
    use crate::domain::options::{GenerationOptions, StylePreference};
    use crate::outfits::classifier::CategoryBuckets;
    use crate::outfits::generator::CombinationGenerator;
    use crate::outfits::recency::RecencyTracker;
    use crate::outfits::scoring::{OutfitScorer, ScoringContext};

    fn catalog() -> Vec<ClothingItem> {
        vec![
            ClothingItem::new("tee", Category::Tops, "#ffffff"),
            ClothingItem::new("shirt", Category::Tops, "#87ceeb"),
            ClothingItem::new("blouse", Category::Tops, "#ff1493"),
            ClothingItem::new("jeans", Category::Bottoms, "#1f3a93"),
            ClothingItem::new("skirt", Category::Bottoms, "#000000"),
            ClothingItem::new("sneakers", Category::Shoes, "#ffffff"),
            ClothingItem::new("loafers", Category::Shoes, "#000000"),
            ClothingItem::new("cap", Category::Hats, "#000000"),
            ClothingItem::new("scarf", Category::Scarves, "#808080"),
        ]
    }

    #[test]
    fn stars_cover_most_of_the_catalog() {
        let items = catalog();
        let refs: Vec<&ClothingItem> = items.iter().collect();
        let buckets = CategoryBuckets::classify(&items);
        let search = SearchConfig::default();
        let options = GenerationOptions::new().using_all_items();
        let generator =
            CombinationGenerator::new(&buckets, &search, &options, StylePreference::default());
        let scorer = OutfitScorer::new(ScoringConfig::default(), RecencyConfig::default());
        let tracker = RecencyTracker::new();
        let context = ScoringContext {
            options: &options,
            preference: StylePreference::default(),
            tracker: &tracker,
            now: Utc::now(),
        };

        let outcome = generate_covering(&generator, &refs, &[], &search, &scorer, &context, 0.0);

        let used: std::collections::BTreeSet<&ItemId> = outcome
            .candidates
            .iter()
            .flat_map(|candidate| candidate.items.iter().map(|item| &item.id))
            .collect();
        assert_eq!(used.len(), items.len());
        assert!((outcome.relaxed_min_score - 0.0).abs() < 1e-9);

        let mut keys: Vec<&str> =
            outcome.candidates.iter().map(|candidate| candidate.key.as_str()).collect();
        let before = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), before);
    }

    #[test]
    fn relaxed_minimum_is_margin_below_the_requested_one() {
        let items = catalog();
        let refs: Vec<&ClothingItem> = items.iter().collect();
        let buckets = CategoryBuckets::classify(&items);
        let search = SearchConfig::default();
        let options = GenerationOptions::new().using_all_items();
        let generator =
            CombinationGenerator::new(&buckets, &search, &options, StylePreference::default());
        let scorer = OutfitScorer::default();
        let tracker = RecencyTracker::new();
        let context = ScoringContext {
            options: &options,
            preference: StylePreference::default(),
            tracker: &tracker,
            now: Utc::now(),
        };

        let outcome = generate_covering(&generator, &refs, &[], &search, &scorer, &context, 0.8);

        assert!((outcome.relaxed_min_score - 0.65).abs() < 1e-9);
        assert!(outcome
            .candidates
            .iter()
            .all(|candidate| candidate.score.total >= outcome.relaxed_min_score));
    }
}
