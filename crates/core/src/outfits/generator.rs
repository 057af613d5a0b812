//! Bounded backtracking over essential, completing and coordinating tiers

use std::collections::BTreeSet;

use crate::config::SearchConfig;
use crate::domain::item::{
    Category, ClothingItem, COORDINATING_CATEGORIES, UNDERGARMENT_CATEGORIES,
};
use crate::domain::options::{GenerationOptions, StylePreference};
use crate::domain::outfit::OutfitKey;
use crate::domain::weather::TemperatureBand;

use super::classifier::CategoryBuckets;
use super::color::{color_match_score, hex_to_hsl};
use super::compatibility::{has_complete_base, is_compatible};
use super::style::{coordinating_priority, infer_style};

/// Which base an outfit is built around.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EssentialTier {
    Dress,
    Separates,
}

impl EssentialTier {
    fn categories(self) -> &'static [Category] {
        match self {
            Self::Dress => &[Category::Dresses],
            Self::Separates => &[Category::Tops, Category::Bottoms],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Category(Category),
    Accessory,
}

#[derive(Clone, Copy, Debug)]
struct PlannedSlot {
    slot: Slot,
    completing: bool,
}

#[derive(Debug, Default)]
pub(crate) struct SearchOutcome<'a> {
    pub outfits: Vec<Vec<&'a ClothingItem>>,
    pub depth_capped: bool,
    pub output_capped: bool,
    pub rejected_incomplete: usize,
    pub duplicates: usize,
}

struct SearchState<'a> {
    outcome: SearchOutcome<'a>,
    seen: BTreeSet<OutfitKey>,
    limit: usize,
}

impl SearchState<'_> {
    fn is_full(&self) -> bool {
        self.outcome.outfits.len() >= self.limit
    }
}

pub(crate) struct CombinationGenerator<'a> {
    buckets: &'a CategoryBuckets<'a>,
    search: &'a SearchConfig,
    options: &'a GenerationOptions,
    preference: StylePreference,
}

impl<'a> CombinationGenerator<'a> {
    pub fn new(
        buckets: &'a CategoryBuckets<'a>,
        search: &'a SearchConfig,
        options: &'a GenerationOptions,
        preference: StylePreference,
    ) -> Self {
        Self { buckets, search, options, preference }
    }

    /// Essential alternatives to search, dress branch first. Forced base items pin the branch.
    pub fn essential_tiers(&self, forced: &[&ClothingItem]) -> Vec<EssentialTier> {
        let has_separates =
            self.buckets.has(Category::Tops) && self.buckets.has(Category::Bottoms);

        if forced.iter().any(|item| item.category == Category::Dresses) {
            return vec![EssentialTier::Dress];
        }
        if forced.iter().any(|item| matches!(item.category, Category::Tops | Category::Bottoms)) {
            return if has_separates { vec![EssentialTier::Separates] } else { Vec::new() };
        }

        let mut tiers = Vec::with_capacity(2);
        if self.buckets.has(Category::Dresses) {
            tiers.push(EssentialTier::Dress);
        }
        if has_separates {
            tiers.push(EssentialTier::Separates);
        }
        tiers
    }

    /// Produces up to `limit` complete, de-duplicated outfits that all contain `forced`.
    pub fn generate(
        &self,
        forced: &[&'a ClothingItem],
        tiers: &[EssentialTier],
        limit: usize,
    ) -> SearchOutcome<'a> {
        let mut state =
            SearchState { outcome: SearchOutcome::default(), seen: BTreeSet::new(), limit };

        for tier in tiers {
            if state.is_full() {
                state.outcome.output_capped = true;
                break;
            }

            let slots = self.plan(*tier, forced);
            let before = state.outcome.outfits.len();
            let mut current: Vec<&'a ClothingItem> = forced.to_vec();
            self.backtrack(&slots, 0, &mut current, &mut state);

            tracing::debug!(
                event_name = "outfits.search.tier",
                tier = ?tier,
                slots = slots.len(),
                produced = state.outcome.outfits.len() - before,
                "essential tier searched"
            );
        }

        state.outcome
    }

    fn plan(&self, tier: EssentialTier, forced: &[&ClothingItem]) -> Vec<PlannedSlot> {
        let forced_has = |category: Category| forced.iter().any(|item| item.category == category);
        let mut slots: Vec<PlannedSlot> = tier
            .categories()
            .iter()
            .filter(|category| !forced_has(**category))
            .map(|category| PlannedSlot { slot: Slot::Category(*category), completing: false })
            .collect();

        if self.buckets.has(Category::Shoes) && !forced_has(Category::Shoes) {
            slots.push(PlannedSlot { slot: Slot::Category(Category::Shoes), completing: true });
        }

        let accessory_forced = forced.iter().any(|item| item.category.is_accessory_like());
        if !self.buckets.accessory_slot().is_empty() && !accessory_forced {
            slots.push(PlannedSlot { slot: Slot::Accessory, completing: true });
        }

        slots
    }

    fn backtrack(
        &self,
        slots: &[PlannedSlot],
        index: usize,
        current: &mut Vec<&'a ClothingItem>,
        state: &mut SearchState<'a>,
    ) {
        if state.is_full() {
            state.outcome.output_capped = true;
            return;
        }

        if index == slots.len() {
            self.finalize(current, state);
            return;
        }

        if index >= self.search.max_depth {
            state.outcome.depth_capped = true;
            return;
        }

        let candidates = self.slot_candidates(slots[index], current);
        if candidates.is_empty() {
            self.backtrack(slots, index + 1, current, state);
            return;
        }

        for candidate in candidates {
            current.push(candidate);
            self.backtrack(slots, index + 1, current, state);
            current.pop();

            if state.is_full() {
                state.outcome.output_capped = true;
                return;
            }
        }
    }

    fn slot_candidates(
        &self,
        planned: PlannedSlot,
        current: &[&'a ClothingItem],
    ) -> Vec<&'a ClothingItem> {
        let pool: Vec<&'a ClothingItem> = match planned.slot {
            Slot::Category(category) => self.buckets.get(category).to_vec(),
            Slot::Accessory => self.buckets.accessory_slot(),
        };
        let colors: Vec<&str> = current.iter().map(|item| item.color.as_str()).collect();

        let mut candidates: Vec<&'a ClothingItem> = pool
            .iter()
            .take(self.search.max_items_per_category)
            .filter(|item| is_compatible(item, current))
            .copied()
            .collect();

        if candidates.is_empty() {
            let fallback = pool.iter().filter(|item| is_compatible(item, current)).copied();
            return best_by(fallback, |item| color_match_score(&item.color, &colors))
                .map(|(item, _)| item)
                .into_iter()
                .collect();
        }

        if planned.completing {
            let mut scored: Vec<(f64, &'a ClothingItem)> = candidates
                .into_iter()
                .map(|item| (color_match_score(&item.color, &colors), item))
                .collect();
            scored.sort_by(|left, right| {
                right.0.partial_cmp(&left.0).unwrap_or(std::cmp::Ordering::Equal)
            });
            candidates = scored
                .into_iter()
                .take(self.search.completing_fan_out)
                .map(|(_, item)| item)
                .collect();
        }

        candidates
    }

    fn finalize(&self, base: &[&'a ClothingItem], state: &mut SearchState<'a>) {
        let mut items = base.to_vec();
        self.add_undergarments(&mut items);
        self.add_coordinating(&mut items);

        if !self.is_complete(&items) {
            state.outcome.rejected_incomplete += 1;
            return;
        }

        let key = OutfitKey::from_ids(items.iter().map(|item| &item.id));
        if !state.seen.insert(key) {
            state.outcome.duplicates += 1;
            return;
        }

        items.sort_by_key(|item| item.category);
        state.outcome.outfits.push(items);
    }

    /// Base, shoes when the catalog has shoes, and an accessory when the catalog has one.
    pub fn is_complete(&self, items: &[&ClothingItem]) -> bool {
        if !has_complete_base(items) {
            return false;
        }
        if self.buckets.has(Category::Shoes)
            && !items.iter().any(|item| item.category == Category::Shoes)
        {
            return false;
        }
        if !self.buckets.accessory_slot().is_empty()
            && !items.iter().any(|item| item.category.is_accessory_like())
        {
            return false;
        }
        true
    }

    fn add_undergarments(&self, items: &mut Vec<&'a ClothingItem>) {
        for category in UNDERGARMENT_CATEGORIES {
            let picked = {
                let current: &[&'a ClothingItem] = items;
                let present = |wanted: Category| current.iter().any(|item| item.category == wanted);
                if category == Category::Socks && !present(Category::Shoes) {
                    continue;
                }
                if category == Category::Tights && !present(Category::Dresses) {
                    continue;
                }

                let colors: Vec<&str> = current.iter().map(|item| item.color.as_str()).collect();
                let candidates = self
                    .buckets
                    .get(category)
                    .iter()
                    .take(self.search.max_items_per_category)
                    .filter(|item| is_compatible(item, current))
                    .copied();
                best_by(candidates, |item| {
                    0.7 * color_match_score(&item.color, &colors) + 0.3 * self.context_fit(item)
                })
            };

            if let Some((item, score)) = picked {
                if score >= self.search.undergarment_threshold {
                    items.push(item);
                }
            }
        }
    }

    fn add_coordinating(&self, items: &mut Vec<&'a ClothingItem>) {
        if self.search.max_coordinating_items == 0 {
            return;
        }

        let style = infer_style(items);
        let priority = coordinating_priority(style);
        let colors: Vec<&str> = items.iter().map(|item| item.color.as_str()).collect();

        let mut ranked: Vec<(f64, &'a ClothingItem)> = Vec::new();
        for category in COORDINATING_CATEGORIES {
            let priority_score = priority
                .iter()
                .position(|candidate| *candidate == category)
                .map(|index| 1.0 - index as f64 * 0.12)
                .unwrap_or(0.3);

            for item in self.buckets.get(category).iter().take(self.search.max_items_per_category)
            {
                if !is_compatible(item, items) {
                    continue;
                }
                let score = 0.5 * priority_score
                    + 0.4 * color_match_score(&item.color, &colors)
                    + 0.1 * self.context_fit(item)
                    + self.coordinating_adjustment(item);
                ranked.push((score, *item));
            }
        }

        ranked.sort_by(|left, right| {
            right.0.partial_cmp(&left.0).unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut added = 0;
        for (score, item) in ranked {
            if added >= self.search.max_coordinating_items {
                break;
            }
            if score < self.search.coordinating_threshold || !is_compatible(item, items) {
                continue;
            }
            items.push(item);
            added += 1;
        }
    }

    fn coordinating_adjustment(&self, item: &ClothingItem) -> f64 {
        let mut adjustment = 0.0;

        if item.category == Category::Outerwear {
            let weather = self.options.weather.as_ref();
            let wants_layer = weather.is_some_and(|w| w.is_chilly() || w.expects_precipitation())
                || self.preference.layering >= 0.6;
            if wants_layer {
                adjustment += 0.25;
            }
            let too_warm = weather
                .is_some_and(|w| matches!(w.band(), TemperatureBand::Warm | TemperatureBand::Hot));
            if too_warm {
                adjustment -= 0.2;
            }
        }

        let neutral = hex_to_hsl(&item.color).is_neutral();
        if self.preference.colorfulness >= 0.6 && !neutral {
            adjustment += 0.05;
        } else if self.preference.colorfulness <= 0.3 && neutral {
            adjustment += 0.05;
        }

        adjustment
    }

    /// How well an item suits the requested occasion and season, in [0, 1].
    fn context_fit(&self, item: &ClothingItem) -> f64 {
        let occasion = set_fit(&item.occasion, self.options.occasion);
        let season = set_fit(&item.season, self.options.season);
        (occasion + season) / 2.0
    }
}

fn set_fit<T: Ord + Copy>(values: &BTreeSet<T>, wanted: Option<T>) -> f64 {
    match wanted {
        None => 1.0,
        Some(wanted) if values.contains(&wanted) => 1.0,
        Some(_) if values.is_empty() => 0.7,
        Some(_) => 0.3,
    }
}

/// Highest-scoring item with its score; the earliest wins ties.
fn best_by<'a>(
    items: impl Iterator<Item = &'a ClothingItem>,
    score: impl Fn(&ClothingItem) -> f64,
) -> Option<(&'a ClothingItem, f64)> {
    let mut best: Option<(&'a ClothingItem, f64)> = None;
    for item in items {
        let value = score(item);
        if best.map_or(true, |(_, current)| value > current) {
            best = Some((item, value));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::{CombinationGenerator, EssentialTier};
    use crate::config::SearchConfig;
    use crate::domain::item::{Category, ClothingItem};
    use crate::domain::options::{GenerationOptions, StylePreference};
    use crate::outfits::classifier::CategoryBuckets;
    use crate::outfits::compatibility::respects_category_caps;

    fn item(id: &str, category: Category, color: &str) -> ClothingItem {
        ClothingItem::new(id, category, color)
    }

    fn catalog() -> Vec<ClothingItem> {
        vec![
            item("top-white", Category::Tops, "#ffffff"),
            item("top-navy", Category::Tops, "#000080"),
            item("jeans", Category::Bottoms, "#1f3a93"),
            item("chinos", Category::Bottoms, "#c3b091"),
            item("sneakers", Category::Shoes, "#ffffff"),
            item("boots", Category::Shoes, "#5c4033"),
            item("watch", Category::Accessories, "#c0c0c0"),
            item("socks", Category::Socks, "#ffffff"),
            item("tote", Category::Bags, "#000000"),
        ]
    }

    #[test]
    fn every_outfit_is_complete_and_within_caps() {
        let items = catalog();
        let buckets = CategoryBuckets::classify(&items);
        let search = SearchConfig::default();
        let options = GenerationOptions::new();
        let generator =
            CombinationGenerator::new(&buckets, &search, &options, StylePreference::default());

        let tiers = generator.essential_tiers(&[]);
        assert_eq!(tiers, vec![EssentialTier::Separates]);

        let outcome = generator.generate(&[], &tiers, 100);
        assert!(!outcome.outfits.is_empty());
        for outfit in &outcome.outfits {
            assert!(generator.is_complete(outfit));
            assert!(respects_category_caps(outfit));
            assert!(outfit.iter().any(|item| item.category == Category::Shoes));
            assert!(outfit.iter().any(|item| item.id.as_str() == "watch"));
        }
    }

    #[test]
    fn socks_join_outfits_that_have_shoes() {
        let items = catalog();
        let buckets = CategoryBuckets::classify(&items);
        let search = SearchConfig::default();
        let options = GenerationOptions::new();
        let generator =
            CombinationGenerator::new(&buckets, &search, &options, StylePreference::default());

        let outcome = generator.generate(&[], &[EssentialTier::Separates], 100);
        assert!(outcome
            .outfits
            .iter()
            .all(|outfit| outfit.iter().any(|item| item.category == Category::Socks)));
    }

    #[test]
    fn output_cap_is_a_hard_stop() {
        let items = catalog();
        let buckets = CategoryBuckets::classify(&items);
        let search = SearchConfig::default();
        let options = GenerationOptions::new();
        let generator =
            CombinationGenerator::new(&buckets, &search, &options, StylePreference::default());

        let outcome = generator.generate(&[], &[EssentialTier::Separates], 2);
        assert_eq!(outcome.outfits.len(), 2);
        assert!(outcome.output_capped);
    }

    #[test]
    fn forced_items_appear_in_every_outfit() {
        let items = catalog();
        let buckets = CategoryBuckets::classify(&items);
        let search = SearchConfig::default();
        let options = GenerationOptions::new();
        let generator =
            CombinationGenerator::new(&buckets, &search, &options, StylePreference::default());

        let chinos = &items[3];
        let tiers = generator.essential_tiers(&[chinos]);
        let outcome = generator.generate(&[chinos], &tiers, 100);

        assert!(!outcome.outfits.is_empty());
        assert!(outcome
            .outfits
            .iter()
            .all(|outfit| outfit.iter().any(|item| item.id.as_str() == "chinos")));
        assert!(outcome
            .outfits
            .iter()
            .all(|outfit| outfit.iter().all(|item| item.id.as_str() != "jeans")));
    }

    #[test]
    fn dress_and_separates_are_both_searched() {
        let mut items = catalog();
        items.push(item("dress", Category::Dresses, "#800020"));
        let buckets = CategoryBuckets::classify(&items);
        let search = SearchConfig::default();
        let options = GenerationOptions::new();
        let generator =
            CombinationGenerator::new(&buckets, &search, &options, StylePreference::default());

        let tiers = generator.essential_tiers(&[]);
        assert_eq!(tiers, vec![EssentialTier::Dress, EssentialTier::Separates]);

        let outcome = generator.generate(&[], &tiers, 100);
        let with_dress = outcome
            .outfits
            .iter()
            .filter(|outfit| outfit.iter().any(|item| item.category == Category::Dresses))
            .count();
        assert!(with_dress > 0);
        assert!(with_dress < outcome.outfits.len());
    }

    #[test]
    fn items_are_presented_in_category_order() {
        let items = catalog();
        let buckets = CategoryBuckets::classify(&items);
        let search = SearchConfig::default();
        let options = GenerationOptions::new();
        let generator =
            CombinationGenerator::new(&buckets, &search, &options, StylePreference::default());

        let outcome = generator.generate(&[], &[EssentialTier::Separates], 10);
        for outfit in &outcome.outfits {
            let categories: Vec<Category> = outfit.iter().map(|item| item.category).collect();
            let mut sorted = categories.clone();
            sorted.sort();
            assert_eq!(categories, sorted);
        }
    }

    #[test]
    fn tops_without_bottoms_have_no_tier() {
        let items =
            vec![item("t1", Category::Tops, "#ffffff"), item("s1", Category::Shoes, "#000000")];
        let buckets = CategoryBuckets::classify(&items);
        let search = SearchConfig::default();
        let options = GenerationOptions::new();
        let generator =
            CombinationGenerator::new(&buckets, &search, &options, StylePreference::default());

        assert!(generator.essential_tiers(&[]).is_empty());
    }

    #[test]
    fn ids_containing_the_key_delimiter_are_not_deduplicated() {
        let items = vec![
            item("a|b", Category::Tops, "#ffffff"),
            item("a", Category::Tops, "#000080"),
            item("c", Category::Bottoms, "#000000"),
            item("b|c", Category::Bottoms, "#1f3a93"),
        ];
        let buckets = CategoryBuckets::classify(&items);
        let search = SearchConfig::default();
        let options = GenerationOptions::new();
        let generator =
            CombinationGenerator::new(&buckets, &search, &options, StylePreference::default());

        let outcome = generator.generate(&[], &[EssentialTier::Separates], 100);
        assert_eq!(outcome.outfits.len(), 4);
        assert_eq!(outcome.duplicates, 0);
    }
}
