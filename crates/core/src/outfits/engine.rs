use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::config::EngineConfig;
use crate::domain::item::{ClothingItem, ItemId};
use crate::domain::options::GenerationOptions;
use crate::domain::outfit::{GeneratedOutfit, OutfitKey};
use crate::errors::DomainError;

use super::all_items::generate_covering;
use super::classifier::CategoryBuckets;
use super::compatibility::{has_complete_base, respects_category_caps};
use super::generator::CombinationGenerator;
use super::ranking::{rank, rank_for_coverage};
use super::recency::RecencyTracker;
use super::scoring::{OutfitScorer, ScoredCandidate, ScoringContext};
use super::style::infer_style;
use super::{OutfitResult, MIN_USABLE_ITEMS};

/// Outfit generation entry point.
///
/// Every call is a pure function of the catalog, the options and the recency
/// history; the only mutation is recording the returned outfits in that history.
#[derive(Clone, Debug, Default)]
pub struct OutfitEngine {
    config: EngineConfig,
    scorer: OutfitScorer,
    tracker: RecencyTracker,
}

impl OutfitEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_tracker(config, RecencyTracker::new())
    }

    /// Resumes from a previously persisted recency history.
    pub fn with_tracker(config: EngineConfig, tracker: RecencyTracker) -> Self {
        let scorer = OutfitScorer::new(config.scoring.clone(), config.recency.clone());
        Self { config, scorer, tracker }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tracker(&self) -> &RecencyTracker {
        &self.tracker
    }

    pub fn into_tracker(self) -> RecencyTracker {
        self.tracker
    }

    pub fn generate(
        &mut self,
        items: &[ClothingItem],
        options: &GenerationOptions,
    ) -> OutfitResult<Vec<GeneratedOutfit>> {
        self.generate_at(items, options, Utc::now())
    }

    pub fn generate_at(
        &mut self,
        items: &[ClothingItem],
        options: &GenerationOptions,
        now: DateTime<Utc>,
    ) -> OutfitResult<Vec<GeneratedOutfit>> {
        options.validate(items)?;
        let purged = self.tracker.purge_expired(now, &self.config.recency);

        warn_unknown_ids(items, options);

        let excluded: BTreeSet<&ItemId> = options.excluded_items.iter().collect();
        let mut seen_ids: BTreeSet<&ItemId> = BTreeSet::new();
        let usable: Vec<&ClothingItem> = items
            .iter()
            .filter(|item| !excluded.contains(&item.id) && seen_ids.insert(&item.id))
            .collect();

        if usable.len() < MIN_USABLE_ITEMS {
            tracing::debug!(
                event_name = "outfits.generate.skipped",
                usable_items = usable.len(),
                "not enough usable items"
            );
            return Ok(Vec::new());
        }

        let buckets = CategoryBuckets::classify(usable.iter().copied());
        if !buckets.has_essentials() {
            tracing::debug!(
                event_name = "outfits.generate.skipped",
                usable_items = usable.len(),
                "catalog has no dress and no top/bottom pair"
            );
            return Ok(Vec::new());
        }

        let mut forced: Vec<&ClothingItem> = Vec::new();
        for id in &options.force_include_items {
            if let Some(item) = usable.iter().find(|item| item.id == *id).copied() {
                if !forced.iter().any(|existing| existing.id == item.id) {
                    forced.push(item);
                }
            }
        }

        let resolved = options.resolve(usable.len(), self.config.scoring.default_min_score);
        let generator = CombinationGenerator::new(
            &buckets,
            &self.config.search,
            options,
            resolved.style_preference,
        );
        let context = ScoringContext {
            options,
            preference: resolved.style_preference,
            tracker: &self.tracker,
            now,
        };

        let (candidates, min_score) = if options.use_all_items {
            let coverage = generate_covering(
                &generator,
                &usable,
                &forced,
                &self.config.search,
                &self.scorer,
                &context,
                resolved.min_score,
            );
            (coverage.candidates, coverage.relaxed_min_score)
        } else {
            let tiers = generator.essential_tiers(&forced);
            let outcome = generator.generate(&forced, &tiers, self.config.search.max_outfits);
            if outcome.depth_capped || outcome.output_capped {
                tracing::warn!(
                    event_name = "outfits.search.capped",
                    depth_capped = outcome.depth_capped,
                    output_capped = outcome.output_capped,
                    max_outfits = self.config.search.max_outfits,
                    "search stopped at a cap"
                );
            }
            tracing::debug!(
                event_name = "outfits.search.completed",
                produced = outcome.outfits.len(),
                rejected_incomplete = outcome.rejected_incomplete,
                duplicates = outcome.duplicates,
                "combination search finished"
            );

            let scored = outcome
                .outfits
                .into_iter()
                .map(|outfit| score_candidate(&self.scorer, outfit, &context))
                .collect::<Vec<_>>();
            (scored, resolved.min_score)
        };

        let candidate_count = candidates.len();
        let generated: Vec<GeneratedOutfit> = candidates
            .into_iter()
            .map(|candidate| GeneratedOutfit {
                style: infer_style(&candidate.items),
                key: candidate.key,
                items: candidate.items.into_iter().cloned().collect(),
                score: candidate.score,
            })
            .collect();

        let (ranked, stats) = if options.use_all_items {
            rank_for_coverage(generated, min_score, resolved.max_results)
        } else {
            let diversity = self.config.scoring.diversity_threshold;
            rank(generated, min_score, resolved.max_results, diversity)
        };

        for outfit in &ranked {
            check_accepted(outfit, &forced, &excluded)?;
        }
        for outfit in &ranked {
            self.tracker.record(outfit.key.clone(), now);
        }

        tracing::info!(
            event_name = "outfits.generate.completed",
            catalog_items = items.len(),
            usable_items = usable.len(),
            candidates = candidate_count,
            pruned_by_score = stats.pruned_by_score,
            pruned_by_diversity = stats.pruned_by_diversity,
            accepted = ranked.len(),
            purged_history = purged,
            use_all_items = options.use_all_items,
            "outfit generation completed"
        );

        Ok(ranked)
    }
}

fn score_candidate<'a>(
    scorer: &OutfitScorer,
    items: Vec<&'a ClothingItem>,
    context: &ScoringContext<'_>,
) -> ScoredCandidate<'a> {
    let score = scorer.score(&items, context);
    let key = OutfitKey::from_ids(items.iter().map(|item| &item.id));
    ScoredCandidate { key, items, score }
}

/// Rejects an accepted outfit that breaks a structural guarantee of the search.
fn check_accepted(
    outfit: &GeneratedOutfit,
    forced: &[&ClothingItem],
    excluded: &BTreeSet<&ItemId>,
) -> OutfitResult<()> {
    let items: Vec<&ClothingItem> = outfit.items.iter().collect();
    let violation = if !has_complete_base(&items) {
        Some("outfit has neither a dress nor a top and bottom".to_owned())
    } else if !respects_category_caps(&items) {
        Some("outfit exceeds a category cap".to_owned())
    } else if outfit.key != OutfitKey::from_items(&outfit.items) {
        Some(format!("outfit key `{}` does not match its items", outfit.key))
    } else if let Some(missing) =
        forced.iter().find(|item| !outfit.items.iter().any(|other| other.id == item.id))
    {
        Some(format!("forced item `{}` is missing", missing.id))
    } else {
        outfit
            .items
            .iter()
            .find(|item| excluded.contains(&item.id))
            .map(|item| format!("excluded item `{}` was selected", item.id))
    };

    match violation {
        Some(detail) => {
            tracing::error!(
                event_name = "outfits.generate.invariant_violation",
                outfit_key = %outfit.key,
                detail = %detail,
                "accepted outfit failed a structural check"
            );
            Err(DomainError::InvariantViolation(detail))
        }
        None => Ok(()),
    }
}

fn warn_unknown_ids(items: &[ClothingItem], options: &GenerationOptions) {
    let known: BTreeSet<&ItemId> = items.iter().map(|item| &item.id).collect();
    let requested = options.force_include_items.iter().chain(&options.excluded_items);
    for id in requested.filter(|id| !known.contains(id)) {
        tracing::warn!(
            event_name = "outfits.generate.unknown_item",
            item_id = %id,
            "ignoring item id that is not in the catalog"
        );
    }
}
