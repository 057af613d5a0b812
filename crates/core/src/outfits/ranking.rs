//! Threshold filter, stable ordering and greedy diversity selection

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::domain::item::ItemId;
use crate::domain::outfit::GeneratedOutfit;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RankingStats {
    pub pruned_by_score: usize,
    pub pruned_by_diversity: usize,
}

/// Keeps candidates at or above `min_score`, best first, skipping any outfit whose
/// Jaccard similarity to an already kept outfit exceeds `diversity_threshold`.
///
/// The sort is stable, so equal scores keep their generation order.
pub fn rank(
    candidates: Vec<GeneratedOutfit>,
    min_score: f64,
    max_results: usize,
    diversity_threshold: f64,
) -> (Vec<GeneratedOutfit>, RankingStats) {
    let mut stats = RankingStats::default();

    let mut eligible: Vec<GeneratedOutfit> = candidates
        .into_iter()
        .filter(|outfit| {
            let keep = outfit.score.total >= min_score;
            if !keep {
                stats.pruned_by_score += 1;
            }
            keep
        })
        .collect();

    eligible.sort_by(|left, right| {
        right.score.total.partial_cmp(&left.score.total).unwrap_or(Ordering::Equal)
    });

    let mut selected: Vec<GeneratedOutfit> = Vec::new();
    for outfit in eligible {
        if selected.len() >= max_results {
            break;
        }
        let too_similar = selected
            .iter()
            .any(|kept| kept.key.similarity(&outfit.key) > diversity_threshold);
        if too_similar {
            stats.pruned_by_diversity += 1;
            continue;
        }
        selected.push(outfit);
    }

    (selected, stats)
}

/// Coverage-first selection for the all-items strategy.
///
/// Walks the eligible candidates best first and takes every outfit that brings at
/// least one not yet represented item, then fills any remaining room by score.
/// The returned list is ordered by score.
pub fn rank_for_coverage(
    candidates: Vec<GeneratedOutfit>,
    min_score: f64,
    max_results: usize,
) -> (Vec<GeneratedOutfit>, RankingStats) {
    let mut stats = RankingStats::default();
    let mut eligible: Vec<GeneratedOutfit> = Vec::new();
    for outfit in candidates {
        if outfit.score.total >= min_score {
            eligible.push(outfit);
        } else {
            stats.pruned_by_score += 1;
        }
    }
    eligible.sort_by(|left, right| {
        right.score.total.partial_cmp(&left.score.total).unwrap_or(Ordering::Equal)
    });

    let mut covered: BTreeSet<ItemId> = BTreeSet::new();
    let mut picked: Vec<bool> = vec![false; eligible.len()];
    let mut taken = 0;
    for (position, outfit) in eligible.iter().enumerate() {
        if taken >= max_results {
            break;
        }
        if outfit.items.iter().any(|item| !covered.contains(&item.id)) {
            covered.extend(outfit.items.iter().map(|item| item.id.clone()));
            picked[position] = true;
            taken += 1;
        }
    }
    for flag in picked.iter_mut() {
        if taken >= max_results {
            break;
        }
        if !*flag {
            *flag = true;
            taken += 1;
        }
    }

    let selected: Vec<GeneratedOutfit> = eligible
        .into_iter()
        .zip(picked)
        .filter(|(_, keep)| *keep)
        .map(|(outfit, _)| outfit)
        .collect();
    (selected, stats)
}
