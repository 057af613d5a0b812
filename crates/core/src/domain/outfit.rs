use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::item::{Category, ClothingItem, ItemId, Occasion, Season};

pub const OUTFIT_KEY_DELIMITER: char = '|';
const OUTFIT_KEY_ESCAPE: char = '\\';

/// Canonical identity of an item set: ids sorted ascending, joined by `|`.
///
/// A `|` or `\\` inside an id is escaped with a backslash, so distinct item sets
/// never share a key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OutfitKey(pub String);

impl OutfitKey {
    pub fn from_ids<'a>(ids: impl IntoIterator<Item = &'a ItemId>) -> Self {
        let mut ids: Vec<&str> = ids.into_iter().map(ItemId::as_str).collect();
        ids.sort_unstable();
        ids.dedup();
        let escaped: Vec<String> = ids.into_iter().map(escape_id).collect();
        Self(escaped.join(&OUTFIT_KEY_DELIMITER.to_string()))
    }

    pub fn from_items(items: &[ClothingItem]) -> Self {
        Self::from_ids(items.iter().map(|item| &item.id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The unescaped item ids encoded in the key.
    pub fn item_ids(&self) -> BTreeSet<String> {
        let mut ids = BTreeSet::new();
        if self.0.is_empty() {
            return ids;
        }

        let mut current = String::new();
        let mut chars = self.0.chars();
        while let Some(ch) = chars.next() {
            match ch {
                OUTFIT_KEY_ESCAPE => {
                    if let Some(escaped) = chars.next() {
                        current.push(escaped);
                    }
                }
                OUTFIT_KEY_DELIMITER => {
                    ids.insert(std::mem::take(&mut current));
                }
                _ => current.push(ch),
            }
        }
        ids.insert(current);
        ids
    }

    /// Jaccard similarity of the two item sets.
    pub fn similarity(&self, other: &OutfitKey) -> f64 {
        jaccard(&self.item_ids(), &other.item_ids())
    }
}

impl fmt::Display for OutfitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn escape_id(id: &str) -> String {
    let mut escaped = String::with_capacity(id.len());
    for ch in id.chars() {
        if ch == OUTFIT_KEY_DELIMITER || ch == OUTFIT_KEY_ESCAPE {
            escaped.push(OUTFIT_KEY_ESCAPE);
        }
        escaped.push(ch);
    }
    escaped
}

pub fn jaccard<T: Ord>(left: &BTreeSet<T>, right: &BTreeSet<T>) -> f64 {
    let union = left.union(right).count();
    if union == 0 {
        return 0.0;
    }
    left.intersection(right).count() as f64 / union as f64
}

/// Per-criterion breakdown, each in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub color_harmony: f64,
    pub style_matching: f64,
    pub occasion_suitability: f64,
    pub season_suitability: f64,
    pub weather_suitability: f64,
    pub user_preference: f64,
    pub variety: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OutfitScore {
    pub total: f64,
    pub breakdown: ScoreBreakdown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutfitStyle {
    Formal,
    Business,
    Party,
    Athletic,
    Casual,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratedOutfit {
    pub key: OutfitKey,
    pub items: Vec<ClothingItem>,
    pub score: OutfitScore,
    pub style: OutfitStyle,
}

impl GeneratedOutfit {
    pub fn item_ids(&self) -> Vec<&ItemId> {
        self.items.iter().map(|item| &item.id).collect()
    }

    pub fn categories(&self) -> Vec<Category> {
        self.items.iter().map(|item| item.category).collect()
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.items.iter().any(|item| &item.id == id)
    }
}

/// A user-named outfit ready to be handed to a persistence collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Outfit {
    pub id: Uuid,
    pub name: String,
    pub item_ids: Vec<ItemId>,
    pub season: BTreeSet<Season>,
    pub occasion: BTreeSet<Occasion>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const UNTITLED_OUTFIT_NAME: &str = "Untitled outfit";

pub fn create_outfit(items: &[ClothingItem], name: &str) -> Outfit {
    create_outfit_at(items, name, Utc::now())
}

/// Builds an outfit whose seasons and occasions are those shared by every item.
pub fn create_outfit_at(items: &[ClothingItem], name: &str, now: DateTime<Utc>) -> Outfit {
    let name = match name.trim() {
        "" => UNTITLED_OUTFIT_NAME.to_string(),
        trimmed => trimmed.to_string(),
    };

    let season = intersect(items.iter().map(|item| &item.season));
    let occasion = intersect(items.iter().map(|item| &item.occasion));

    let tags: BTreeSet<String> = items
        .iter()
        .flat_map(|item| item.tags.iter())
        .map(|tag| tag.trim().to_ascii_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect();

    Outfit {
        id: Uuid::new_v4(),
        name,
        item_ids: items.iter().map(|item| item.id.clone()).collect(),
        season,
        occasion,
        tags: tags.into_iter().collect(),
        created_at: now,
        updated_at: now,
    }
}

fn intersect<'a, T>(mut sets: impl Iterator<Item = &'a BTreeSet<T>>) -> BTreeSet<T>
where
    T: Ord + Clone + 'a,
{
    let Some(first) = sets.next() else {
        return BTreeSet::new();
    };
    sets.fold(first.clone(), |acc, set| acc.intersection(set).cloned().collect())
}
