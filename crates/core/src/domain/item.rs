use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Catalog category of a clothing item.
///
/// Variant order is the display order used when presenting an outfit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Dresses,
    Tops,
    Bottoms,
    Outerwear,
    Shoes,
    Underwear,
    Bras,
    Socks,
    Tights,
    Accessories,
    Jewelry,
    Bags,
    Belts,
    Hats,
    Scarves,
    Activewear,
    Sleepwear,
    Swimwear,
}

/// Categories that may appear more than once in a single outfit.
pub const MULTI_ITEM_CATEGORIES: [Category; 3] =
    [Category::Accessories, Category::Jewelry, Category::Scarves];

/// Categories used to fill the accessory slot when the catalog has no plain accessories.
pub const ACCESSORY_FALLBACK_CATEGORIES: [Category; 5] =
    [Category::Jewelry, Category::Bags, Category::Belts, Category::Hats, Category::Scarves];

/// Optional categories layered on top of a complete base outfit.
pub const COORDINATING_CATEGORIES: [Category; 6] = [
    Category::Jewelry,
    Category::Bags,
    Category::Belts,
    Category::Hats,
    Category::Scarves,
    Category::Outerwear,
];

pub const UNDERGARMENT_CATEGORIES: [Category; 4] =
    [Category::Underwear, Category::Bras, Category::Socks, Category::Tights];

impl Category {
    pub fn is_multi_item(self) -> bool {
        MULTI_ITEM_CATEGORIES.contains(&self)
    }

    pub fn is_undergarment(self) -> bool {
        UNDERGARMENT_CATEGORIES.contains(&self)
    }

    pub fn is_accessory_like(self) -> bool {
        self == Category::Accessories || ACCESSORY_FALLBACK_CATEGORIES.contains(&self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Dresses => "dresses",
            Category::Tops => "tops",
            Category::Bottoms => "bottoms",
            Category::Outerwear => "outerwear",
            Category::Shoes => "shoes",
            Category::Underwear => "underwear",
            Category::Bras => "bras",
            Category::Socks => "socks",
            Category::Tights => "tights",
            Category::Accessories => "accessories",
            Category::Jewelry => "jewelry",
            Category::Bags => "bags",
            Category::Belts => "belts",
            Category::Hats => "hats",
            Category::Scarves => "scarves",
            Category::Activewear => "activewear",
            Category::Sleepwear => "sleepwear",
            Category::Swimwear => "swimwear",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl std::str::FromStr for Season {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "spring" => Ok(Self::Spring),
            "summer" => Ok(Self::Summer),
            "fall" | "autumn" => Ok(Self::Fall),
            "winter" => Ok(Self::Winter),
            other => Err(format!("unsupported season `{other}` (expected spring|summer|fall|winter)")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occasion {
    Casual,
    Work,
    Formal,
    Party,
    Sport,
    Travel,
    Date,
    Special,
}

impl std::str::FromStr for Occasion {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "casual" => Ok(Self::Casual),
            "work" => Ok(Self::Work),
            "formal" => Ok(Self::Formal),
            "party" => Ok(Self::Party),
            "sport" => Ok(Self::Sport),
            "travel" => Ok(Self::Travel),
            "date" => Ok(Self::Date),
            "special" => Ok(Self::Special),
            other => Err(format!(
                "unsupported occasion `{other}` (expected casual|work|formal|party|sport|travel|date|special)"
            )),
        }
    }
}

/// A catalog item as supplied by the caller. The engine never mutates it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClothingItem {
    pub id: ItemId,
    #[serde(default)]
    pub name: String,
    pub category: Category,
    /// Hex color such as `#1f2a44`. Malformed values are treated as black.
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub season: BTreeSet<Season>,
    #[serde(default)]
    pub occasion: BTreeSet<Occasion>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

impl ClothingItem {
    pub fn new(id: impl Into<String>, category: Category, color: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id: ItemId(id),
            category,
            color: color.into(),
            season: BTreeSet::new(),
            occasion: BTreeSet::new(),
            tags: Vec::new(),
            brand: None,
            price: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_seasons(mut self, seasons: impl IntoIterator<Item = Season>) -> Self {
        self.season.extend(seasons);
        self
    }

    pub fn with_occasions(mut self, occasions: impl IntoIterator<Item = Occasion>) -> Self {
        self.occasion.extend(occasions);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Case-insensitive substring match against any tag.
    pub fn has_tag_like(&self, needle: &str) -> bool {
        self.tags.iter().any(|tag| tag.to_ascii_lowercase().contains(needle))
    }

    pub fn has_any_tag_like(&self, needles: &[&str]) -> bool {
        needles.iter().any(|needle| self.has_tag_like(needle))
    }
}
