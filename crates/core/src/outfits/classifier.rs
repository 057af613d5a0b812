//! Category grouping of catalog items

use std::collections::BTreeMap;

use crate::domain::item::{Category, ClothingItem, ACCESSORY_FALLBACK_CATEGORIES};

/// Items grouped per category, each bucket in catalog order.
#[derive(Debug, Clone, Default)]
pub struct CategoryBuckets<'a> {
    buckets: BTreeMap<Category, Vec<&'a ClothingItem>>,
}

impl<'a> CategoryBuckets<'a> {
    pub fn classify(items: impl IntoIterator<Item = &'a ClothingItem>) -> Self {
        let mut buckets: BTreeMap<Category, Vec<&'a ClothingItem>> = BTreeMap::new();
        for item in items {
            buckets.entry(item.category).or_default().push(item);
        }
        Self { buckets }
    }

    pub fn get(&self, category: Category) -> &[&'a ClothingItem] {
        self.buckets.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, category: Category) -> bool {
        !self.get(category).is_empty()
    }

    pub fn count(&self, category: Category) -> usize {
        self.get(category).len()
    }

    pub fn total(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.buckets.keys().copied()
    }

    /// Items eligible for the mandatory accessory slot: plain accessories when the
    /// catalog has any, otherwise jewelry, bags, belts, hats and scarves in that order.
    pub fn accessory_slot(&self) -> Vec<&'a ClothingItem> {
        if self.has(Category::Accessories) {
            return self.get(Category::Accessories).to_vec();
        }

        ACCESSORY_FALLBACK_CATEGORIES
            .iter()
            .flat_map(|category| self.get(*category).iter().copied())
            .collect()
    }

    pub fn has_essentials(&self) -> bool {
        self.has(Category::Dresses) || (self.has(Category::Tops) && self.has(Category::Bottoms))
    }
}
