//! Category-level legality checks for partial outfits
//!
//! Only category exclusivity and the multi-item cap are enforced here. Softer
//! compatibility is expressed through the scorer so the search is not over-pruned.

use crate::domain::item::{Category, ClothingItem};

use super::MULTI_ITEM_CAP;

pub fn category_cap(category: Category) -> usize {
    if category.is_multi_item() {
        MULTI_ITEM_CAP
    } else {
        1
    }
}

/// Whether `candidate` may be added to `partial` without breaking a category invariant.
pub fn is_compatible(candidate: &ClothingItem, partial: &[&ClothingItem]) -> bool {
    if partial.iter().any(|item| item.id == candidate.id) {
        return false;
    }

    let present = partial.iter().filter(|item| item.category == candidate.category).count();
    present < category_cap(candidate.category)
}

/// A dress, or both a top and a bottom.
pub fn has_complete_base(items: &[&ClothingItem]) -> bool {
    let has = |category: Category| items.iter().any(|item| item.category == category);
    has(Category::Dresses) || (has(Category::Tops) && has(Category::Bottoms))
}

/// Whether every category of `items` respects its cap.
pub fn respects_category_caps(items: &[&ClothingItem]) -> bool {
    items.iter().enumerate().all(|(index, item)| {
        let seen = items[..index].iter().filter(|other| other.category == item.category).count();
        seen < category_cap(item.category)
    })
}

#[cfg(test)]
mod tests {
    use super::{has_complete_base, is_compatible, respects_category_caps};
    use crate::domain::item::{Category, ClothingItem};

    #[test]
    fn second_top_is_rejected() {
        let top = ClothingItem::new("t1", Category::Tops, "#ffffff");
        let other_top = ClothingItem::new("t2", Category::Tops, "#000000");

        assert!(!is_compatible(&other_top, &[&top]));
    }

    #[test]
    fn jewelry_is_capped_at_three() {
        let pieces: Vec<ClothingItem> = (0..4)
            .map(|index| ClothingItem::new(format!("j{index}"), Category::Jewelry, "#c0c0c0"))
            .collect();

        assert!(is_compatible(&pieces[2], &[&pieces[0], &pieces[1]]));
        assert!(!is_compatible(&pieces[3], &[&pieces[0], &pieces[1], &pieces[2]]));
    }

    #[test]
    fn the_same_item_cannot_be_added_twice() {
        let scarf = ClothingItem::new("s1", Category::Scarves, "#aa0000");
        assert!(!is_compatible(&scarf, &[&scarf]));
    }

    #[test]
    fn cap_check_over_a_whole_outfit() {
        let top = ClothingItem::new("t1", Category::Tops, "#ffffff");
        let other_top = ClothingItem::new("t2", Category::Tops, "#000000");
        let bag = ClothingItem::new("g1", Category::Bags, "#000000");

        assert!(respects_category_caps(&[&top, &bag]));
        assert!(!respects_category_caps(&[&top, &bag, &other_top]));
    }

    #[test]
    fn base_needs_a_dress_or_both_separates() {
        let dress = ClothingItem::new("d1", Category::Dresses, "#000000");
        let top = ClothingItem::new("t1", Category::Tops, "#ffffff");
        let bottom = ClothingItem::new("b1", Category::Bottoms, "#000000");

        assert!(has_complete_base(&[&dress]));
        assert!(has_complete_base(&[&top, &bottom]));
        assert!(!has_complete_base(&[&top]));
    }
}
