use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Clothing category identifier (small integer key of reference data).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClothingCategoryId(pub i64);

impl core::fmt::Display for ClothingCategoryId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Lookup data: a kind of clothing whose stock is tracked per child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClothingCategory {
    pub id: ClothingCategoryId,
    pub name: String,
    pub icon_path: Option<String>,
    pub sort_order: Option<i32>,
}

impl ClothingCategory {
    /// Display ordering: `sort_order` ascending, unordered categories last,
    /// ties broken by id.
    pub fn display_cmp(&self, other: &Self) -> Ordering {
        match (self.sort_order, other.sort_order) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then_with(|| self.id.cmp(&other.id))
    }
}

/// Sort categories into display order in place.
pub fn sort_categories(categories: &mut [ClothingCategory]) {
    categories.sort_by(ClothingCategory::display_cmp);
}

/// The catalog a fresh installation is seeded with.
pub fn default_catalog() -> Vec<ClothingCategory> {
    [
        ("T-shirts", "tshirt"),
        ("Pants", "pants"),
        ("Socks", "socks"),
        ("Handkerchiefs", "handkerchief"),
        ("Underwear", "underwear"),
        ("Hats", "hat"),
        ("Swimwear set", "swimwear"),
        ("Plastic bags", "plastic-bag"),
    ]
    .into_iter()
    .zip(1..)
    .map(|((name, slug), n)| ClothingCategory {
        id: ClothingCategoryId(i64::from(n)),
        name: name.to_string(),
        icon_path: Some(format!("/icons/{slug}.svg")),
        sort_order: Some(n),
    })
    .collect()
}
