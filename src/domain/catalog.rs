//! Item catalog
//!
//! Compiled-in price list. Nothing here is persisted.

use super::Amount;

/// Item name and price in coins
const ITEMS: &[(&str, i64)] = &[
    ("t-shirt", 80),
    ("cup", 20),
    ("book", 50),
    ("pen", 10),
    ("powerbank", 200),
    ("hoody", 300),
    ("umbrella", 200),
    ("socks", 10),
    ("wallet", 50),
    ("pink-hoody", 500),
];

/// A purchasable item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogItem {
    pub name: &'static str,
    pub price: Amount,
}

/// Look up an item by exact name.
pub fn lookup(name: &str) -> Option<CatalogItem> {
    ITEMS
        .iter()
        .find(|(item, _)| *item == name)
        .and_then(|&(item, price)| {
            Amount::new(price).ok().map(|price| CatalogItem { name: item, price })
        })
}
