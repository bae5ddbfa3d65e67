use std::collections::HashMap;

use crate::api::Collectible;

#[derive(Debug, Clone, PartialEq)]
pub struct CollectibleGroup {
    /// The first entry seen for this asset
    pub item: Collectible,
    pub quantity: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CollectiblesSummary {
    /// In the order the assets were first seen
    pub groups: Vec<CollectibleGroup>,
    pub total_rap: u64,
    pub total_count: usize,
}

impl CollectiblesSummary {
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }
}

/// Groups the entries by asset id and sums up the RAP over every entry, duplicates
/// included.
pub fn summarize(items: Vec<Collectible>) -> CollectiblesSummary {
    let mut summary = CollectiblesSummary {
        total_count: items.len(),
        ..Default::default()
    };

    let mut index: HashMap<Option<u64>, usize> = HashMap::with_capacity(items.len());

    for item in items {
        summary.total_rap = summary.total_rap.saturating_add(item.recent_average_price);

        match index.get(&item.asset_id) {
            Some(&idx) => summary.groups[idx].quantity += 1,
            None => {
                index.insert(item.asset_id, summary.groups.len());
                summary.groups.push(CollectibleGroup { item, quantity: 1 });
            }
        }
    }

    summary
}

/// `1234567` becomes `"1,234,567"`
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    result
}

pub fn thumbnail_url(asset_base: &str, asset_id: u64) -> String {
    format!(
        "{}/thumbs/asset.ashx?assetId={}&width=420&height=420&format=png",
        crate::config::trim_base(asset_base),
        asset_id
    )
}
