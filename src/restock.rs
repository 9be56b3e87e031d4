use crate::models::{keys_match, Item};
use std::collections::HashMap;

/// Returns true when at least one unit is on hand
pub fn is_available(item: &Item) -> bool {
    item.quantity > 0
}

/// Returns true when a quantity has dropped below the low-stock threshold
pub fn needs_restock(quantity: u64, threshold: u64) -> bool {
    quantity < threshold
}

/// Item-level alert rule: still in stock, but at or below the threshold.
/// Items that have run out are not reported here.
pub fn item_running_low(item: &Item, threshold: u64) -> bool {
    is_available(item) && u64::from(item.quantity) <= threshold
}

pub struct RestockAnalysis<'a> {
    items: &'a [Item],
}

#[derive(Debug, Default)]
pub struct RestockStats {
    pub low_items: HashMap<String, usize>, // Category -> items below threshold
}

impl RestockStats {
    /// Categories with low items, sorted by name
    pub fn sorted(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> = self
            .low_items
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    pub fn is_empty(&self) -> bool {
        self.low_items.is_empty()
    }
}

impl<'a> RestockAnalysis<'a> {
    pub fn new(items: &'a [Item]) -> Self {
        Self { items }
    }

    pub fn analyze(&self, threshold: u64) -> RestockStats {
        let mut stats = RestockStats::default();

        for item in self.items {
            if !item_running_low(item, threshold) {
                continue;
            }
            // Group case variants of a category under the first spelling seen
            let key = stats
                .low_items
                .keys()
                .find(|k| keys_match(k, &item.category))
                .cloned()
                .unwrap_or_else(|| item.category.clone());
            *stats.low_items.entry(key).or_insert(0) += 1;
        }

        stats
    }
}

pub fn format_restock_alerts(stats: &RestockStats) -> String {
    let mut output = String::new();
    for (category, count) in stats.sorted() {
        output.push_str(&format!(
            "Restock needed in category: {category} ({count} item(s) low)\n"
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(number: &str, quantity: u32, category: &str) -> Item {
        Item::new(number, format!("Part {number}"), 2.0, quantity, category)
    }

    #[test]
    fn test_is_available() {
        assert!(is_available(&item("A1", 1, "Electrical")));
        assert!(!is_available(&item("A2", 0, "Electrical")));
    }

    #[test]
    fn test_needs_restock_is_strict() {
        assert!(needs_restock(4, 5));
        assert!(!needs_restock(5, 5));
        assert!(!needs_restock(0, 0));
    }

    #[test]
    fn test_item_running_low_includes_threshold_and_skips_empty() {
        assert!(item_running_low(&item("A1", 5, "Electrical"), 5));
        assert!(item_running_low(&item("A2", 1, "Electrical"), 5));
        assert!(!item_running_low(&item("A3", 6, "Electrical"), 5));
        assert!(!item_running_low(&item("A4", 0, "Electrical"), 5));
    }

    #[test]
    fn test_analyze_counts_low_items_per_category() {
        let items = vec![
            item("A1", 1, "Electrical"),
            item("A2", 2, "electrical"),
            item("A3", 50, "Electrical"),
            item("B1", 0, "Body Parts"),
            item("C1", 9, "Accessories"),
        ];
        let stats = RestockAnalysis::new(&items).analyze(5);

        assert_eq!(stats.low_items.len(), 1);
        assert_eq!(stats.low_items["Electrical"], 2);
        assert!(!stats.low_items.contains_key("Body Parts"));
    }

    #[test]
    fn test_analyze_no_alerts() {
        let items = vec![item("A1", 10, "Electrical")];
        let stats = RestockAnalysis::new(&items).analyze(5);
        assert!(stats.is_empty());
        assert_eq!(format_restock_alerts(&stats), "");
    }

    #[test]
    fn test_format_restock_alerts_sorted() {
        let items = vec![
            item("A1", 1, "Electrical"),
            item("B1", 0, "Body Parts"),
            item("B2", 3, "Body Parts"),
        ];
        let stats = RestockAnalysis::new(&items).analyze(5);
        assert_eq!(
            format_restock_alerts(&stats),
            "Restock needed in category: Body Parts (1 item(s) low)\n\
             Restock needed in category: Electrical (1 item(s) low)\n"
        );
    }
}
