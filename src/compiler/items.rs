//! Item list preprocessing
//!
//! Item names carrying an explicit ordinal suffix ("Progressive Sword #2",
//! meaning the third copy) are rewritten into stacked-threshold names
//! ("Progressive Sword x 3"), and a dominance table records that owning a
//! higher threshold always implies owning every lower one. Later passes treat
//! dominance as ordinary subsumption.

use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct PreprocessedItems {
    /// Item names with ordinal suffixes rewritten to thresholds.
    pub names: Vec<String>,
    /// Name to the stronger names that imply it.
    pub dominators: HashMap<Arc<str>, Vec<Arc<str>>>,
    /// Name to the weaker names it implies.
    pub reverse_dominators: HashMap<Arc<str>, Vec<Arc<str>>>,
}

fn threshold_name(item: &str, amount: u32) -> String {
    if amount > 1 {
        format!("{} x {}", item, amount)
    } else {
        item.to_string()
    }
}

/// Splits `"<item> #<n>"` into the item and its ordinal.
fn parse_ordinal(raw: &str) -> Option<(&str, u32)> {
    let (item, ordinal) = raw.rsplit_once(" #")?;
    if item.is_empty() || ordinal.is_empty() || !ordinal.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((item, ordinal.parse().ok()?))
}

/// Rewrites ordinal item names and derives the dominance table.
pub fn preprocess_items(raw: &[String]) -> PreprocessedItems {
    let mut result = PreprocessedItems::default();
    for raw_item in raw {
        let Some((item, ordinal)) = parse_ordinal(raw_item) else {
            result.names.push(raw_item.clone());
            continue;
        };
        // "#2" is the third copy, so it stands for owning three
        let amount = ordinal + 1;
        let name: Arc<str> = Arc::from(threshold_name(item, amount).as_str());

        for lower in 1..amount {
            let lower_name: Arc<str> = Arc::from(threshold_name(item, lower).as_str());
            result
                .dominators
                .entry(Arc::clone(&lower_name))
                .or_default()
                .push(Arc::clone(&name));
            result
                .reverse_dominators
                .entry(Arc::clone(&name))
                .or_default()
                .push(lower_name);
        }

        result.names.push(name.to_string());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_items_pass_through() {
        let items = vec!["Bomb Bag".to_string(), "Clawshots".to_string()];
        let result = preprocess_items(&items);
        assert_eq!(result.names, items);
        assert!(result.dominators.is_empty());
    }

    #[test]
    fn test_ordinals_become_thresholds() {
        let items = vec![
            "Progressive Sword".to_string(),
            "Progressive Sword #1".to_string(),
            "Progressive Sword #2".to_string(),
        ];
        let result = preprocess_items(&items);
        assert_eq!(
            result.names,
            vec![
                "Progressive Sword",
                "Progressive Sword x 2",
                "Progressive Sword x 3",
            ]
        );
    }

    #[test]
    fn test_dominance_covers_all_lower_thresholds() {
        let items = vec![
            "Progressive Sword".to_string(),
            "Progressive Sword #1".to_string(),
            "Progressive Sword #2".to_string(),
        ];
        let result = preprocess_items(&items);

        // x 3 implies both x 2 and the base item
        let implied: Vec<&str> = result.reverse_dominators["Progressive Sword x 3"]
            .iter()
            .map(|s| &**s)
            .collect();
        assert_eq!(implied, vec!["Progressive Sword", "Progressive Sword x 2"]);

        // the base item is implied by both higher thresholds
        let dominators: Vec<&str> = result.dominators["Progressive Sword"]
            .iter()
            .map(|s| &**s)
            .collect();
        assert_eq!(
            dominators,
            vec!["Progressive Sword x 2", "Progressive Sword x 3"]
        );
    }

    #[test]
    fn test_hash_in_middle_of_name_is_not_an_ordinal() {
        let items = vec!["Item #notanumber".to_string()];
        let result = preprocess_items(&items);
        assert_eq!(result.names, vec!["Item #notanumber"]);
    }
}
