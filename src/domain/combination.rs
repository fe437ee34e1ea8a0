//! Combination primitives shared by the admin variant generator and the
//! storefront resolver.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One coordinate of a variant combination: a single value chosen along a
/// named option axis. Also the shape of a combination entry in submitted
/// variant payloads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionValuePair {
    pub option_name: String,
    pub option_value: String,
}

impl OptionValuePair {
    pub fn new(option_name: impl Into<String>, option_value: impl Into<String>) -> Self {
        Self {
            option_name: option_name.into(),
            option_value: option_value.into(),
        }
    }
}

/// Full cross product of the given option axes.
///
/// Each axis is one option's value list, already trimmed. Pair order inside
/// a combination follows axis input order; combinations come out in
/// nested-loop order and are not re-sorted. Zero axes yield a single empty
/// combination, which callers treat as "no options defined". An axis with no
/// values contributes nothing and is skipped.
pub fn cartesian_product(axes: &[Vec<OptionValuePair>]) -> Vec<Vec<OptionValuePair>> {
    axes.iter().fold(vec![Vec::new()], |acc, axis| {
        if axis.is_empty() {
            return acc;
        }
        acc.iter()
            .flat_map(|combo| {
                axis.iter().map(move |pair| {
                    let mut next = combo.clone();
                    next.push(pair.clone());
                    next
                })
            })
            .collect()
    })
}

/// Canonical identity of a combination, independent of pair order.
///
/// Every pair is formatted as `"name:value"`, the strings are sorted by
/// ordinal comparison and joined with `_`. The key is the sole correlation
/// mechanism between a freshly regenerated combination and previously
/// entered variant data, so edited stock/price/SKU survive regeneration as
/// long as the same combination still exists.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombinationKey(String);

impl CombinationKey {
    pub fn from_pairs(pairs: &[OptionValuePair]) -> Self {
        let mut parts: Vec<String> = pairs
            .iter()
            .map(|pair| format!("{}:{}", pair.option_name, pair.option_value))
            .collect();
        parts.sort();
        Self(parts.join("_"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CombinationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis(name: &str, values: &[&str]) -> Vec<OptionValuePair> {
        values
            .iter()
            .map(|value| OptionValuePair::new(name, *value))
            .collect()
    }

    #[test]
    fn product_size_is_product_of_axis_sizes() {
        let axes = vec![
            axis("Renk", &["Mavi", "Kırmızı", "Yeşil"]),
            axis("Beden", &["S", "M"]),
        ];
        let combos = cartesian_product(&axes);
        assert_eq!(combos.len(), 6);
        assert!(combos.iter().all(|combo| combo.len() == 2));
    }

    #[test]
    fn pair_order_follows_axis_input_order() {
        let axes = vec![axis("Renk", &["Mavi"]), axis("Beden", &["S", "M"])];
        let combos = cartesian_product(&axes);
        assert_eq!(combos[0][0].option_name, "Renk");
        assert_eq!(combos[0][1].option_name, "Beden");
        assert_eq!(combos[0][1].option_value, "S");
        assert_eq!(combos[1][1].option_value, "M");
    }

    #[test]
    fn zero_axes_yield_single_empty_combination() {
        let combos = cartesian_product(&[]);
        assert_eq!(combos, vec![Vec::new()]);
    }

    #[test]
    fn empty_axis_is_skipped() {
        let axes = vec![axis("Renk", &["Mavi", "Kırmızı"]), Vec::new()];
        let combos = cartesian_product(&axes);
        assert_eq!(combos.len(), 2);
        assert!(combos.iter().all(|combo| combo.len() == 1));
    }

    #[test]
    fn key_is_invariant_under_pair_reordering() {
        let combo = vec![
            OptionValuePair::new("Renk", "Mavi"),
            OptionValuePair::new("Beden", "XL"),
        ];
        let mut reversed = combo.clone();
        reversed.reverse();
        assert_eq!(
            CombinationKey::from_pairs(&combo),
            CombinationKey::from_pairs(&reversed)
        );
        assert_eq!(CombinationKey::from_pairs(&combo).as_str(), "Beden:XL_Renk:Mavi");
    }
}
