//! Admin-side variant generation.
//!
//! Turns the author's current option rows into the authoritative variant
//! working set. Previously entered SKU/stock/price ride across regeneration
//! passes on the combination key; combinations that no longer exist are
//! dropped, which is how removing or editing an option prunes stale
//! variants.

use thiserror::Error;
use uuid::Uuid;

use crate::domain::combination::{cartesian_product, CombinationKey, OptionValuePair};

/// Option axis used when a product declares no options at all.
pub const FALLBACK_OPTION_NAME: &str = "Çeşit";
/// Value of the implicit variant on the fallback axis.
pub const FALLBACK_OPTION_VALUE: &str = "Standart";

/// Identity of a working entry: a row already saved on the server, or a
/// fresh client-side draft.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DraftId {
    Persisted(i64),
    Local(Uuid),
}

impl DraftId {
    pub fn fresh() -> Self {
        Self::Local(Uuid::new_v4())
    }

    /// Server id, if this entry has one. Only persisted ids are echoed back
    /// in submission payloads.
    pub fn persisted(self) -> Option<i64> {
        match self {
            Self::Persisted(id) => Some(id),
            Self::Local(_) => None,
        }
    }
}

/// One option row as typed on the admin form: a name and the raw
/// comma-separated value string.
#[derive(Clone, Debug)]
pub struct OptionInput {
    pub id: DraftId,
    pub name: String,
    pub values: String,
}

impl OptionInput {
    pub fn new(name: impl Into<String>, values: impl Into<String>) -> Self {
        Self {
            id: DraftId::fresh(),
            name: name.into(),
            values: values.into(),
        }
    }

    /// Trimmed, non-empty value tokens.
    pub fn value_tokens(&self) -> Vec<&str> {
        self.values
            .split(',')
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .collect()
    }

    /// Usable rows have both a name and at least one value; only these
    /// contribute an axis and get submitted.
    pub fn is_usable(&self) -> bool {
        !self.name.trim().is_empty() && !self.value_tokens().is_empty()
    }
}

/// One variant working entry. Stock and price stay raw strings until the
/// submission gate parses them.
#[derive(Clone, Debug)]
pub struct VariantDraft {
    pub id: DraftId,
    pub combination: Vec<OptionValuePair>,
    pub key: CombinationKey,
    pub sku: String,
    pub stock: String,
    pub price: String,
}

impl VariantDraft {
    /// Human-readable combination, the way variant rows are labeled
    /// ("Mavi / XL").
    pub fn display_name(&self) -> String {
        if self.combination.is_empty() {
            return FALLBACK_OPTION_VALUE.to_string();
        }
        self.combination
            .iter()
            .map(|pair| pair.option_value.as_str())
            .collect::<Vec<_>>()
            .join(" / ")
    }

    pub fn references_option(&self, option_name: &str) -> bool {
        self.combination
            .iter()
            .any(|pair| pair.option_name == option_name)
    }
}

/// Why an option row was left out of a generation pass.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum OptionWarning {
    /// Values were entered but the name was left blank.
    #[error("an option with values needs a name; the row was skipped")]
    MissingName,
    /// The named option has no usable values after trimming.
    #[error("option \"{name}\" has no values and was skipped")]
    NoValues { name: String },
}

/// Result of one generation pass: the replacement working set plus any
/// option rows that were skipped.
#[derive(Clone, Debug)]
pub struct GeneratedVariants {
    pub variants: Vec<VariantDraft>,
    pub warnings: Vec<OptionWarning>,
}

/// Regenerate the variant working set from the current option rows.
///
/// Options with a trimmed name and at least one trimmed value each become an
/// axis; rows failing that are skipped with a warning (fully blank rows are
/// ignored silently). With no usable axes the single implicit
/// `Çeşit:Standart` variant is emitted. Every combination reuses the
/// id/SKU/stock/price of a previous entry with the same combination key;
/// everything else starts as a fresh draft with stock `"0"`.
pub fn generate_variants(
    options: &[OptionInput],
    previous: &[VariantDraft],
) -> GeneratedVariants {
    let mut warnings = Vec::new();
    let mut axes: Vec<Vec<OptionValuePair>> = Vec::new();

    for option in options {
        let name = option.name.trim();
        let tokens = option.value_tokens();
        match (name.is_empty(), tokens.is_empty()) {
            (true, true) => {}
            (true, false) => warnings.push(OptionWarning::MissingName),
            (false, true) => warnings.push(OptionWarning::NoValues {
                name: name.to_string(),
            }),
            (false, false) => axes.push(
                tokens
                    .into_iter()
                    .map(|value| OptionValuePair::new(name, value))
                    .collect(),
            ),
        }
    }

    if axes.is_empty() {
        let combination = vec![OptionValuePair::new(
            FALLBACK_OPTION_NAME,
            FALLBACK_OPTION_VALUE,
        )];
        let key = CombinationKey::from_pairs(&combination);
        let variant = build_variant(combination, key, previous);
        tracing::debug!("no usable options, emitting the implicit variant");
        return GeneratedVariants {
            variants: vec![variant],
            warnings,
        };
    }

    let variants: Vec<VariantDraft> = cartesian_product(&axes)
        .into_iter()
        .map(|combination| {
            let key = CombinationKey::from_pairs(&combination);
            build_variant(combination, key, previous)
        })
        .collect();

    tracing::debug!(count = variants.len(), "regenerated variant working set");
    GeneratedVariants { variants, warnings }
}

fn build_variant(
    combination: Vec<OptionValuePair>,
    key: CombinationKey,
    previous: &[VariantDraft],
) -> VariantDraft {
    match previous.iter().find(|prev| prev.key == key) {
        Some(prev) => VariantDraft {
            id: prev.id,
            combination,
            key,
            sku: prev.sku.clone(),
            stock: prev.stock.clone(),
            price: prev.price.clone(),
        },
        None => VariantDraft {
            id: DraftId::fresh(),
            combination,
            key,
            sku: String::new(),
            stock: "0".to_string(),
            price: String::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_axes_produce_four_variants_with_sorted_keys() {
        let options = vec![
            OptionInput::new("Renk", "Mavi,Kırmızı"),
            OptionInput::new("Beden", "S, M"),
        ];
        let generated = generate_variants(&options, &[]);
        assert!(generated.warnings.is_empty());

        let keys: Vec<&str> = generated
            .variants
            .iter()
            .map(|variant| variant.key.as_str())
            .collect();
        assert_eq!(
            keys,
            vec![
                "Beden:S_Renk:Mavi",
                "Beden:M_Renk:Mavi",
                "Beden:S_Renk:Kırmızı",
                "Beden:M_Renk:Kırmızı",
            ]
        );
    }

    #[test]
    fn regeneration_preserves_entered_data_for_surviving_keys() {
        let options = vec![OptionInput::new("Renk", "Mavi,Kırmızı")];
        let mut generated = generate_variants(&options, &[]);
        let blue = &mut generated.variants[0];
        blue.sku = "SKU-MAVI".to_string();
        blue.stock = "7".to_string();
        blue.price = "149.90".to_string();
        let blue_id = blue.id;

        let options = vec![OptionInput::new("Renk", "Mavi,Kırmızı,Yeşil")];
        let regenerated = generate_variants(&options, &generated.variants);
        assert_eq!(regenerated.variants.len(), 3);

        let blue = regenerated
            .variants
            .iter()
            .find(|variant| variant.key.as_str() == "Renk:Mavi")
            .unwrap();
        assert_eq!(blue.id, blue_id);
        assert_eq!(blue.sku, "SKU-MAVI");
        assert_eq!(blue.stock, "7");
        assert_eq!(blue.price, "149.90");

        let green = regenerated
            .variants
            .iter()
            .find(|variant| variant.key.as_str() == "Renk:Yeşil")
            .unwrap();
        assert_eq!(green.stock, "0");
        assert!(green.sku.is_empty());
    }

    #[test]
    fn removed_value_prunes_its_variants() {
        let options = vec![OptionInput::new("Renk", "Mavi,Kırmızı")];
        let generated = generate_variants(&options, &[]);

        let options = vec![OptionInput::new("Renk", "Mavi")];
        let regenerated = generate_variants(&options, &generated.variants);
        assert_eq!(regenerated.variants.len(), 1);
        assert_eq!(regenerated.variants[0].key.as_str(), "Renk:Mavi");
    }

    #[test]
    fn no_usable_options_fall_back_to_the_implicit_variant() {
        let generated = generate_variants(&[], &[]);
        assert_eq!(generated.variants.len(), 1);
        let variant = &generated.variants[0];
        assert_eq!(variant.key.as_str(), "Çeşit:Standart");
        assert_eq!(variant.stock, "0");
        assert!(variant.price.is_empty());
    }

    #[test]
    fn implicit_variant_keeps_previous_entry() {
        let mut generated = generate_variants(&[], &[]);
        generated.variants[0].stock = "12".to_string();
        let id = generated.variants[0].id;

        let regenerated = generate_variants(&[], &generated.variants);
        assert_eq!(regenerated.variants[0].id, id);
        assert_eq!(regenerated.variants[0].stock, "12");
    }

    #[test]
    fn unusable_rows_warn_and_are_excluded() {
        let options = vec![
            OptionInput::new("", "Mavi,Kırmızı"),
            OptionInput::new("Beden", "  , "),
            OptionInput::new("Renk", "Mavi"),
            OptionInput::new("", ""),
        ];
        let generated = generate_variants(&options, &[]);
        assert_eq!(
            generated.warnings,
            vec![
                OptionWarning::MissingName,
                OptionWarning::NoValues {
                    name: "Beden".to_string()
                },
            ]
        );
        assert_eq!(generated.variants.len(), 1);
        assert_eq!(generated.variants[0].key.as_str(), "Renk:Mavi");
    }

    #[test]
    fn value_tokens_trim_and_drop_blanks() {
        let option = OptionInput::new("Renk", " Mavi , ,Kırmızı,");
        assert_eq!(option.value_tokens(), vec!["Mavi", "Kırmızı"]);
    }
}
