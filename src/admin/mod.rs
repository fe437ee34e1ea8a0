//! Product authoring state for the admin add/edit screens.
//!
//! The form holds raw text the way it is typed; nothing is parsed until the
//! submission gate runs. Variant rows are regenerated from the option rows
//! on demand, keeping previously entered per-variant data via the
//! combination key.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::api::types::{OptionPayload, Product, ProductPayload, VariantPayload};
use crate::domain::combination::{CombinationKey, OptionValuePair};
use crate::domain::generator::{
    generate_variants, DraftId, GeneratedVariants, OptionInput, OptionWarning, VariantDraft,
};

/// Which admin screen the form is backing. The edit flow additionally
/// validates non-blank variant prices before submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormFlow {
    Create,
    Edit,
}

/// Why submission is blocked. None of these reach the network.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("product title is required")]
    MissingTitle,

    #[error("a valid base price of 0 or more is required")]
    InvalidBasePrice,

    #[error("at least one variant is required")]
    NoVariants,

    #[error("variant \"{variant}\" needs a whole stock amount of 0 or more")]
    InvalidStock { variant: String },

    #[error("variant \"{variant}\" has a price that is not a valid number")]
    InvalidVariantPrice { variant: String },

    #[error("no option row with that id")]
    UnknownOption,

    #[error("no variant row with that id")]
    UnknownVariant,
}

/// Working state of the add/edit product form.
#[derive(Clone, Debug)]
pub struct ProductForm {
    flow: FormFlow,
    pub title: String,
    pub description: String,
    /// Base price exactly as typed.
    pub price: String,
    pub category_id: Option<i64>,
    pub published: bool,
    pub is_favorite: bool,
    options: Vec<OptionInput>,
    variants: Vec<VariantDraft>,
}

impl ProductForm {
    pub fn new(flow: FormFlow) -> Self {
        Self {
            flow,
            title: String::new(),
            description: String::new(),
            price: String::new(),
            category_id: None,
            published: true,
            is_favorite: false,
            options: Vec::new(),
            variants: Vec::new(),
        }
    }

    /// Hydrate the edit form from a fetched product: option values joined
    /// back into their comma-separated authoring shape, variant keys
    /// recomputed from the stored configurations.
    pub fn from_product(product: &Product) -> Self {
        let options = product
            .options
            .iter()
            .map(|option| OptionInput {
                id: DraftId::Persisted(option.id),
                name: option.name.clone(),
                values: option
                    .values
                    .iter()
                    .map(|value| value.value.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
            .collect();

        let variants = product
            .variants
            .iter()
            .map(|variant| {
                let combination: Vec<OptionValuePair> = variant
                    .configurations
                    .iter()
                    .map(|config| {
                        OptionValuePair::new(
                            &config.option_value.option.name,
                            &config.option_value.value,
                        )
                    })
                    .collect();
                let key = CombinationKey::from_pairs(&combination);
                VariantDraft {
                    id: DraftId::Persisted(variant.id),
                    combination,
                    key,
                    sku: variant.sku.clone().unwrap_or_default(),
                    stock: variant.stock.to_string(),
                    price: variant.price.map(|p| p.to_string()).unwrap_or_default(),
                }
            })
            .collect();

        Self {
            flow: FormFlow::Edit,
            title: product.title.clone(),
            description: product.description.clone().unwrap_or_default(),
            price: product.price.to_string(),
            category_id: product.category_id,
            published: product.published,
            is_favorite: product.is_favorite,
            options,
            variants,
        }
    }

    pub fn flow(&self) -> FormFlow {
        self.flow
    }

    pub fn options(&self) -> &[OptionInput] {
        &self.options
    }

    pub fn variants(&self) -> &[VariantDraft] {
        &self.variants
    }

    /// Append a blank option row and return its id.
    pub fn add_option(&mut self) -> DraftId {
        let id = DraftId::fresh();
        self.options.push(OptionInput {
            id,
            name: String::new(),
            values: String::new(),
        });
        id
    }

    pub fn set_option_name(&mut self, id: DraftId, name: &str) -> Result<(), FormError> {
        let option = self.option_mut(id)?;
        option.name = name.trim().to_string();
        Ok(())
    }

    pub fn set_option_values(&mut self, id: DraftId, values: &str) -> Result<(), FormError> {
        let option = self.option_mut(id)?;
        option.values = values.to_string();
        Ok(())
    }

    /// Drop an option row along with every variant that referenced it.
    /// Removing the last row clears the whole variant working set.
    pub fn remove_option(&mut self, id: DraftId) -> Result<(), FormError> {
        let index = self
            .options
            .iter()
            .position(|option| option.id == id)
            .ok_or(FormError::UnknownOption)?;
        let removed = self.options.remove(index);
        if self.options.is_empty() {
            self.variants.clear();
        } else {
            let name = removed.name.trim().to_string();
            if !name.is_empty() {
                self.variants
                    .retain(|variant| !variant.references_option(&name));
            }
        }
        Ok(())
    }

    /// Recompute the variant working set from the current option rows,
    /// returning the warnings for any skipped rows.
    pub fn regenerate(&mut self) -> Vec<OptionWarning> {
        let GeneratedVariants { variants, warnings } =
            generate_variants(&self.options, &self.variants);
        self.variants = variants;
        warnings
    }

    pub fn set_variant_sku(&mut self, id: DraftId, sku: &str) -> Result<(), FormError> {
        self.variant_mut(id)?.sku = sku.to_string();
        Ok(())
    }

    pub fn set_variant_stock(&mut self, id: DraftId, stock: &str) -> Result<(), FormError> {
        self.variant_mut(id)?.stock = stock.to_string();
        Ok(())
    }

    pub fn set_variant_price(&mut self, id: DraftId, price: &str) -> Result<(), FormError> {
        self.variant_mut(id)?.price = price.to_string();
        Ok(())
    }

    pub fn remove_variant(&mut self, id: DraftId) -> Result<(), FormError> {
        let before = self.variants.len();
        self.variants.retain(|variant| variant.id != id);
        if self.variants.len() == before {
            return Err(FormError::UnknownVariant);
        }
        Ok(())
    }

    /// The submission gate: everything the screens verify before any
    /// network call is made.
    pub fn validate(&self) -> Result<(), FormError> {
        if self.title.trim().is_empty() {
            return Err(FormError::MissingTitle);
        }
        parse_price(&self.price).ok_or(FormError::InvalidBasePrice)?;
        if self.variants.is_empty() {
            return Err(FormError::NoVariants);
        }
        for variant in &self.variants {
            if parse_stock(&variant.stock).is_none() {
                return Err(FormError::InvalidStock {
                    variant: variant.display_name(),
                });
            }
            if self.flow == FormFlow::Edit
                && !variant.price.trim().is_empty()
                && parse_price(&variant.price).is_none()
            {
                return Err(FormError::InvalidVariantPrice {
                    variant: variant.display_name(),
                });
            }
        }
        Ok(())
    }

    /// Validate and convert the working state into the submission payload.
    /// Only usable option rows are sent; only persisted ids are echoed back.
    pub fn to_payload(&self) -> Result<ProductPayload, FormError> {
        self.validate()?;
        let price = parse_price(&self.price).ok_or(FormError::InvalidBasePrice)?;

        let options = self
            .options
            .iter()
            .filter(|option| option.is_usable())
            .map(|option| OptionPayload {
                id: option.id.persisted(),
                name: option.name.trim().to_string(),
                values: option
                    .value_tokens()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            })
            .collect();

        let variants = self
            .variants
            .iter()
            .map(|variant| {
                let sku = variant.sku.trim();
                VariantPayload {
                    id: variant.id.persisted(),
                    combination: variant.combination.clone(),
                    stock: parse_stock(&variant.stock).unwrap_or(0),
                    price: parse_price(&variant.price),
                    sku: (!sku.is_empty()).then(|| sku.to_string()),
                }
            })
            .collect();

        Ok(ProductPayload {
            title: self.title.trim().to_string(),
            description: self.description.clone(),
            price,
            category_id: self.category_id,
            published: self.published,
            is_favorite: self.is_favorite,
            options,
            variants,
        })
    }

    fn option_mut(&mut self, id: DraftId) -> Result<&mut OptionInput, FormError> {
        self.options
            .iter_mut()
            .find(|option| option.id == id)
            .ok_or(FormError::UnknownOption)
    }

    fn variant_mut(&mut self, id: DraftId) -> Result<&mut VariantDraft, FormError> {
        self.variants
            .iter_mut()
            .find(|variant| variant.id == id)
            .ok_or(FormError::UnknownVariant)
    }
}

/// A required whole stock amount of 0 or more.
fn parse_stock(raw: &str) -> Option<u32> {
    raw.trim().parse().ok()
}

/// An optional non-negative price; blank and unparseable both come back as
/// `None`.
fn parse_price(raw: &str) -> Option<Decimal> {
    let price: Decimal = raw.trim().parse().ok()?;
    (price >= Decimal::ZERO).then_some(price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::test_support::two_axis_product;

    fn filled_form(flow: FormFlow) -> ProductForm {
        let mut form = ProductForm::new(flow);
        form.title = "Pamuklu Tişört".to_string();
        form.price = "199.90".to_string();
        let renk = form.add_option();
        form.set_option_name(renk, "Renk").unwrap();
        form.set_option_values(renk, "Mavi,Kırmızı").unwrap();
        form.regenerate();
        for id in form.variants().iter().map(|v| v.id).collect::<Vec<_>>() {
            form.set_variant_stock(id, "5").unwrap();
        }
        form
    }

    #[test]
    fn create_flow_gate_blocks_each_missing_piece() {
        let mut form = ProductForm::new(FormFlow::Create);
        assert_eq!(form.validate(), Err(FormError::MissingTitle));

        form.title = "Tişört".to_string();
        assert_eq!(form.validate(), Err(FormError::InvalidBasePrice));

        form.price = "199.90".to_string();
        assert_eq!(form.validate(), Err(FormError::NoVariants));

        form.regenerate();
        assert_eq!(form.variants().len(), 1);
        let id = form.variants()[0].id;
        form.set_variant_stock(id, "-1").unwrap();
        assert!(matches!(
            form.validate(),
            Err(FormError::InvalidStock { .. })
        ));

        form.set_variant_stock(id, "3").unwrap();
        assert_eq!(form.validate(), Ok(()));
    }

    #[test]
    fn variant_price_blocks_only_the_edit_flow() {
        let mut form = filled_form(FormFlow::Create);
        let id = form.variants()[0].id;
        form.set_variant_price(id, "abc").unwrap();
        assert_eq!(form.validate(), Ok(()));
        // An unparseable price on the create flow falls back to null.
        let payload = form.to_payload().unwrap();
        assert_eq!(payload.variants[0].price, None);

        let mut form = filled_form(FormFlow::Edit);
        let id = form.variants()[0].id;
        form.set_variant_price(id, "abc").unwrap();
        assert!(matches!(
            form.validate(),
            Err(FormError::InvalidVariantPrice { .. })
        ));
    }

    #[test]
    fn removing_an_option_prunes_its_variants() {
        let mut form = filled_form(FormFlow::Create);
        let beden = form.add_option();
        form.set_option_name(beden, "Beden").unwrap();
        form.set_option_values(beden, "S,M").unwrap();
        form.regenerate();
        assert_eq!(form.variants().len(), 4);

        // Every combination referenced Beden, so the cascade drops them all
        // until the author regenerates.
        form.remove_option(beden).unwrap();
        assert!(form.variants().is_empty());
        let warnings = form.regenerate();
        assert!(warnings.is_empty());
        assert_eq!(form.variants().len(), 2);

        let renk = form.options()[0].id;
        form.remove_option(renk).unwrap();
        assert!(form.variants().is_empty());
    }

    #[test]
    fn regeneration_after_an_edit_keeps_row_data() {
        let mut form = filled_form(FormFlow::Create);
        let blue_id = form
            .variants()
            .iter()
            .find(|variant| variant.key.as_str() == "Renk:Mavi")
            .map(|variant| variant.id)
            .unwrap();
        form.set_variant_sku(blue_id, "SKU-MAVI").unwrap();

        let renk = form.options()[0].id;
        form.set_option_values(renk, "Mavi,Kırmızı,Yeşil").unwrap();
        form.regenerate();

        let blue = form
            .variants()
            .iter()
            .find(|variant| variant.key.as_str() == "Renk:Mavi")
            .unwrap();
        assert_eq!(blue.id, blue_id);
        assert_eq!(blue.sku, "SKU-MAVI");
    }

    #[test]
    fn hydration_recomputes_keys_that_line_up_with_regeneration() {
        let product = two_axis_product();
        let mut form = ProductForm::from_product(&product);
        assert_eq!(form.flow(), FormFlow::Edit);
        assert_eq!(form.options().len(), 2);
        assert_eq!(form.variants().len(), 3);
        let loaded: Vec<(DraftId, String)> = form
            .variants()
            .iter()
            .map(|variant| (variant.id, variant.key.as_str().to_string()))
            .collect();

        // Regenerating without touching the options must keep every loaded
        // row's identity.
        form.regenerate();
        for (id, key) in loaded {
            let row = form
                .variants()
                .iter()
                .find(|variant| variant.key.as_str() == key)
                .unwrap();
            assert_eq!(row.id, id);
        }
    }

    #[test]
    fn payload_echoes_persisted_ids_only() {
        let product = two_axis_product();
        let mut form = ProductForm::from_product(&product);
        let renk = form.options()[0].id;
        form.set_option_values(renk, "Mavi,Kırmızı,Yeşil").unwrap();
        form.regenerate();
        for id in form
            .variants()
            .iter()
            .map(|variant| variant.id)
            .collect::<Vec<_>>()
        {
            form.set_variant_stock(id, "2").unwrap();
        }

        let payload = form.to_payload().unwrap();
        assert_eq!(payload.options[0].id, Some(1));
        let persisted = payload
            .variants
            .iter()
            .filter(|variant| variant.id.is_some())
            .count();
        let fresh = payload.variants.len() - persisted;
        assert_eq!(persisted, 3);
        assert_eq!(fresh, 3);
        assert!(payload
            .variants
            .iter()
            .all(|variant| variant.stock == 2));
    }

    #[test]
    fn blank_sku_and_price_are_absent_from_the_payload() {
        let form = filled_form(FormFlow::Create);
        let payload = form.to_payload().unwrap();
        assert_eq!(payload.variants[0].sku, None);
        assert_eq!(payload.variants[0].price, None);
        assert_eq!(payload.title, "Pamuklu Tişört");
    }
}
