//! Variant snapshots supplied by the hosting storefront.

use serde::{Deserialize, Serialize};

use super::price::Money;
use crate::validation::extract_numeric_id;

/// Variant title Shopify assigns to products without options.
const DEFAULT_VARIANT_TITLE: &str = "Default Title";

/// Image attached to a variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantImage {
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
}

/// Immutable snapshot of a purchasable variant.
///
/// Owned by the host; this crate only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantInfo {
    /// Variant global ID (or numeric ID).
    pub id: String,
    /// Parent product global ID (or numeric ID).
    pub product_id: String,
    /// Parent product title.
    pub product_title: String,
    /// Variant title (combination of option values).
    #[serde(default)]
    pub variant_title: Option<String>,
    /// Whether this variant is available for sale.
    pub available_for_sale: bool,
    /// Quantity available (if inventory tracking enabled).
    #[serde(default)]
    pub quantity_available: Option<i64>,
    /// Current price.
    #[serde(default)]
    pub price: Option<Money>,
    /// Variant image.
    #[serde(default)]
    pub image: Option<VariantImage>,
}

impl VariantInfo {
    /// Numeric part of the variant ID, as used in count URLs.
    #[must_use]
    pub fn numeric_id(&self) -> &str {
        extract_numeric_id(&self.id)
    }

    /// Variant title unless it is missing, blank or Shopify's placeholder.
    #[must_use]
    pub fn meaningful_variant_title(&self) -> Option<&str> {
        self.variant_title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty() && *t != DEFAULT_VARIANT_TITLE)
    }

    /// Title for notifications: `Product - Variant`, or just the product.
    #[must_use]
    pub fn display_title(&self) -> String {
        match self.meaningful_variant_title() {
            Some(variant) => format!("{} - {variant}", self.product_title),
            None => self.product_title.clone(),
        }
    }
}
