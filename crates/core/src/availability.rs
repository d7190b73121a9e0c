//! Availability classifier for product variants.
//!
//! Turns a [`VariantInfo`] snapshot into the flags a product page needs:
//! whether to show the buy button, a low-stock hint, or the notify-me form.

use serde::Serialize;

use crate::types::{AvailabilityStatus, VariantInfo};

/// Quantity at or below which an available variant counts as low stock.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// Result of [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub status: AvailabilityStatus,
    pub is_available: bool,
    pub is_out_of_stock: bool,
    pub is_low_stock: bool,
    /// True exactly when the variant is out of stock. Preorder variants are
    /// purchasable and get their own affordance instead.
    pub show_notify_me: bool,
    /// Tracked quantity copied from the snapshot, for labels.
    pub quantity_available: Option<i64>,
}

impl Availability {
    const MISSING: Self = Self {
        status: AvailabilityStatus::OutOfStock,
        is_available: false,
        is_out_of_stock: true,
        is_low_stock: false,
        show_notify_me: false,
        quantity_available: None,
    };

    /// Short shopper-facing label.
    #[must_use]
    pub fn label(&self) -> String {
        match (self.status, self.quantity_available) {
            (AvailabilityStatus::OutOfStock, _) => "Out of stock".to_string(),
            (AvailabilityStatus::Preorder, _) => "Available for preorder".to_string(),
            (AvailabilityStatus::Available, Some(qty)) if self.is_low_stock => {
                format!("Only {qty} left")
            }
            (AvailabilityStatus::Available, _) => "In stock".to_string(),
        }
    }
}

/// Classify a variant's availability.
///
/// A missing variant is reported as out of stock without offering the
/// notify-me form, since there is nothing to subscribe to.
///
/// ```
/// use restock_core::{AvailabilityStatus, VariantInfo, classify, DEFAULT_LOW_STOCK_THRESHOLD};
///
/// let variant = VariantInfo {
///     id: "1".into(),
///     product_id: "2".into(),
///     product_title: "Mug".into(),
///     variant_title: None,
///     available_for_sale: true,
///     quantity_available: Some(0),
///     price: None,
///     image: None,
/// };
/// let availability = classify(Some(&variant), DEFAULT_LOW_STOCK_THRESHOLD);
/// assert_eq!(availability.status, AvailabilityStatus::Preorder);
/// assert!(!availability.show_notify_me);
/// ```
#[must_use]
pub fn classify(variant: Option<&VariantInfo>, low_stock_threshold: i64) -> Availability {
    let Some(variant) = variant else {
        return Availability::MISSING;
    };

    let is_available = variant.available_for_sale;
    let is_out_of_stock = !is_available;
    let quantity = variant.quantity_available;

    let status = if is_out_of_stock {
        AvailabilityStatus::OutOfStock
    } else if quantity == Some(0) {
        AvailabilityStatus::Preorder
    } else {
        AvailabilityStatus::Available
    };

    let is_low_stock =
        is_available && quantity.is_some_and(|qty| qty > 0 && qty <= low_stock_threshold);

    Availability {
        status,
        is_available,
        is_out_of_stock,
        is_low_stock,
        show_notify_me: is_out_of_stock,
        quantity_available: quantity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(available_for_sale: bool, quantity_available: Option<i64>) -> VariantInfo {
        VariantInfo {
            id: "gid://shopify/ProductVariant/1".to_string(),
            product_id: "gid://shopify/Product/1".to_string(),
            product_title: "Tee".to_string(),
            variant_title: None,
            available_for_sale,
            quantity_available,
            price: None,
            image: None,
        }
    }

    #[test]
    fn test_missing_variant() {
        let a = classify(None, DEFAULT_LOW_STOCK_THRESHOLD);
        assert_eq!(a.status, AvailabilityStatus::OutOfStock);
        assert!(!a.is_available);
        assert!(a.is_out_of_stock);
        assert!(!a.is_low_stock);
        assert!(!a.show_notify_me);
    }

    #[test]
    fn test_out_of_stock_shows_notify_me() {
        let a = classify(Some(&variant(false, Some(0))), DEFAULT_LOW_STOCK_THRESHOLD);
        assert_eq!(a.status, AvailabilityStatus::OutOfStock);
        assert!(a.show_notify_me);
        assert!(!a.is_low_stock);
        assert_eq!(a.label(), "Out of stock");
    }

    #[test]
    fn test_zero_quantity_but_for_sale_is_preorder() {
        let a = classify(Some(&variant(true, Some(0))), DEFAULT_LOW_STOCK_THRESHOLD);
        assert_eq!(a.status, AvailabilityStatus::Preorder);
        assert!(a.is_available);
        assert!(!a.show_notify_me);
        assert!(!a.is_low_stock);
        assert_eq!(a.label(), "Available for preorder");
    }

    #[test]
    fn test_low_stock() {
        let a = classify(Some(&variant(true, Some(3))), 5);
        assert_eq!(a.status, AvailabilityStatus::Available);
        assert!(a.is_low_stock);
        assert_eq!(a.label(), "Only 3 left");
    }

    #[test]
    fn test_low_stock_threshold_is_inclusive() {
        assert!(classify(Some(&variant(true, Some(5))), 5).is_low_stock);
        assert!(!classify(Some(&variant(true, Some(6))), 5).is_low_stock);
    }

    #[test]
    fn test_untracked_inventory_is_available() {
        let a = classify(Some(&variant(true, None)), DEFAULT_LOW_STOCK_THRESHOLD);
        assert_eq!(a.status, AvailabilityStatus::Available);
        assert!(!a.is_low_stock);
        assert_eq!(a.label(), "In stock");
    }

    #[test]
    fn test_oversold_negative_quantity_is_available() {
        let a = classify(Some(&variant(true, Some(-2))), DEFAULT_LOW_STOCK_THRESHOLD);
        assert_eq!(a.status, AvailabilityStatus::Available);
        assert!(!a.is_low_stock);
    }
}
