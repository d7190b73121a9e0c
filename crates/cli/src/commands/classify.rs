//! Availability classification command.

use restock_core::{Availability, Money, VariantInfo, classify};
use serde::Serialize;

use super::{CommandError, write_json};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    #[serde(flatten)]
    availability: Availability,
    label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    price: Option<String>,
}

/// Classify a variant described on the command line and print the result.
pub fn show(
    available_for_sale: bool,
    quantity_available: Option<i64>,
    price: Option<Money>,
    threshold: i64,
) -> Result<(), CommandError> {
    let variant = VariantInfo {
        id: String::new(),
        product_id: String::new(),
        product_title: String::new(),
        variant_title: None,
        available_for_sale,
        quantity_available,
        price,
        image: None,
    };

    let availability = classify(Some(&variant), threshold);
    write_json(&Report {
        availability,
        label: availability.label(),
        price: variant.price.as_ref().map(ToString::to_string),
    })
}
