//! Stock status reported to shoppers.

use serde::{Deserialize, Serialize};

/// Shopping-relevant availability of a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    /// Purchasable with stock on hand (or untracked inventory).
    Available,
    /// Not available for sale.
    OutOfStock,
    /// Available for sale despite zero tracked quantity.
    Preorder,
}

impl std::fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available => write!(f, "available"),
            Self::OutOfStock => write!(f, "out_of_stock"),
            Self::Preorder => write!(f, "preorder"),
        }
    }
}

impl std::str::FromStr for AvailabilityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "out_of_stock" => Ok(Self::OutOfStock),
            "preorder" => Ok(Self::Preorder),
            _ => Err(format!("invalid availability status: {s}")),
        }
    }
}
