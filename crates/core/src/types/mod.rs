//! Core types for Restock.
//!
//! This module provides type-safe wrappers for the domain concepts shared by
//! the waitlist client and its hosts.

pub mod email;
pub mod id;
pub mod price;
pub mod status;
pub mod variant;

pub use email::{Email, EmailError, normalize as normalize_email};
pub use id::*;
pub use price::Money;
pub use status::AvailabilityStatus;
pub use variant::{VariantImage, VariantInfo};
