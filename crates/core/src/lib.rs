//! Restock Core - Shared types library.
//!
//! This crate provides the pure building blocks used by every Restock
//! component:
//! - `waitlist` - Join/leave/count client for the remote waitlist service
//! - `cli` - Command-line driver for the waitlist client
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no clocks. This keeps it lightweight and allows it to be used
//! anywhere, including inside request handlers of the hosting storefront.
//!
//! # Modules
//!
//! - [`validation`] - Email, global ID and free-text input checks
//! - [`availability`] - Stock status classifier for product variants
//! - [`types`] - Newtype wrappers for emails, global IDs, prices and variants

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod availability;
pub mod types;
pub mod validation;

pub use availability::{Availability, DEFAULT_LOW_STOCK_THRESHOLD, classify};
pub use types::*;
pub use validation::{
    MAX_INPUT_LENGTH, extract_numeric_id, is_valid_email, is_valid_product_id,
    is_valid_variant_id, sanitize_input,
};
