//! Newtype global IDs for type-safe resource references.
//!
//! Use the `define_gid!` macro to create ID wrappers that only accept a
//! Shopify global ID of one resource type (or a bare numeric ID), so a
//! product ID can never be passed where a variant ID is expected.

/// Errors that can occur when parsing a global ID.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The input is neither `gid://shopify/<resource>/<digits>` nor digits.
    #[error("invalid {resource} id: {value}")]
    Invalid {
        /// Expected Shopify resource type.
        resource: &'static str,
        /// Rejected input.
        value: String,
    },
}

/// Macro to define a type-safe global ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` that validate on the way in
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `parse()`, `as_str()` and `numeric_id()`
/// - `Display`, `FromStr` and `AsRef<str>`
///
/// # Example
///
/// ```rust
/// # use restock_core::define_gid;
/// define_gid!(CollectionGid, "Collection");
///
/// let id = CollectionGid::parse("gid://shopify/Collection/42").unwrap();
/// assert_eq!(id.numeric_id(), "42");
/// assert!(CollectionGid::parse("gid://shopify/Product/42").is_err());
/// ```
#[macro_export]
macro_rules! define_gid {
    ($name:ident, $resource:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Shopify resource type accepted by this ID.
            pub const RESOURCE: &'static str = $resource;

            /// Parse a global ID or bare numeric ID.
            ///
            /// # Errors
            ///
            /// Returns `IdError::Invalid` if the input has the wrong shape or
            /// names a different resource type.
            pub fn parse(s: &str) -> ::core::result::Result<Self, $crate::IdError> {
                if $crate::validation::is_valid_gid(s, $resource) {
                    Ok(Self(s.to_owned()))
                } else {
                    Err($crate::IdError::Invalid {
                        resource: $resource,
                        value: s.to_owned(),
                    })
                }
            }

            /// Returns the ID exactly as it was supplied.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns the trailing numeric segment.
            #[must_use]
            pub fn numeric_id(&self) -> &str {
                $crate::validation::extract_numeric_id(&self.0)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl ::core::convert::TryFrom<String> for $name {
            type Error = $crate::IdError;

            fn try_from(s: String) -> ::core::result::Result<Self, Self::Error> {
                Self::parse(&s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_gid!(VariantGid, "ProductVariant");
define_gid!(ProductGid, "Product");

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_gid() {
        let id = VariantGid::parse("gid://shopify/ProductVariant/123").unwrap();
        assert_eq!(id.numeric_id(), "123");
        assert_eq!(id.as_str(), "gid://shopify/ProductVariant/123");
    }

    #[test]
    fn test_numeric_ids_accepted_for_both() {
        assert_eq!(VariantGid::parse("123").unwrap().numeric_id(), "123");
        assert_eq!(ProductGid::parse("123").unwrap().numeric_id(), "123");
    }

    #[test]
    fn test_resource_mismatch_rejected() {
        let err = VariantGid::parse("gid://shopify/Product/123").unwrap_err();
        assert_eq!(
            err,
            IdError::Invalid {
                resource: "ProductVariant",
                value: "gid://shopify/Product/123".to_string(),
            }
        );
        assert!(ProductGid::parse("gid://shopify/ProductVariant/123").is_err());
    }

    #[test]
    fn test_serde_validates() {
        let id: ProductGid = serde_json::from_str("\"gid://shopify/Product/9\"").unwrap();
        assert_eq!(id.numeric_id(), "9");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"gid://shopify/Product/9\"");

        assert!(serde_json::from_str::<ProductGid>("\"gid://shopify/Order/9\"").is_err());
    }
}
