//! Input validation and sanitization.
//!
//! Every function here is pure and total: malformed input yields `false`
//! or an empty string, never a panic.

/// Maximum number of characters kept by [`sanitize_input`].
pub const MAX_INPUT_LENGTH: usize = 500;

/// Prefix shared by all Shopify global IDs.
const GID_PREFIX: &str = "gid://shopify/";

/// Check that a string looks like `local@domain.tld`.
///
/// Deliberately permissive: the input is trimmed, must contain exactly one
/// `@`, no whitespace, and a `.` inside the domain with text on both sides.
///
/// ```
/// use restock_core::is_valid_email;
///
/// assert!(is_valid_email("user+tag@domain.co"));
/// assert!(is_valid_email("  first.last@domain.org  "));
/// assert!(!is_valid_email("user@domain"));
/// assert!(!is_valid_email("user @domain.com"));
/// ```
#[must_use]
pub fn is_valid_email(s: &str) -> bool {
    let s = s.trim();
    if s.is_empty() || s.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    // Some dot must have at least one character before and after it.
    let last = domain.len().saturating_sub(1);
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i < last)
}

/// Check for a `ProductVariant` global ID or a bare numeric ID.
#[must_use]
pub fn is_valid_variant_id(s: &str) -> bool {
    is_valid_gid(s, "ProductVariant")
}

/// Check for a `Product` global ID or a bare numeric ID.
#[must_use]
pub fn is_valid_product_id(s: &str) -> bool {
    is_valid_gid(s, "Product")
}

/// Check `s` against `gid://shopify/<resource>/<digits>` or plain digits.
#[must_use]
pub fn is_valid_gid(s: &str, resource: &str) -> bool {
    if is_all_digits(s) {
        return true;
    }

    s.strip_prefix(GID_PREFIX)
        .and_then(|rest| rest.strip_prefix(resource))
        .and_then(|rest| rest.strip_prefix('/'))
        .is_some_and(is_all_digits)
}

/// Return the trailing numeric segment of a global ID.
///
/// Input without a trailing `/<digits>` segment is returned unchanged.
///
/// ```
/// use restock_core::extract_numeric_id;
///
/// assert_eq!(extract_numeric_id("gid://shopify/ProductVariant/123"), "123");
/// assert_eq!(extract_numeric_id("123"), "123");
/// assert_eq!(extract_numeric_id(""), "");
/// ```
#[must_use]
pub fn extract_numeric_id(gid: &str) -> &str {
    match gid.rsplit_once('/') {
        Some((_, tail)) if is_all_digits(tail) => tail,
        _ => gid,
    }
}

/// Clean free-text user input before it is sent anywhere.
///
/// Trims surrounding whitespace, removes every literal `<` and `>`, then
/// truncates to [`MAX_INPUT_LENGTH`] characters. This is not HTML escaping.
#[must_use]
pub fn sanitize_input(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !matches!(c, '<' | '>'))
        .take(MAX_INPUT_LENGTH)
        .collect()
}

fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
