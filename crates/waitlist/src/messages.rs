//! User-facing messages produced by waitlist operations.

/// Text shown to shoppers for each waitlist outcome.
///
/// Hosts can override any field to localize or rebrand the copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitlistMessages {
    /// Email failed local validation.
    pub invalid_email: String,
    /// The service answered 429.
    pub rate_limited: String,
    /// No usable response arrived.
    pub network: String,
    /// The service rejected the request without a reason.
    pub unknown: String,
    /// Joined, when the service sent no message of its own.
    pub joined: String,
    /// Left, when the service sent no message of its own.
    pub left: String,
    /// Prefix of the count-fetch error; the HTTP status is appended when known.
    pub count_failed: String,
}

impl Default for WaitlistMessages {
    fn default() -> Self {
        Self {
            invalid_email: "Please enter a valid email address.".to_string(),
            rate_limited: "Too many requests. Please try again later.".to_string(),
            network: "Unable to connect. Please check your connection and try again."
                .to_string(),
            unknown: "Something went wrong. Please try again.".to_string(),
            joined: "You're on the list! We'll email you when it's back in stock.".to_string(),
            left: "You've been removed from the waitlist.".to_string(),
            count_failed: "Failed to fetch waitlist count".to_string(),
        }
    }
}
