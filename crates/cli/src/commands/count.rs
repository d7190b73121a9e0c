//! Waitlist count command.

use restock_waitlist::{CountCache, CountState, CountTracker};
use serde::Serialize;

use super::{CommandError, client_from_env, write_json};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    variant_id: &'a str,
    count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Fetch and print the waitlist count for `variant_id`.
pub async fn show(variant_id: &str, refetch: bool) -> Result<(), CommandError> {
    let client = client_from_env()?;
    let tracker = CountTracker::new(client, CountCache::default(), variant_id);

    let count = if refetch {
        tracker.refetch().await
    } else {
        tracker.fetch_count().await
    };

    let CountState { error, .. } = tracker.state();
    write_json(&Report {
        variant_id: tracker.variant_id(),
        count,
        error: error.clone(),
    })?;

    error.map_or(Ok(()), |e| Err(CommandError::Rejected(e)))
}
