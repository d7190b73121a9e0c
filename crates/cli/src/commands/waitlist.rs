//! Waitlist membership commands.
//!
//! # Environment Variables
//!
//! - `RESTOCK_API_URL` - Base URL of the waitlist service
//! - `RESTOCK_SHOP_DOMAIN` - Store domain sent with every request
//! - `RESTOCK_API_KEY` - Optional bearer token

use restock_core::{ProductGid, VariantGid};
use restock_waitlist::{WaitlistOutcome, WaitlistSession, WaitlistState, WaitlistTarget};
use serde::Serialize;

use super::{CommandError, client_from_env, write_json};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a, R> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<&'a R>,
    state: WaitlistState,
}

/// Validate IDs and assemble a waitlist target.
pub fn target(
    variant_id: &str,
    product_id: &str,
    product_title: Option<String>,
    variant_title: Option<String>,
) -> Result<WaitlistTarget, CommandError> {
    let variant_id = VariantGid::parse(variant_id)?;
    let product_id = ProductGid::parse(product_id)?;

    Ok(WaitlistTarget {
        variant_id: variant_id.into(),
        product_id: product_id.into(),
        product_title,
        variant_title,
    })
}

/// Join the waitlist and print the outcome.
pub async fn join(target: WaitlistTarget, email: &str) -> Result<(), CommandError> {
    let session = WaitlistSession::new(client_from_env()?, target);

    tracing::info!(variant_id = %session.target().variant_id, "Joining waitlist");
    let outcome = session.join(email).await;
    report(&session, &outcome)
}

/// Leave the waitlist and print the outcome.
pub async fn leave(variant_id: &str, email: &str) -> Result<(), CommandError> {
    let variant_id = VariantGid::parse(variant_id)?;
    let target = WaitlistTarget {
        variant_id: variant_id.into(),
        product_id: String::new(),
        product_title: None,
        variant_title: None,
    };
    let session = WaitlistSession::new(client_from_env()?, target);

    tracing::info!(variant_id = %session.target().variant_id, "Leaving waitlist");
    let outcome = session.leave(email).await;
    report(&session, &outcome)
}

fn report<R: Serialize>(
    session: &WaitlistSession,
    outcome: &WaitlistOutcome<R>,
) -> Result<(), CommandError> {
    let response = match outcome {
        WaitlistOutcome::Success(response) => Some(response),
        WaitlistOutcome::Failure(failure) => failure.response.as_ref(),
    };

    write_json(&Report {
        success: outcome.is_success(),
        error: outcome.error(),
        response,
        state: session.state(),
    })?;

    match outcome.error() {
        Some(error) => Err(CommandError::Rejected(error.to_owned())),
        None => Ok(()),
    }
}
