//! Full join, count and leave flow through a waitlist session.

use restock_core::{DEFAULT_LOW_STOCK_THRESHOLD, VariantInfo, classify};
use restock_integration_tests::{Endpoint, MockBackend, SHOP_DOMAIN};
use restock_waitlist::{CountCache, CountTracker, ErrorKind, WaitlistSession, WaitlistTarget};
use serde_json::json;

fn sold_out_variant() -> VariantInfo {
    VariantInfo {
        id: "gid://shopify/ProductVariant/123".to_string(),
        product_id: "gid://shopify/Product/45".to_string(),
        product_title: "Linen Shirt".to_string(),
        variant_title: Some("M / Blue".to_string()),
        available_for_sale: false,
        quantity_available: Some(0),
        price: None,
        image: None,
    }
}

#[tokio::test]
async fn test_sold_out_variant_join_then_leave() {
    let backend = MockBackend::start().await;
    backend.respond(
        Endpoint::Join,
        200,
        json!({"success": true, "entryId": "e-9", "message": "See you soon"}),
    );
    backend.respond(Endpoint::Count, 200, json!({"variantId": "123", "count": 1}));
    backend.respond(Endpoint::Leave, 200, json!({"success": true}));

    let variant = sold_out_variant();
    assert!(classify(Some(&variant), DEFAULT_LOW_STOCK_THRESHOLD).show_notify_me);

    let client = backend.client(Some("sk_test"));
    let session = WaitlistSession::new(client.clone(), WaitlistTarget::from(&variant));

    let joined = session.join(" Shopper@Example.com ").await;
    assert!(joined.is_success());
    let state = session.state();
    assert!(state.is_joined);
    assert_eq!(state.email, "shopper@example.com");
    assert_eq!(state.success_message.as_deref(), Some("See you soon"));

    let tracker = CountTracker::new(client, CountCache::default(), &variant.id);
    assert_eq!(tracker.fetch_count().await, 1);

    let left = session.leave("shopper@example.com").await;
    assert!(left.is_success());
    assert!(!session.state().is_joined);

    let leave = backend
        .requests()
        .into_iter()
        .find(|r| r.endpoint == Endpoint::Leave)
        .expect("leave request recorded");
    assert_eq!(
        leave.body,
        Some(json!({
            "email": "shopper@example.com",
            "variantId": "gid://shopify/ProductVariant/123",
            "shop": SHOP_DOMAIN,
        }))
    );
}

#[tokio::test]
async fn test_invalid_email_sends_nothing() {
    let backend = MockBackend::start().await;
    let session = WaitlistSession::new(
        backend.client(None),
        WaitlistTarget::from(&sold_out_variant()),
    );

    let outcome = session.join("user@domain").await;

    assert_eq!(outcome.error(), Some("Please enter a valid email address."));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_rate_limited_join_over_http() {
    let backend = MockBackend::start().await;
    backend.respond(Endpoint::Join, 429, json!({"error": "Too many"}));

    let session = WaitlistSession::new(
        backend.client(None),
        WaitlistTarget::from(&sold_out_variant()),
    );
    let failure = session
        .join("shopper@example.com")
        .await
        .into_result()
        .expect_err("429 should fail");

    assert_eq!(failure.kind, ErrorKind::RateLimited);
    assert_eq!(failure.error, "Too many requests. Please try again later.");
    assert!(!session.state().is_joined);
}

#[tokio::test]
async fn test_application_error_over_http() {
    let backend = MockBackend::start().await;
    backend.respond(
        Endpoint::Join,
        400,
        json!({"success": false, "error": "Variant is in stock"}),
    );

    let session = WaitlistSession::new(
        backend.client(None),
        WaitlistTarget::from(&sold_out_variant()),
    );
    let outcome = session.join("shopper@example.com").await;

    assert_eq!(outcome.error(), Some("Variant is in stock"));
    assert_eq!(session.state().error.as_deref(), Some("Variant is in stock"));
}
