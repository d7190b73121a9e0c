//! Waitlist client over real HTTP against the in-process backend.

use std::time::Duration;

use restock_integration_tests::{Endpoint, MockBackend, SHOP_DOMAIN, serve_truncated_once};
use restock_waitlist::{
    CountCache, CountError, CountTracker, JoinWaitlistRequest, LeaveWaitlistRequest, RequestError,
    WaitlistClient, WaitlistConfig,
};
use serde_json::json;

fn join_request() -> JoinWaitlistRequest {
    JoinWaitlistRequest {
        email: "shopper@example.com".to_string(),
        variant_id: "gid://shopify/ProductVariant/123".to_string(),
        product_id: "gid://shopify/Product/45".to_string(),
        product_title: Some("Linen Shirt".to_string()),
        variant_title: None,
        shop: SHOP_DOMAIN.to_string(),
    }
}

// ============================================================================
// Join / Leave
// ============================================================================

#[tokio::test]
async fn test_join_posts_json_with_bearer() {
    let backend = MockBackend::start().await;
    backend.respond(Endpoint::Join, 200, json!({"success": true, "entryId": "e-1"}));

    let reply = backend
        .client(Some("sk_live_123"))
        .join(&join_request())
        .await
        .expect("join should succeed");

    assert!(reply.is_accepted());
    assert_eq!(
        reply.body.and_then(|b| b.entry_id).as_deref(),
        Some("e-1")
    );

    let request = backend.requests().pop().expect("request recorded");
    assert_eq!(request.endpoint, Endpoint::Join);
    assert_eq!(request.authorization.as_deref(), Some("Bearer sk_live_123"));
    assert_eq!(
        request.body,
        Some(json!({
            "email": "shopper@example.com",
            "variantId": "gid://shopify/ProductVariant/123",
            "productId": "gid://shopify/Product/45",
            "productTitle": "Linen Shirt",
            "shop": SHOP_DOMAIN,
        }))
    );
}

#[tokio::test]
async fn test_no_authorization_header_without_key() {
    let backend = MockBackend::start().await;
    backend.respond(Endpoint::Leave, 200, json!({"success": true}));

    backend
        .client(None)
        .leave(&LeaveWaitlistRequest {
            email: "shopper@example.com".to_string(),
            variant_id: "123".to_string(),
            shop: SHOP_DOMAIN.to_string(),
        })
        .await
        .expect("leave should succeed");

    let request = backend.requests().pop().expect("request recorded");
    assert_eq!(request.endpoint, Endpoint::Leave);
    assert!(request.authorization.is_none());
}

#[tokio::test]
async fn test_rate_limit_status() {
    let backend = MockBackend::start().await;
    backend.respond(Endpoint::Join, 429, json!({"success": false}));

    let err = backend
        .client(None)
        .join(&join_request())
        .await
        .expect_err("429 should be an error");

    assert!(matches!(err, RequestError::RateLimited));
}

#[tokio::test]
async fn test_html_error_page_is_reply_without_body() {
    let backend = MockBackend::start().await;
    backend.respond_raw(Endpoint::Join, 503, "<html>Service Unavailable</html>");

    let reply = backend
        .client(None)
        .join(&join_request())
        .await
        .expect("a non-JSON error page is still a reply");

    assert_eq!(reply.status, 503);
    assert!(reply.body.is_none());
}

#[tokio::test]
async fn test_timeout_is_transport_error() {
    let backend = MockBackend::start().await;
    backend.respond_after(
        Endpoint::Join,
        Duration::from_millis(500),
        200,
        json!({"success": true}),
    );

    let err = backend
        .client_with_timeout(Duration::from_millis(50))
        .join(&join_request())
        .await
        .expect_err("slow response should time out");

    assert!(matches!(err, RequestError::Transport(_)));
}

#[tokio::test]
async fn test_truncated_rate_limit_body_is_still_rate_limited() {
    let url = serve_truncated_once(429).await;
    let config = WaitlistConfig::new(&url, SHOP_DOMAIN, None).expect("valid config");

    let err = WaitlistClient::new(config)
        .join(&join_request())
        .await
        .expect_err("429 should be an error");

    assert!(matches!(err, RequestError::RateLimited));
}

// ============================================================================
// Count
// ============================================================================

#[tokio::test]
async fn test_count_path_and_shop_query() {
    let backend = MockBackend::start().await;
    backend.respond(Endpoint::Count, 200, json!({"variantId": "123", "count": 12}));

    let count = backend
        .client(Some("sk_live_123"))
        .fetch_count("123")
        .await
        .expect("count should succeed");

    assert_eq!(count, 12);
    let request = backend.requests().pop().expect("request recorded");
    assert_eq!(request.variant_id.as_deref(), Some("123"));
    assert_eq!(request.query, Some(format!("shop={SHOP_DOMAIN}")));
    assert_eq!(request.authorization.as_deref(), Some("Bearer sk_live_123"));
}

#[tokio::test]
async fn test_count_not_found_and_server_error() {
    let backend = MockBackend::start().await;
    backend.respond_raw(Endpoint::Count, 404, "");
    backend.respond_raw(Endpoint::Count, 500, "{\"error\":\"boom\"}");

    let client = backend.client(None);
    assert_eq!(client.fetch_count("123").await.expect("404 is zero"), 0);
    assert!(matches!(
        client.fetch_count("123").await,
        Err(CountError::Status(500))
    ));
}

#[tokio::test]
async fn test_tracker_caches_between_widgets() {
    let backend = MockBackend::start().await;
    backend.respond(Endpoint::Count, 200, json!({"variantId": 123, "count": 3}));

    let client = backend.client(None);
    let cache = CountCache::default();
    let first = CountTracker::new(client.clone(), cache.clone(), "gid://shopify/ProductVariant/123");
    let second = CountTracker::new(client, cache, "123");

    assert_eq!(first.fetch_count().await, 3);
    assert_eq!(second.fetch_count().await, 3);
    assert_eq!(backend.request_count(Endpoint::Count), 1);
}

#[tokio::test]
async fn test_tracker_reports_server_error() {
    let backend = MockBackend::start().await;
    backend.respond_raw(Endpoint::Count, 500, "oops");

    let tracker = CountTracker::new(backend.client(None), CountCache::default(), "123");

    assert_eq!(tracker.fetch_count().await, 0);
    let state = tracker.state();
    assert_eq!(
        state.error.as_deref(),
        Some("Failed to fetch waitlist count (HTTP 500)")
    );
    assert!(!state.is_loading);
}

#[tokio::test]
async fn test_truncated_not_found_body_is_zero() {
    let url = serve_truncated_once(404).await;
    let config = WaitlistConfig::new(&url, SHOP_DOMAIN, None).expect("valid config");

    let count = WaitlistClient::new(config)
        .fetch_count("123")
        .await
        .expect("404 is zero even with a broken body");

    assert_eq!(count, 0);
}
