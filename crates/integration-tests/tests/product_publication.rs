//! Integration tests for `POST /shopify/products`.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::time::Duration;

use panel_bridge::config::PublishLimits;
use panel_bridge_integration_tests::{
    BridgeOptions, PRODUCT_ID, SHOP, StubBehavior, StubShopify, TestBridge, image_b64,
};
use reqwest::StatusCode;
use serde_json::{Value, json};

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_publish_without_token_is_forbidden() {
    let stub = StubShopify::start().await;
    let bridge = TestBridge::start(&stub).await;

    for body in [
        json!({"shop": SHOP, "title": "T"}),
        json!({"shop": SHOP, "accessToken": "", "title": "T"}),
        json!({"shop": SHOP, "accessToken": "   ", "title": "T"}),
    ] {
        let resp = bridge.publish(&body).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "error");
    }

    assert_eq!(stub.total_calls(), 0);
}

#[tokio::test]
async fn test_publish_without_token_is_forbidden_before_product_checks() {
    let stub = StubShopify::start().await;
    let bridge = TestBridge::start(&stub).await;

    for body in [
        json!({"shop": SHOP}),
        json!({"shop": SHOP, "title": "T", "price": "abc"}),
        json!({"shop": SHOP, "title": 7, "images": "not-a-list"}),
    ] {
        let resp = bridge.publish(&body).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{body}");
    }

    assert_eq!(stub.total_calls(), 0);
}

#[tokio::test]
async fn test_publish_invalid_product_fields_are_bad_request() {
    let stub = StubShopify::start().await;
    let bridge = TestBridge::start(&stub).await;

    for body in [
        json!({"shop": SHOP, "accessToken": "tok"}),
        json!({"shop": SHOP, "accessToken": "tok", "title": "T", "price": "abc"}),
        json!({"shop": SHOP, "accessToken": "tok", "title": "T", "price": "-1.00"}),
    ] {
        let resp = bridge.publish(&body).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{body}");
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "error");
    }

    assert_eq!(stub.total_calls(), 0);
}

#[tokio::test]
async fn test_publish_without_valid_shop_is_bad_request() {
    let stub = StubShopify::start().await;
    let bridge = TestBridge::start(&stub).await;

    for body in [
        json!({"accessToken": "tok", "title": "T"}),
        json!({"shop": "", "accessToken": "tok", "title": "T"}),
        json!({"shop": "shop.example.com", "accessToken": "tok", "title": "T"}),
    ] {
        let resp = bridge.publish(&body).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    assert_eq!(stub.total_calls(), 0);
}

#[tokio::test]
async fn test_publish_malformed_json_is_bad_request() {
    let stub = StubShopify::start().await;
    let bridge = TestBridge::start(&stub).await;

    let resp = bridge
        .client
        .post(format!("{}/shopify/products", bridge.url))
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("{\"shop\": ")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(stub.total_calls(), 0);
}

// ============================================================================
// Publication
// ============================================================================

#[tokio::test]
async fn test_publish_creates_draft_and_tolerates_bad_image() {
    let stub = StubShopify::start().await;
    let bridge = TestBridge::start(&stub).await;

    let resp = bridge
        .publish(&json!({
            "shop": SHOP,
            "accessToken": "tok",
            "title": "T",
            "price": "9.99",
            "inventory_quantity": 5,
            "images": [image_b64(1), "<bad-b64>"],
        }))
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["id"], PRODUCT_ID);

    let products = stub.product_calls();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].access_token.as_deref(), Some("tok"));
    assert!(products[0].path.ends_with("/products.json"));
    let product = &products[0].body["product"];
    assert_eq!(product["title"], "T");
    assert_eq!(product["status"], "draft");
    assert_eq!(product["variants"][0]["price"], "9.99");
    assert_eq!(product["variants"][0]["inventory_quantity"], 5);

    let images = stub.image_calls();
    assert_eq!(images.len(), 2);
    for call in &images {
        assert_eq!(call.access_token.as_deref(), Some("tok"));
        assert!(call.path.contains(&format!("/products/{PRODUCT_ID}/images.json")));
    }
}

#[tokio::test]
async fn test_publish_attaches_images_in_order_after_failure() {
    let stub = StubShopify::start().await;
    let bridge = TestBridge::start(&stub).await;
    let images = [image_b64(1), "not base64!".to_string(), image_b64(3)];

    let resp = bridge
        .publish(&json!({
            "shop": SHOP,
            "accessToken": "tok",
            "title": "Three images",
            "images": images,
        }))
        .await;

    assert_eq!(resp.status(), StatusCode::OK);

    let calls = stub.image_calls();
    assert_eq!(calls.len(), 3);
    for (index, call) in calls.iter().enumerate() {
        assert_eq!(call.body["image"]["position"], index + 1);
        assert_eq!(call.body["image"]["attachment"], images[index]);
    }
}

#[tokio::test]
async fn test_publish_without_images_makes_one_call() {
    let stub = StubShopify::start().await;
    let bridge = TestBridge::start(&stub).await;

    let resp = bridge
        .publish(&json!({"shop": SHOP, "accessToken": "tok", "title": "Plain"}))
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(stub.product_calls().len(), 1);
    assert!(stub.image_calls().is_empty());
}

#[tokio::test]
async fn test_publish_strips_data_url_prefix() {
    let stub = StubShopify::start().await;
    let bridge = TestBridge::start(&stub).await;
    let payload = image_b64(7);

    let resp = bridge
        .publish(&json!({
            "shop": SHOP,
            "accessToken": "tok",
            "title": "T",
            "images": [format!("data:image/png;base64,{payload}")],
        }))
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let calls = stub.image_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].body["image"]["attachment"], payload);
}

#[tokio::test]
async fn test_publish_rejected_product_returns_upstream_errors() {
    let stub = StubShopify::with_behavior(StubBehavior {
        product_response: (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({"errors": {"title": ["can't be blank"]}}),
        ),
        ..StubBehavior::default()
    })
    .await;
    let bridge = TestBridge::start(&stub).await;

    let resp = bridge
        .publish(&json!({
            "shop": SHOP,
            "accessToken": "tok",
            "title": "",
            "images": [image_b64(1)],
        }))
        .await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["errors"], json!({"title": ["can't be blank"]}));
    assert!(stub.image_calls().is_empty());
}

#[tokio::test]
async fn test_publish_rejected_token_is_server_error() {
    let stub = StubShopify::with_behavior(StubBehavior {
        product_response: (
            StatusCode::UNAUTHORIZED,
            json!({"errors": "[API] Invalid API key or access token (unrecognized login or wrong password)"}),
        ),
        ..StubBehavior::default()
    })
    .await;
    let bridge = TestBridge::start(&stub).await;

    let resp = bridge
        .publish(&json!({"shop": SHOP, "accessToken": "revoked", "title": "T"}))
        .await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.unwrap();
    assert!(body["errors"].as_str().unwrap().contains("Invalid API key"));
}

// ============================================================================
// Limits
// ============================================================================

#[tokio::test]
async fn test_publish_oversize_body_is_rejected() {
    let stub = StubShopify::start().await;
    let bridge = TestBridge::with_options(
        &stub,
        BridgeOptions {
            limits: PublishLimits {
                max_body_bytes: 1024,
                max_images: 250,
            },
            ..BridgeOptions::default()
        },
    )
    .await;

    let resp = bridge
        .publish(&json!({
            "shop": SHOP,
            "accessToken": "tok",
            "title": "T",
            "images": ["A".repeat(4096)],
        }))
        .await;

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(stub.total_calls(), 0);
}

#[tokio::test]
async fn test_publish_too_many_images_is_rejected() {
    let stub = StubShopify::start().await;
    let bridge = TestBridge::with_options(
        &stub,
        BridgeOptions {
            limits: PublishLimits {
                max_images: 2,
                ..PublishLimits::default()
            },
            ..BridgeOptions::default()
        },
    )
    .await;

    let resp = bridge
        .publish(&json!({
            "shop": SHOP,
            "accessToken": "tok",
            "title": "T",
            "images": [image_b64(1), image_b64(2), image_b64(3)],
        }))
        .await;

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(stub.total_calls(), 0);
}

#[tokio::test]
async fn test_publish_upstream_timeout() {
    let stub = StubShopify::with_behavior(StubBehavior {
        product_delay: Some(Duration::from_secs(2)),
        ..StubBehavior::default()
    })
    .await;
    let bridge = TestBridge::with_options(
        &stub,
        BridgeOptions {
            timeout: Duration::from_millis(200),
            ..BridgeOptions::default()
        },
    )
    .await;

    let resp = bridge
        .publish(&json!({
            "shop": SHOP,
            "accessToken": "tok",
            "title": "T",
            "images": [image_b64(1)],
        }))
        .await;

    assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);
    assert!(stub.image_calls().is_empty());
}
