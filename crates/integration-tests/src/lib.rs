//! Integration test harness for the panel bridge.
//!
//! Every test gets its own stub Shopify and its own bridge, each served on an
//! ephemeral localhost port. The bridge is pointed at the stub through
//! `upstream_url`, so the real router, client and error mapping are exercised
//! end to end.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p panel-bridge-integration-tests
//! ```

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
};
use base64::Engine;
use hmac::{Hmac, Mac};
use panel_bridge::config::{BridgeConfig, PublishLimits, ShopifyAppConfig};
use panel_bridge::state::AppState;
use secrecy::SecretString;
use serde_json::{Value, json};
use sha2::Sha256;

/// Client secret shared by the bridge and the stub.
pub const CLIENT_SECRET: &str = "shpss_4f1c9e2b7a8d6053e1b2c3d4";
/// Client ID configured on the bridge.
pub const CLIENT_ID: &str = "test-client-id";
/// Externally reachable bridge URL used for the callback.
pub const BASE_URL: &str = "https://bridge.test";
/// Panel page the callback redirects to.
pub const FRONTEND_URL: &str = "http://127.0.0.1:5500/panel.html";
/// Shop used by the tests.
pub const SHOP: &str = "demo.myshopify.com";
/// Token the stub issues by default.
pub const ISSUED_TOKEN: &str = "shpat_5e1f0a9c8b7d6e5f4a3b";
/// Product ID the stub assigns by default.
pub const PRODUCT_ID: u64 = 632_910_392;

// =============================================================================
// Stub Shopify
// =============================================================================

/// Canned responses for the stub.
#[derive(Debug, Clone)]
pub struct StubBehavior {
    /// Status and body of `POST /admin/oauth/access_token`.
    pub token_response: (StatusCode, Value),
    /// Delay before answering the token exchange.
    pub token_delay: Option<Duration>,
    /// Status and body of `POST /admin/api/*/products.json`.
    pub product_response: (StatusCode, Value),
    /// Delay before answering product creation.
    pub product_delay: Option<Duration>,
}

impl Default for StubBehavior {
    fn default() -> Self {
        Self {
            token_response: (
                StatusCode::OK,
                json!({"access_token": ISSUED_TOKEN, "scope": "write_products,read_products"}),
            ),
            token_delay: None,
            product_response: (
                StatusCode::CREATED,
                json!({"product": {"id": PRODUCT_ID, "title": "T", "status": "draft"}}),
            ),
            product_delay: None,
        }
    }
}

/// A request the stub received.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Path that was called.
    pub path: String,
    /// `X-Shopify-Access-Token` header, if any.
    pub access_token: Option<String>,
    /// JSON body.
    pub body: Value,
}

#[derive(Default)]
struct Recorder {
    token: Vec<RecordedCall>,
    products: Vec<RecordedCall>,
    images: Vec<RecordedCall>,
}

#[derive(Clone)]
struct StubState {
    behavior: Arc<StubBehavior>,
    recorder: Arc<Mutex<Recorder>>,
}

/// Stub Shopify server recording every call.
pub struct StubShopify {
    /// Origin of the stub, e.g. `http://127.0.0.1:41234`.
    pub url: String,
    recorder: Arc<Mutex<Recorder>>,
}

impl StubShopify {
    /// Start a stub with the default behavior.
    pub async fn start() -> Self {
        Self::with_behavior(StubBehavior::default()).await
    }

    /// Start a stub with custom responses.
    pub async fn with_behavior(behavior: StubBehavior) -> Self {
        let recorder = Arc::new(Mutex::new(Recorder::default()));
        let state = StubState {
            behavior: Arc::new(behavior),
            recorder: Arc::clone(&recorder),
        };

        let router = Router::new()
            .route("/admin/oauth/access_token", post(stub_token))
            .route("/admin/api/{version}/products.json", post(stub_create_product))
            .route(
                "/admin/api/{version}/products/{id}/images.json",
                post(stub_attach_image),
            )
            .with_state(state);

        let addr = serve(router).await;
        Self {
            url: format!("http://{addr}"),
            recorder,
        }
    }

    /// Calls to the token endpoint.
    pub fn token_calls(&self) -> Vec<RecordedCall> {
        self.recorder.lock().unwrap().token.clone()
    }

    /// Calls to the product creation endpoint.
    pub fn product_calls(&self) -> Vec<RecordedCall> {
        self.recorder.lock().unwrap().products.clone()
    }

    /// Calls to the image endpoint, in arrival order.
    pub fn image_calls(&self) -> Vec<RecordedCall> {
        self.recorder.lock().unwrap().images.clone()
    }

    /// Total number of calls to any endpoint.
    pub fn total_calls(&self) -> usize {
        let recorder = self.recorder.lock().unwrap();
        recorder.token.len() + recorder.products.len() + recorder.images.len()
    }
}

fn record(headers: &HeaderMap, path: String, body: Value) -> RecordedCall {
    RecordedCall {
        path,
        access_token: headers
            .get("x-shopify-access-token")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    }
}

async fn stub_token(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let call = record(&headers, "/admin/oauth/access_token".to_string(), body);
    state.recorder.lock().unwrap().token.push(call);

    if let Some(delay) = state.behavior.token_delay {
        tokio::time::sleep(delay).await;
    }

    let (status, body) = state.behavior.token_response.clone();
    (status, Json(body))
}

async fn stub_create_product(
    State(state): State<StubState>,
    Path(version): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let call = record(&headers, format!("/admin/api/{version}/products.json"), body);
    state.recorder.lock().unwrap().products.push(call);

    if let Some(delay) = state.behavior.product_delay {
        tokio::time::sleep(delay).await;
    }

    let (status, body) = state.behavior.product_response.clone();
    (status, Json(body))
}

/// Accepts attachments that decode as base64, like Shopify.
async fn stub_attach_image(
    State(state): State<StubState>,
    Path((version, id)): Path<(String, u64)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let attachment = body["image"]["attachment"].as_str().unwrap_or_default().to_string();
    let position = body["image"]["position"].clone();
    let call = record(
        &headers,
        format!("/admin/api/{version}/products/{id}/images.json"),
        body,
    );
    state.recorder.lock().unwrap().images.push(call);

    match base64::engine::general_purpose::STANDARD.decode(&attachment) {
        Ok(bytes) if !bytes.is_empty() => (
            StatusCode::OK,
            Json(json!({"image": {"id": 850_703_190, "product_id": id, "position": position}})),
        ),
        _ => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"errors": {"image": ["Could not decode attachment"]}})),
        ),
    }
}

// =============================================================================
// Bridge under test
// =============================================================================

/// Options for the bridge under test.
#[derive(Debug, Clone)]
pub struct BridgeOptions {
    /// Timeout on upstream calls.
    pub timeout: Duration,
    /// Publish limits.
    pub limits: PublishLimits,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            limits: PublishLimits::default(),
        }
    }
}

/// A running bridge wired to a stub Shopify.
pub struct TestBridge {
    /// Origin of the bridge.
    pub url: String,
    /// Client that does not follow redirects.
    pub client: reqwest::Client,
}

impl TestBridge {
    /// Start a bridge pointed at `stub` with default options.
    pub async fn start(stub: &StubShopify) -> Self {
        Self::with_options(stub, BridgeOptions::default()).await
    }

    /// Start a bridge pointed at `stub`.
    pub async fn with_options(stub: &StubShopify, options: BridgeOptions) -> Self {
        let config = BridgeConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            base_url: BASE_URL.to_string(),
            frontend_url: FRONTEND_URL.to_string(),
            shopify: ShopifyAppConfig {
                api_version: "2024-10".to_string(),
                client_id: CLIENT_ID.to_string(),
                client_secret: SecretString::from(CLIENT_SECRET),
                upstream_url: Some(stub.url.clone()),
                timeout: options.timeout,
            },
            limits: options.limits,
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        };

        let state = AppState::new(config).unwrap();
        let addr = serve(panel_bridge::app(state)).await;

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            url: format!("http://{addr}"),
            client,
        }
    }

    /// GET a bridge path with query parameters.
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> reqwest::Response {
        let url = url::Url::parse_with_params(&format!("{}{path}", self.url), query).unwrap();
        self.client
            .get(url)
            .send()
            .await
            .unwrap()
    }

    /// POST a JSON body to `/shopify/products`.
    pub async fn publish(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}/shopify/products", self.url))
            .json(body)
            .send()
            .await
            .unwrap()
    }
}

/// Serve `router` on an ephemeral localhost port.
async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

// =============================================================================
// Helpers
// =============================================================================

/// Callback query parameters signed the way Shopify signs them.
pub fn signed_callback(pairs: &[(&str, &str)], secret: &str) -> Vec<(String, String)> {
    let sorted: BTreeMap<&str, &str> = pairs.iter().copied().collect();
    let message = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(message.as_bytes());
    let hmac = hex::encode(mac.finalize().into_bytes());

    let mut params: Vec<(String, String)> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    params.push(("hmac".to_string(), hmac));
    params
}

/// Borrow owned query pairs for [`TestBridge::get`].
pub fn as_query(params: &[(String, String)]) -> Vec<(&str, &str)> {
    params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
}

/// A small valid base64 image payload.
pub fn image_b64(seed: u8) -> String {
    base64::engine::general_purpose::STANDARD.encode([0x89, b'P', b'N', b'G', seed])
}

/// `Location` header of a response, if any.
pub fn location(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
