//! Shared helpers for the integration suites.

// Not every suite uses every helper
#![allow(dead_code)]

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use url::Url;
use wiremock::MockServer;

use mekong_storefront::StorefrontStore;
use mekong_storefront::session::SessionStore;

/// Build an unsigned JWT carrying the storefront's identity claims.
#[must_use]
pub fn token_for(email: &str, username: &str, id: i64) -> String {
    let payload = serde_json::json!({
        "sub": email,
        "username": username,
        "id": id,
        "is_admin": false,
    });
    format!(
        "{}.{}.test-signature",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(payload.to_string())
    )
}

/// An anonymous store pointed at the mock backend.
#[must_use]
pub fn anonymous_store(server: &MockServer) -> StorefrontStore {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let base_url = Url::parse(&server.uri()).expect("mock server uri");
    StorefrontStore::with_session(base_url, SessionStore::in_memory())
}

/// A store with an established session.
#[must_use]
pub fn logged_in_store(server: &MockServer) -> StorefrontStore {
    let store = anonymous_store(server);
    store
        .session()
        .login(&token_for("linh@example.com", "linh", 7))
        .expect("test token must decode");
    store
}

/// Product JSON the way the backend serves it.
#[must_use]
pub fn product_json(id: i64, name: &str, price: i64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "description": "Hàng thủ công từ đồng bằng sông Cửu Long",
        "price": price,
        "quantity": 10,
        "image_url": null,
    })
}

/// Cart envelope JSON for `GET /cart/`.
#[must_use]
pub fn cart_json(items: &[(i64, i64, u32)]) -> serde_json::Value {
    let cart: Vec<serde_json::Value> = items
        .iter()
        .map(|(id, product_id, quantity)| {
            serde_json::json!({
                "id": id,
                "product_id": product_id,
                "quantity": quantity,
            })
        })
        .collect();
    serde_json::json!({ "cart": cart })
}
