//! Domain types for the Mekong Market backend API.
//!
//! These are parsed once at the API client boundary so the rest of the crate
//! never handles untyped JSON. Field names follow the backend's snake_case
//! wire format.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use mekong_core::{CartItemId, CommentId, NewsId, ProductId};

// =============================================================================
// Catalog Types
// =============================================================================

/// A product as served by `GET /products`.
///
/// Read-only from the client's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Longer description, if the merchant wrote one.
    #[serde(default)]
    pub description: Option<String>,
    /// Unit price in đồng.
    pub price: Decimal,
    /// Units in stock.
    pub quantity: i64,
    /// Primary image URL.
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A customer comment on a product. Append-only from the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Comment ID.
    pub id: CommentId,
    /// Product the comment belongs to.
    pub product_id: ProductId,
    /// Display name of the author, if known.
    #[serde(default)]
    pub user_name: Option<String>,
    /// Comment body.
    pub content: String,
    /// Server-side creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A news article for the home page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    /// Article ID.
    pub id: NewsId,
    /// Headline.
    pub title: String,
    /// Article body.
    #[serde(default)]
    pub content: Option<String>,
    /// Cover image URL.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Publication timestamp.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Cart Types
// =============================================================================

/// A cart line as stored server-side.
///
/// Mirrored locally only as a cached read result - every quantity change
/// round-trips through the server before it is considered authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    /// Cart line ID.
    pub id: CartItemId,
    /// Product in the cart.
    pub product_id: ProductId,
    /// Quantity of that product.
    pub quantity: u32,
}

/// A cart line joined with its product detail.
///
/// `product` is `None` when the per-item detail fetch failed; the line stays
/// visible, it just cannot contribute a price.
#[derive(Debug, Clone)]
pub struct CartLine {
    /// The server-owned cart line.
    pub item: CartItem,
    /// Product detail, when the fetch succeeded.
    pub product: Option<Product>,
}

/// Envelope for `GET /cart/`.
#[derive(Debug, Deserialize)]
pub(crate) struct CartEnvelope {
    pub cart: Vec<CartItem>,
}

// =============================================================================
// Request Payloads
// =============================================================================

/// Body for `POST /cart/add` and `PUT /cart/update`.
#[derive(Debug, Serialize)]
pub(crate) struct CartItemPayload {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body for `POST /products/{id}/comments`.
#[derive(Debug, Serialize)]
pub(crate) struct CommentPayload<'a> {
    pub content: &'a str,
    pub user_name: &'a str,
}

/// Body for `POST /auth/login`.
#[derive(Debug, Serialize)]
pub(crate) struct LoginPayload<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body for `POST /auth/register`.
#[derive(Debug, Serialize)]
pub(crate) struct RegisterPayload<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

/// Response for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub(crate) struct AccessToken {
    pub access_token: String,
}
