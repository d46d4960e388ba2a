//! Mekong Market storefront data layer.
//!
//! This crate provides the data layer the customer-facing storefront UI is
//! built on: a typed API client for the Mekong Market backend, a keyed query
//! cache with request de-duplication, a mutation pipeline with declared cache
//! invalidation, and an auth session store persisted across restarts.
//!
//! # Architecture
//!
//! - The backend is the source of truth - no local sync, every mutation
//!   round-trips through the server before cached reads are refreshed
//! - In-memory caching via `moka` for API responses (5 minute TTL backstop,
//!   explicit invalidation on mutation)
//! - Session state behind a `tokio::sync::watch` channel so views can react
//!   to login/logout transitions
//!
//! # Example
//!
//! ```rust,ignore
//! use mekong_storefront::{StorefrontStore, config::StorefrontConfig};
//!
//! let config = StorefrontConfig::from_env()?;
//! let store = StorefrontStore::new(&config);
//!
//! let products = store.products(12).await?;
//! store.login("user@example.com", "hunter200").await?;
//! store.add_to_cart(products[0].id, 1).await?;
//! let cart = store.cart_with_products().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod session;
pub mod store;
pub mod views;

pub use error::{AppError, Result};
pub use store::StorefrontStore;
