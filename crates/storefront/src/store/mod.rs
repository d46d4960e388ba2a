//! The storefront store: cached reads plus the mutation pipeline.
//!
//! [`StorefrontStore`] is the one handle the view layer talks to. Reads go
//! through the [`QueryCache`]; mutations live in [`mutations`] and invalidate
//! the cache keys they declare.

mod mutations;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::StatusCode;
use tracing::{instrument, warn};
use url::Url;

use mekong_core::ProductId;

use crate::api::{ApiClient, ApiError};
use crate::config::StorefrontConfig;
use crate::error::{AppError, Result};
use crate::models::{CartEnvelope, CartItem, CartLine, Comment, NewsItem, Product};
use crate::query::{CacheValue, QueryCache, QueryKey};
use crate::session::{FileSlot, SessionStore};

/// The storefront data layer.
///
/// Cheaply cloneable via `Arc`; hand a clone to every view.
#[derive(Clone)]
pub struct StorefrontStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    api: ApiClient,
    session: SessionStore,
    queries: QueryCache,
}

impl StorefrontStore {
    /// Create a store from configuration, with a file-persisted session.
    #[must_use]
    pub fn new(config: &StorefrontConfig) -> Self {
        let session = SessionStore::new(FileSlot::new(config.session_file.clone()));
        Self::with_session(config.api_url.clone(), session)
    }

    /// Create a store around an existing session store.
    #[must_use]
    pub fn with_session(api_url: Url, session: SessionStore) -> Self {
        let api = ApiClient::new(api_url, session.clone());
        let queries = QueryCache::new();

        // The cart-with-products join is derived from the base cart query:
        // refetching the cart must re-run the join
        queries.register_dependent(QueryKey::Cart, QueryKey::CartWithProducts);

        Self {
            inner: Arc::new(StoreInner {
                api,
                session,
                queries,
            }),
        }
    }

    /// The session store backing this client.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    // =========================================================================
    // Catalog Queries
    // =========================================================================

    /// Get the product listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self, limit: u32) -> Result<Vec<Product>> {
        let value = self
            .inner
            .queries
            .fetch(QueryKey::Products { limit }, async {
                self.inner
                    .api
                    .get(&format!("products?limit={limit}"))
                    .await
                    .map(CacheValue::Products)
            })
            .await?;

        let CacheValue::Products(products) = value else {
            return Err(cache_mismatch("products").into());
        };
        Ok(products)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the product does not exist, or an
    /// API error if the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn product(&self, product_id: ProductId) -> Result<Product> {
        match self.product_detail(product_id).await {
            Ok(product) => Ok(product),
            Err(e) if e.is_status(StatusCode::NOT_FOUND) => {
                Err(AppError::NotFound(format!("sản phẩm {product_id}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Get comments for a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn comments(&self, product_id: ProductId) -> Result<Vec<Comment>> {
        let value = self
            .inner
            .queries
            .fetch(QueryKey::Comments(product_id), async {
                self.inner
                    .api
                    .get(&format!("products/{product_id}/comments"))
                    .await
                    .map(CacheValue::Comments)
            })
            .await?;

        let CacheValue::Comments(comments) = value else {
            return Err(cache_mismatch("comments").into());
        };
        Ok(comments)
    }

    /// Get recommended products for a product page.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn recommendations(&self, product_id: ProductId) -> Result<Vec<Product>> {
        let value = self
            .inner
            .queries
            .fetch(QueryKey::Recommendations(product_id), async {
                self.inner
                    .api
                    .get(&format!("products/{product_id}/recommendations"))
                    .await
                    .map(CacheValue::Recommendations)
            })
            .await?;

        let CacheValue::Recommendations(products) = value else {
            return Err(cache_mismatch("recommendations").into());
        };
        Ok(products)
    }

    /// Get news articles for the home page.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn news(&self, limit: u32) -> Result<Vec<NewsItem>> {
        let value = self
            .inner
            .queries
            .fetch(QueryKey::News { limit }, async {
                self.inner
                    .api
                    .get(&format!("news?limit={limit}"))
                    .await
                    .map(CacheValue::News)
            })
            .await?;

        let CacheValue::News(news) = value else {
            return Err(cache_mismatch("news").into());
        };
        Ok(news)
    }

    // =========================================================================
    // Cart Queries
    // =========================================================================

    /// Get the session's cart items.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::AuthRequired`] when anonymous, or an API error if
    /// the request fails.
    #[instrument(skip(self))]
    pub async fn cart(&self) -> Result<Vec<CartItem>> {
        self.require_auth()?;
        Ok(self.cart_items().await?)
    }

    /// Get the cart joined with per-item product detail.
    ///
    /// This is a derived query: it reads the (cached) base cart, then fans
    /// out per-item product fetches. A failed product fetch is logged and the
    /// line is kept with `product: None` - one missing product must not take
    /// down the whole cart view.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::AuthRequired`] when anonymous, or an API error if
    /// the base cart fetch fails.
    #[instrument(skip(self))]
    pub async fn cart_with_products(&self) -> Result<Vec<CartLine>> {
        self.require_auth()?;

        let value = self
            .inner
            .queries
            .fetch(QueryKey::CartWithProducts, async {
                let items = self.cart_items().await?;

                let mut lines = Vec::with_capacity(items.len());
                for item in items {
                    let product = match self.product_detail(item.product_id).await {
                        Ok(product) => Some(product),
                        Err(e) => {
                            warn!(
                                product_id = %item.product_id,
                                error = %e,
                                "failed to fetch product for cart item"
                            );
                            None
                        }
                    };
                    lines.push(CartLine { item, product });
                }

                Ok(CacheValue::CartDetail(lines))
            })
            .await?;

        let CacheValue::CartDetail(lines) = value else {
            return Err(cache_mismatch("cart detail").into());
        };
        Ok(lines)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Cached base cart fetch. `GET /cart/` wraps the items in an envelope.
    async fn cart_items(&self) -> std::result::Result<Vec<CartItem>, ApiError> {
        let fetched = AtomicBool::new(false);
        let value = self
            .inner
            .queries
            .fetch(QueryKey::Cart, async {
                fetched.store(true, Ordering::Relaxed);
                self.inner
                    .api
                    .get::<CartEnvelope>("cart/")
                    .await
                    .map(|envelope| CacheValue::Cart(envelope.cart))
            })
            .await?;

        // The base fetch actually ran (cold read or TTL expiry), so any join
        // computed from the previous cart snapshot is stale
        if fetched.load(Ordering::Relaxed) {
            self.inner
                .queries
                .invalidate_dependents(&QueryKey::Cart)
                .await;
        }

        let CacheValue::Cart(items) = value else {
            return Err(cache_mismatch("cart"));
        };
        Ok(items)
    }

    /// Cached product detail fetch, surfacing the raw API error.
    async fn product_detail(
        &self,
        product_id: ProductId,
    ) -> std::result::Result<Product, ApiError> {
        let value = self
            .inner
            .queries
            .fetch(QueryKey::Product(product_id), async {
                self.inner
                    .api
                    .get(&format!("products/{product_id}"))
                    .await
                    .map(|product| CacheValue::Product(Box::new(product)))
            })
            .await?;

        let CacheValue::Product(product) = value else {
            return Err(cache_mismatch("product"));
        };
        Ok(*product)
    }

    fn require_auth(&self) -> Result<()> {
        if self.inner.session.is_authenticated() {
            Ok(())
        } else {
            Err(AppError::AuthRequired)
        }
    }
}

/// A key resolved to a value of the wrong shape. Keys map 1:1 to value
/// variants, so this only fires on a bug in the store itself.
fn cache_mismatch(what: &str) -> ApiError {
    ApiError::Decode(format!("cached value has the wrong shape for {what}"))
}
