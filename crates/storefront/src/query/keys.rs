//! Cache keys and values for storefront queries.

use mekong_core::ProductId;

use crate::models::{CartItem, CartLine, Comment, NewsItem, Product};

/// Cache key for a storefront query: endpoint plus parameters.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum QueryKey {
    /// Product listing, `GET /products?limit=N`.
    Products {
        /// Requested page size.
        limit: u32,
    },
    /// Single product detail, `GET /products/{id}`.
    Product(ProductId),
    /// Comments for a product, `GET /products/{id}/comments`.
    Comments(ProductId),
    /// Recommendations for a product, `GET /products/{id}/recommendations`.
    Recommendations(ProductId),
    /// The session's cart, `GET /cart/`.
    Cart,
    /// The cart joined with per-item product detail; derived from [`QueryKey::Cart`].
    CartWithProducts,
    /// News listing, `GET /news?limit=N`.
    News {
        /// Requested article count.
        limit: u32,
    },
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Vec<Product>),
    Product(Box<Product>),
    Comments(Vec<Comment>),
    Recommendations(Vec<Product>),
    Cart(Vec<CartItem>),
    CartDetail(Vec<CartLine>),
    News(Vec<NewsItem>),
}
