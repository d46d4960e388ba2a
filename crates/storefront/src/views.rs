//! Derived view aggregates: cart totals and the catalog pipeline.
//!
//! Pure functions over already-fetched data; no I/O. The catalog pipeline is
//! deliberately client-side - the full product set is bounded (the listing
//! fetches at most ~100 items), so filter, sort, and pagination all operate
//! on the whole set.

use rust_decimal::Decimal;

use mekong_core::{CurrencyCode, Price};

use crate::models::{CartLine, Product};

/// Format an amount the way the storefront shows prices, e.g. `250.000 ₫`.
#[must_use]
pub fn display_price(amount: Decimal) -> String {
    Price::new(amount, CurrencyCode::VND).to_string()
}

/// Products shown per catalog page.
pub const PAGE_SIZE: usize = 12;

// =============================================================================
// Cart Aggregates
// =============================================================================

/// Totals for the cart view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSummary {
    /// Sum of `price × quantity` over lines with a known product.
    ///
    /// A line whose product fetch failed contributes zero but stays in the
    /// view with a "product not found" placeholder.
    pub total_amount: Decimal,
    /// Sum of quantities over all lines, placeholders included.
    pub total_items: u64,
}

impl CartSummary {
    /// Compute totals for a set of cart lines.
    #[must_use]
    pub fn from_lines(lines: &[CartLine]) -> Self {
        let total_amount = lines
            .iter()
            .filter_map(|line| {
                line.product
                    .as_ref()
                    .map(|p| p.price * Decimal::from(line.item.quantity))
            })
            .sum();

        let total_items = lines.iter().map(|line| u64::from(line.item.quantity)).sum();

        Self {
            total_amount,
            total_items,
        }
    }

    /// Whether the cart has nothing in it.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total_items == 0
    }

    /// The total formatted for display.
    #[must_use]
    pub fn display_total(&self) -> String {
        display_price(self.total_amount)
    }
}

// =============================================================================
// Catalog Pipeline
// =============================================================================

/// Sort order for the product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// By name, lexicographic.
    #[default]
    Name,
    /// By price, cheapest first.
    PriceAsc,
    /// By price, most expensive first.
    PriceDesc,
}

impl SortOrder {
    /// Parse the sort selector value used by the listing UI.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "name" => Some(Self::Name),
            "price-asc" => Some(Self::PriceAsc),
            "price-desc" => Some(Self::PriceDesc),
            _ => None,
        }
    }
}

/// One page of the filtered, sorted catalog.
#[derive(Debug, Clone)]
pub struct CatalogPage {
    /// Products on this page, at most [`PAGE_SIZE`].
    pub items: Vec<Product>,
    /// 1-based page number.
    pub number: usize,
    /// Total pages after filtering; zero when nothing matched.
    pub total_pages: usize,
}

/// Keep products whose name or description contains `term`,
/// case-insensitively. An empty term keeps everything.
#[must_use]
pub fn filter_products(products: Vec<Product>, term: &str) -> Vec<Product> {
    if term.is_empty() {
        return products;
    }
    let needle = term.to_lowercase();

    products
        .into_iter()
        .filter(|product| {
            product.name.to_lowercase().contains(&needle)
                || product
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Sort products in place according to the selected order.
///
/// Name order compares Unicode code points, not locale collation: a name
/// starting with a diacritic initial such as `Áo` sorts after every ASCII
/// initial, where `vi-VN` collation would slot it next to `A`.
pub fn sort_products(products: &mut [Product], order: SortOrder) {
    match order {
        SortOrder::Name => products.sort_by(|a, b| a.name.cmp(&b.name)),
        SortOrder::PriceAsc => products.sort_by(|a, b| a.price.cmp(&b.price)),
        SortOrder::PriceDesc => products.sort_by(|a, b| b.price.cmp(&a.price)),
    }
}

/// Slice out one page. Page numbers are 1-based; an out-of-range page comes
/// back empty rather than panicking.
#[must_use]
pub fn paginate(products: Vec<Product>, page: usize) -> CatalogPage {
    let total_pages = products.len().div_ceil(PAGE_SIZE);
    let page = page.max(1);

    let items = products
        .into_iter()
        .skip((page - 1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .collect();

    CatalogPage {
        items,
        number: page,
        total_pages,
    }
}

/// The full listing pipeline: filter, then sort, then paginate.
#[must_use]
pub fn catalog_page(
    products: Vec<Product>,
    term: &str,
    order: SortOrder,
    page: usize,
) -> CatalogPage {
    let mut filtered = filter_products(products, term);
    sort_products(&mut filtered, order);
    paginate(filtered, page)
}
