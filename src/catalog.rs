//! Storage collaborator contract.
//!
//! The serving core never issues SQL. It reaches the product store
//! through this trait; the in-memory implementation backs the demo
//! binary and the tests.

use std::sync::Arc;

/// One storefront product, as the serving layer sees it.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: u32,
    pub handle: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub price_cents: u32,
    pub stock: u32,
    pub image_url: String,
}

impl Product {
    /// Display price, e.g. "Rs 1499.00".
    pub fn display_price(&self) -> String {
        format!("Rs {:.2}", self.price_cents as f64 / 100.0)
    }
}

/// Read access to the product store: list with an optional category
/// filter, a limit (0 = unlimited), and an offset.
pub trait ProductCatalog: Send + Sync {
    fn list(&self, category: Option<&str>, limit: usize, offset: usize) -> Vec<Product>;
}

/// In-memory catalog seeded with demo data.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    products: Vec<Product>,
}

impl MemoryCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn demo() -> Arc<Self> {
        let mut products = Vec::new();
        let seed: [(&str, &str, &str, u32); 6] = [
            ("wireless-earbuds", "Wireless Earbuds", "Electronics", 349_900),
            ("smart-watch", "Smart Watch", "Electronics", 599_900),
            ("cotton-kurta", "Cotton Kurta", "Fashion", 189_900),
            ("leather-wallet", "Leather Wallet", "Fashion", 99_900),
            ("ceramic-planter", "Ceramic Planter", "Home", 74_900),
            ("desk-lamp", "Desk Lamp", "Home", 129_900),
        ];
        for (i, (handle, title, category, price_cents)) in seed.into_iter().enumerate() {
            products.push(Product {
                id: i as u32 + 1,
                handle: handle.to_string(),
                title: title.to_string(),
                description: format!("{title} from the {category} collection."),
                category: category.to_string(),
                price_cents,
                stock: 20,
                image_url: format!("/static/img/{handle}.jpg"),
            });
        }
        Arc::new(Self::new(products))
    }
}

impl ProductCatalog for MemoryCatalog {
    fn list(&self, category: Option<&str>, limit: usize, offset: usize) -> Vec<Product> {
        let limit = if limit == 0 { usize::MAX } else { limit };
        self.products
            .iter()
            .filter(|p| category.map_or(true, |c| p.category == c))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_limits_and_offsets() {
        let catalog = MemoryCatalog::demo();

        assert_eq!(catalog.list(None, 0, 0).len(), 6);
        assert_eq!(catalog.list(None, 2, 0).len(), 2);
        assert_eq!(catalog.list(None, 0, 5).len(), 1);

        let fashion = catalog.list(Some("Fashion"), 0, 0);
        assert_eq!(fashion.len(), 2);
        assert!(fashion.iter().all(|p| p.category == "Fashion"));
    }

    #[test]
    fn price_formatting() {
        let catalog = MemoryCatalog::demo();
        let first = &catalog.list(None, 1, 0)[0];
        assert_eq!(first.display_price(), "Rs 3499.00");
    }
}
