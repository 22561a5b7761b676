//! Storefront HTML pages. Plain glue over the catalog and the registry.

use std::fmt::Write as _;

use crate::cache::PageCache;
use crate::catalog::{Product, ProductCatalog};
use crate::edge::EdgeRegistry;
use crate::http::Response;
use crate::metrics::PerfCounters;

fn page_header(title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <title>{title} - Shopfront</title>\n</head>\n<body>\n\
         <header><h1>Shopfront</h1>\n\
         <nav><a href=\"/\">Home</a> <a href=\"/products\">Products</a> \
         <a href=\"/admin\">Admin</a></nav></header>\n"
    )
}

const PAGE_FOOTER: &str = "<footer><p>Served by the shopfront edge core</p></footer>\n</body>\n</html>\n";

fn product_card(product: &Product) -> String {
    format!(
        "<div class=\"product-card\" data-category=\"{}\">\n\
         <img src=\"{}\" alt=\"{}\">\n\
         <h3 class=\"product-title\">{}</h3>\n\
         <p class=\"product-description\">{}</p>\n\
         <p class=\"product-price\">{}</p>\n</div>\n",
        product.category,
        product.image_url,
        product.title,
        product.title,
        product.description,
        product.display_price(),
    )
}

fn product_grid(title: &str, products: &[Product]) -> String {
    let mut html = String::new();
    let _ = write!(html, "<h2>{title}</h2>\n<div class=\"products-grid\">\n");
    for product in products {
        html.push_str(&product_card(product));
    }
    html.push_str("</div>\n");
    html
}

/// `/` and `/home`: featured products, cached.
pub fn home(catalog: &dyn ProductCatalog, cache: &PageCache) -> Response {
    if let Some((body, content_type)) = cache.get("/home") {
        return Response::new(200, &content_type, body);
    }

    let mut body = page_header("Home");
    body.push_str(&product_grid("Featured Products", &catalog.list(None, 6, 0)));
    body.push_str(PAGE_FOOTER);

    cache.put("/home", body.clone().into_bytes(), "text/html");
    Response::html(body)
}

/// `/products`: the full listing, cached.
pub fn products(catalog: &dyn ProductCatalog, cache: &PageCache) -> Response {
    if let Some((body, content_type)) = cache.get("/products") {
        return Response::new(200, &content_type, body);
    }

    let mut body = page_header("Products");
    body.push_str(&product_grid("All Products", &catalog.list(None, 100, 0)));
    body.push_str(PAGE_FOOTER);

    cache.put("/products", body.clone().into_bytes(), "text/html");
    Response::html(body)
}

/// `/admin`: live counters and per-node state. Never cached.
pub fn admin(counters: &PerfCounters, registry: &EdgeRegistry) -> Response {
    let snap = counters.snapshot();
    let mut body = page_header("Admin Panel");

    let _ = write!(
        body,
        "<section class=\"stats\"><h2>Performance</h2>\n\
         <p>Total Requests: {}</p>\n<p>Active Connections: {}</p>\n\
         <p>Cache Hits: {}</p>\n<p>Cache Misses: {}</p>\n</section>\n",
        snap.total_requests, snap.active_connections, snap.cache_hits, snap.cache_misses
    );

    body.push_str("<section class=\"nodes\"><h2>Edge Nodes</h2>\n");
    for node in registry.snapshots() {
        let _ = write!(
            body,
            "<p>{}: {} (load: {})</p>\n",
            node.name,
            if node.healthy { "healthy" } else { "unhealthy" },
            node.load_score
        );
    }
    body.push_str("</section>\n");
    body.push_str(PAGE_FOOTER);

    Response::html(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::config::EdgeNodeConfig;
    use crate::edge::NodeRole;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn home_is_cached_after_first_render() {
        let counters = Arc::new(PerfCounters::new());
        let cache = PageCache::new(Duration::from_secs(60), Arc::clone(&counters));
        let catalog = MemoryCatalog::demo();

        let first = home(catalog.as_ref(), &cache);
        let second = home(catalog.as_ref(), &cache);
        assert_eq!(first.body, second.body);
        assert!(String::from_utf8_lossy(&first.body).contains("Featured Products"));

        let snap = counters.snapshot();
        assert_eq!(snap.cache_misses, 1);
        assert_eq!(snap.cache_hits, 1);
    }

    #[test]
    fn admin_shows_counters_and_nodes() {
        let counters = PerfCounters::new();
        counters.record_request();
        let registry = EdgeRegistry::from_config(&[EdgeNodeConfig {
            id: "primary-server".into(),
            name: "Primary Server".into(),
            host: "0.0.0.0".into(),
            port: 8080,
            role: NodeRole::Primary,
            active: true,
            initial_load: 0,
        }]);

        let resp = admin(&counters, &registry);
        let body = String::from_utf8_lossy(&resp.body).into_owned();
        assert!(body.contains("Total Requests: 1"));
        assert!(body.contains("Primary Server: healthy"));
    }
}
