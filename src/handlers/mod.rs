//! Local request handlers.
//!
//! `pages` renders the storefront HTML (home, products, admin); `status`
//! renders the JSON status surface (`/health`, `/status`,
//! `/api/edge/status`, `/api/performance`). All handlers are pure
//! functions of the injected state; the router owns the dispatch table.

pub mod pages;
pub mod status;
