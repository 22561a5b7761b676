//! Parsed HTTP request.

use std::collections::HashMap;
use std::net::SocketAddr;

/// One decoded HTTP/1.1 request.
///
/// Created by [`crate::http::codec::decode`] and immutable afterwards.
/// `path` has the query string stripped; header keys are lowercased.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    pub peer: SocketAddr,
}

impl Request {
    /// Look up a header by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }
}
