//! HTTP/1.1 message types and wire codec.
//!
//! # Data Flow
//! ```text
//! raw bytes ──codec::decode──▶ Request ──handlers──▶ Response ──codec::encode──▶ raw bytes
//! ```
//!
//! # Design Decisions
//! - Decode and encode are pure functions of their input; no I/O here
//! - Header keys fold to lowercase, last value wins
//! - Every encoded response carries `Content-Length` and `Connection: close`
//! - No keep-alive, chunked encoding, or HTTP/2

pub mod codec;
pub mod request;
pub mod response;

pub use codec::{decode, encode, ParseError};
pub use request::Request;
pub use response::Response;
