//! HTTP/1.1 wire codec.
//!
//! # Responsibilities
//! - `decode`: raw bytes → [`Request`] (request line, headers, query, body)
//! - `encode`: [`Response`] → raw bytes with exact `Content-Length`
//! - Helpers for the dispatcher's bounded read loop (header boundary,
//!   declared body length)

use std::collections::HashMap;
use std::net::SocketAddr;

use thiserror::Error;

use crate::http::{Request, Response};

/// Protocol-level decode failure. The connection gets a 400 and is closed.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("empty request")]
    Empty,
    #[error("missing or malformed request line")]
    RequestLine,
}

/// Decode one request from a raw byte buffer.
///
/// Tolerates `\r\n` and bare `\n` line endings. Header keys fold to
/// lowercase and values are trimmed; on duplicate keys the last value wins.
pub fn decode(raw: &[u8], peer: SocketAddr) -> Result<Request, ParseError> {
    if raw.is_empty() {
        return Err(ParseError::Empty);
    }

    let head_end = header_section_end(raw).unwrap_or(raw.len());
    let head = String::from_utf8_lossy(&raw[..head_end]);
    let body = raw
        .get(body_offset(raw, head_end)..)
        .unwrap_or_default()
        .to_vec();

    let mut lines = head.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l));

    let request_line = lines.next().ok_or(ParseError::RequestLine)?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().ok_or(ParseError::RequestLine)?.to_string();
    let target = parts.next().ok_or(ParseError::RequestLine)?;
    if method.is_empty() || !target.starts_with('/') {
        return Err(ParseError::RequestLine);
    }

    let (path, query) = match target.split_once('?') {
        Some((path, query_string)) => (path.to_string(), parse_query(query_string)),
        None => (target.to_string(), HashMap::new()),
    };

    let mut headers = HashMap::new();
    for line in lines {
        if line.is_empty() {
            break;
        }
        // Lines without a colon are ignored rather than failing the parse.
        if let Some((key, value)) = line.split_once(':') {
            headers.insert(
                key.trim().to_ascii_lowercase(),
                value.trim().to_string(),
            );
        }
    }

    Ok(Request {
        method,
        path,
        query,
        headers,
        body,
        peer,
    })
}

/// Serialize a response. Always emits `Content-Length` computed from the
/// body and `Connection: close`; this core never reuses a connection.
pub fn encode(response: &Response) -> Vec<u8> {
    let mut out = Vec::with_capacity(256 + response.body.len());
    out.extend_from_slice(
        format!("HTTP/1.1 {} {}\r\n", response.status, response.reason()).as_bytes(),
    );
    out.extend_from_slice(format!("Content-Type: {}\r\n", response.content_type).as_bytes());
    out.extend_from_slice(format!("Content-Length: {}\r\n", response.body.len()).as_bytes());
    for (name, value) in &response.headers {
        out.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
    }
    out.extend_from_slice(b"Connection: close\r\n");
    out.extend_from_slice(b"X-Server: shopfront\r\n");
    out.extend_from_slice(b"X-Edge-Computing: enabled\r\n");
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(&response.body);
    out
}

/// Offset of the end of the header section (start of the blank-line
/// separator), if the buffer contains one yet.
pub fn header_section_end(raw: &[u8]) -> Option<usize> {
    let crlf = raw.windows(4).position(|w| w == b"\r\n\r\n");
    let lf = raw.windows(2).position(|w| w == b"\n\n");
    match (crlf, lf) {
        // Whichever blank line comes first ends the header section.
        (Some(c), Some(l)) => Some(c.min(l)),
        (c, l) => c.or(l),
    }
}

fn body_offset(raw: &[u8], head_end: usize) -> usize {
    if raw[head_end..].starts_with(b"\r\n\r\n") {
        head_end + 4
    } else if raw[head_end..].starts_with(b"\n\n") {
        head_end + 2
    } else {
        raw.len()
    }
}

/// Scan a raw header section for `Content-Length`. Used by the read loop
/// before a full decode is possible; absent or unparseable means zero.
pub fn declared_body_len(head: &[u8]) -> usize {
    let head = String::from_utf8_lossy(head);
    for line in head.split('\n') {
        if let Some((key, value)) = line.split_once(':') {
            if key.trim().eq_ignore_ascii_case("content-length") {
                return value.trim().parse().unwrap_or(0);
            }
        }
    }
    0
}

fn parse_query(query_string: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for pair in query_string.split('&') {
        // Pairs without '=' carry no value and are dropped.
        if let Some((key, value)) = pair.split_once('=') {
            params.insert(percent_decode(key), percent_decode(value));
        }
    }
    params
}

/// Percent-decode a query component. `+` becomes a space; malformed
/// escapes degrade to the literal characters instead of failing the parse.
fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                match (hex_val(bytes.get(i + 1)), hex_val(bytes.get(i + 2))) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi << 4 | lo);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_val(b: Option<&u8>) -> Option<u8> {
    match b? {
        b @ b'0'..=b'9' => Some(b - b'0'),
        b @ b'a'..=b'f' => Some(b - b'a' + 10),
        b @ b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
