//! HTTP response construction.

/// One HTTP response, built by a handler and serialized exactly once.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub content_type: String,
    /// Extra headers beyond the ones the codec always emits.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, content_type: &str, body: Vec<u8>) -> Self {
        debug_assert!((100..=599).contains(&status));
        Self {
            status,
            content_type: content_type.to_string(),
            headers: Vec::new(),
            body,
        }
    }

    pub fn html(body: impl Into<String>) -> Self {
        Self::new(200, "text/html", body.into().into_bytes())
    }

    pub fn json(value: &serde_json::Value) -> Self {
        Self::new(200, "application/json", value.to_string().into_bytes())
    }

    /// Client-side redirect; the body stays empty.
    pub fn redirect(location: &str) -> Self {
        Self::new(302, "text/html", Vec::new()).with_header("Location", location)
    }

    pub fn not_found() -> Self {
        let body = "<!DOCTYPE html>\n<html>\n<head><title>404 Not Found</title></head>\n\
                    <body>\n<h1>404 - Page Not Found</h1>\n\
                    <p>The requested page could not be found.</p>\n\
                    <a href=\"/\">Go Home</a>\n</body>\n</html>\n";
        Self::new(404, "text/html", body.as_bytes().to_vec())
    }

    pub fn bad_request() -> Self {
        let body = "<!DOCTYPE html>\n<html>\n<head><title>400 Bad Request</title></head>\n\
                    <body><h1>400 - Bad Request</h1></body>\n</html>\n";
        Self::new(400, "text/html", body.as_bytes().to_vec())
    }

    pub fn with_header(mut self, name: &str, value: impl ToString) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Standard reason phrase for the status codes this core emits.
    pub fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            302 => "Found",
            400 => "Bad Request",
            404 => "Not Found",
            500 => "Internal Server Error",
            _ => "Unknown",
        }
    }
}
