//! HTTP Request types
//!
//! Routing only looks at the method and path, so that is all we keep. The
//! body is never read off the wire.

use http::Method;

/// HTTP Request head
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method, including extension methods
    pub method: Method,
    /// Request path (without query string)
    pub path: String,
}

impl Request {
    /// Create a new request
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }
}
