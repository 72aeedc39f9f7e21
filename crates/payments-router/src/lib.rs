//! payments-router: Zero-dependency exact-path HTTP router
//!
//! Maps `(method, path)` pairs to numeric handler IDs. The server keeps the
//! actual responses in a separate table keyed by those IDs.
//!
//! ## Matching rules
//! - Paths match segment by segment, with no parameters or wildcards
//! - Empty segments are significant: `/pay`, `/pay/` and `//pay` are three
//!   different paths
//! - Methods are case-insensitive
//! - [`ANY_METHOD`] (`*`) registers a route for every method
//!
//! ## Priority
//! 1. Route registered for the exact method (highest)
//! 2. Route registered for [`ANY_METHOD`]
//!
//! ## Example
//! ```
//! use payments_router::{Router, ANY_METHOD};
//!
//! let mut router = Router::new();
//! router.insert(ANY_METHOD, "/", 0);
//! router.insert(ANY_METHOD, "/pay", 1);
//!
//! assert_eq!(router.find("POST", "/pay").unwrap().handler_id, 1);
//! assert_eq!(router.find("GET", "/").unwrap().handler_id, 0);
//! assert!(router.find("GET", "/refund").is_none());
//! ```

use std::collections::HashMap;

/// Method wildcard accepted by [`Router::insert`]
pub const ANY_METHOD: &str = "*";

/// Route match result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// The matched handler ID
    pub handler_id: u32,
}

/// Trie node keyed by path segment
#[derive(Debug, Default)]
struct Node {
    children: HashMap<String, Node>,
    /// Handler ID if a route ends at this node
    handler_id: Option<u32>,
}

impl Node {
    fn insert(&mut self, segments: &[&str], handler_id: u32) {
        match segments.split_first() {
            None => self.handler_id = Some(handler_id),
            Some((segment, rest)) => self
                .children
                .entry((*segment).to_string())
                .or_default()
                .insert(rest, handler_id),
        }
    }

    fn find(&self, segments: &[&str]) -> Option<u32> {
        match segments.split_first() {
            None => self.handler_id,
            Some((segment, rest)) => self.children.get(*segment)?.find(rest),
        }
    }
}

/// Exact-path HTTP router
///
/// Routes are organized by HTTP method for O(1) method dispatch,
/// then matched through a segment trie in O(k) where k = segment count.
#[derive(Debug, Default)]
pub struct Router {
    /// Method -> Trie root
    trees: HashMap<String, Node>,
}

impl Router {
    /// Create a new router
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a route
    ///
    /// Registering the same method and path twice keeps the last handler ID.
    ///
    /// # Arguments
    /// * `method` - HTTP method (GET, POST, etc.) or [`ANY_METHOD`]
    /// * `path` - exact URL path, without query string
    /// * `handler_id` - identifier for the handler
    pub fn insert(&mut self, method: &str, path: &str, handler_id: u32) {
        let tree = self.trees.entry(method.to_ascii_uppercase()).or_default();
        tree.insert(&segments(path), handler_id);
    }

    /// Find a matching route
    ///
    /// Returns `None` if neither the method's routes nor the
    /// [`ANY_METHOD`] routes contain `path`.
    pub fn find(&self, method: &str, path: &str) -> Option<Match> {
        let segments = segments(path);

        self.tree(method)
            .and_then(|tree| tree.find(&segments))
            .or_else(|| {
                self.trees
                    .get(ANY_METHOD)
                    .and_then(|tree| tree.find(&segments))
            })
            .map(|handler_id| Match { handler_id })
    }

    /// Check if a method has any routes registered
    pub fn has_method(&self, method: &str) -> bool {
        self.tree(method).is_some()
    }

    /// Look up a method's tree. Methods normally arrive uppercase already,
    /// so only a miss on a name with lowercase letters pays for a copy.
    fn tree(&self, method: &str) -> Option<&Node> {
        self.trees.get(method).or_else(|| {
            if method.bytes().any(|b| b.is_ascii_lowercase()) {
                self.trees.get(&method.to_ascii_uppercase())
            } else {
                None
            }
        })
    }

    /// Get all registered methods
    pub fn methods(&self) -> Vec<String> {
        self.trees.keys().cloned().collect()
    }
}

/// Split a path into trie segments. `/` is a single empty segment.
fn segments(path: &str) -> Vec<&str> {
    path.strip_prefix('/').unwrap_or(path).split('/').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_routes() {
        let mut router = Router::new();
        router.insert("GET", "/", 0);
        router.insert("GET", "/pay", 1);
        router.insert("GET", "/pay/status", 2);
        router.insert("POST", "/pay", 3);

        assert_eq!(router.find("GET", "/").unwrap().handler_id, 0);
        assert_eq!(router.find("GET", "/pay").unwrap().handler_id, 1);
        assert_eq!(router.find("GET", "/pay/status").unwrap().handler_id, 2);
        assert_eq!(router.find("POST", "/pay").unwrap().handler_id, 3);
        assert!(router.find("GET", "/unknown").is_none());
        assert!(router.find("DELETE", "/pay").is_none());
    }

    #[test]
    fn test_any_method() {
        let mut router = Router::new();
        router.insert(ANY_METHOD, "/pay", 7);

        for method in ["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS", "PURGE"] {
            assert_eq!(router.find(method, "/pay").unwrap().handler_id, 7, "{method}");
        }
    }

    #[test]
    fn test_priority_exact_method_over_any() {
        let mut router = Router::new();
        router.insert(ANY_METHOD, "/pay", 1);
        router.insert("POST", "/pay", 2);

        assert_eq!(router.find("POST", "/pay").unwrap().handler_id, 2);
        assert_eq!(router.find("GET", "/pay").unwrap().handler_id, 1);
    }

    #[test]
    fn test_method_tree_miss_falls_back_to_any() {
        let mut router = Router::new();
        router.insert("GET", "/other", 1);
        router.insert(ANY_METHOD, "/pay", 2);

        assert_eq!(router.find("GET", "/pay").unwrap().handler_id, 2);
    }

    #[test]
    fn test_exact_matching() {
        let mut router = Router::new();
        router.insert(ANY_METHOD, "/", 0);
        router.insert(ANY_METHOD, "/pay", 1);

        assert!(router.find("GET", "/pay/").is_none());
        assert!(router.find("GET", "/pay/extra").is_none());
        assert!(router.find("GET", "//pay").is_none());
        assert!(router.find("GET", "//").is_none());
        assert!(router.find("GET", "/payments").is_none());
        assert!(router.find("GET", "/PAY").is_none());
    }

    #[test]
    fn test_root_path() {
        let mut router = Router::new();
        router.insert("GET", "/", 0);
        router.insert("GET", "/api", 1);

        assert_eq!(router.find("GET", "/").unwrap().handler_id, 0);
        assert_eq!(router.find("GET", "/api").unwrap().handler_id, 1);
        // Intermediate nodes carry no handler
        let mut router = Router::new();
        router.insert("GET", "/a/b", 5);
        assert!(router.find("GET", "/a").is_none());
    }

    #[test]
    fn test_missing_leading_slash() {
        let mut router = Router::new();
        router.insert("GET", "pay", 1);

        assert_eq!(router.find("GET", "/pay").unwrap().handler_id, 1);
        assert_eq!(router.find("GET", "pay").unwrap().handler_id, 1);
    }

    #[test]
    fn test_reinsert_overwrites() {
        let mut router = Router::new();
        router.insert("GET", "/pay", 1);
        router.insert("GET", "/pay", 9);

        assert_eq!(router.find("GET", "/pay").unwrap().handler_id, 9);
    }

    #[test]
    fn test_methods() {
        let mut router = Router::new();
        router.insert("GET", "/pay", 1);
        router.insert(ANY_METHOD, "/", 2);

        assert!(router.has_method("GET"));
        assert!(router.has_method("get"));
        assert!(router.has_method(ANY_METHOD));
        assert!(!router.has_method("PUT"));

        let methods = router.methods();
        assert_eq!(methods.len(), 2);
        assert!(methods.contains(&"GET".to_string()));
        assert!(methods.contains(&"*".to_string()));
    }

    #[test]
    fn test_extension_method_lookup() {
        let mut router = Router::new();
        router.insert("CHARGE", "/pay", 4);
        router.insert(ANY_METHOD, "/pay", 1);

        assert_eq!(router.find("CHARGE", "/pay").unwrap().handler_id, 4);
        assert_eq!(router.find("charge", "/pay").unwrap().handler_id, 4);
        // Uppercase miss goes straight to the ANY_METHOD tree
        assert_eq!(router.find("REFUND", "/pay").unwrap().handler_id, 1);
        assert!(!router.has_method("REFUND"));
    }

    #[test]
    fn test_case_insensitive_method() {
        let mut router = Router::new();
        router.insert("post", "/pay", 1);

        assert_eq!(router.find("POST", "/pay").unwrap().handler_id, 1);
        assert_eq!(router.find("post", "/pay").unwrap().handler_id, 1);
        assert_eq!(router.find("Post", "/pay").unwrap().handler_id, 1);
    }
}
