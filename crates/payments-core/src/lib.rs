//! payments-core: HTTP server core for the payments service
//!
//! Holds the request/response types, the fixed payment routes, the shared
//! server state and the hyper accept loop. The binary in
//! `payments-service` only adds configuration, logging and signals.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod error;
pub mod request;
pub mod response;
pub mod routes;
pub mod server;

// Re-exports
pub use error::{Error, Result};
pub use request::Request;
pub use response::{Response, ResponseBuilder};
pub use routes::{payment_routes, NOT_FOUND_BODY, PAY_BODY, ROOT_BODY};
pub use server::{
    create_optimized_socket, from_hyper_request, to_hyper_response, ConnectionGuard,
    ConnectionTracker, Server, ServerConfig, ServerState, StaticRoute,
};

pub use http::{Method, StatusCode};
