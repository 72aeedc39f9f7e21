//! The payment service's fixed routes

use crate::response::TEXT_PLAIN;
use crate::server::StaticRoute;
use payments_router::ANY_METHOD;

/// Body served by `/pay`
pub const PAY_BODY: &str = "Payment processed";

/// Body served by `/`
pub const ROOT_BODY: &str = "Payments Service Running";

/// Body served for unregistered paths
pub const NOT_FOUND_BODY: &str = "Not Found";

/// Routes served by the payments service. Both accept any method.
pub fn payment_routes() -> Vec<StaticRoute> {
    vec![
        StaticRoute {
            method: ANY_METHOD.to_string(),
            path: "/".to_string(),
            status: 200,
            content_type: TEXT_PLAIN.to_string(),
            body: ROOT_BODY.to_string(),
            handler_id: 0,
        },
        StaticRoute {
            method: ANY_METHOD.to_string(),
            path: "/pay".to_string(),
            status: 200,
            content_type: TEXT_PLAIN.to_string(),
            body: PAY_BODY.to_string(),
            handler_id: 1,
        },
    ]
}
