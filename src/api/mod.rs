//! REST API for the clinic backend: routing, auth middleware, request
//! handlers and the server lifecycle.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use types::ApiContext;
