//! HTTP test double that records the last request it received and answers
//! every request with a configurable canned response.
//!
//! ```no_run
//! use axum::http::StatusCode;
//! use mock_endpoint::{state::MockResponse, MockEndpoint};
//!
//! # async fn demo() {
//! let mut endpoint = MockEndpoint::start().await;
//! endpoint.set_response(
//!     MockResponse::new(StatusCode::NOT_FOUND)
//!         .with_body("{}")
//!         .with_header("Content-Type", "application/json"),
//! );
//!
//! // ... point the client under test at `endpoint.base_url()` ...
//!
//! assert_eq!(endpoint.last_method(), "POST");
//! endpoint.stop().await;
//! # }
//! ```

use axum::{middleware, Router};

pub mod config;
pub mod endpoint;
pub mod errors;
pub mod http;
pub mod logging;
pub mod state;

pub use endpoint::MockEndpoint;
use state::EndpointState;

pub fn build_app(state: EndpointState) -> Router {
    Router::new()
        .fallback(http::handlers::record_and_respond)
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}
