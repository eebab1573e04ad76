//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, request ID)
//!     → form.rs (decode JSON or urlencoded body)
//!     → handlers.rs (validate, classify device, resolve location)
//!     → request.rs (client address from proxy headers / peer)
//!     → response.rs (envelope, error → status mapping)
//!     → Send to client
//! ```

pub mod form;
pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use handlers::AppState;
pub use response::{ApiError, ApiResponse};
pub use server::{HttpServer, X_REQUEST_ID};
