//! HTTP API Layer
//!
//! Serves the DYMO Label Web Service protocol that browser label SDKs expect
//! on the local machine, and hands print requests to the core PrintService.

pub mod error;
pub mod routes;
pub mod server;
pub mod state;
pub mod templates;

pub use error::{ApiError, ErrorPage};
pub use server::{router, serve};
pub use state::AppState;
