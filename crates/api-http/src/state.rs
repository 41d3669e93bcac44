//! Application state shared across all handlers

use dymo_core::application::PrintService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Intake + batch dispatch
    pub service: Arc<PrintService>,

    /// Show error details on exception pages
    pub debug: bool,
}

impl AppState {
    pub fn new(service: Arc<PrintService>, debug: bool) -> Self {
        Self { service, debug }
    }
}
