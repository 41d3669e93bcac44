// Port Layer - Interfaces for external collaborators

pub mod document_fetcher;
pub mod print_invoker;
pub mod time_provider;

// Re-exports
pub use document_fetcher::{DocumentFetcher, FetchError};
pub use print_invoker::{PrintError, PrintInvoker};
pub use time_provider::TimeProvider;
