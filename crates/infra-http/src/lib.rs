// Dymo Infrastructure - HTTP document transport
// Implements: DocumentFetcher

pub mod client;
pub mod http_fetcher;

pub use client::{build_client, prepare_spool_dir, FetchClientConfig};
pub use http_fetcher::HttpDocumentFetcher;
