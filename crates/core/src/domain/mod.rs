// Domain Layer - Print requests, artifacts and batch cycles

pub mod artifact;
pub mod batch;
pub mod error;
pub mod print_request;

// Re-exports
pub use artifact::Artifact;
pub use batch::{BatchCycle, BatchId, BatchOutcome, BatcherState};
pub use error::DomainError;
pub use print_request::{JobId, PrintRequest};
