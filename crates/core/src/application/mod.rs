// Application Layer - Job intake, queueing and batch dispatch

pub mod batcher;
pub mod constants;
pub mod job_queue;
pub mod print_service;

// Re-exports
pub use batcher::{Batcher, BatcherConfig, BatcherStats, StatsSnapshot};
pub use job_queue::JobQueue;
pub use print_service::PrintService;
