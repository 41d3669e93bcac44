// Batching constants (no magic values in the coordinator)
use std::time::Duration;

/// Quiet window used to coalesce print requests into one job (observed value: 1s)
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(1);

/// How long shutdown waits for an in-progress batch cycle and the final flush
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// First job id handed out by the coordinator
pub const FIRST_JOB_ID: u64 = 1;

/// First batch id handed out by the Batcher
pub const FIRST_BATCH_ID: u64 = 1;
