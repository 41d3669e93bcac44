// Time Provider Port
// Wall-clock source for batch cycle timestamps and print durations

/// Epoch-millisecond clock
///
/// Implementations:
/// - SystemTimeProvider: UTC wall clock
/// - TokioClockTimeProvider: follows tokio's clock, so paused-time tests see exact durations
pub trait TimeProvider: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;

    /// Reports `epoch_millis` plus the tokio time elapsed since construction.
    ///
    /// Under `start_paused` runtimes this only moves when tokio's clock does.
    pub struct TokioClockTimeProvider {
        epoch_millis: i64,
        origin: tokio::time::Instant,
    }

    impl TokioClockTimeProvider {
        pub fn starting_at(epoch_millis: i64) -> Self {
            Self {
                epoch_millis,
                origin: tokio::time::Instant::now(),
            }
        }
    }

    impl TimeProvider for TokioClockTimeProvider {
        fn now_millis(&self) -> i64 {
            self.epoch_millis + self.origin.elapsed().as_millis() as i64
        }
    }
}
