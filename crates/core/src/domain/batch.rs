// Batch Domain Model - one drain-and-print cycle of the Batcher

use crate::domain::error::{DomainError, Result};
use crate::domain::Artifact;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Batch identifier (monotonically increasing, starts at 1)
pub type BatchId = u64;

/// Batcher state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatcherState {
    Idle,
    Debouncing,
    Draining,
    Printing,
}

impl fmt::Display for BatcherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatcherState::Idle => write!(f, "IDLE"),
            BatcherState::Debouncing => write!(f, "DEBOUNCING"),
            BatcherState::Draining => write!(f, "DRAINING"),
            BatcherState::Printing => write!(f, "PRINTING"),
        }
    }
}

impl BatcherState {
    /// Validate and perform a transition.
    ///
    /// Allowed edges:
    /// - `Idle -> Debouncing` (new work arrived)
    /// - `Idle -> Draining` (shutdown flush skips the debounce window)
    /// - `Debouncing -> Draining` (timer expired)
    /// - `Draining -> Printing` (non-empty drain)
    /// - `Draining -> Idle` (nothing was left to drain)
    /// - `Printing -> Idle` (print call returned)
    pub fn transition(self, to: BatcherState) -> Result<BatcherState> {
        use BatcherState::*;
        match (self, to) {
            (Idle, Debouncing)
            | (Idle, Draining)
            | (Debouncing, Draining)
            | (Draining, Printing)
            | (Draining, Idle)
            | (Printing, Idle) => Ok(to),
            _ => Err(DomainError::InvalidStateTransition {
                from: self.to_string(),
                to: to.to_string(),
            }),
        }
    }
}

/// Terminal outcome of a batch cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchOutcome {
    Printed,
    Failed(String),
}

/// A drained batch and its outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchCycle {
    pub batch_id: BatchId,
    pub artifacts: Vec<Artifact>,
    pub started_at: i64, // epoch ms
    pub finished_at: Option<i64>,
    pub outcome: Option<BatchOutcome>,
}

impl BatchCycle {
    pub fn new(batch_id: BatchId, artifacts: Vec<Artifact>, started_at: i64) -> Self {
        Self {
            batch_id,
            artifacts,
            started_at,
            finished_at: None,
            outcome: None,
        }
    }

    /// Print job title handed to the OS print subsystem
    pub fn title(&self) -> String {
        format!("Dymo Web Service Clone #{}", self.batch_id)
    }

    pub fn artifact_names(&self) -> Vec<String> {
        self.artifacts.iter().map(Artifact::name).collect()
    }

    pub fn finish(&mut self, outcome: BatchOutcome, now_millis: i64) {
        self.outcome = Some(outcome);
        self.finished_at = Some(now_millis);
    }

    pub fn duration_ms(&self) -> Option<i64> {
        self.finished_at.map(|f| f - self.started_at)
    }
}
