// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid batcher state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Invalid document reference: {0}")]
    InvalidReference(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
