use thiserror::Error;

use sar_core::EntityId;

#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("claim timeout must be positive (target {0})")]
    ZeroTimeout(EntityId),
}

pub type ClaimResult<T> = Result<T, ClaimError>;
