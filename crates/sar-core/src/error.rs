//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `SarError` for the id
//! lookups they share.

use thiserror::Error;

use crate::{AgentId, EntityId};

/// The top-level error type for `sar-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum SarError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("entity {0} not found")]
    EntityNotFound(EntityId),
}

/// Shorthand result type for all `sar-*` crates.
pub type SarResult<T> = Result<T, SarError>;
