use sar_agent::AgentError;
use sar_claim::ClaimError;
use sar_core::SarError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FleetError {
    #[error("fleet configuration error: {0}")]
    Config(String),

    #[error("{what} length {got} does not match agent count {expected}")]
    CountMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error(transparent)]
    Core(#[from] SarError),

    #[error("agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("claim registry error: {0}")]
    Claim(#[from] ClaimError),

    #[error("descriptor pool is empty and no mission descriptor was given")]
    EmptyPool,
}

pub type FleetResult<T> = Result<T, FleetError>;
