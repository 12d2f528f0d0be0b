use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent configuration error: {0}")]
    Config(String),

    #[error("descriptor has no active requirements and match threshold {0} <= 0 would accept anyone")]
    UnconstrainedMatch(f32),
}

pub type AgentResult<T> = Result<T, AgentError>;
