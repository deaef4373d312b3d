//! Error types for the stage model

/// Errors raised while parsing stage and scope identifiers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StageError {
    /// No stage matches the given identifier
    #[error("unknown stage: '{0}'")]
    UnknownStage(String),

    /// No brand scope matches the given identifier
    #[error("unknown brand scope: '{0}'")]
    UnknownScope(String),
}
