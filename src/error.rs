use crate::stores::StoreError;

/// Engine-level errors surfaced to callers
///
/// Most engine operations degrade internally instead of failing (see the
/// per-strategy fallbacks); this type covers the few calls that can
/// legitimately reject input, such as looking up an unknown item.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal engine error: {0}")]
    Internal(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
