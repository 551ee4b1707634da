use thiserror::Error;

use super::model::FailureKind;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AppError {
    #[error("Invalid download request: {0}")]
    InvalidRequest(String),

    #[error("A download is already in progress")]
    Busy,

    #[error("Transfer failed: {0}")]
    Transfer(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl AppError {
    pub fn kind(&self) -> FailureKind {
        match self {
            AppError::InvalidRequest(_) => FailureKind::InvalidRequest,
            AppError::Busy => FailureKind::Busy,
            AppError::Transfer(_) | AppError::Io(_) => FailureKind::Transfer,
        }
    }
}
