pub mod error;
pub mod model;

pub use error::AppError;
pub use model::{
    CompletedItem, DownloadCommand, DownloadFailure, DownloadPhase, DownloadProperties,
    DownloadRequest, FailureKind, ProgressInfo,
};
