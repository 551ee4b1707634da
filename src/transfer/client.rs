use std::time::Duration;

use futures::Stream;
use futures::TryStreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use thiserror::Error;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Server responded with status {0}")]
    Status(reqwest::StatusCode),

    #[error("Failed to create file: {0}")]
    Create(std::io::Error),

    #[error("Write error: {0}")]
    Write(std::io::Error),

    #[error("Failed to sync file: {0}")]
    Sync(std::io::Error),

    #[error("No target path in download options")]
    NoTarget,
}

pub type Result<T> = std::result::Result<T, TransferError>;

/// Response head plus the body as a byte stream.
pub struct RemoteBody<S> {
    pub total_size: Option<u64>,
    pub mime_type: String,
    pub stream: S,
}

#[derive(Clone)]
pub struct TransferClient {
    http: Client,
}

impl TransferClient {
    pub fn new(connect_timeout: Duration) -> Self {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(connect_timeout)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });

        Self { http }
    }

    /// Sends the GET and hands back the body stream without reading it.
    pub async fn open(
        &self,
        url: &str,
    ) -> Result<RemoteBody<impl Stream<Item = Result<bytes::Bytes>>>> {
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::Status(status));
        }

        let total_size = response.content_length();
        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let stream = response.bytes_stream().map_err(TransferError::Request);

        Ok(RemoteBody {
            total_size,
            mime_type,
            stream,
        })
    }
}
