use std::path::PathBuf;

use futures::{stream::BoxStream, StreamExt};
use tokio::io::AsyncWriteExt;

use super::client::{Result, TransferClient, TransferError};
use crate::domain::{CompletedItem, DownloadProperties, ProgressInfo};

#[derive(Debug)]
pub enum TransferEvent {
    Progress(ProgressInfo),
    Completed(CompletedItem),
    Failed(TransferError),
}

struct Target {
    url: String,
    path: PathBuf,
}

enum TransferState {
    Start {
        client: TransferClient,
        target: Target,
    },
    Downloading {
        file: tokio::fs::File,
        stream: BoxStream<'static, Result<bytes::Bytes>>,
        transferred: u64,
        total: Option<u64>,
        mime_type: String,
        target: Target,
    },
    Finished,
}

impl TransferClient {
    /// Streams `url` into the file named by `properties` (`directory` joined
    /// with `filename`). Yields progress per chunk and ends with exactly one
    /// `Completed` or `Failed`.
    pub fn download(
        &self,
        url: String,
        properties: &DownloadProperties,
    ) -> BoxStream<'static, TransferEvent> {
        let Some(path) = properties.target_path() else {
            return futures::stream::once(async { TransferEvent::Failed(TransferError::NoTarget) })
                .boxed();
        };

        futures::stream::unfold(
            TransferState::Start {
                client: self.clone(),
                target: Target { url, path },
            },
            |state| async move {
                match state {
                    TransferState::Start { client, target } => {
                        let file = match tokio::fs::File::create(&target.path).await {
                            Ok(file) => file,
                            Err(e) => {
                                return Some((
                                    TransferEvent::Failed(TransferError::Create(e)),
                                    TransferState::Finished,
                                ));
                            }
                        };

                        match client.open(&target.url).await {
                            Ok(body) => Some((
                                TransferEvent::Progress(ProgressInfo::new(0, body.total_size)),
                                TransferState::Downloading {
                                    file,
                                    stream: body.stream.boxed(),
                                    transferred: 0,
                                    total: body.total_size,
                                    mime_type: body.mime_type,
                                    target,
                                },
                            )),
                            Err(e) => {
                                drop(file);
                                Some((fail(&target, e).await, TransferState::Finished))
                            }
                        }
                    }
                    TransferState::Downloading {
                        mut file,
                        mut stream,
                        mut transferred,
                        total,
                        mime_type,
                        target,
                    } => match stream.next().await {
                        Some(Ok(chunk)) => {
                            if let Err(e) = file.write_all(&chunk).await {
                                drop(file);
                                return Some((
                                    fail(&target, TransferError::Write(e)).await,
                                    TransferState::Finished,
                                ));
                            }

                            transferred += chunk.len() as u64;
                            log::trace!("{} bytes of {:?} written", transferred, total);

                            Some((
                                TransferEvent::Progress(ProgressInfo::new(transferred, total)),
                                TransferState::Downloading {
                                    file,
                                    stream,
                                    transferred,
                                    total,
                                    mime_type,
                                    target,
                                },
                            ))
                        }
                        Some(Err(e)) => {
                            drop(file);
                            Some((fail(&target, e).await, TransferState::Finished))
                        }
                        None => {
                            if let Err(e) = file.sync_all().await {
                                drop(file);
                                return Some((
                                    fail(&target, TransferError::Sync(e)).await,
                                    TransferState::Finished,
                                ));
                            }

                            Some((
                                TransferEvent::Completed(completed_item(
                                    target,
                                    transferred,
                                    mime_type,
                                )),
                                TransferState::Finished,
                            ))
                        }
                    },
                    TransferState::Finished => None,
                }
            },
        )
        .boxed()
    }
}

fn completed_item(target: Target, file_size: u64, mime_type: String) -> CompletedItem {
    let file_name = target
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    CompletedItem {
        path: target.path.to_string_lossy().into_owned(),
        file_name,
        url: target.url,
        file_size,
        mime_type,
    }
}

/// Removes the partial file and wraps the error.
async fn fail(target: &Target, error: TransferError) -> TransferEvent {
    if let Err(e) = tokio::fs::remove_file(&target.path).await {
        log::debug!("Could not remove partial file {}: {}", target.path.display(), e);
    }
    TransferEvent::Failed(error)
}
