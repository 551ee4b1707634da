use std::path::PathBuf;

use futures::{stream::BoxStream, StreamExt};
use serde_json::Value;
use url::Url;

use crate::{
    bridge::{channels, Envelope, HostEndpoint},
    config::ShellConfig,
    domain::{AppError, DownloadCommand, DownloadFailure, DownloadProperties, DownloadRequest},
    transfer::{TransferClient, TransferEvent},
    utils::{default_file_name, split_save_path},
};

/// A validated request waiting on the save dialog.
#[derive(Debug, Clone)]
pub struct PendingSave {
    pub url: String,
    pub properties: DownloadProperties,
    pub default_path: PathBuf,
}

#[derive(Debug)]
pub enum HostAction {
    None,
    /// Deliver to the view right away.
    Post(Envelope),
    /// Show the save dialog, then report back through `on_save_chosen`.
    PromptSave(PendingSave),
}

/// Owns everything the view may not touch: config, the HTTP client and the
/// single-download slot.
pub struct HostController {
    endpoint: HostEndpoint,
    transfer: TransferClient,
    config: ShellConfig,
    in_flight: bool,
}

impl HostController {
    pub fn new(endpoint: HostEndpoint, config: ShellConfig) -> Self {
        let transfer = TransferClient::new(config.connect_timeout);
        Self {
            endpoint,
            transfer,
            config,
            in_flight: false,
        }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    /// Handles every message the view has sent since the last call.
    pub fn poll_inbox(&mut self) -> Vec<HostAction> {
        self.endpoint
            .drain()
            .into_iter()
            .map(|envelope| self.handle(envelope))
            .collect()
    }

    pub fn handle(&mut self, envelope: Envelope) -> HostAction {
        match envelope.channel.as_str() {
            channels::DOWNLOAD => match self.begin_download(&envelope.args) {
                Ok(pending) => {
                    log::info!(
                        "Download requested: {} (proposing {})",
                        pending.url,
                        pending.default_path.display()
                    );
                    HostAction::PromptSave(pending)
                }
                Err(e) => {
                    log::warn!("Rejected download request: {}", e);
                    HostAction::Post(self.failure(&e))
                }
            },
            other => {
                log::warn!("Ignoring message on unknown channel {}", other);
                HostAction::None
            }
        }
    }

    fn begin_download(&mut self, args: &[Value]) -> Result<PendingSave, AppError> {
        let raw = args
            .first()
            .cloned()
            .ok_or_else(|| AppError::InvalidRequest("empty message".to_string()))?;
        let DownloadCommand { payload } = serde_json::from_value(raw)
            .map_err(|e| AppError::InvalidRequest(e.to_string()))?;
        let DownloadRequest { url, properties } = payload;

        let url = parse_download_url(&url)?;

        if self.in_flight {
            return Err(AppError::Busy);
        }

        let file_name = default_file_name(&url, properties.as_ref());
        let default_path = self.config.default_download_dir().join(file_name);

        self.in_flight = true;
        Ok(PendingSave {
            url: url.to_string(),
            properties: properties.unwrap_or_default(),
            default_path,
        })
    }

    /// Continues a request once the dialog closes. `None` means the user
    /// cancelled: the slot frees up and nothing is posted.
    pub fn on_save_chosen(
        &mut self,
        pending: PendingSave,
        chosen: Option<PathBuf>,
    ) -> Option<BoxStream<'static, Envelope>> {
        let Some(path) = chosen else {
            log::info!("Save dialog cancelled for {}", pending.url);
            self.in_flight = false;
            return None;
        };

        let Some((directory, filename)) = split_save_path(&path) else {
            let error = AppError::Io(format!("not a file path: {}", path.display()));
            log::warn!("{}", error);
            let envelope = self.failure(&error);
            return Some(futures::stream::once(async move { envelope }).boxed());
        };

        let properties = pending.properties.with_save_path(directory, filename);
        log::info!("Downloading {} to {}", pending.url, path.display());

        Some(
            self.transfer
                .download(pending.url, &properties)
                .map(transfer_envelope)
                .boxed(),
        )
    }

    /// Passes a transfer message through on its way to the view, freeing the
    /// slot once the transfer has finished either way.
    pub fn relay(&mut self, envelope: Envelope) -> Envelope {
        if matches!(
            envelope.channel.as_str(),
            channels::DOWNLOAD_COMPLETE | channels::DOWNLOAD_ERROR
        ) {
            self.in_flight = false;
        }
        envelope
    }

    fn failure(&self, error: &AppError) -> Envelope {
        self.endpoint
            .post(channels::DOWNLOAD_ERROR, DownloadFailure::from(error))
    }
}

fn parse_download_url(raw: &str) -> Result<Url, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::InvalidRequest("missing url".to_string()));
    }

    let url = Url::parse(raw)
        .map_err(|e| AppError::InvalidRequest(format!("malformed url {:?}: {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(AppError::InvalidRequest(format!(
            "unsupported scheme {:?}",
            scheme
        ))),
    }
}

fn transfer_envelope(event: TransferEvent) -> Envelope {
    match event {
        TransferEvent::Progress(progress) => Envelope::new(channels::DOWNLOAD_PROGRESS, progress),
        TransferEvent::Completed(item) => {
            log::info!("Download finished: {}", item.path);
            Envelope::new(channels::DOWNLOAD_COMPLETE, item)
        }
        TransferEvent::Failed(e) => {
            log::warn!("Download failed: {}", e);
            let error = AppError::Transfer(e.to_string());
            Envelope::new(channels::DOWNLOAD_ERROR, DownloadFailure::from(&error))
        }
    }
}

/// Native "save as" prompt seeded with the proposed path.
pub async fn choose_save_path(default_path: PathBuf) -> Option<PathBuf> {
    let mut dialog = rfd::AsyncFileDialog::new();
    if let Some(directory) = default_path.parent() {
        dialog = dialog.set_directory(directory);
    }
    if let Some(name) = default_path.file_name() {
        dialog = dialog.set_file_name(name.to_string_lossy());
    }

    dialog
        .save_file()
        .await
        .map(|handle| handle.path().to_path_buf())
}
