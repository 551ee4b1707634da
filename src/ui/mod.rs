use iced::{
    widget::{button, column, progress_bar, text, Space},
    Element, Length,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    bridge::{channels, Envelope, UiBridge},
    domain::{
        CompletedItem, DownloadCommand, DownloadFailure, DownloadPhase, DownloadRequest,
        FailureKind, ProgressInfo,
    },
    utils::trailing_segment,
};

/// What the view's channel listeners turn host messages into.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// Fraction in `0.0..=1.0`.
    Progress(f64),
    /// Absolute path of the saved file.
    Completed(String),
    Failed(DownloadFailure),
}

/// Main view state
pub struct DownloadView {
    bridge: UiBridge<ViewEvent>,
    url: String,
    pub is_downloading: bool,
    /// Percent in `0.0..=100.0`.
    pub download_progress: f64,
    pub file_name: Option<String>,
    pub failure: Option<String>,
    pub notice: Option<String>,
}

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    DownloadPressed,
    RetryPressed,
}

impl DownloadView {
    pub fn new(url: String, mut bridge: UiBridge<ViewEvent>) -> Self {
        bridge.receive(channels::DOWNLOAD_PROGRESS, |args| {
            first_arg::<ProgressInfo>(args).map(|p| ViewEvent::Progress(p.percent))
        });
        bridge.receive(channels::DOWNLOAD_COMPLETE, |args| {
            first_arg::<CompletedItem>(args).map(|item| ViewEvent::Completed(item.path))
        });
        bridge.receive(channels::DOWNLOAD_ERROR, |args| {
            first_arg::<DownloadFailure>(args).map(ViewEvent::Failed)
        });

        Self {
            bridge,
            url,
            is_downloading: false,
            download_progress: 0.0,
            file_name: None,
            failure: None,
            notice: None,
        }
    }

    pub fn update(&mut self, message: DownloadMessage) {
        match message {
            DownloadMessage::DownloadPressed | DownloadMessage::RetryPressed => {
                // A press during a running download only reaches the host,
                // which answers busy; the current progress stays on screen.
                if !self.is_downloading {
                    self.is_downloading = true;
                    self.download_progress = 0.0;
                    self.file_name = None;
                    self.failure = None;
                }
                self.notice = None;

                self.bridge.send(
                    channels::DOWNLOAD,
                    DownloadCommand {
                        payload: DownloadRequest::new(self.url.clone()),
                    },
                );
            }
        }
    }

    /// Feeds a host message through the registered listeners.
    pub fn on_host_message(&mut self, envelope: &Envelope) {
        for event in self.bridge.deliver(envelope) {
            self.apply(event);
        }
    }

    fn apply(&mut self, event: ViewEvent) {
        match event {
            ViewEvent::Progress(fraction) => {
                self.download_progress = (fraction * 100.0).clamp(0.0, 100.0);
            }
            ViewEvent::Completed(path) => {
                self.is_downloading = false;
                self.file_name = Some(trailing_segment(&path).to_string());
            }
            ViewEvent::Failed(failure) => {
                if failure.kind == FailureKind::Busy && self.is_downloading {
                    self.notice = Some(failure.reason);
                } else {
                    self.is_downloading = false;
                    self.failure = Some(failure.reason);
                }
            }
        }
    }

    pub fn phase(&self) -> DownloadPhase {
        if let Some(reason) = &self.failure {
            return DownloadPhase::Failed(reason.clone());
        }

        if self.is_downloading && self.download_progress < 100.0 {
            DownloadPhase::Downloading(self.download_progress)
        } else if self.download_progress >= 100.0 || self.file_name.is_some() {
            DownloadPhase::Completed(self.file_name.clone().unwrap_or_default())
        } else {
            DownloadPhase::Idle
        }
    }

    pub fn status_line(&self) -> String {
        match self.phase() {
            DownloadPhase::Idle => "Press Download to fetch the file".to_string(),
            DownloadPhase::Downloading(percent) => format!("Download Progress: {:.0}", percent),
            DownloadPhase::Completed(name) => format!("Downloaded file {}", name)
                .trim_end()
                .to_string(),
            DownloadPhase::Failed(reason) => format!("Download failed: {}", reason),
        }
    }

    pub fn view(&self) -> Element<'_, DownloadMessage> {
        let phase = self.phase();

        let mut content = column![
            text("Download Shell").size(32),
            Space::new().height(Length::Fixed(20.0)),
            button("Download")
                .on_press(DownloadMessage::DownloadPressed)
                .padding([10, 20]),
            Space::new().height(Length::Fixed(10.0)),
            text(self.status_line()).size(16),
        ];

        if let DownloadPhase::Downloading(percent) = phase {
            content = content.push(progress_bar(0.0..=100.0, percent as f32));
        }

        if let Some(notice) = &self.notice {
            content = content.push(text(notice).size(14));
        }

        if let DownloadPhase::Failed(_) = phase {
            content = content.push(
                button("Retry")
                    .on_press(DownloadMessage::RetryPressed)
                    .padding([10, 20]),
            );
        }

        content.padding(20).spacing(10).into()
    }
}

fn first_arg<T: DeserializeOwned>(args: &[Value]) -> Option<T> {
    let value = args.first()?.clone();
    serde_json::from_value(value)
        .map_err(|e| log::warn!("Dropping malformed host message: {}", e))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{self, HostEndpoint};
    use serde_json::json;

    const URL: &str = "https://x/y/file.bin";

    fn view() -> (DownloadView, HostEndpoint) {
        let (ui, host) = bridge::channel();
        (DownloadView::new(URL.to_string(), ui), host)
    }

    #[test]
    fn test_press_sends_download_request() {
        let (mut view, mut host) = view();
        view.update(DownloadMessage::DownloadPressed);

        assert!(view.is_downloading);
        let sent = host.drain();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].channel, "download");
        assert_eq!(sent[0].args[0], json!({ "payload": { "url": URL } }));
        assert_eq!(view.status_line(), "Download Progress: 0");
    }

    #[test]
    fn test_progress_is_shown_as_percent() {
        let (mut view, host) = view();
        view.update(DownloadMessage::DownloadPressed);

        view.on_host_message(&host.post(channels::DOWNLOAD_PROGRESS, json!({ "percent": 0.42 })));
        assert_eq!(view.status_line(), "Download Progress: 42");

        view.on_host_message(&host.post(channels::DOWNLOAD_PROGRESS, json!({ "percent": 1.0 })));
        assert_eq!(view.download_progress, 100.0);
        assert_eq!(view.phase(), DownloadPhase::Completed(String::new()));
    }

    #[test]
    fn test_completion_shows_trailing_segment() {
        let (mut view, host) = view();
        view.update(DownloadMessage::DownloadPressed);

        view.on_host_message(&host.post(
            channels::DOWNLOAD_COMPLETE,
            json!({ "path": "/home/u/Downloads/file.bin" }),
        ));

        assert!(!view.is_downloading);
        assert_eq!(view.phase(), DownloadPhase::Completed("file.bin".to_string()));
        assert_eq!(view.status_line(), "Downloaded file file.bin");
    }

    #[test]
    fn test_failure_then_retry() {
        let (mut view, mut host) = view();
        view.update(DownloadMessage::DownloadPressed);
        host.drain();

        view.on_host_message(&host.post(
            channels::DOWNLOAD_ERROR,
            json!({ "reason": "Transfer failed: timed out", "kind": "transfer" }),
        ));
        assert_eq!(
            view.phase(),
            DownloadPhase::Failed("Transfer failed: timed out".to_string())
        );

        view.update(DownloadMessage::RetryPressed);
        assert_eq!(view.phase(), DownloadPhase::Downloading(0.0));
        assert_eq!(host.drain().len(), 1);
    }

    #[test]
    fn test_full_progress_shows_downloaded_line() {
        let (mut view, host) = view();
        view.update(DownloadMessage::DownloadPressed);
        view.on_host_message(&host.post(channels::DOWNLOAD_PROGRESS, json!({ "percent": 1.0 })));

        assert_eq!(view.status_line(), "Downloaded file");
    }

    #[test]
    fn test_busy_keeps_current_download() {
        let (mut view, mut host) = view();
        view.update(DownloadMessage::DownloadPressed);
        view.on_host_message(&host.post(channels::DOWNLOAD_PROGRESS, json!({ "percent": 0.5 })));

        view.update(DownloadMessage::DownloadPressed);
        assert_eq!(host.drain().len(), 2);
        assert_eq!(view.phase(), DownloadPhase::Downloading(50.0));

        view.on_host_message(&host.post(
            channels::DOWNLOAD_ERROR,
            json!({ "reason": "A download is already in progress", "kind": "busy" }),
        ));

        assert_eq!(view.phase(), DownloadPhase::Downloading(50.0));
        assert_eq!(view.notice.as_deref(), Some("A download is already in progress"));
    }

    #[test]
    fn test_malformed_message_is_ignored() {
        let (mut view, host) = view();
        view.on_host_message(&host.post(channels::DOWNLOAD_PROGRESS, json!({ "pct": 3 })));
        assert_eq!(view.phase(), DownloadPhase::Idle);
    }
}
