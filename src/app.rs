use std::path::PathBuf;

use futures::StreamExt;
use iced::{window, Size, Subscription, Task};

use crate::application::{choose_save_path, HostAction, HostController, PendingSave, WindowPolicy};
use crate::bridge::{self, Envelope};
use crate::config::ShellConfig;
use crate::ui::{DownloadMessage, DownloadView};

/// Application state, owned by the iced runtime and handed to every update.
pub struct DownloadShell {
    host: HostController,
    view: DownloadView,
    window: Option<window::Id>,
    policy: WindowPolicy,
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(DownloadMessage),
    WindowOpened(window::Id),
    WindowClosed(window::Id),
    /// Save dialog result; `None` when cancelled
    SaveChosen(PendingSave, Option<PathBuf>),
    /// Host message produced by a running transfer
    Transfer(Envelope),
}

impl DownloadShell {
    pub fn new(config: ShellConfig, policy: WindowPolicy) -> Self {
        let (ui_bridge, endpoint) = bridge::channel();
        let view = DownloadView::new(config.download_url.clone(), ui_bridge);
        let host = HostController::new(endpoint, config);

        Self {
            host,
            view,
            window: None,
            policy,
        }
    }

    pub fn boot() -> (Self, Task<Message>) {
        let config = ShellConfig::from_env();
        log::info!("Starting with download url {}", config.download_url);

        let mut shell = Self::new(config, WindowPolicy::for_current_platform());

        let (width, height) = shell.host.config().window_size;
        let (id, open) = window::open(window::Settings {
            size: Size::new(width, height),
            ..Default::default()
        });
        shell.window = Some(id);

        (shell, open.map(Message::WindowOpened))
    }

    /// Forgets the closed window. Returns whether the process should exit.
    fn on_window_closed(&mut self, id: window::Id) -> bool {
        if self.window == Some(id) {
            self.window = None;
        }

        let exit = self.window.is_none() && self.policy.quit_when_all_closed;
        if exit && self.host.is_busy() {
            log::warn!("Last window closed with a download in progress");
        }
        exit
    }

    fn run(&mut self, action: HostAction) -> Task<Message> {
        match action {
            HostAction::None => Task::none(),
            HostAction::Post(envelope) => {
                self.view.on_host_message(&envelope);
                Task::none()
            }
            HostAction::PromptSave(pending) => {
                let default_path = pending.default_path.clone();
                Task::perform(choose_save_path(default_path), move |chosen| {
                    Message::SaveChosen(pending, chosen)
                })
            }
        }
    }
}

pub fn update(shell: &mut DownloadShell, message: Message) -> Task<Message> {
    let task = match message {
        Message::UiMessage(ui_msg) => {
            shell.view.update(ui_msg);
            Task::none()
        }
        Message::WindowOpened(id) => {
            log::debug!("Window {:?} opened", id);
            Task::none()
        }
        Message::WindowClosed(id) => {
            if shell.on_window_closed(id) {
                log::info!("Last window closed, exiting");
                iced::exit()
            } else {
                Task::none()
            }
        }
        Message::SaveChosen(pending, chosen) => match shell.host.on_save_chosen(pending, chosen) {
            Some(stream) => Task::stream(stream.map(Message::Transfer)),
            None => Task::none(),
        },
        Message::Transfer(envelope) => {
            let envelope = shell.host.relay(envelope);
            shell.view.on_host_message(&envelope);
            Task::none()
        }
    };

    // Whatever the view sent during this update is handled before the next
    // message is processed.
    let actions = shell.host.poll_inbox();
    let follow_up = Task::batch(actions.into_iter().map(|action| shell.run(action)));

    Task::batch([task, follow_up])
}

pub fn view(shell: &DownloadShell, _window: window::Id) -> iced::Element<'_, Message> {
    shell.view.view().map(Message::UiMessage)
}

pub fn title(shell: &DownloadShell, _window: window::Id) -> String {
    shell.host.config().window_title.clone()
}

pub fn subscription(_shell: &DownloadShell) -> Subscription<Message> {
    window::close_events().map(Message::WindowClosed)
}
