mod app;
mod application;
mod bridge;
mod config;
mod domain;
mod transfer;
mod ui;
mod utils;

fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    iced::daemon(app::DownloadShell::boot, app::update, app::view)
        .title(app::title)
        .subscription(app::subscription)
        .run()
}
