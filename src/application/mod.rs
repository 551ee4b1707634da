pub mod host_controller;
pub mod lifecycle;

pub use host_controller::{choose_save_path, HostAction, HostController, PendingSave};
pub use lifecycle::WindowPolicy;
