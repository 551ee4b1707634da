/// What happens when the last window goes away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPolicy {
    pub quit_when_all_closed: bool,
}

impl WindowPolicy {
    pub fn for_current_platform() -> Self {
        Self::for_os(std::env::consts::OS)
    }

    /// macOS apps stay resident with no windows open; everything else quits.
    pub fn for_os(os: &str) -> Self {
        Self {
            quit_when_all_closed: os != "macos",
        }
    }
}
