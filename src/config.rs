use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_URL: &str = "https://btweb-assets.bittorrent.com/installer/BitTorrentWeb.dmg";

pub const ENV_URL: &str = "DOWNLOAD_SHELL_URL";
pub const ENV_DIR: &str = "DOWNLOAD_SHELL_DIR";
pub const ENV_CONNECT_TIMEOUT: &str = "DOWNLOAD_SHELL_CONNECT_TIMEOUT_SECS";

/// Runtime settings for the shell
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// URL fetched when the download button is pressed
    pub download_url: String,
    /// Overrides the OS downloads folder as the dialog's starting point
    pub download_dir: Option<PathBuf>,
    pub connect_timeout: Duration,
    pub window_title: String,
    pub window_size: (f32, f32),
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            download_url: DEFAULT_URL.to_string(),
            download_dir: None,
            connect_timeout: Duration::from_secs(30),
            window_title: "Download Shell".to_string(),
            window_size: (800.0, 600.0),
        }
    }
}

impl ShellConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_URL).filter(|v| !v.trim().is_empty()) {
            config.download_url = url.trim().to_string();
        }

        if let Some(dir) = lookup(ENV_DIR).filter(|v| !v.trim().is_empty()) {
            config.download_dir = Some(PathBuf::from(dir));
        }

        if let Some(raw) = lookup(ENV_CONNECT_TIMEOUT) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.connect_timeout = Duration::from_secs(secs),
                _ => log::warn!("Ignoring invalid {}: {:?}", ENV_CONNECT_TIMEOUT, raw),
            }
        }

        config
    }

    /// Directory the save dialog starts in.
    pub fn default_download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .or_else(dirs::download_dir)
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = ShellConfig::from_lookup(lookup(&[]));
        assert_eq!(config.download_url, DEFAULT_URL);
        assert!(config.download_dir.is_none());
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_env_overrides() {
        let config = ShellConfig::from_lookup(lookup(&[
            (ENV_URL, " https://example.com/a.zip "),
            (ENV_DIR, "/tmp/dl"),
            (ENV_CONNECT_TIMEOUT, "5"),
        ]));
        assert_eq!(config.download_url, "https://example.com/a.zip");
        assert_eq!(config.default_download_dir(), PathBuf::from("/tmp/dl"));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_timeout_keeps_default() {
        let config = ShellConfig::from_lookup(lookup(&[(ENV_CONNECT_TIMEOUT, "soon")]));
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
    }
}
