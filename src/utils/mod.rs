use std::path::{Path, PathBuf};

use url::Url;

use crate::domain::DownloadProperties;

const FALLBACK_FILENAME: &str = "download";

/// Sanitize filename to remove invalid characters
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Name proposed in the save dialog: the explicit `filename` option if any,
/// otherwise the last path segment of the URL.
pub fn default_file_name(url: &Url, properties: Option<&DownloadProperties>) -> String {
    let explicit = properties
        .and_then(|p| p.filename.as_deref())
        .filter(|name| !name.trim().is_empty());

    // Url::path never contains the query or the fragment.
    let raw = match explicit {
        Some(name) => name,
        None => trailing_segment(url.path()),
    };

    let name = sanitize_filename(raw);
    if name.trim_matches('.').is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        name
    }
}

/// Last segment of a `/` or `\` separated path.
pub fn trailing_segment(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Splits a chosen save location into `(directory, filename)`.
pub fn split_save_path(path: &Path) -> Option<(PathBuf, String)> {
    let filename = path.file_name()?.to_string_lossy().into_owned();
    let directory = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Some((directory, filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("test/file.bin"), "test_file.bin");
        assert_eq!(sanitize_filename("normal-name.dmg"), "normal-name.dmg");
    }

    #[test]
    fn test_default_name_strips_query() {
        assert_eq!(default_file_name(&url("https://x/y/file.bin?tok=1"), None), "file.bin");
        assert_eq!(
            default_file_name(&url("https://x/y/file.bin?a=b/c.txt#frag"), None),
            "file.bin"
        );
    }

    #[test]
    fn test_default_name_prefers_override() {
        let properties = DownloadProperties {
            filename: Some("custom.dmg".to_string()),
            ..Default::default()
        };
        assert_eq!(
            default_file_name(&url("https://x/y/file.bin?tok=1"), Some(&properties)),
            "custom.dmg"
        );
    }

    #[test]
    fn test_default_name_ignores_blank_override() {
        let properties = DownloadProperties {
            filename: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            default_file_name(&url("https://x/y/file.bin"), Some(&properties)),
            "file.bin"
        );
    }

    #[test]
    fn test_default_name_fallback() {
        assert_eq!(default_file_name(&url("https://example.com/"), None), "download");
        assert_eq!(default_file_name(&url("https://example.com"), None), "download");
    }

    #[test]
    fn test_trailing_segment() {
        assert_eq!(trailing_segment("/home/u/Downloads/file.bin"), "file.bin");
        assert_eq!(trailing_segment("C:\\Users\\u\\file.bin"), "file.bin");
        assert_eq!(trailing_segment("file.bin"), "file.bin");
    }

    #[test]
    fn test_split_save_path() {
        let (dir, name) = split_save_path(Path::new("/home/u/Downloads/file.bin")).unwrap();
        assert_eq!(dir, PathBuf::from("/home/u/Downloads"));
        assert_eq!(name, "file.bin");
        assert!(split_save_path(Path::new("/")).is_none());
    }
}
