//! File-name helpers shared by the rename and cleanup tools.

use std::path::{Path, PathBuf};

/// Decodes `%XX` escapes the way annotation exports write them.
///
/// Malformed escapes are kept literally and invalid UTF-8 is replaced with
/// U+FFFD.
#[must_use]
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                decoded.push((hi << 4) | lo);
                i += 3;
                continue;
            }
        }
        decoded.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&decoded).into_owned()
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// True if any component below `root` starts with a dot.
#[must_use]
pub fn is_hidden_in_path(path: &Path, root: &Path) -> bool {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .any(|c| c.as_os_str().to_str().is_some_and(|s| s.starts_with('.') && s != "." && s != ".."))
}

/// `dir/stem_N.ext` for the first `N >= 1` that does not exist yet.
#[must_use]
pub fn first_free_numbered(dir: &Path, stem: &str, extension: &str) -> PathBuf {
    let mut counter = 1_usize;
    loop {
        let candidate = dir.join(format!("{stem}_{counter}.{extension}"));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_percent_decode_plain_text() {
        assert_eq!(percent_decode("frame_0001"), "frame_0001");
        assert_eq!(percent_decode(""), "");
    }

    #[test]
    fn test_percent_decode_escapes() {
        assert_eq!(percent_decode("onca%20pintada"), "onca pintada");
        assert_eq!(percent_decode("a%2Fb%2fc"), "a/b/c");
        assert_eq!(percent_decode("capivara%C3%A7"), "capivaraç");
    }

    #[test]
    fn test_percent_decode_malformed() {
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("50%2"), "50%2");
        assert_eq!(percent_decode("%zz"), "%zz");
        assert_eq!(percent_decode("%%41"), "%A");
    }

    #[test]
    fn test_percent_decode_invalid_utf8() {
        assert_eq!(percent_decode("x%FFy"), "x\u{FFFD}y");
    }

    #[test]
    fn test_is_hidden_in_path() {
        let root = Path::new("/data");
        assert!(is_hidden_in_path(Path::new("/data/.cache/a.jpg"), root));
        assert!(is_hidden_in_path(Path::new("/data/train/.a.jpg"), root));
        assert!(!is_hidden_in_path(Path::new("/data/train/a.jpg"), root));
        assert!(!is_hidden_in_path(Path::new("/.data/train/a.jpg"), Path::new("/.data")));
    }

    #[test]
    fn test_first_free_numbered() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let dir = temp_dir.path();
        std::fs::write(dir.join("cat_1.txt"), b"").unwrap();

        assert_eq!(first_free_numbered(dir, "cat", "txt"), dir.join("cat_2.txt"));
        assert_eq!(first_free_numbered(dir, "dog", "txt"), dir.join("dog_1.txt"));
    }
}
