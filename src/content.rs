use once_cell::sync::Lazy;
use regex::bytes::Regex;

use crate::assets::AssetStore;
use crate::error::Result;
use crate::models::{LicenseContent, LicenseInfo};

static LINE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n").unwrap());

/// Filename of the stored body for a catalog entry.
///
/// Deprecated ids are stored under a `deprecated_` prefix. One legacy
/// filename predates that rule and always wins, deprecated or not.
pub fn content_path(info: &LicenseInfo) -> String {
    if info.id.is_empty() {
        return String::new();
    }

    if info.id == "Nokia-Qt-exception-1.1" {
        return "Nokia-Qt-exception-1.1.txt".to_string();
    }

    let mut path = String::new();
    if info.is_deprecated {
        path.push_str("deprecated_");
    }
    path.push_str(&info.id);
    path.push_str(".txt");
    path
}

/// Load and normalize the body for `info` from the store.
///
/// `content` keeps the bytes exactly as stored; `raw_content` is the
/// line-break-collapsed form. A failed read surfaces the attempted path.
pub fn load(store: &impl AssetStore, info: &LicenseInfo) -> Result<LicenseContent> {
    let raw = store.get(&content_path(info))?;
    let raw_content = collapse_line_breaks(&raw);

    Ok(LicenseContent {
        id: info.id.clone(),
        content: raw,
        raw_content,
    })
}

/// Replace every `\r?\n` with a single space.
pub fn collapse_line_breaks(raw: &[u8]) -> Vec<u8> {
    LINE_BREAKS.replace_all(raw, &b" "[..]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::DirStore;

    fn info(id: &str, deprecated: bool) -> LicenseInfo {
        LicenseInfo {
            id: id.to_string(),
            name: String::new(),
            references: Vec::new(),
            is_deprecated: deprecated,
        }
    }

    #[test]
    fn test_content_path_empty_id() {
        assert_eq!(content_path(&info("", false)), "");
        assert_eq!(content_path(&info("", true)), "");
    }

    #[test]
    fn test_content_path_plain() {
        assert_eq!(content_path(&info("0BSD", false)), "0BSD.txt");
    }

    #[test]
    fn test_content_path_deprecated_prefix() {
        assert_eq!(
            content_path(&info("AGPL-3.0", true)),
            "deprecated_AGPL-3.0.txt"
        );
    }

    #[test]
    fn test_content_path_legacy_override() {
        // The override wins regardless of the deprecation flag.
        assert_eq!(
            content_path(&info("Nokia-Qt-exception-1.1", false)),
            "Nokia-Qt-exception-1.1.txt"
        );
        assert_eq!(
            content_path(&info("Nokia-Qt-exception-1.1", true)),
            "Nokia-Qt-exception-1.1.txt"
        );
    }

    #[test]
    fn test_collapse_line_breaks() {
        assert_eq!(collapse_line_breaks(b"a\nb\r\nc"), b"a b c");
        assert_eq!(collapse_line_breaks(b"no breaks"), b"no breaks");
    }

    #[test]
    fn test_collapse_leaves_no_cr_or_lf() {
        let collapsed = collapse_line_breaks(b"one\r\ntwo\nthree\r\n");
        assert!(!collapsed.contains(&b'\r'));
        assert!(!collapsed.contains(&b'\n'));
    }

    #[test]
    fn test_load_sets_both_forms() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("0BSD.txt"),
            b"Permission to use, copy, modify,\nand/or distribute this software\r\nfor any purpose",
        )
        .unwrap();

        let store = DirStore::new(dir.path());
        let content = load(&store, &info("0BSD", false)).unwrap();

        assert_eq!(content.id, "0BSD");
        assert_eq!(
            content.content,
            b"Permission to use, copy, modify,\nand/or distribute this software\r\nfor any purpose"
        );
        assert_eq!(
            content.raw_content,
            b"Permission to use, copy, modify, and/or distribute this software for any purpose"
        );
    }

    #[test]
    fn test_load_missing_reports_attempted_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirStore::new(dir.path());

        let err = load(&store, &info("AGPL-3.0", true)).unwrap_err();
        assert!(err.to_string().contains("deprecated_AGPL-3.0.txt"));
    }
}
