//! Best-guess license identification for free-form text.
//!
//! Cheap substring checks catch the overwhelmingly common licenses first;
//! everything else is compared against a fixed corpus of canonical
//! templates by edit distance, with a regex fallback when nothing is
//! close enough.

pub mod templates;

use once_cell::sync::Lazy;
use regex::Regex;

use templates::TEMPLATES;

/// Default cutoff for accepting a nearest-template match.
///
/// A policy value, not a law: edit distance grows with text length, so
/// callers identifying unusually long or short documents can override it
/// via the `[identify] distance_threshold` config key.
pub const DEFAULT_DISTANCE_THRESHOLD: usize = 500;

static LINE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n").unwrap());

static COPYRIGHT_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Copyright(.+)").unwrap());

/// The corpus pre-normalized the same way input text is.
static NORMALIZED_TEMPLATES: Lazy<Vec<(&'static str, String)>> = Lazy::new(|| {
    TEMPLATES
        .iter()
        .map(|(name, text)| (*name, collapse_line_breaks(text)))
        .collect()
});

/// Name the license `text` most closely resembles. Total: always returns
/// a string, possibly empty.
///
/// Order of attempts:
/// 1. case-insensitive substring fast paths for MIT, MPL, and Apache 2.0;
/// 2. nearest canonical template by Levenshtein distance, accepted when
///    the distance is under `max_distance`;
/// 3. the first `Copyright ...` line of the text, or `""`.
pub fn identify(text: &str, max_distance: usize) -> String {
    let lower = text.to_lowercase();
    if lower.contains("mit license") {
        return "MIT license".to_string();
    }
    if lower.contains("mozilla public license") {
        return "Mozilla Public License".to_string();
    }
    if lower.contains("apache license") && lower.contains("version 2.0") {
        return "Apache License 2.0".to_string();
    }

    let (name, distance) = nearest_template(text);
    if distance < max_distance {
        return name.to_string();
    }

    COPYRIGHT_LINE
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Closest template to `text` and its edit distance.
///
/// Both sides are compared in line-break-collapsed form. Ties keep the
/// first-encountered template; the corpus is a fixed-order slice, so the
/// tie-break is deterministic.
pub fn nearest_template(text: &str) -> (&'static str, usize) {
    let normalized = collapse_line_breaks(text);

    let mut best_name = "";
    let mut best_distance = usize::MAX;
    for (name, template) in NORMALIZED_TEMPLATES.iter() {
        let distance = strsim::levenshtein(&normalized, template);
        if distance < best_distance {
            best_name = name;
            best_distance = distance;
        }
    }
    (best_name, best_distance)
}

fn collapse_line_breaks(text: &str) -> String {
    LINE_BREAKS.replace_all(text, " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fast_path_mit() {
        assert_eq!(
            identify("Licensed under the MIT License.", DEFAULT_DISTANCE_THRESHOLD),
            "MIT license"
        );
    }

    #[test]
    fn test_fast_path_mozilla() {
        assert_eq!(
            identify(
                "This Source Code Form is subject to the Mozilla Public License, v. 2.0.",
                DEFAULT_DISTANCE_THRESHOLD
            ),
            "Mozilla Public License"
        );
    }

    #[test]
    fn test_fast_path_apache_needs_both_markers() {
        assert_eq!(
            identify(
                "Apache License, Version 2.0, January 2004",
                DEFAULT_DISTANCE_THRESHOLD
            ),
            "Apache License 2.0"
        );
        // "Apache License" alone is not enough to trigger the fast path,
        // and a short fragment is too far from every template.
        assert_eq!(
            identify("Apache License", DEFAULT_DISTANCE_THRESHOLD),
            ""
        );
    }

    #[test]
    fn test_exact_template_distance_zero() {
        // BSD has no fast path, so this exercises the distance search.
        let text = templates::TEMPLATES
            .iter()
            .find(|(name, _)| *name == "BSD 3-Clause 'New' or 'Revised' License")
            .map(|(_, text)| *text)
            .unwrap();

        let (name, distance) = nearest_template(text);
        assert_eq!(name, "BSD 3-Clause 'New' or 'Revised' License");
        assert_eq!(distance, 0);
        assert_eq!(
            identify(text, DEFAULT_DISTANCE_THRESHOLD),
            "BSD 3-Clause 'New' or 'Revised' License"
        );
    }

    #[test]
    fn test_drifted_template_still_matches() {
        let text = templates::TEMPLATES
            .iter()
            .find(|(name, _)| *name == "ISC License")
            .map(|(_, text)| *text)
            .unwrap();
        let drifted = text.replace("<year>", "2017").replace("<owner>", "Internet Software Consortium");

        assert_eq!(
            identify(&drifted, DEFAULT_DISTANCE_THRESHOLD),
            "ISC License"
        );
    }

    #[test]
    fn test_threshold_gates_the_match() {
        let text = templates::TEMPLATES
            .iter()
            .find(|(name, _)| *name == "ISC License")
            .map(|(_, text)| *text)
            .unwrap();

        // With a zero threshold even the exact text is rejected and the
        // fallback takes over.
        let name = identify(text, 0);
        assert!(name.starts_with("Copyright"));
    }

    #[test]
    fn test_fallback_copyright_line() {
        let text = "Copyright (c) 2019 Acme Industries.\nAll rights reserved.";
        assert_eq!(
            identify(text, DEFAULT_DISTANCE_THRESHOLD),
            "Copyright (c) 2019 Acme Industries."
        );
    }

    #[test]
    fn test_fallback_no_copyright_is_empty() {
        assert_eq!(identify("hello world", DEFAULT_DISTANCE_THRESHOLD), "");
    }

    #[test]
    fn test_normalized_corpus_has_no_line_breaks() {
        for (name, template) in NORMALIZED_TEMPLATES.iter() {
            assert!(
                !template.contains('\n') && !template.contains('\r'),
                "template '{}' still contains line breaks",
                name
            );
        }
    }
}
