//! Canonical license texts compiled into the binary.
//!
//! Slice order is comparison order: when two templates sit at the same
//! edit distance from the input, the earlier one wins.

pub static TEMPLATES: &[(&str, &str)] = &[
    (
        "Apache License 1.0",
        include_str!("../../templates/Apache-1.0.txt"),
    ),
    (
        "Apache License 1.1",
        include_str!("../../templates/Apache-1.1.txt"),
    ),
    (
        "Apache License 2.0",
        include_str!("../../templates/Apache-2.0.txt"),
    ),
    (
        "BSD 2-Clause 'Simplified' License",
        include_str!("../../templates/BSD-2-Clause.txt"),
    ),
    (
        "BSD 3-Clause 'New' or 'Revised' License",
        include_str!("../../templates/BSD-3-Clause.txt"),
    ),
    (
        "BSD 3-Clause Clear License",
        include_str!("../../templates/BSD-3-Clause-Clear.txt"),
    ),
    (
        "Creative Commons Attribution 4.0",
        include_str!("../../templates/CC-BY-4.0.txt"),
    ),
    (
        "GNU General Public License v2.0",
        include_str!("../../templates/GPL-2.0.txt"),
    ),
    (
        "GNU General Public License v3.0",
        include_str!("../../templates/GPL-3.0.txt"),
    ),
    (
        "GNU Lesser General Public License v2.0",
        include_str!("../../templates/LGPL-2.0.txt"),
    ),
    (
        "GNU Lesser General Public License v2.1",
        include_str!("../../templates/LGPL-2.1.txt"),
    ),
    (
        "GNU Lesser General Public License v3.0",
        include_str!("../../templates/LGPL-3.0.txt"),
    ),
    ("MIT License", include_str!("../../templates/MIT.txt")),
    ("ISC License", include_str!("../../templates/ISC.txt")),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corpus_names_are_unique() {
        let mut names: Vec<&str> = TEMPLATES.iter().map(|(name, _)| *name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), TEMPLATES.len());
    }

    #[test]
    fn test_corpus_texts_are_nonempty() {
        for (name, text) in TEMPLATES {
            assert!(!text.trim().is_empty(), "template '{}' is empty", name);
        }
    }
}
