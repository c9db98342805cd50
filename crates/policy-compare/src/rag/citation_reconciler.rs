//! Citation Reconciliation Module
//!
//! Rewrites summary text so that document references match the filenames the
//! search service actually stored. Display titles reported by the service are
//! often export artifacts ("Microsoft Word - HO6") or simply wrong, while the
//! storage link always ends in the real filename.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::types::SearchResult;

static NOISE_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(Microsoft\s*Word\s*-\s*|Adobe\s*PDF\s*-\s*|docx\s*-\s*)")
        .expect("noise prefix regex is valid")
});

static BRACKET_COLON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\s*:").expect("bracket colon regex is valid"));

/// A single wrong-title → canonical-filename substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleMapping {
    pub wrong_title: String,
    pub filename: String,
}

/// Remove generator-noise prefixes. Repeats until nothing matches, so a
/// removal that exposes another prefix is handled and the result is a
/// fixpoint.
pub fn strip_noise(text: &str) -> String {
    let mut current = text.to_string();
    while NOISE_PREFIX_RE.is_match(&current) {
        current = NOISE_PREFIX_RE.replace_all(&current, "").into_owned();
    }
    current
}

/// Last `/`-separated segment of a storage link.
pub fn canonical_filename(link: &str) -> &str {
    link.rsplit('/').next().unwrap_or(link)
}

/// Derive substitution pairs from search results, longest wrong title first.
pub fn build_mappings(results: &[SearchResult]) -> Vec<TitleMapping> {
    let mut seen = HashSet::new();
    let mut mappings = Vec::new();

    for result in results {
        let filename = canonical_filename(&result.link);
        if filename.is_empty() {
            continue;
        }

        let wrong_title = strip_noise(&result.title);
        if wrong_title.is_empty() || wrong_title == filename {
            continue;
        }

        // First result wins when two results report the same title.
        if !seen.insert(wrong_title.clone()) {
            continue;
        }

        tracing::debug!(
            document_id = result.document_id.as_deref().unwrap_or("-"),
            pages = ?result.page_numbers,
            title = %wrong_title,
            filename = %filename,
            "[CitationReconciler] Mapping result"
        );

        mappings.push(TitleMapping {
            wrong_title,
            filename: filename.to_string(),
        });
    }

    // Longer titles first so "HO" cannot clobber "HO5".
    mappings.sort_by(|a, b| {
        b.wrong_title
            .chars()
            .count()
            .cmp(&a.wrong_title.chars().count())
            .then_with(|| a.wrong_title.cmp(&b.wrong_title))
    });
    mappings
}

enum Span {
    Raw(String),
    Replaced(String),
}

/// Apply mappings in order, each as a literal global replacement.
///
/// Text produced by an earlier replacement is never matched again, so a
/// filename that happens to contain a shorter title stays intact.
pub fn apply_mappings(text: &str, mappings: &[TitleMapping]) -> String {
    let mut spans = vec![Span::Raw(text.to_string())];

    for mapping in mappings {
        if mapping.wrong_title.is_empty() || mapping.wrong_title == mapping.filename {
            continue;
        }

        let present = spans
            .iter()
            .any(|span| matches!(span, Span::Raw(s) if s.contains(&mapping.wrong_title)));
        if !present {
            continue;
        }

        tracing::debug!(
            from = %mapping.wrong_title,
            to = %mapping.filename,
            "[CitationReconciler] Replacing title"
        );

        let mut next = Vec::with_capacity(spans.len());
        for span in spans {
            match span {
                Span::Raw(s) if s.contains(&mapping.wrong_title) => {
                    let mut parts = s.split(mapping.wrong_title.as_str()).peekable();
                    while let Some(part) = parts.next() {
                        if !part.is_empty() {
                            next.push(Span::Raw(part.to_string()));
                        }
                        if parts.peek().is_some() {
                            next.push(Span::Replaced(mapping.filename.clone()));
                        }
                    }
                }
                other => next.push(other),
            }
        }
        spans = next;
    }

    spans
        .into_iter()
        .map(|span| match span {
            Span::Raw(s) | Span::Replaced(s) => s,
        })
        .collect()
}

/// Collapse the malformed `[ :` citation artifact into `[:`.
pub fn fix_bracket_artifacts(text: &str) -> String {
    BRACKET_COLON_RE.replace_all(text, "[:").into_owned()
}

/// Reconcile document references in `text` against `results`.
pub fn reconcile(text: &str, results: &[SearchResult]) -> String {
    if text.is_empty() {
        return String::new();
    }

    let cleaned = strip_noise(text);
    let mappings = build_mappings(results);
    tracing::debug!(
        results = results.len(),
        mappings = mappings.len(),
        "[CitationReconciler] Built title mappings"
    );

    let replaced = apply_mappings(&cleaned, &mappings);
    fix_bracket_artifacts(&replaced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_noise_title_replaced_with_link_filename() {
        let results = vec![SearchResult::new(
            "Microsoft Word - HO6",
            "gs://bucket/policies/HO5.pdf",
        )];
        // The filename carries its extension; the title did not.
        assert_eq!(
            reconcile("Policy HO6 covers surgery.", &results),
            "Policy HO5.pdf covers surgery."
        );
    }

    #[test]
    fn test_extensionless_link() {
        let results = vec![SearchResult::new("Microsoft Word - HO6", "gs://bucket/docs/HO5")];
        assert_eq!(reconcile("Policy HO6 covers...", &results), "Policy HO5 covers...");
    }

    #[test]
    fn test_page_metadata_does_not_affect_mapping() {
        let results = vec![
            SearchResult::new("Microsoft Word - HO6", "gs://bucket/HO5.pdf")
                .with_pages(vec!["3".into(), "7".into()]),
        ];
        assert_eq!(
            build_mappings(&results),
            vec![TitleMapping {
                wrong_title: "HO6".into(),
                filename: "HO5.pdf".into(),
            }]
        );
        assert_eq!(reconcile("HO6 [ :3]", &results), "HO5.pdf [:3]");
    }

    #[test]
    fn test_empty_text() {
        let results = vec![SearchResult::new("A", "gs://b/B.pdf")];
        assert_eq!(reconcile("", &results), "");
    }

    #[test]
    fn test_empty_results_only_strips_noise() {
        let text = "See Microsoft Word - 1U terms and ADOBE PDF - HO5 [ :3]";
        assert_eq!(reconcile(text, &[]), "See 1U terms and HO5 [:3]");
    }

    #[test]
    fn test_longer_title_replaced_first() {
        let results = vec![
            SearchResult::new("HO", "gs://b/Generic.pdf"),
            SearchResult::new("HO5", "gs://b/Farglory-HO5.pdf"),
        ];
        let mappings = build_mappings(&results);
        assert_eq!(mappings[0].wrong_title, "HO5");
        assert_eq!(mappings[1].wrong_title, "HO");

        // The shorter title also occurs inside the longer filename; the
        // replaced span must not be rewritten again.
        assert_eq!(
            reconcile("Compare HO5 with HO", &results),
            "Compare Farglory-HO5.pdf with Generic.pdf"
        );
    }

    #[test]
    fn test_identity_pair_is_skipped() {
        let results = vec![SearchResult::new("HO5.pdf", "gs://b/HO5.pdf")];
        assert!(build_mappings(&results).is_empty());
        assert_eq!(reconcile("HO5.pdf page 2", &results), "HO5.pdf page 2");
    }

    #[test]
    fn test_identity_mapping_application_is_noop() {
        let mapping = TitleMapping {
            wrong_title: "X".into(),
            filename: "X".into(),
        };
        assert_eq!(apply_mappings("X and X", &[mapping]), "X and X");
    }

    #[test]
    fn test_duplicate_titles_first_result_wins() {
        let results = vec![
            SearchResult::new("Plan A", "gs://b/first.pdf"),
            SearchResult::new("Microsoft Word - Plan A", "gs://b/second.pdf"),
        ];
        let mappings = build_mappings(&results);
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].filename, "first.pdf");
    }

    #[test]
    fn test_absent_title_skipped() {
        let results = vec![SearchResult::new("Nowhere", "gs://b/Somewhere.pdf")];
        assert_eq!(reconcile("Nothing to see", &results), "Nothing to see");
    }

    #[test]
    fn test_empty_link_skipped() {
        let results = vec![SearchResult::new("HO6", "")];
        assert!(build_mappings(&results).is_empty());
    }

    #[test]
    fn test_bracket_colon_each_occurrence() {
        assert_eq!(fix_bracket_artifacts("a [ :1] b [ :2] c [:3]"), "a [:1] b [:2] c [:3]");
    }

    #[test]
    fn test_canonical_filename() {
        assert_eq!(canonical_filename("gs://bucket/a/b/HO5.pdf"), "HO5.pdf");
        assert_eq!(canonical_filename("HO5.pdf"), "HO5.pdf");
        assert_eq!(canonical_filename("gs://bucket/dir/"), "");
    }

    #[test]
    fn test_strip_noise_exposed_prefix() {
        // Removing the inner prefix exposes an outer one.
        let text = "Microsoft Microsoft Word - Word - HO5";
        assert_eq!(strip_noise(text), "HO5");
    }

    proptest! {
        #[test]
        fn prop_strip_noise_idempotent(text in "(Microsoft|Word|Adobe|PDF|docx| |-|HO5|x){0,12}") {
            let once = strip_noise(&text);
            prop_assert_eq!(strip_noise(&once), once);
        }

        #[test]
        fn prop_no_results_means_noise_strip_only(text in "[a-zA-Z0-9 ]{0,40}") {
            prop_assert_eq!(reconcile(&text, &[]), strip_noise(&text));
        }

        #[test]
        fn prop_longer_title_survives_intact(code in "[A-Z]{2}", digit in "[0-9]") {
            let long = format!("{}{}", code, digit);
            let results = vec![
                SearchResult::new(code.clone(), "gs://b/short-target.pdf"),
                SearchResult::new(long.clone(), "gs://b/LONG_TARGET.pdf"),
            ];
            let text = format!("compare {} now", long);
            let out = reconcile(&text, &results);
            prop_assert_eq!(out, "compare LONG_TARGET.pdf now");
        }
    }
}
