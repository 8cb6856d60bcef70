//! Pulls email addresses out of page text, scoped to a list of top-level suffixes.

use crate::error::Result;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};

/// Suffixes every page is scanned for, in addition to the page's own suffix.
pub(crate) const DEFAULT_SUFFIXES: [&str; 4] = ["se", "com", "net", "nu"];

/// Characters allowed in both the local part and the domain part.
const ADDRESS_CHARS: &str = r"[a-z0-9.\-+_]+";

fn normalize_suffix(suffix: &str) -> String {
    suffix.trim().trim_start_matches('.').to_lowercase()
}

fn compile_suffix_pattern(suffix: &str) -> std::result::Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"(?i){chars}@{chars}\.{suffix}",
        chars = ADDRESS_CHARS,
        suffix = regex::escape(suffix)
    ))
}

/// Full case folding for the characters an address match can contain.
///
/// Besides ASCII, the case-insensitive class admits KELVIN SIGN (folds to `k`)
/// and LATIN SMALL LETTER LONG S (folds to `s`). `to_lowercase` handles the
/// first but leaves the long s untouched.
pub(crate) fn fold_case(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c == '\u{17F}' { 's' } else { c })
        .collect()
}

/// Scans text for `local@domain.<suffix>` addresses.
#[derive(Debug, Clone)]
pub(crate) struct EmailExtractor {
    base_suffixes: Vec<String>,
    patterns: HashMap<String, Regex>,
}

impl EmailExtractor {
    /// Compiles one pattern per base suffix. Empty and duplicate suffixes are dropped.
    pub(crate) fn new<S: AsRef<str>>(base_suffixes: &[S]) -> Result<Self> {
        let mut suffixes = Vec::with_capacity(base_suffixes.len());
        let mut patterns = HashMap::with_capacity(base_suffixes.len());

        for suffix in base_suffixes {
            let suffix = normalize_suffix(suffix.as_ref());
            if suffix.is_empty() || patterns.contains_key(&suffix) {
                continue;
            }
            patterns.insert(suffix.clone(), compile_suffix_pattern(&suffix)?);
            suffixes.push(suffix);
        }

        tracing::debug!("Email extractor ready for suffixes: {:?}", suffixes);
        Ok(Self {
            base_suffixes: suffixes,
            patterns,
        })
    }

    /// The base suffixes, in configured order.
    pub(crate) fn base_suffixes(&self) -> &[String] {
        &self.base_suffixes
    }

    /// Returns every address in `text` ending in one of the base suffixes or in
    /// `observed_suffix`, case-folded and deduplicated.
    ///
    /// Each suffix is scanned independently, so `info@example.com.se` yields both
    /// `info@example.com` and `info@example.com.se`.
    pub(crate) fn extract_emails(&self, text: &str, observed_suffix: &str) -> BTreeSet<String> {
        if text.is_empty() {
            return BTreeSet::new();
        }

        let mut raw_matches: BTreeSet<&str> = BTreeSet::new();
        for pattern in self.patterns.values() {
            raw_matches.extend(pattern.find_iter(text).map(|m| m.as_str()));
        }

        let observed = normalize_suffix(observed_suffix);
        if !observed.is_empty() && !self.patterns.contains_key(&observed) {
            match compile_suffix_pattern(&observed) {
                Ok(pattern) => raw_matches.extend(pattern.find_iter(text).map(|m| m.as_str())),
                Err(e) => {
                    tracing::warn!(
                        "Skipping observed suffix '{}', pattern did not compile: {}",
                        observed,
                        e
                    );
                }
            }
        }

        raw_matches.into_iter().map(fold_case).collect()
    }
}

impl Default for EmailExtractor {
    fn default() -> Self {
        let patterns: HashMap<String, Regex> = DEFAULT_SUFFIXES
            .iter()
            .filter_map(|suffix| {
                compile_suffix_pattern(suffix)
                    .ok()
                    .map(|pattern| (suffix.to_string(), pattern))
            })
            .collect();
        Self {
            base_suffixes: DEFAULT_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            patterns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extract_basic() {
        let extractor = EmailExtractor::default();
        let text = "Kontakta oss på info@webbyra.se eller sales@example.com!";
        assert_eq!(
            extractor.extract_emails(text, "se"),
            set(&["info@webbyra.se", "sales@example.com"])
        );
    }

    #[test]
    fn test_extract_case_insensitive() {
        let extractor = EmailExtractor::default();
        let upper = extractor.extract_emails("Foo@Bar.COM", "com");
        let lower = extractor.extract_emails("foo@bar.com", "com");
        assert_eq!(upper, set(&["foo@bar.com"]));
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_extract_empty_text() {
        let extractor = EmailExtractor::default();
        assert!(extractor.extract_emails("", "com").is_empty());
        assert!(extractor.extract_emails("no addresses here", "com").is_empty());
    }

    #[test]
    fn test_extract_only_listed_suffixes() {
        let extractor = EmailExtractor::default();
        let text = "a@b.org c@d.de e@f.nu";
        assert_eq!(extractor.extract_emails(text, "com"), set(&["e@f.nu"]));
        assert_eq!(
            extractor.extract_emails(text, "org"),
            set(&["a@b.org", "e@f.nu"])
        );
    }

    #[test]
    fn test_extract_observed_suffix_already_listed() {
        let extractor = EmailExtractor::default();
        assert_eq!(
            extractor.extract_emails("hej@firma.se", "se"),
            set(&["hej@firma.se"])
        );
    }

    #[test]
    fn test_extract_duplicates_collapse() {
        let extractor = EmailExtractor::default();
        let text = "INFO@Firma.se, info@firma.se; Info@FIRMA.SE";
        assert_eq!(extractor.extract_emails(text, "se"), set(&["info@firma.se"]));
    }

    #[test]
    fn test_extract_scans_each_suffix_independently() {
        let extractor = EmailExtractor::default();
        assert_eq!(
            extractor.extract_emails("info@example.com.se", "se"),
            set(&["info@example.com", "info@example.com.se"])
        );
    }

    #[test]
    fn test_extract_allowed_characters() {
        let extractor = EmailExtractor::default();
        let found = extractor.extract_emails("<p>first.last+tag_1@sub-domain.example.net</p>", "se");
        assert_eq!(found, set(&["first.last+tag_1@sub-domain.example.net"]));
    }

    #[test]
    fn test_extract_is_idempotent() {
        let extractor = EmailExtractor::default();
        let text = "a@b.se B@C.COM x@y.nu";
        assert_eq!(
            extractor.extract_emails(text, "nu"),
            extractor.extract_emails(text, "nu")
        );
    }

    #[test]
    fn test_results_are_lowercase_and_suffix_scoped() {
        let extractor = EmailExtractor::default();
        let text = "Mail: Kim@Byra.SE, Lo@Net.NET, nope@x.io, Ok@Host.IO";
        let found = extractor.extract_emails(text, "io");
        let suffixes = ["se", "com", "net", "nu", "io"];
        for email in &found {
            assert_eq!(email, &email.to_lowercase());
            let (_, domain) = email.rsplit_once('@').unwrap();
            let tld = domain.rsplit('.').next().unwrap();
            assert!(suffixes.contains(&tld), "unexpected suffix in {}", email);
        }
        assert_eq!(found.len(), 4);
    }

    #[test]
    fn test_fold_case_beyond_ascii() {
        // KELVIN SIGN and LONG S are matched by the case-insensitive class.
        assert_eq!(fold_case("\u{212A}im@bar.se"), "kim@bar.se");
        assert_eq!(fold_case("\u{17F}ara@bar.se"), "sara@bar.se");

        let extractor = EmailExtractor::default();
        assert_eq!(
            extractor.extract_emails("\u{212A}IM@BAR.SE", "se"),
            set(&["kim@bar.se"])
        );
    }

    #[test]
    fn test_new_drops_empty_and_duplicate_suffixes() {
        let extractor = EmailExtractor::new(&["se", " .COM ", "", "se"]).unwrap();
        assert_eq!(extractor.base_suffixes(), &["se".to_string(), "com".to_string()]);
        assert_eq!(
            extractor.extract_emails("a@b.com c@d.net", ""),
            set(&["a@b.com"])
        );
    }
}
