//! References to code review changes (CLs) found in free text.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Gerrit change URLs (`.../c/<project>/+/<id>`) and `crrev.com/c/<id>`.
static CHANGE_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:/c/(?:[A-Za-z0-9_.\-]+/)*\+/|crrev\.com/c/)(\d{6,})\b")
        .expect("valid change url regex")
});

/// Bare mentions such as `CL 1234567`, `CL-1234567` or `CL:1234567`.
static CHANGE_MENTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bCL[\s:#/\-]*(\d{6,})\b").expect("valid change mention regex"));

/// Order-preserving, duplicate-free set of change ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeIdSet {
    ids: Vec<String>,
    seen: HashSet<String>,
}

impl ChangeIdSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an id, returning false if it was already present.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.seen.contains(&id) {
            return false;
        }
        self.seen.insert(id.clone());
        self.ids.push(id);
        true
    }

    /// Adds every change id referenced in `text`.
    pub fn extend_from_text(&mut self, text: &str) {
        for id in extract_change_ids(text) {
            self.insert(id);
        }
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.ids
    }
}

/// Extracts change ids from text, in text order, without duplicates.
#[must_use]
pub fn extract_change_ids(text: &str) -> Vec<String> {
    let mut matches: Vec<(usize, &str)> = CHANGE_URL_RE
        .captures_iter(text)
        .chain(CHANGE_MENTION_RE.captures_iter(text))
        .filter_map(|captures| captures.get(1))
        .map(|id| (id.start(), id.as_str()))
        .collect();
    matches.sort_by_key(|(start, _)| *start);

    let mut ids = ChangeIdSet::new();
    for (_, id) in matches {
        ids.insert(id);
    }
    ids.into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deduplicates_across_conventions() {
        let text = "Fixed by .../c/chromium/src/+/6624568 (see CL-6624568). \
                    Follow-up in CL 1234567.";
        assert_eq!(extract_change_ids(text), vec!["6624568", "1234567"]);
    }

    #[test]
    fn can_extract_full_urls() {
        let text = "https://chromium-review.googlesource.com/c/chromium/src/+/5012345/3 and \
                    https://crrev.com/c/4999999";
        assert_eq!(extract_change_ids(text), vec!["5012345", "4999999"]);
    }

    #[test]
    fn requires_six_digits() {
        assert!(extract_change_ids("CL 12345 and /c/src/+/99999").is_empty());
    }

    #[test]
    fn ignores_words_ending_in_cl() {
        assert!(extract_change_ids("OpenCL 1234567").is_empty());
        assert_eq!(extract_change_ids("CL:7654321"), vec!["7654321"]);
    }

    #[test]
    fn set_preserves_insertion_order() {
        let mut set = ChangeIdSet::new();
        assert!(set.insert("2000000"));
        assert!(set.insert("1000000"));
        assert!(!set.insert("2000000"));
        assert_eq!(set.into_vec(), ["2000000", "1000000"]);
    }
}
