//! Text cleaning shared by every comment source.

use once_cell::sync::Lazy;
use regex::Regex;

/// Cleaned content must be longer than this to count as a real comment.
pub const MIN_COMMENT_CHARS: usize = 20;

/// Body inserted by the tracker migration for comments that had no text.
pub const MIGRATION_ARTIFACT: &str = "[empty comment from monorail migration]";

/// Title fallback bounds for the first line of a comment, inclusive.
const TITLE_MIN_CHARS: usize = 10;
const TITLE_MAX_CHARS: usize = 200;

static BREAK_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(?:p|div|li|h[1-6]|tr|pre|blockquote)\s*>")
        .expect("valid break tag regex")
});

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

/// Strips markup, decodes the standard entities and normalizes whitespace.
///
/// Line breaks survive as single `\n` separators; blank lines are dropped and
/// each line has its inner whitespace collapsed.
#[must_use]
pub fn clean_content(raw: &str) -> String {
    let with_breaks = BREAK_TAG_RE.replace_all(raw, "\n");
    let stripped = TAG_RE.replace_all(&with_breaks, "");
    let decoded = decode_entities(&stripped);

    decoded
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decodes `&lt; &gt; &quot; &#39; &amp;`.
#[must_use]
pub fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Returns true when cleaned content is long enough to be prose.
#[must_use]
pub fn is_substantive(content: &str) -> bool {
    content.chars().count() > MIN_COMMENT_CHARS
}

/// Returns true for the migration placeholder body.
#[must_use]
pub fn is_migration_artifact(content: &str) -> bool {
    content.trim().eq_ignore_ascii_case(MIGRATION_ARTIFACT)
}

/// Derives a title from the first line of cleaned content.
#[must_use]
pub fn title_from_content(content: &str) -> Option<String> {
    let first = content.lines().next()?.trim();
    let len = first.chars().count();
    (TITLE_MIN_CHARS..=TITLE_MAX_CHARS)
        .contains(&len)
        .then(|| first.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_clean_markup() {
        let cleaned = clean_content("<p>Crash  in <b>renderer</b></p><p>Steps:&nbsp;x &amp; y</p>");
        assert_eq!(cleaned, "Crash in renderer\nSteps:&nbsp;x & y");
    }

    #[test]
    fn decodes_ampersand_last() {
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
        assert_eq!(decode_entities("&quot;a&#39;"), "\"a'");
    }

    #[test]
    fn threshold_is_exclusive() {
        assert!(!is_substantive("exactly twenty chars"));
        assert!(is_substantive("exactly twenty chars!"));
    }

    #[test]
    fn detects_migration_artifact() {
        assert!(is_migration_artifact("[Empty comment from Monorail migration]"));
        assert!(is_migration_artifact("  [empty comment from monorail migration] "));
        assert!(!is_migration_artifact(
            "[empty comment from monorail migration] but then real text"
        ));
    }

    #[test]
    fn title_requires_reasonable_first_line() {
        assert_eq!(
            title_from_content("Renderer crash on navigate\nmore detail"),
            Some("Renderer crash on navigate".to_string())
        );
        assert_eq!(title_from_content("short\nsecond line is long enough"), None);
        assert_eq!(title_from_content(&"x".repeat(201)), None);
    }
}
