//! Keyword specifications and keyword list parsing.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Trailing marker that turns a literal into a prefix match.
pub const WILDCARD_MARKER: char = '*';

/// Delimiter surrounding a raw regular expression.
pub const RAW_DELIMITER: char = '/';

/// A user-authored keyword, classified by its surface syntax.
///
/// Each variant keeps the original (trimmed) text, which is also the key
/// used in match summaries and page records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeywordSpec {
    /// Exact word or phrase, word-boundary delimited (`grøn`)
    Literal(String),

    /// Literal prefix followed by any word characters (`bæredygtig*`)
    Wildcard(String),

    /// Explicit regular expression (`/co2[- ]?neutral/`)
    Raw(String),
}

impl KeywordSpec {
    /// Classify a raw keyword. Returns `None` for blank input, including an
    /// empty `//` expression.
    pub fn parse(raw: &str) -> Option<Self> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }

        let is_raw = text.chars().count() >= 2
            && text.starts_with(RAW_DELIMITER)
            && text.ends_with(RAW_DELIMITER);

        if is_raw {
            let body = &text[1..text.len() - 1];
            (!body.trim().is_empty()).then(|| Self::Raw(text.to_string()))
        } else if text.len() > 1 && text.ends_with(WILDCARD_MARKER) {
            Some(Self::Wildcard(text.to_string()))
        } else {
            Some(Self::Literal(text.to_string()))
        }
    }

    /// Original keyword text.
    pub fn text(&self) -> &str {
        match self {
            Self::Literal(text) | Self::Wildcard(text) | Self::Raw(text) => text,
        }
    }

    /// Build the regular expression source for this keyword.
    pub fn pattern_source(&self) -> String {
        match self {
            Self::Literal(text) => format!(
                "{}{}{}",
                boundary_before(text),
                regex::escape(text),
                boundary_after(text)
            ),
            Self::Wildcard(text) => {
                let base = text.strip_suffix(WILDCARD_MARKER).unwrap_or(text);
                format!(r"{}{}\w*\b", boundary_before(base), regex::escape(base))
            }
            Self::Raw(text) => text[1..text.len() - 1].to_string(),
        }
    }
}

/// `\b` is only meaningful next to a word character; `#grøn` has none in front.
fn boundary_before(text: &str) -> &'static str {
    if text.chars().next().is_some_and(is_word_char) { r"\b" } else { "" }
}

fn boundary_after(text: &str) -> &'static str {
    if text.chars().next_back().is_some_and(is_word_char) { r"\b" } else { "" }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Split a free-text keyword list into individual keywords.
///
/// Entries are separated by newlines, commas or semicolons. A line holding a
/// complete `/…/` expression is kept whole so the expression may itself contain
/// separators. Blank entries are dropped and duplicates keep their first position.
pub fn parse_keyword_list(text: &str) -> Vec<String> {
    let mut entries = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if matches!(KeywordSpec::parse(line), Some(KeywordSpec::Raw(_))) {
            entries.push(line.to_string());
            continue;
        }
        entries.extend(
            line.split([',', ';'])
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        );
    }

    dedup_preserving_order(entries)
}

/// Read a keyword file. Every line is a keyword list entry; lines starting
/// with `#` are keywords too (`#grøn`).
pub fn read_keyword_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(parse_keyword_list(&content))
}

/// Concatenate two keyword lists, dropping later duplicates.
pub fn merge_keyword_lists(primary: &[String], secondary: &[String]) -> Vec<String> {
    dedup_preserving_order(primary.iter().chain(secondary).cloned())
}

fn dedup_preserving_order(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kinds() {
        assert_eq!(
            KeywordSpec::parse("  grøn "),
            Some(KeywordSpec::Literal("grøn".into()))
        );
        assert_eq!(
            KeywordSpec::parse("bæredygtig*"),
            Some(KeywordSpec::Wildcard("bæredygtig*".into()))
        );
        assert_eq!(
            KeywordSpec::parse("/co2[- ]?neutral/"),
            Some(KeywordSpec::Raw("/co2[- ]?neutral/".into()))
        );
        assert_eq!(KeywordSpec::parse("   "), None);
    }

    #[test]
    fn test_empty_raw_expression_is_blank() {
        assert_eq!(KeywordSpec::parse("//"), None);
        assert_eq!(KeywordSpec::parse(" /  / "), None);
        assert!(parse_keyword_list("//\ngrøn").contains(&"grøn".to_string()));
    }

    #[test]
    fn test_lone_markers_are_literals() {
        assert_eq!(KeywordSpec::parse("*"), Some(KeywordSpec::Literal("*".into())));
        assert_eq!(KeywordSpec::parse("/"), Some(KeywordSpec::Literal("/".into())));
    }

    #[test]
    fn test_pattern_source() {
        let wildcard = KeywordSpec::parse("co2-neutral*").unwrap();
        assert_eq!(wildcard.pattern_source(), r"\bco2\-neutral\w*\b");

        let hashtag = KeywordSpec::parse("#grøn").unwrap();
        assert_eq!(hashtag.pattern_source(), r"\#grøn\b");

        let raw = KeywordSpec::parse("/grøn(ne)?/").unwrap();
        assert_eq!(raw.pattern_source(), "grøn(ne)?");
    }

    #[test]
    fn test_parse_keyword_list_separators() {
        let list = parse_keyword_list("grøn, klimavenlig;miljøvenlig\nbæredygtig*\n\n grøn ");
        assert_eq!(list, vec!["grøn", "klimavenlig", "miljøvenlig", "bæredygtig*"]);
    }

    #[test]
    fn test_parse_keyword_list_keeps_raw_line_whole() {
        let list = parse_keyword_list("/co2{1,2}[- ]?neutral/\ngrøn");
        assert_eq!(list, vec!["/co2{1,2}[- ]?neutral/", "grøn"]);
    }

    #[test]
    fn test_keyword_file_keeps_hashtags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keywords.txt");
        fs::write(&path, "#grøn\nbæredygtig*, klimavenlig\n\n/co2[- ]?neutral/\n").unwrap();

        let keywords = read_keyword_file(&path).unwrap();

        assert_eq!(
            keywords,
            vec!["#grøn", "bæredygtig*", "klimavenlig", "/co2[- ]?neutral/"]
        );
        assert!(read_keyword_file(&dir.path().join("missing.txt")).is_err());
    }

    #[test]
    fn test_merge_keyword_lists() {
        let a = vec!["grøn".to_string(), "klimavenlig".to_string()];
        let b = vec!["klimavenlig".to_string(), "co2-neutral".to_string()];
        assert_eq!(
            merge_keyword_lists(&a, &b),
            vec!["grøn", "klimavenlig", "co2-neutral"]
        );
    }
}
