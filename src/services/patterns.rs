//! Keyword pattern compilation.
//!
//! Turns keyword specifications into case-insensitive regular expressions,
//! keyed by the original keyword text.

use std::collections::HashSet;

use regex::{Regex, RegexBuilder};

use crate::error::{AppError, Result};
use crate::models::KeywordSpec;

/// A keyword specification with its compiled expression.
#[derive(Debug, Clone)]
pub struct CompiledKeyword {
    spec: KeywordSpec,
    regex: Regex,
}

impl CompiledKeyword {
    /// Compile a single specification.
    pub fn compile(spec: KeywordSpec) -> Result<Self> {
        let regex = RegexBuilder::new(&spec.pattern_source())
            .case_insensitive(true)
            .build()
            .map_err(|e| AppError::pattern(spec.text(), e))?;
        Ok(Self { spec, regex })
    }

    /// Original keyword text, used as the key in results.
    pub fn key(&self) -> &str {
        self.spec.text()
    }

    pub fn spec(&self) -> &KeywordSpec {
        &self.spec
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// Compiled keyword set, built once per crawl or scan and reused for every page.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    entries: Vec<CompiledKeyword>,
}

impl PatternSet {
    /// Compile specifications, skipping (and logging) any that fail.
    pub fn compile<S: AsRef<str>>(specs: &[S]) -> Self {
        let (set, errors) = Self::compile_with_errors(specs);
        for error in errors {
            log::warn!("Skipping keyword: {}", error);
        }
        set
    }

    /// Compile specifications independently, returning every failure alongside
    /// the patterns that did compile.
    pub fn compile_with_errors<S: AsRef<str>>(specs: &[S]) -> (Self, Vec<AppError>) {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        let mut errors = Vec::new();

        for spec in specs.iter().filter_map(|s| KeywordSpec::parse(s.as_ref())) {
            if !seen.insert(spec.text().to_string()) {
                continue;
            }
            match CompiledKeyword::compile(spec) {
                Ok(entry) => entries.push(entry),
                Err(e) => errors.push(e),
            }
        }

        (Self { entries }, errors)
    }

    /// Compile specifications, failing on the first malformed one.
    pub fn try_compile<S: AsRef<str>>(specs: &[S]) -> Result<Self> {
        let (set, mut errors) = Self::compile_with_errors(specs);
        if errors.is_empty() {
            Ok(set)
        } else {
            Err(errors.remove(0))
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledKeyword> {
        self.entries.iter()
    }

    /// Keyword keys in compilation order.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(CompiledKeyword::key).collect()
    }

    /// Whether any pattern matches somewhere in `text`.
    pub fn matches_any(&self, text: &str) -> bool {
        self.entries.iter().any(|entry| entry.regex.is_match(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_respects_word_boundaries() {
        let set = PatternSet::compile(&["grøn"]);
        let regex = set.iter().next().unwrap().regex();
        assert!(regex.is_match("en GRØN løsning"));
        assert!(!regex.is_match("grønsager"));
        assert!(!regex.is_match("lysegrøn"));
    }

    #[test]
    fn test_wildcard_matches_prefix_only() {
        let set = PatternSet::compile(&["bæredygtig*"]);
        let regex = set.iter().next().unwrap().regex();
        assert!(regex.is_match("Bæredygtige løsninger"));
        assert!(regex.is_match("bæredygtig"));
        assert!(!regex.is_match("ubæredygtig"));
    }

    #[test]
    fn test_raw_pattern_is_case_insensitive() {
        let set = PatternSet::compile(&["/co2[- ]?neutral/"]);
        let regex = set.iter().next().unwrap().regex();
        assert!(regex.is_match("CO2 neutral"));
        assert!(regex.is_match("co2-Neutral"));
    }

    #[test]
    fn test_literal_escapes_metacharacters() {
        let set = PatternSet::compile(&["co2.neutral"]);
        let regex = set.iter().next().unwrap().regex();
        assert!(regex.is_match("co2.neutral"));
        assert!(!regex.is_match("co2xneutral"));
    }

    #[test]
    fn test_malformed_raw_pattern_does_not_block_others() {
        let (set, errors) = PatternSet::compile_with_errors(&["grøn", "/co2(/", "klima*"]);
        assert_eq!(set.keys(), vec!["grøn", "klima*"]);
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], AppError::Pattern { spec, .. } if spec == "/co2(/"));
    }

    #[test]
    fn test_try_compile_reports_failure() {
        assert!(PatternSet::try_compile(&["/[/"]).is_err());
        assert!(PatternSet::try_compile(&["grøn"]).is_ok());
    }

    #[test]
    fn test_blank_and_duplicate_specs_are_dropped() {
        let set = PatternSet::compile(&["", "  ", "grøn", "grøn", " grøn "]);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_equivalent_specs_stay_distinct() {
        let set = PatternSet::compile(&["grøn", "/grøn/"]);
        assert_eq!(set.keys(), vec!["grøn", "/grøn/"]);
    }
}
