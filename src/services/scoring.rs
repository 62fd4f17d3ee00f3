//! Keyword scoring of extracted page text.

use std::cmp::Ordering;

use regex::Match;

use crate::services::PatternSet;

/// Keywords found on a page and how often.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSummary {
    /// Keywords with at least one surviving match, sorted case-insensitively
    pub keywords: Vec<String>,

    /// Surviving match count per keyword, in the same order as `keywords`
    pub counts: Vec<(String, usize)>,

    /// Sum of all surviving matches
    pub total: usize,
}

impl MatchSummary {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Count non-overlapping matches of every pattern in `text`.
///
/// A match is dropped when its matched text is itself matched by any
/// exclusion pattern.
pub fn score(text: &str, patterns: &PatternSet, exclude: Option<&PatternSet>) -> MatchSummary {
    let mut counts: Vec<(String, usize)> = patterns
        .iter()
        .map(|entry| {
            let count = entry
                .regex()
                .find_iter(text)
                .filter(|m| is_hit(m, exclude))
                .count();
            (entry.key().to_string(), count)
        })
        .filter(|(_, count)| *count > 0)
        .collect();

    counts.sort_by(|(a, _), (b, _)| compare_keys(a, b));

    MatchSummary {
        keywords: counts.iter().map(|(key, _)| key.clone()).collect(),
        total: counts.iter().map(|(_, count)| count).sum(),
        counts,
    }
}

/// Whether a match counts as a hit. Zero-width matches never do.
pub(crate) fn is_hit(m: &Match<'_>, exclude: Option<&PatternSet>) -> bool {
    m.start() < m.end() && !is_excluded(m, exclude)
}

/// Whether a single match is suppressed by the exclusion set.
fn is_excluded(m: &Match<'_>, exclude: Option<&PatternSet>) -> bool {
    exclude.is_some_and(|set| set.matches_any(m.as_str()))
}

/// Case-insensitive ordering with a case-sensitive tie-break.
pub(crate) fn compare_keys(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_standalone_word_matches() {
        let patterns = PatternSet::compile(&["grøn"]);
        let summary = score("Et grøn valg. GRØN!", &patterns, None);
        assert_eq!(summary.keywords, vec!["grøn"]);
        assert_eq!(summary.total, 2);
    }

    #[test]
    fn test_literal_inside_longer_word_does_not_match() {
        let patterns = PatternSet::compile(&["grøn"]);
        let summary = score("grønsager og lysegrønne vægge", &patterns, None);
        assert!(summary.keywords.is_empty());
        assert_eq!(summary.total, 0);
    }

    #[test]
    fn test_hashtag_literal_matches() {
        let patterns = PatternSet::compile(&["#grøn"]);
        assert_eq!(score("Følg os på #grøn og #GRØN!", &patterns, None).total, 2);
        assert_eq!(score("#grønne tiltag", &patterns, None).total, 0);
    }

    #[test]
    fn test_wildcard_prefix_semantics() {
        let patterns = PatternSet::compile(&["klima*"]);
        assert_eq!(score("klimavenlige tiltag", &patterns, None).total, 1);
        assert_eq!(score("et godt indeklima", &patterns, None).total, 0);
    }

    #[test]
    fn test_keywords_sorted_case_insensitively() {
        let patterns = PatternSet::compile(&["grøn", "Bæredygtig*", "co2-neutral", "aNsvarlig"]);
        let summary = score(
            "grøn, bæredygtigt, CO2-neutral og ansvarlig",
            &patterns,
            None,
        );
        assert_eq!(
            summary.keywords,
            vec!["aNsvarlig", "Bæredygtig*", "co2-neutral", "grøn"]
        );
        assert_eq!(summary.total, 4);
    }

    #[test]
    fn test_exclusion_drops_only_matching_tokens() {
        let patterns = PatternSet::compile(&["grøn*"]);
        let exclude = PatternSet::compile(&["grønland*"]);
        let summary = score("Grønland er grønt", &patterns, Some(&exclude));
        assert_eq!(summary.total, 1);
        assert_eq!(summary.counts, vec![("grøn*".to_string(), 1)]);
    }

    #[test]
    fn test_exclusion_equal_to_keywords_zeroes_everything() {
        let specs = ["bæredygtig*", "grøn", "/co2[- ]?neutral/", "klimaneutral*"];
        let patterns = PatternSet::compile(&specs);
        let exclude = PatternSet::compile(&specs);
        let text = "Bæredygtige, grøn og CO2 neutral. Klimaneutralt! grøn grøn";
        assert!(score(text, &patterns, None).total > 0);

        let summary = score(text, &patterns, Some(&exclude));
        assert_eq!(summary.total, 0);
        assert!(summary.keywords.is_empty());
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let specs = ["grøn", "bæredygtig*", "klimavenlig"];
        let text = "klimavenlig og grøn og bæredygtig";
        let first = score(text, &PatternSet::compile(&specs), None);
        let second = score(text, &PatternSet::compile(&specs), None);
        assert_eq!(first, second);
        assert_eq!(first.keywords.join(", "), second.keywords.join(", "));
    }

    #[test]
    fn test_zero_width_matches_are_not_hits() {
        let patterns = PatternSet::compile(&["//", "/x*/", "/grøn(ne)?/"]);
        let summary = score("Vi sælger grønne cykler", &patterns, None);
        assert_eq!(summary.keywords, vec!["/grøn(ne)?/"]);
        assert_eq!(summary.total, 1);
    }

    #[test]
    fn test_empty_pattern_set() {
        let summary = score("grøn", &PatternSet::default(), None);
        assert!(summary.is_empty());
    }
}
