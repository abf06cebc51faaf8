use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::lexicon::Thresholds;
use super::text::{canonicalize, is_punctuation_only, strip_quote_marks, word_count};
use crate::model::Isolation;

// Bodies are canonicalized first, so only straight double quotes remain.
static SPAN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""([^"]+)""#).unwrap());

/// Isolate the quotations in one block body.
pub fn extract_quotes(body: &str, isolation: Isolation, limits: &Thresholds) -> Vec<String> {
    let text = canonicalize(body);
    if text.is_empty() {
        return Vec::new();
    }
    match isolation {
        Isolation::Spans => {
            let spans = inline_quotes(&text, limits);
            if spans.is_empty() {
                whole(&strip_quote_marks(&text), limits).into_iter().collect()
            } else {
                spans
            }
        }
        Isolation::Whole => whole(&strip_quote_marks(&text), limits).into_iter().collect(),
        Isolation::Verbatim => whole(&text, limits).into_iter().collect(),
    }
}

/// Every quoted span long enough to be a line of its own, in source order,
/// exact duplicates dropped.
pub fn inline_quotes(text: &str, limits: &Thresholds) -> Vec<String> {
    let text = canonicalize(text);
    let mut seen = HashSet::new();
    SPAN_RE
        .captures_iter(&text)
        .map(|c| c[1].trim().to_string())
        .filter(|q| {
            let chars = q.chars().count();
            chars >= limits.min_span_chars
                && chars <= limits.max_span_chars
                && word_count(q) >= limits.min_span_words
                && !is_punctuation_only(q)
        })
        .filter(|q| seen.insert(q.clone()))
        .collect()
}

fn whole(text: &str, limits: &Thresholds) -> Option<String> {
    let long_enough = text.chars().count() >= limits.min_quote_chars;
    (long_enough && !is_punctuation_only(text)).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexicon::Lexicon;

    fn limits() -> Thresholds {
        Lexicon::latenighter().thresholds
    }

    #[test]
    fn two_spans_in_order() {
        let body = "He said “the first thing was really quite funny” and later “a second line that also lands well”.";
        let q = extract_quotes(body, Isolation::Spans, &limits());
        assert_eq!(
            q,
            vec![
                "the first thing was really quite funny".to_string(),
                "a second line that also lands well".to_string(),
            ]
        );
    }

    #[test]
    fn duplicate_spans_suppressed() {
        let body = r#""this is the very same line" and "this is the very same line""#;
        let q = extract_quotes(body, Isolation::Spans, &limits());
        assert_eq!(q, vec!["this is the very same line".to_string()]);
    }

    #[test]
    fn short_spans_fall_back_to_body() {
        let body = r#"She said "no way" and walked out of the room laughing."#;
        let q = extract_quotes(body, Isolation::Spans, &limits());
        assert_eq!(q, vec![body.to_string()]);
    }

    #[test]
    fn spans_respect_thresholds() {
        let body = r#""four words only here" "tiny" "five words but short?""#;
        let l = limits();
        for q in inline_quotes(body, &l) {
            assert!(q.chars().count() >= l.min_span_chars);
            assert!(word_count(&q) >= l.min_span_words);
        }
    }

    #[test]
    fn whole_strips_wrapping_quotes() {
        let q = extract_quotes("“Good evening, welcome to the show tonight.”", Isolation::Whole, &limits());
        assert_eq!(q, vec!["Good evening, welcome to the show tonight.".to_string()]);
    }

    #[test]
    fn short_or_empty_dropped() {
        let l = limits();
        assert!(extract_quotes("", Isolation::Whole, &l).is_empty());
        assert!(extract_quotes("Too short.", Isolation::Whole, &l).is_empty());
        assert!(extract_quotes("... --- ... --- ... --- ...", Isolation::Verbatim, &l).is_empty());
    }
}
