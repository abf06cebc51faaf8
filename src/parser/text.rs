use std::sync::LazyLock;

use regex::Regex;

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

const QUOTE_MARKS: &[char] = &['"', '“', '”'];

/// Collapse every whitespace run (newlines, tabs, nbsp) to one space and trim.
pub fn normalize(text: &str) -> String {
    WS_RE.replace_all(text, " ").trim().to_string()
}

/// Missing text normalizes to the empty string.
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}

/// `normalize` plus straight quote marks, so patterns only need to know `"` and `'`.
pub fn canonicalize(text: &str) -> String {
    let straight: String = text
        .chars()
        .map(|c| match c {
            '‘' | '’' | '‛' | '′' => '\'',
            '“' | '”' | '„' | '″' => '"',
            other => other,
        })
        .collect();
    normalize(&straight)
}

/// Remove one pair of surrounding quotation marks, if the text is wrapped in them.
pub fn strip_quote_marks(text: &str) -> String {
    let t = text.trim();
    let mut chars = t.chars();
    match (chars.next(), chars.next_back()) {
        (Some(a), Some(b)) if QUOTE_MARKS.contains(&a) && QUOTE_MARKS.contains(&b) => {
            normalize(chars.as_str())
        }
        _ => t.to_string(),
    }
}

pub fn is_punctuation_only(text: &str) -> bool {
    !text.chars().any(|c| c.is_alphanumeric())
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Title-case one word, treating each apostrophe-separated part as its own word.
pub fn title_case_word(word: &str) -> String {
    word.split('\'')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join("'")
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Insert a space at every lower→upper boundary: "SethMeyers" → "Seth Meyers".
pub fn split_camel_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    let mut prev_lower = false;
    for c in text.chars() {
        if prev_lower && c.is_uppercase() {
            out.push(' ');
        }
        prev_lower = c.is_lowercase();
        out.push(c);
    }
    out
}
