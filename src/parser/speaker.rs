use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use super::lexicon::{Lexicon, NameShape};
use super::text::{canonicalize, normalize, split_camel_case, title_case_word};
use crate::model::{Cue, Speaker};

static CONNECTOR_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\bwith\s+([A-Za-z.'\- ]+)$",
        r"(?i)\bstarring(?:\s+with)?\s+([A-Za-z.'\- ]+)$",
        r"(?i)\bhosted by\s+([A-Za-z.'\- ]+)$",
        r"(?i)\bfeaturing\s+([A-Za-z.'\- ]+)$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});
static IMAGE_EXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(jpg|jpeg|png|gif|webp|svg)\b").unwrap());
static NAME_CHARS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z.' -]").unwrap());
const MAX_HEADING_CHARS: usize = 40;
const MAX_HEADING_WORDS: usize = 5;
const HEADING_PREFIXES: &[&str] = &["The Daily Show's ", "With "];

static KEY_CHARS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z' ]").unwrap());

#[derive(Debug, Clone, Copy)]
enum Signal<'s> {
    Text(&'s str),
    Path(&'s str),
}

impl<'s> Signal<'s> {
    fn raw(&self) -> &'s str {
        match self {
            Signal::Text(s) | Signal::Path(s) => s,
        }
    }
}

/// Turns weak textual cues into a canonical speaker name.
///
/// Rules run in a fixed order and stop at the first hit: alias table, keyword
/// table, connector phrases, image filename, generic name cleaning. Which of
/// the last three are active is up to the lexicon. Every hit goes through the
/// lexicon's fix-up table before it is returned.
pub struct SpeakerResolver<'a> {
    lexicon: &'a Lexicon,
}

impl<'a> SpeakerResolver<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        SpeakerResolver { lexicon }
    }

    pub fn resolve(&self, cue: &Cue) -> Option<String> {
        let name = match cue {
            Cue::Portrait { alt, src, caption } => self.portrait(alt, src, caption),
            Cue::Attribution { tail, tracked, raw } => self
                .chain(&[Signal::Text(tail)])
                .or_else(|| tracked.clone())
                .or_else(|| self.by_keyword(raw)),
            Cue::Prose { text } => self.by_keyword(text),
            Cue::Prefix { name } => name.as_deref().and_then(|n| self.chain(&[Signal::Text(n)])),
        };
        name.map(|n| self.canonical(&n))
    }

    /// Resolve, falling back to `default` and then to `Unknown`.
    pub fn speaker(&self, cue: &Cue, default: Option<&str>) -> Speaker {
        Speaker::or_default(self.resolve(cue), default)
    }

    /// Speaker named by a heading, if any. Noise headings never resolve, and
    /// neither do headline-length ones that merely mention a host.
    pub fn track_heading(&self, heading: &str) -> Option<String> {
        let text = canonicalize(heading);
        let mut text = text.trim_matches(':').trim();
        if text.is_empty() || self.lexicon.is_noise_heading(text) {
            return None;
        }
        for prefix in HEADING_PREFIXES {
            text = strip_prefix_ci(text, prefix).unwrap_or(text).trim();
        }
        let words = text.split_whitespace().count();
        if text.chars().count() > MAX_HEADING_CHARS || !(1..=MAX_HEADING_WORDS).contains(&words) {
            return None;
        }
        self.by_keyword(text).map(|n| self.canonical(&n))
    }

    fn portrait(&self, alt: &str, src: &str, caption: &str) -> Option<String> {
        if let Some(rule) = self.lexicon.mislabeled_alt {
            if rule.applies(alt) {
                if let Some(name) = self.by_keyword(src) {
                    return Some(name);
                }
            }
        }
        self.chain(&[Signal::Text(alt), Signal::Path(src), Signal::Text(caption)])
    }

    fn chain(&self, signals: &[Signal<'_>]) -> Option<String> {
        let inference = self.lexicon.inference;
        let texts = || {
            signals.iter().filter_map(|s| match s {
                Signal::Text(t) if !t.trim().is_empty() => Some(*t),
                _ => None,
            })
        };

        if let Some(name) = texts().find_map(|t| self.by_alias(t)) {
            return Some(name);
        }
        if let Some(name) = signals.iter().find_map(|s| self.by_keyword(s.raw())) {
            return Some(name);
        }
        if inference.connectors {
            if let Some(name) = texts().find_map(|t| self.by_connector(t)) {
                return Some(name);
            }
        }
        if inference.filenames {
            let paths = signals.iter().filter_map(|s| match s {
                Signal::Path(p) if !p.trim().is_empty() => Some(*p),
                _ => None,
            });
            for path in paths {
                if let Some(name) = self.by_filename(path) {
                    return Some(name);
                }
            }
        }
        let shape = inference.names?;
        texts().find_map(|t| self.clean_name(t, shape))
    }

    fn by_alias(&self, text: &str) -> Option<String> {
        let key = alias_key(text);
        self.lexicon
            .aliases
            .iter()
            .find(|(raw, _)| *raw == key)
            .map(|(_, canonical)| canonical.to_string())
    }

    fn by_keyword(&self, text: &str) -> Option<String> {
        if text.is_empty() {
            return None;
        }
        let lower = text.to_lowercase();
        self.lexicon
            .keywords
            .iter()
            .find(|(kw, _)| lower.contains(&kw.to_lowercase()))
            .map(|(_, canonical)| canonical.to_string())
    }

    fn by_connector(&self, text: &str) -> Option<String> {
        let shape = self.lexicon.inference.names?;
        let text = normalize(text);
        CONNECTOR_RES.iter().find_map(|re| {
            let caps = re.captures(&text)?;
            self.clean_name(&caps[1], shape)
        })
    }

    /// Name hidden in an image path, e.g. `.../newsmax_jokes_personalities_SethMeyers.jpg`.
    fn by_filename(&self, src: &str) -> Option<String> {
        let shape = self.lexicon.inference.names?;
        let path = match Url::parse(src) {
            Ok(url) => url.path().to_string(),
            Err(_) => src.split(['?', '#']).next().unwrap_or_default().to_string(),
        };
        let path = urlencoding::decode(&path).map(|p| p.into_owned()).unwrap_or(path);
        let file = path.rsplit('/').next().unwrap_or_default();
        let mut stem = match file.rfind('.') {
            Some(i) if i > 0 => &file[..i],
            _ => file,
        };
        for prefix in self.lexicon.path_prefixes {
            stem = strip_prefix_ci(stem, prefix).unwrap_or(stem);
        }
        if let Some(s) = self.lexicon.path_suffixes.iter().find_map(|sfx| strip_suffix_ci(stem, sfx)) {
            stem = s;
        }
        if stem.is_empty() {
            return None;
        }
        let spaced = split_camel_case(&stem.replace(['_', '-'], " "));
        self.clean_name(&spaced, shape)
    }

    /// Accept free text as a name only if it looks like one: no URL, file
    /// extension, digit or noise token, and a word count inside `shape`.
    fn clean_name(&self, value: &str, shape: NameShape) -> Option<String> {
        let raw = normalize(value);
        if raw.is_empty() || raw.contains("://") || raw.starts_with('/') {
            return None;
        }
        if IMAGE_EXT_RE.is_match(&raw) || raw.chars().any(|c| c.is_ascii_digit()) {
            return None;
        }
        let text = normalize(&NAME_CHARS_RE.replace_all(&raw, " "));
        let lower = text.to_lowercase();
        if text.is_empty() || self.lexicon.noise_tokens.iter().any(|t| lower.contains(t)) {
            return None;
        }

        let words: Vec<String> = text
            .split_whitespace()
            .map(|w| w.trim_matches(['.', '\'', '-']))
            .filter(|w| !w.is_empty())
            .map(title_case_word)
            .collect();
        if words.len() < shape.min_words || words.len() > shape.max_words {
            return None;
        }
        let cleaned = words.join(" ");
        (cleaned.chars().count() >= 3).then_some(cleaned)
    }

    fn canonical(&self, name: &str) -> String {
        let key = normalize(name).to_lowercase();
        self.lexicon
            .fixups
            .iter()
            .find(|(raw, _)| *raw == key)
            .map(|(_, canonical)| canonical.to_string())
            .unwrap_or_else(|| name.to_string())
    }
}

/// Lower-case, drop everything but letters, apostrophes and spaces, collapse.
fn alias_key(text: &str) -> String {
    let lower = canonicalize(text).to_lowercase();
    normalize(&KEY_CHARS_RE.replace_all(&lower, ""))
}

fn strip_prefix_ci<'s>(s: &'s str, prefix: &str) -> Option<&'s str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

fn strip_suffix_ci<'s>(s: &'s str, suffix: &str) -> Option<&'s str> {
    let cut = s.len().checked_sub(suffix.len())?;
    let tail = s.get(cut..)?;
    tail.eq_ignore_ascii_case(suffix).then(|| &s[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn portrait(alt: &str, src: &str) -> Cue {
        Cue::Portrait { alt: alt.into(), src: src.into(), caption: String::new() }
    }

    #[test]
    fn alias_tables_round_trip() {
        for lexicon in [Lexicon::scraps(), Lexicon::latenighter()] {
            let r = SpeakerResolver::new(&lexicon);
            for (raw, canonical) in lexicon.aliases {
                let cue = Cue::Prefix { name: Some(raw.to_string()) };
                assert_eq!(r.resolve(&cue).as_deref(), Some(*canonical), "{}", raw);
            }
        }
    }

    #[test]
    fn alias_key_strips_punctuation() {
        assert_eq!(alias_key("  Stephen   COLBERT!! "), "stephen colbert");
        assert_eq!(alias_key("Conan O’Brien"), "conan o'brien");
    }

    #[test]
    fn keyword_table_order_wins() {
        let lex = Lexicon::newsmax();
        let r = SpeakerResolver::new(&lex);
        // "Jay" is listed before "Kimmel"
        assert_eq!(r.resolve(&portrait("Jay and Kimmel", "")).as_deref(), Some("Jay Leno"));
    }

    #[test]
    fn mislabeled_alt_prefers_image_path() {
        let lex = Lexicon::newsmax();
        let r = SpeakerResolver::new(&lex);
        let cue = portrait("Late Night With Seth Meyers", "https://x.com/img/seth-meyers.jpg");
        assert_eq!(r.resolve(&cue).as_deref(), Some("Seth Meyers"));
    }

    #[test]
    fn connector_phrase_names() {
        let lex = Lexicon::newsmax();
        let r = SpeakerResolver::new(&lex);
        let cue = portrait("The Tonight Show Starring Trevor Noah", "");
        assert_eq!(r.resolve(&cue).as_deref(), Some("Trevor Noah"));
        let cue = portrait("Late Show hosted by John Oliver", "");
        assert_eq!(r.resolve(&cue).as_deref(), Some("John Oliver"));
    }

    #[test]
    fn filename_names() {
        let lex = Lexicon::newsmax();
        let r = SpeakerResolver::new(&lex);
        let cue = portrait("", "https://www.newsmax.com/CMSPages/newsmax_jokes_personalities_TrevorNoah.jpg?w=90");
        assert_eq!(r.resolve(&cue).as_deref(), Some("Trevor Noah"));
        let cue = portrait("", "/images/john_oliver_jokes.png");
        assert_eq!(r.resolve(&cue).as_deref(), Some("John Oliver"));
        let cue = portrait("", "/images/Bill%20Maher.png");
        assert_eq!(r.resolve(&cue).as_deref(), Some("Bill Maher"));
    }

    #[test]
    fn generic_rule_rejects_noise() {
        let lex = Lexicon::newsmax();
        let r = SpeakerResolver::new(&lex);
        assert_eq!(r.resolve(&portrait("Newsmax Jokes", "")), None);
        assert_eq!(r.resolve(&portrait("Top 10 Jokes", "")), None);
        assert_eq!(r.resolve(&portrait("logo.png", "")), None);
        assert_eq!(r.resolve(&portrait("Bill", "")), None);
        assert_eq!(r.resolve(&portrait("one two three four five six", "")), None);
        assert_eq!(r.resolve(&portrait("bill o'reilly", "")).as_deref(), Some("Bill O'Reilly"));
    }

    #[test]
    fn fixups_apply_last() {
        let lex = Lexicon::newsmax();
        let r = SpeakerResolver::new(&lex);
        assert_eq!(r.resolve(&portrait("Conan O'Brien", "")).as_deref(), Some("Conan O'Brian"));
    }

    #[test]
    fn attribution_order() {
        let lex = Lexicon::latenighter();
        let r = SpeakerResolver::new(&lex);
        let cue = Cue::Attribution {
            tail: "— Jimmy Fallon".into(),
            tracked: Some("Seth Meyers".into()),
            raw: "\"Joke about Kimmel.\" — Jimmy Fallon".into(),
        };
        assert_eq!(r.resolve(&cue).as_deref(), Some("Jimmy Fallon"));
        let cue = Cue::Attribution {
            tail: String::new(),
            tracked: Some("Seth Meyers".into()),
            raw: "\"Joke about Kimmel.\"".into(),
        };
        assert_eq!(r.resolve(&cue).as_deref(), Some("Seth Meyers"));
        let cue = Cue::Attribution { tail: String::new(), tracked: None, raw: "\"Joke about Kimmel.\"".into() };
        assert_eq!(r.resolve(&cue).as_deref(), Some("Jimmy Kimmel"));
    }

    #[test]
    fn attribution_never_invents_names() {
        let lex = Lexicon::latenighter();
        let r = SpeakerResolver::new(&lex);
        let cue = Cue::Attribution { tail: "said the host on Monday".into(), tracked: None, raw: String::new() };
        assert_eq!(r.speaker(&cue, None), Speaker::Unknown);
    }

    #[test]
    fn prefix_falls_back_to_default() {
        let lex = Lexicon::scraps();
        let r = SpeakerResolver::new(&lex);
        assert_eq!(r.speaker(&Cue::Prefix { name: None }, Some("John Oliver")).as_str(), "John Oliver");
        assert_eq!(
            r.speaker(&Cue::Prefix { name: Some("Guest 2".into()) }, Some("John Oliver")).as_str(),
            "John Oliver"
        );
        assert_eq!(r.speaker(&Cue::Prefix { name: Some("audience".into()) }, None).as_str(), "Audience");
    }

    #[test]
    fn headings() {
        let lex = Lexicon::latenighter();
        let r = SpeakerResolver::new(&lex);
        assert_eq!(r.track_heading("The Daily Show’s Desi Lydic:").as_deref(), Some("Desi Lydic"));
        assert_eq!(r.track_heading("More News"), None);
        assert_eq!(r.track_heading("Monday's Monologues"), None);
        assert_eq!(r.track_heading("With Jimmy Fallon").as_deref(), Some("Jimmy Fallon"));
        assert_eq!(r.track_heading("THE DAILY SHOW'S Jordan Klepper").as_deref(), Some("Jordan Klepper"));
    }

    #[test]
    fn headline_mentioning_host_is_not_a_speaker() {
        let lex = Lexicon::latenighter();
        let r = SpeakerResolver::new(&lex);
        assert_eq!(
            r.track_heading("Why Jimmy Kimmel's Absence Changed Everything About Late Night This Week"),
            None
        );
        assert_eq!(r.track_heading("Seth Meyers Explains The Whole Week"), None);
        assert_eq!(r.track_heading("Seth Meyers: A Closer Look").as_deref(), Some("Seth Meyers"));
    }

    #[test]
    fn mislabeled_alt_reads_path_before_alt_keywords() {
        let lex = Lexicon::newsmax();
        let r = SpeakerResolver::new(&lex);
        // the alt alone would resolve to Seth Meyers by keyword
        let cue = portrait("Late Night With Seth Meyers", "/img/kimmel.jpg");
        assert_eq!(r.resolve(&cue).as_deref(), Some("Jimmy Kimmel"));
        // any other alt still wins over the path
        let cue = portrait("Jimmy Fallon", "/img/kimmel.jpg");
        assert_eq!(r.resolve(&cue).as_deref(), Some("Jimmy Fallon"));
    }
}
