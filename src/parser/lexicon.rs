//! Static per-source tables: aliases, keywords, noise lists and thresholds.
//!
//! Nothing here is mutated at runtime; a `&Lexicon` is handed to the resolver
//! and adapters explicitly.

use crate::model::Source;

/// Word-count window accepted by the generic name-cleaning rule.
#[derive(Debug, Clone, Copy)]
pub struct NameShape {
    pub min_words: usize,
    pub max_words: usize,
}

/// Which inference rules run after alias and keyword lookup.
#[derive(Debug, Clone, Copy)]
pub struct Inference {
    pub connectors: bool,
    pub filenames: bool,
    pub names: Option<NameShape>,
}

/// Newsmax once shipped Seth Meyers portraits whose alt text named the show
/// rather than the host; for exactly this alt the image path is consulted first.
#[derive(Debug, Clone, Copy)]
pub struct MislabeledAltRule {
    pub alt: &'static str,
}

impl MislabeledAltRule {
    pub fn applies(&self, alt: &str) -> bool {
        alt == self.alt
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    /// A paragraph must be at least this long to be considered at all.
    pub min_paragraph_chars: usize,
    pub min_quote_chars: usize,
    pub min_span_words: usize,
    pub min_span_chars: usize,
    pub max_span_chars: usize,
}

#[derive(Debug, Clone)]
pub struct Lexicon {
    pub aliases: &'static [(&'static str, &'static str)],
    pub keywords: &'static [(&'static str, &'static str)],
    pub fixups: &'static [(&'static str, &'static str)],
    pub noise_tokens: &'static [&'static str],
    pub ignored_headings: &'static [&'static str],
    pub heading_noise: &'static [&'static str],
    pub noise_prefixes: &'static [&'static str],
    pub path_prefixes: &'static [&'static str],
    pub path_suffixes: &'static [&'static str],
    pub inference: Inference,
    pub mislabeled_alt: Option<MislabeledAltRule>,
    pub thresholds: Thresholds,
}

const SPAN_WORDS: usize = 5;
const SPAN_MIN: usize = 20;
const SPAN_MAX: usize = 400;

// ── Newsmax ──

const NEWSMAX_KEYWORDS: &[(&str, &str)] = &[
    ("Jay", "Jay Leno"),
    ("Meyers", "Seth Meyers"),
    ("Letterman", "David Letterman"),
    ("Kimmel", "Jimmy Kimmel"),
    ("Conan", "Conan O'Brian"),
    ("Fallon", "Jimmy Fallon"),
    ("Corden", "James Corden"),
    ("Colbert", "Stephen Colbert"),
    ("Ferguson", "Craig Ferguson"),
];

// Stored Newsmax data spells Conan this way; keep it stable.
const NEWSMAX_FIXUPS: &[(&str, &str)] = &[
    ("conan o'brien", "Conan O'Brian"),
    ("conan obrien", "Conan O'Brian"),
];

// ── LateNighter ──

const LATENIGHTER_HOSTS: &[(&str, &str)] = &[
    ("stephen colbert", "Stephen Colbert"),
    ("colbert", "Stephen Colbert"),
    ("jimmy kimmel", "Jimmy Kimmel"),
    ("kimmel", "Jimmy Kimmel"),
    ("seth meyers", "Seth Meyers"),
    ("meyers", "Seth Meyers"),
    ("jimmy fallon", "Jimmy Fallon"),
    ("fallon", "Jimmy Fallon"),
    ("desi lydic", "Desi Lydic"),
    ("lydic", "Desi Lydic"),
    ("jon stewart", "Jon Stewart"),
    ("stewart", "Jon Stewart"),
    ("jordan klepper", "Jordan Klepper"),
    ("klepper", "Jordan Klepper"),
    ("ronny chieng", "Ronny Chieng"),
    ("chieng", "Ronny Chieng"),
    ("michael kosta", "Michael Kosta"),
    ("kosta", "Michael Kosta"),
    ("taylor tomlinson", "Taylor Tomlinson"),
    ("tomlinson", "Taylor Tomlinson"),
];

const LATENIGHTER_IGNORED_HEADINGS: &[&str] = &[
    "Read More About",
    "More News",
    "Cancel reply",
    "Tonight's Lineups",
    "The Latest",
    "LateNighter Podcasts",
];

// ── Scraps from the loft ──

const SCRAPS_ALIASES: &[(&str, &str)] = &[
    ("john", "John Oliver"),
    ("john oliver", "John Oliver"),
    ("jon", "Jon Stewart"),
    ("jon stewart", "Jon Stewart"),
    ("seth", "Seth Meyers"),
    ("seth meyers", "Seth Meyers"),
    ("jimmy", "Jimmy Kimmel"),
    ("jimmy kimmel", "Jimmy Kimmel"),
    ("jimmy fallon", "Jimmy Fallon"),
    ("fallon", "Jimmy Fallon"),
    ("stephen", "Stephen Colbert"),
    ("stephen colbert", "Stephen Colbert"),
    ("colbert", "Stephen Colbert"),
    ("desi", "Desi Lydic"),
    ("desi lydic", "Desi Lydic"),
    ("jordan klepper", "Jordan Klepper"),
    ("michael kosta", "Michael Kosta"),
    ("ronny chieng", "Ronny Chieng"),
    ("conan", "Conan O'Brien"),
    ("conan o'brien", "Conan O'Brien"),
    ("trevor noah", "Trevor Noah"),
];

const SCRAPS_NOISE_PREFIXES: &[&str] = &[
    "aired on ",
    "main segment:",
    "other segments:",
    "the daily show ,",
    "the daily show,",
    "* * *",
];

/// Default speaker and title filter for one scraps tag.
#[derive(Debug, Clone, Copy)]
pub struct TagProfile {
    pub tag: i64,
    pub speaker: &'static str,
    pub title_keywords: &'static [&'static str],
}

pub const SCRAPS_TAGS: &[TagProfile] = &[
    TagProfile { tag: 1578, speaker: "John Oliver", title_keywords: &["last week tonight"] },
    TagProfile { tag: 654, speaker: "Daily Show", title_keywords: &["daily show"] },
    TagProfile {
        tag: 1628,
        speaker: "Seth Meyers",
        title_keywords: &["late night with seth meyers", "a closer look"],
    },
    TagProfile {
        tag: 3325,
        speaker: "Jimmy Kimmel",
        title_keywords: &["jimmy kimmel live", "jimmy kimmel delivers first monologue"],
    },
    TagProfile {
        tag: 4530,
        speaker: "Jimmy Kimmel",
        title_keywords: &["jimmy kimmel live", "jimmy kimmel delivers first monologue"],
    },
    TagProfile {
        tag: 1382,
        speaker: "Jimmy Fallon",
        title_keywords: &["the tonight show starring jimmy fallon"],
    },
    TagProfile {
        tag: 1821,
        speaker: "Stephen Colbert",
        title_keywords: &["the late show with stephen colbert"],
    },
];

impl TagProfile {
    /// Transcript posts only, and when keywords are set the title must carry one.
    pub fn is_relevant(&self, title: &str, link: &str) -> bool {
        let title = title.to_lowercase();
        let link = link.to_lowercase();
        if !title.contains("transcript") && !link.contains("transcript") {
            return false;
        }
        self.title_keywords.is_empty() || self.title_keywords.iter().any(|k| title.contains(k))
    }
}

impl Lexicon {
    pub fn for_source(source: Source) -> Self {
        match source {
            Source::Newsmax => Self::newsmax(),
            Source::Latenighter => Self::latenighter(),
            Source::Scraps => Self::scraps(),
        }
    }

    pub fn newsmax() -> Self {
        Lexicon {
            aliases: &[],
            keywords: NEWSMAX_KEYWORDS,
            fixups: NEWSMAX_FIXUPS,
            noise_tokens: &["newsmax", "jokes", "personalities"],
            ignored_headings: &[],
            heading_noise: &[],
            noise_prefixes: &[],
            path_prefixes: &["newsmax_jokes_personalities_"],
            path_suffixes: &["_jokes", "_joke", "jokes", "joke"],
            inference: Inference {
                connectors: true,
                filenames: true,
                names: Some(NameShape { min_words: 2, max_words: 5 }),
            },
            mislabeled_alt: Some(MislabeledAltRule { alt: "Late Night With Seth Meyers" }),
            thresholds: Thresholds {
                min_paragraph_chars: 11,
                min_quote_chars: 11,
                min_span_words: SPAN_WORDS,
                min_span_chars: SPAN_MIN,
                max_span_chars: SPAN_MAX,
            },
        }
    }

    pub fn latenighter() -> Self {
        Lexicon {
            aliases: LATENIGHTER_HOSTS,
            keywords: LATENIGHTER_HOSTS,
            fixups: &[],
            noise_tokens: &[],
            ignored_headings: LATENIGHTER_IGNORED_HEADINGS,
            heading_noise: &["read more", "more news", "lineups", "latest"],
            noise_prefixes: &[],
            path_prefixes: &[],
            path_suffixes: &[],
            inference: Inference { connectors: false, filenames: false, names: None },
            mislabeled_alt: None,
            thresholds: Thresholds {
                min_paragraph_chars: 30,
                min_quote_chars: 20,
                min_span_words: SPAN_WORDS,
                min_span_chars: SPAN_MIN,
                max_span_chars: SPAN_MAX,
            },
        }
    }

    pub fn scraps() -> Self {
        Lexicon {
            aliases: SCRAPS_ALIASES,
            keywords: &[],
            fixups: &[],
            noise_tokens: &[],
            ignored_headings: &[],
            heading_noise: &[],
            noise_prefixes: SCRAPS_NOISE_PREFIXES,
            path_prefixes: &[],
            path_suffixes: &[],
            inference: Inference {
                connectors: false,
                filenames: false,
                names: Some(NameShape { min_words: 1, max_words: 3 }),
            },
            mislabeled_alt: None,
            thresholds: Thresholds {
                min_paragraph_chars: 40,
                min_quote_chars: 20,
                min_span_words: SPAN_WORDS,
                min_span_chars: SPAN_MIN,
                max_span_chars: SPAN_MAX,
            },
        }
    }

    pub fn is_noise_paragraph(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.noise_prefixes.iter().any(|p| lower.starts_with(p))
    }

    pub fn is_noise_heading(&self, heading: &str) -> bool {
        let lower = heading.to_lowercase();
        self.ignored_headings.iter().any(|h| h.eq_ignore_ascii_case(heading))
            || self.heading_noise.iter().any(|t| lower.contains(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scraps_relevance() {
        let kimmel = SCRAPS_TAGS.iter().find(|p| p.tag == 3325).unwrap();
        assert!(kimmel.is_relevant("Jimmy Kimmel Live – Monologue Transcript", ""));
        assert!(!kimmel.is_relevant("Jimmy Kimmel Live – Monologue", "https://x/monologue"));
        assert!(!kimmel.is_relevant("Late Show Transcript", ""));
    }

    #[test]
    fn noise_headings() {
        let lex = Lexicon::latenighter();
        assert!(lex.is_noise_heading("More News"));
        assert!(lex.is_noise_heading("Tonight's Lineups: Monday"));
        assert!(!lex.is_noise_heading("Stephen Colbert"));
    }

    #[test]
    fn noise_paragraphs() {
        let lex = Lexicon::scraps();
        assert!(lex.is_noise_paragraph("Aired on March 3, 2021"));
        assert!(lex.is_noise_paragraph("* * *"));
        assert!(!lex.is_noise_paragraph("Good evening, everybody."));
    }
}
