use std::fmt;

use clap::ValueEnum;
use indexmap::IndexMap;

/// Sites the crawler knows how to read. Each one maps to exactly one markup layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Source {
    Newsmax,
    Latenighter,
    Scraps,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    ImageHeader,
    HeadingBlockquote,
    ParagraphPrefix,
}

impl Source {
    pub fn layout(self) -> Layout {
        match self {
            Source::Newsmax => Layout::ImageHeader,
            Source::Latenighter => Layout::HeadingBlockquote,
            Source::Scraps => Layout::ParagraphPrefix,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Source::Newsmax => "newsmax",
            Source::Latenighter => "latenighter",
            Source::Scraps => "scraps",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One post or page as handed over by the fetch side.
#[derive(Debug, Clone)]
pub struct RawPost {
    pub id: i64,
    /// Empty when the date lives inside the markup (Newsmax dateline).
    pub publish_date: String,
    pub title: String,
    pub link: String,
    pub content: String,
    pub source: Source,
}

impl RawPost {
    /// A bare page fetched by numeric id, with no API metadata around it.
    pub fn page(id: i64, source: Source, content: String) -> Self {
        RawPost {
            id,
            publish_date: String::new(),
            title: String::new(),
            link: String::new(),
            content,
            source,
        }
    }
}

/// Speaker context attached to a candidate block, one shape per layout.
#[derive(Debug, Clone, PartialEq)]
pub enum Cue {
    /// Speaker image heading an image-header block.
    Portrait {
        alt: String,
        src: String,
        caption: String,
    },
    /// Quotation block: text after its last closing quote, the heading speaker
    /// tracked so far, and the whole block text.
    Attribution {
        tail: String,
        tracked: Option<String>,
        raw: String,
    },
    /// Running prose containing an inline quotation.
    Prose { text: String },
    /// Transcript paragraph. `None` marks a continuation line.
    Prefix { name: Option<String> },
}

/// How the quote extractor treats a block body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Isolation {
    /// Pull out quoted spans, falling back to the whole body.
    Spans,
    /// The whole body is the quote.
    Whole,
    /// Body is already an isolated quotation.
    Verbatim,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateBlock {
    pub cue: Cue,
    pub body: String,
    pub isolation: Isolation,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Speaker {
    Named(String),
    Unknown,
}

impl Speaker {
    pub fn or_default(name: Option<String>, default: Option<&str>) -> Self {
        match name.or_else(|| default.map(str::to_string)) {
            Some(n) => Speaker::Named(n),
            None => Speaker::Unknown,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Speaker::Named(n) => n,
            Speaker::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub text: String,
    pub speaker: Speaker,
    pub date: String,
    pub source: Source,
}

/// One date's quotes, speakers in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyRecord {
    pub date: String,
    pub speakers: IndexMap<Speaker, Vec<String>>,
}

impl DailyRecord {
    pub fn new(date: impl Into<String>) -> Self {
        DailyRecord {
            date: date.into(),
            speakers: IndexMap::new(),
        }
    }

    pub fn quote_count(&self) -> usize {
        self.speakers.values().map(Vec::len).sum()
    }

    pub fn quotes_for(&self, speaker: &str) -> &[String] {
        self.speakers
            .iter()
            .find(|(s, _)| s.as_str() == speaker)
            .map(|(_, q)| q.as_slice())
            .unwrap_or(&[])
    }

    /// Flatten to (name, monologue) rows in speaker then encounter order.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &str)> {
        self.speakers
            .iter()
            .flat_map(|(s, quotes)| quotes.iter().map(move |q| (s.as_str(), q.as_str())))
    }
}
