//! Round-up posts: host headings (`h2`-`h4`) followed by `blockquote` jokes.
//! Feature-style posts without blockquotes fall back to quotations embedded
//! in paragraph and list text.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::{node_text, Extraction};
use crate::model::{CandidateBlock, Cue, Isolation};
use crate::parser::lexicon::Lexicon;
use crate::parser::quotes::inline_quotes;
use crate::parser::speaker::SpeakerResolver;
use crate::parser::text::canonicalize;

static NODE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2, h3, h4, blockquote").unwrap());
static PROSE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p, li").unwrap());

/// Speaker named by the most recent recognised heading.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum HeadingState {
    #[default]
    NoSpeaker,
    Speaker(String),
}

impl HeadingState {
    /// Headings that do not resolve (noise, section titles) leave the state as is.
    pub fn on_heading(self, heading: &str, resolver: &SpeakerResolver<'_>) -> Self {
        match resolver.track_heading(heading) {
            Some(name) => HeadingState::Speaker(name),
            None => self,
        }
    }

    pub fn speaker(&self) -> Option<&str> {
        match self {
            HeadingState::NoSpeaker => None,
            HeadingState::Speaker(name) => Some(name),
        }
    }
}

pub fn extract(markup: &str, lexicon: &Lexicon) -> Extraction {
    let doc = Html::parse_fragment(markup);
    let resolver = SpeakerResolver::new(lexicon);

    let (_, blocks) = doc.select(&NODE_SEL).fold(
        (HeadingState::default(), Vec::new()),
        |(state, mut blocks), node| {
            if node.value().name() != "blockquote" {
                return (state.on_heading(&node_text(node), &resolver), blocks);
            }
            let raw = canonicalize(&node_text(node));
            if raw.chars().count() >= lexicon.thresholds.min_quote_chars {
                blocks.push(CandidateBlock {
                    cue: Cue::Attribution {
                        tail: trailing_clause(&raw).to_string(),
                        tracked: state.speaker().map(str::to_string),
                        raw: raw.clone(),
                    },
                    body: raw,
                    isolation: Isolation::Spans,
                });
            }
            (state, blocks)
        },
    );

    let blocks = if blocks.is_empty() {
        embedded_quotations(&doc, lexicon)
    } else {
        blocks
    };
    Extraction { dateline: None, blocks }
}

/// Text after the last closing quotation mark, where a credit like
/// "— Stephen Colbert" usually sits. Without any quote mark, the whole text.
fn trailing_clause(raw: &str) -> &str {
    match raw.rfind('"') {
        Some(i) => raw[i + 1..].trim(),
        None => raw,
    }
}

fn embedded_quotations(doc: &Html, lexicon: &Lexicon) -> Vec<CandidateBlock> {
    let mut blocks = Vec::new();
    for node in doc.select(&PROSE_SEL) {
        let text = canonicalize(&node_text(node));
        if text.chars().count() < lexicon.thresholds.min_paragraph_chars {
            continue;
        }
        for quote in inline_quotes(&text, &lexicon.thresholds) {
            blocks.push(CandidateBlock {
                cue: Cue::Prose { text: text.clone() },
                body: quote,
                isolation: Isolation::Verbatim,
            });
        }
    }
    blocks
}
