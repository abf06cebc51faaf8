//! Transcript posts: one paragraph per line, speaker changes marked `Name: text`.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use super::{node_text, Extraction};
use crate::model::{CandidateBlock, Cue, Isolation};
use crate::parser::lexicon::Lexicon;
use crate::parser::text::canonicalize;

static PARA_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());
static PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z][A-Za-z .'-]{0,40}):\s+(.+)$").unwrap());

pub fn extract(markup: &str, lexicon: &Lexicon) -> Extraction {
    let doc = Html::parse_fragment(markup);
    let mut blocks = Vec::new();

    for para in doc.select(&PARA_SEL) {
        let text = canonicalize(&node_text(para));
        if text.is_empty() || lexicon.is_noise_paragraph(&text) {
            continue;
        }

        let (cue, body) = match PREFIX_RE.captures(&text) {
            Some(caps) => (Cue::Prefix { name: Some(caps[1].trim().to_string()) }, caps[2].to_string()),
            // Unprefixed lines continue the default speaker, unless they are too short to be prose.
            None if text.chars().count() >= lexicon.thresholds.min_paragraph_chars => {
                (Cue::Prefix { name: None }, text.clone())
            }
            None => continue,
        };

        blocks.push(CandidateBlock {
            cue,
            body,
            isolation: Isolation::Whole,
        });
    }

    Extraction { dateline: None, blocks }
}
