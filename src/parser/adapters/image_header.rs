//! Static listing pages where each comedian's jokes follow a header holding
//! their portrait (`div.jokesHeader > img`).

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::{node_text, Extraction};
use crate::error::ExtractError;
use crate::model::{CandidateBlock, Cue, Isolation};
use crate::parser::lexicon::Lexicon;
use crate::parser::text::normalize_opt;

static PAGE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.jokespage").unwrap());
static DATE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.jokesDate").unwrap());
static HEADER_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.jokesHeader").unwrap());
static IMG_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());

const HEADER_CLASS: &str = "jokesHeader";

pub fn extract(markup: &str, lexicon: &Lexicon) -> Result<Extraction, ExtractError> {
    let doc = Html::parse_document(markup);
    let page = doc
        .select(&PAGE_SEL)
        .next()
        .ok_or(ExtractError::Structural { missing: "div.jokespage" })?;
    let dateline = doc.select(&DATE_SEL).next().map(node_text).filter(|d| !d.is_empty());

    let mut blocks = Vec::new();
    for header in page.select(&HEADER_SEL) {
        let img = header.select(&IMG_SEL).next();
        let attr = |name: &str| normalize_opt(img.and_then(|i| i.value().attr(name)));
        let cue = Cue::Portrait {
            alt: attr("alt"),
            src: attr("src"),
            caption: node_text(header),
        };

        for body in jokes_after(header) {
            if body.chars().count() < lexicon.thresholds.min_paragraph_chars {
                continue;
            }
            blocks.push(CandidateBlock {
                cue: cue.clone(),
                body,
                isolation: Isolation::Whole,
            });
        }
    }

    Ok(Extraction { dateline, blocks })
}

/// Paragraph siblings following `header`, up to the next header.
fn jokes_after(header: ElementRef<'_>) -> Vec<String> {
    header
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .take_while(|el| !is_header(el))
        .filter(|el| el.value().name() == "p")
        .map(node_text)
        .collect()
}

fn is_header(el: &ElementRef<'_>) -> bool {
    el.value().name() == "div" && el.value().classes().any(|c| c == HEADER_CLASS)
}
