pub mod heading_blockquote;
pub mod image_header;
pub mod paragraph_prefix;

use scraper::ElementRef;

use super::lexicon::Lexicon;
use super::text::normalize;
use crate::error::ExtractError;
use crate::model::{CandidateBlock, Layout};

/// Candidate blocks of one page, plus the date printed in it when the page carries one.
#[derive(Debug, Default)]
pub struct Extraction {
    pub dateline: Option<String>,
    pub blocks: Vec<CandidateBlock>,
}

/// Walk `markup` with the adapter for `layout`.
pub fn extract(layout: Layout, markup: &str, lexicon: &Lexicon) -> Result<Extraction, ExtractError> {
    match layout {
        Layout::ImageHeader => image_header::extract(markup, lexicon),
        Layout::HeadingBlockquote => Ok(heading_blockquote::extract(markup, lexicon)),
        Layout::ParagraphPrefix => Ok(paragraph_prefix::extract(markup, lexicon)),
    }
}

/// All text under `el`, text nodes joined by a space, whitespace collapsed.
pub(crate) fn node_text(el: ElementRef<'_>) -> String {
    normalize(&el.text().collect::<Vec<_>>().join(" "))
}
