pub mod adapters;
pub mod aggregate;
pub mod dates;
pub mod lexicon;
pub mod quotes;
pub mod speaker;
pub mod text;

use tracing::debug;

use crate::error::ExtractError;
use crate::model::{Cue, Quote, RawPost, Speaker};
use lexicon::Lexicon;
use speaker::SpeakerResolver;

/// Resolved date and quotes of a single post.
#[derive(Debug)]
pub struct PostQuotes {
    pub date: String,
    pub quotes: Vec<Quote>,
}

/// Adapter → speaker resolution → quote isolation for one post.
///
/// `default_speaker` stands in for cues that resolve to nothing; without it
/// such quotes are credited to `Unknown`, except portrait blocks, which are
/// dropped because their jokes cannot be told apart from page furniture.
pub fn process_post(
    post: &RawPost,
    lexicon: &Lexicon,
    default_speaker: Option<&str>,
) -> Result<PostQuotes, ExtractError> {
    let extraction = adapters::extract(post.source.layout(), &post.content, lexicon)?;
    let raw_date = if post.publish_date.trim().is_empty() {
        extraction.dateline.as_deref().unwrap_or_default()
    } else {
        post.publish_date.as_str()
    };
    let date = dates::resolve(raw_date)?;

    let resolver = SpeakerResolver::new(lexicon);
    let mut quotes = Vec::new();
    for block in &extraction.blocks {
        let speaker = match &block.cue {
            Cue::Portrait { alt, src, .. } => {
                match resolver.resolve(&block.cue).or_else(|| default_speaker.map(str::to_string)) {
                    Some(name) => Speaker::Named(name),
                    None => {
                        debug!(post = post.id, alt = %alt, src = %src, "unresolved portrait, block skipped");
                        continue;
                    }
                }
            }
            cue => resolver.speaker(cue, default_speaker),
        };
        for text in quotes::extract_quotes(&block.body, block.isolation, &lexicon.thresholds) {
            quotes.push(Quote {
                text,
                speaker: speaker.clone(),
                date: date.clone(),
                source: post.source,
            });
        }
    }

    if quotes.is_empty() {
        return Err(ExtractError::NoQuotes);
    }
    Ok(PostQuotes { date, quotes })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Source;
    use aggregate::Aggregator;

    fn post(source: Source, date: &str, content: &str) -> RawPost {
        RawPost {
            id: 1,
            publish_date: date.to_string(),
            title: String::new(),
            link: String::new(),
            content: content.to_string(),
            source,
        }
    }

    #[test]
    fn transcript_prefix_resolves_alias() {
        let p = post(
            Source::Scraps,
            "2021-03-03T00:00:00",
            "<p>Colbert: It’s a great day for democracy, or at least for jokes about it.</p>",
        );
        let out = process_post(&p, &Lexicon::scraps(), Some("Stephen Colbert")).unwrap();
        assert_eq!(out.date, "2021-03-03");
        assert_eq!(out.quotes.len(), 1);
        assert_eq!(out.quotes[0].speaker.as_str(), "Stephen Colbert");
        assert_eq!(out.quotes[0].text, "It's a great day for democracy, or at least for jokes about it.");
    }

    #[test]
    fn mislabeled_seth_portrait() {
        let html = r#"
            <div class="jokesDate">Monday Jan 02 2017</div>
            <div class="jokespage">
              <div class="jokesHeader">
                <img alt="Late Night With Seth Meyers" src="https://www.newsmax.com/img/seth-meyers.jpg">
              </div>
              <p>A joke that Seth told about the holidays being over.</p>
            </div>"#;
        let p = RawPost::page(1756, Source::Newsmax, html.to_string());
        let out = process_post(&p, &Lexicon::newsmax(), None).unwrap();
        assert_eq!(out.date, "2017-01-02");
        assert_eq!(out.quotes[0].speaker.as_str(), "Seth Meyers");
    }

    #[test]
    fn noise_heading_keeps_tracked_speaker() {
        let html = r#"
            <h3>Jimmy Fallon</h3>
            <blockquote>“The first joke about the weekend and the weather.”</blockquote>
            <h3>More News</h3>
            <blockquote>“The second joke still told by the same host tonight.”</blockquote>
        "#;
        let p = post(Source::Latenighter, "2023-05-01T09:00:00", html);
        let out = process_post(&p, &Lexicon::latenighter(), None).unwrap();
        assert_eq!(out.quotes.len(), 2);
        assert!(out.quotes.iter().all(|q| q.speaker.as_str() == "Jimmy Fallon"));
    }

    #[test]
    fn two_posts_same_day_merge() {
        let jon = post(
            Source::Scraps,
            "2016-09-12T10:00:00",
            "<p>Welcome to the show, tonight we have a lot to talk about.</p>",
        );
        let trevor = post(
            Source::Scraps,
            "2016-09-12T22:00:00",
            "<p>Trevor Noah: And here is the news from the other side of the desk.</p>",
        );
        let mut agg = Aggregator::new();
        let a = process_post(&jon, &Lexicon::scraps(), Some("Jon Stewart")).unwrap();
        let b = process_post(&trevor, &Lexicon::scraps(), Some("Daily Show")).unwrap();
        agg.extend(a.quotes);
        agg.extend(b.quotes);
        assert_eq!(agg.records().count(), 1);
        let day = agg.records().find(|r| r.date == "2016-09-12").unwrap();
        let speakers: Vec<_> = day.speakers.keys().map(Speaker::as_str).collect();
        assert_eq!(speakers, vec!["Jon Stewart", "Trevor Noah"]);
    }

    #[test]
    fn unresolved_blockquote_is_unknown() {
        let html = "<blockquote>“A joke with nobody attached to it at all.”</blockquote>";
        let p = post(Source::Latenighter, "2023-05-01", html);
        let out = process_post(&p, &Lexicon::latenighter(), None).unwrap();
        assert_eq!(out.quotes[0].speaker, Speaker::Unknown);
    }

    #[test]
    fn bad_date_skips_post() {
        let p = post(Source::Scraps, "last tuesday", "<p>Jon: A long enough line of dialogue here.</p>");
        let err = process_post(&p, &Lexicon::scraps(), None).unwrap_err();
        assert!(matches!(err, ExtractError::DateParse(_)));
    }

    #[test]
    fn empty_post_has_no_quotes() {
        let p = post(Source::Latenighter, "2023-05-01", "<p>Nothing quoted.</p>");
        let err = process_post(&p, &Lexicon::latenighter(), None).unwrap_err();
        assert!(matches!(err, ExtractError::NoQuotes));
    }

    #[test]
    fn roundup_fixture() {
        let html = std::fs::read_to_string("tests/fixtures/latenighter_roundup.html").unwrap();
        let p = post(Source::Latenighter, "2024-02-06T08:15:00", &html);
        let out = process_post(&p, &Lexicon::latenighter(), None).unwrap();
        let mut agg = Aggregator::new();
        agg.extend(out.quotes);
        let day = agg.records().find(|r| r.date == "2024-02-06").unwrap();
        assert_eq!(day.quotes_for("Stephen Colbert").len(), 2);
        assert_eq!(day.quotes_for("Jimmy Kimmel").len(), 1);
        assert_eq!(day.quotes_for("Seth Meyers").len(), 1);
        assert!(day.quotes_for("Unknown").is_empty());
    }

    #[test]
    fn newsmax_fixture() {
        let html = std::fs::read_to_string("tests/fixtures/newsmax_page.html").unwrap();
        let p = RawPost::page(2001, Source::Newsmax, html);
        let out = process_post(&p, &Lexicon::newsmax(), None).unwrap();
        assert_eq!(out.date, "2017-03-07");
        let mut agg = Aggregator::new();
        agg.extend(out.quotes);
        let day = agg.records().find(|r| r.date == "2017-03-07").unwrap();
        let speakers: Vec<_> = day.speakers.keys().map(Speaker::as_str).collect();
        assert_eq!(speakers, vec!["Jimmy Fallon", "Seth Meyers", "Trevor Noah", "Conan O'Brian"]);
        assert_eq!(day.quotes_for("Jimmy Fallon").len(), 2);
    }
}
