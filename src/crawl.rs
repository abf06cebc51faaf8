use std::collections::HashSet;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::fetch::{newsmax, wordpress, HttpClient};
use crate::model::{DailyRecord, RawPost, Source};
use crate::output;
use crate::parser::aggregate::Aggregator;
use crate::parser::dates;
use crate::parser::lexicon::{Lexicon, TagProfile, SCRAPS_TAGS};
use crate::parser::process_post;

/// Per-run tallies, printed as the closing summary line.
#[derive(Debug, Default)]
pub struct CrawlCounts {
    pub scanned: usize,
    pub saved: usize,
    pub skipped: usize,
    pub ignored: usize,
    pub missing: usize,
    pub failed: usize,
    pub pruned: usize,
}

impl CrawlCounts {
    pub fn print(&self) {
        println!(
            "Summary: scanned={} saved={} skipped={} ignored={} missing={} failed={} pruned={}",
            self.scanned, self.saved, self.skipped, self.ignored, self.missing, self.failed, self.pruned,
        );
    }

    /// Count one write attempt. True when the date is on disk afterwards.
    fn tally(&mut self, record: &DailyRecord, result: io::Result<Written>) -> bool {
        match result {
            Ok(Written::Saved(path)) => {
                self.saved += 1;
                info!(
                    date = %record.date,
                    speakers = record.speakers.len(),
                    quotes = record.quote_count(),
                    file = %path.display(),
                    "saved"
                );
                true
            }
            Ok(Written::Skipped(path)) => {
                self.skipped += 1;
                info!(date = %record.date, file = %path.display(), "skipped");
                true
            }
            Err(e) => {
                self.failed += 1;
                warn!(date = %record.date, "write failed: {}", e);
                false
            }
        }
    }
}

enum Written {
    Saved(PathBuf),
    Skipped(PathBuf),
}

pub struct OutputPolicy {
    pub dir: PathBuf,
    pub skip_existing: bool,
}

impl OutputPolicy {
    fn write(&self, record: &DailyRecord) -> io::Result<Written> {
        let path = output::day_path(&self.dir, &record.date);
        if self.skip_existing && path.exists() {
            return Ok(Written::Skipped(path));
        }
        output::write_day(&self.dir, record).map(Written::Saved)
    }
}

fn progress_bar(len: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );
    Ok(pb)
}

/* ---------------- Newsmax ---------------- */

pub struct PageRange {
    pub start: i64,
    pub end: i64,
    pub stop_after_miss: usize,
    pub sleep: Duration,
}

/// Last page to visit: explicit, discovered from the archive, or a bounded window.
pub async fn resolve_end_page(
    client: &HttpClient,
    start: i64,
    end: Option<i64>,
    auto_end: bool,
    fallback_window: i64,
) -> i64 {
    let fallback = start + fallback_window;
    match (end, auto_end) {
        (Some(end), _) => end,
        (None, true) => match newsmax::discover_latest_page(client).await {
            Ok(latest) => {
                info!(latest, "discovered latest page");
                latest
            }
            Err(e) => {
                warn!("auto-end discovery failed ({}); falling back to [{}, {}]", e, start, fallback);
                fallback
            }
        },
        (None, false) => {
            info!("no end page given; defaulting to [{}, {}]", start, fallback);
            fallback
        }
    }
}

/// Walk numbered pages, one CSV per page date. Stops early after
/// `stop_after_miss` consecutive pages yield nothing.
pub async fn crawl_newsmax(client: &HttpClient, range: &PageRange, out: &OutputPolicy) -> Result<CrawlCounts> {
    if range.end < range.start {
        bail!("end page {} is before start page {}", range.end, range.start);
    }
    let lexicon = Lexicon::newsmax();
    let pb = progress_bar((range.end - range.start + 1) as u64)?;
    let mut counts = CrawlCounts::default();
    let mut misses = 0usize;

    for page in range.start..=range.end {
        counts.scanned += 1;
        let hit = match newsmax::fetch_page(client, page).await {
            Ok(Some(post)) => save_page(&post, &lexicon, out, &mut counts),
            Ok(None) => false,
            Err(e) => {
                warn!(page, "fetch failed: {}", e);
                false
            }
        };
        pb.inc(1);

        if hit {
            misses = 0;
        } else {
            misses += 1;
            counts.missing += 1;
            info!(page, "missing");
        }
        if misses >= range.stop_after_miss {
            info!("stopping after {} consecutive misses", misses);
            break;
        }
        if !range.sleep.is_zero() {
            tokio::time::sleep(range.sleep).await;
        }
    }

    pb.finish_and_clear();
    Ok(counts)
}

fn save_page(post: &RawPost, lexicon: &Lexicon, out: &OutputPolicy, counts: &mut CrawlCounts) -> bool {
    let extracted = match process_post(post, lexicon, None) {
        Ok(extracted) => extracted,
        Err(e) => {
            info!(page = post.id, reason = %e, "no jokes on page");
            return false;
        }
    };
    let mut day = Aggregator::new();
    day.extend(extracted.quotes);
    day.into_records().fold(true, |ok, record| counts.tally(&record, out.write(&record)) && ok)
}

/* ---------------- WordPress ---------------- */

/// Inclusive publish-date window.
#[derive(Debug, Clone, Copy)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    /// `to` defaults to today (UTC).
    pub fn parse(from: &str, to: Option<&str>) -> Result<Self> {
        let day = |s: &str| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{}'", s))
        };
        let window = DateWindow {
            from: day(from)?,
            to: match to {
                Some(to) => day(to)?,
                None => Utc::now().date_naive(),
            },
        };
        if window.to < window.from {
            bail!("to-date {} is before from-date {}", window.to, window.from);
        }
        Ok(window)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// One tag to page through, with the transcript profile that filters it.
pub struct FeedTag {
    pub id: i64,
    pub profile: Option<&'static TagProfile>,
}

impl FeedTag {
    fn default_speaker(&self) -> Option<&'static str> {
        self.profile.map(|p| p.speaker)
    }

    fn is_relevant(&self, post: &RawPost) -> bool {
        self.profile.map_or(true, |p| p.is_relevant(&post.title, &post.link))
    }
}

pub struct Feed {
    pub api: &'static str,
    pub source: Source,
    pub tags: Vec<FeedTag>,
}

impl Feed {
    pub fn latenighter() -> Self {
        Feed {
            api: wordpress::LATENIGHTER_API,
            source: Source::Latenighter,
            tags: vec![FeedTag { id: wordpress::LATENIGHTER_MONOLOGUE_TAG, profile: None }],
        }
    }

    pub fn scraps() -> Self {
        Feed {
            api: wordpress::SCRAPS_API,
            source: Source::Scraps,
            tags: SCRAPS_TAGS.iter().map(|p| FeedTag { id: p.tag, profile: Some(p) }).collect(),
        }
    }
}

/// Page through every tag of `feed`, merge quotes per date across posts and
/// tags, then write one CSV per date.
pub async fn crawl_wordpress(
    client: &HttpClient,
    feed: &Feed,
    window: &DateWindow,
    out: &OutputPolicy,
    prune_stale: bool,
) -> Result<CrawlCounts> {
    let lexicon = Lexicon::for_source(feed.source);
    let mut aggregator = Aggregator::new();
    let mut counts = CrawlCounts::default();

    let mut complete = true;

    let pb = ProgressBar::new_spinner();
    for tag in &feed.tags {
        let mut page = 1u32;
        loop {
            pb.set_message(format!("{} tag {} page {}", feed.source, tag.id, page));
            let batch = match wordpress::fetch_page(client, feed.api, feed.source, tag.id, page).await {
                Ok(Some(batch)) => batch,
                Ok(None) => break,
                Err(e) => {
                    warn!(tag = tag.id, page, "fetch failed: {}", e);
                    counts.failed += 1;
                    complete = false;
                    break;
                }
            };
            counts.scanned += batch.posts.len();

            let wanted: Vec<&RawPost> = batch
                .posts
                .iter()
                .filter(|post| {
                    let keep = in_scope(post, tag, window);
                    if !keep {
                        counts.ignored += 1;
                    }
                    keep
                })
                .collect();
            let speaker = tag.default_speaker();
            let results: Vec<_> = wanted
                .par_iter()
                .map(|post| (post.id, process_post(post, &lexicon, speaker)))
                .collect();
            for (id, result) in results {
                match result {
                    Ok(extracted) => {
                        aggregator.extend(extracted.quotes);
                    }
                    Err(e) => {
                        counts.ignored += 1;
                        info!(post = id, reason = %e, "ignored");
                    }
                }
            }

            pb.tick();
            if batch.is_last(page) {
                break;
            }
            page += 1;
        }
    }
    pb.finish_and_clear();

    let keep: HashSet<String> = aggregator.records().map(|r| r.date.clone()).collect();
    for record in aggregator.into_records() {
        counts.tally(&record, out.write(&record));
    }

    if prune_stale && !complete {
        warn!("crawl incomplete after {} fetch failure(s); not pruning {}", counts.failed, out.dir.display());
    } else if prune_stale {
        let pruned = output::prune_stale(&out.dir, window.from, window.to, &keep)
            .with_context(|| format!("pruning {}", out.dir.display()))?;
        for path in &pruned {
            info!(file = %path.display(), "pruned");
        }
        counts.pruned = pruned.len();
    }

    Ok(counts)
}

fn in_scope(post: &RawPost, tag: &FeedTag, window: &DateWindow) -> bool {
    match dates::parse_day(&post.publish_date) {
        Ok(day) if window.contains(day) => tag.is_relevant(post),
        Ok(_) => false,
        Err(e) => {
            info!(post = post.id, "ignored: {}", e);
            false
        }
    }
}
