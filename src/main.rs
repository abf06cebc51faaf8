mod crawl;
mod db;
mod error;
mod fetch;
mod model;
mod output;
mod parser;
mod settings;

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use crawl::{DateWindow, Feed, OutputPolicy, PageRange};
use fetch::HttpClient;
use model::{RawPost, Source};
use parser::aggregate::Aggregator;
use parser::lexicon::Lexicon;
use settings::Settings;

#[derive(Parser)]
#[command(name = "monologue_scraper", about = "Late-night monologue quote scraper")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl a site and write one CSV per date
    Crawl {
        #[command(subcommand)]
        site: Site,
    },
    /// Run the extractor on a saved HTML file and print the rows
    Extract {
        #[arg(short, long, value_enum)]
        source: Source,
        #[arg(short, long)]
        file: PathBuf,
        /// Publish date, for layouts that carry no dateline
        #[arg(short, long)]
        date: Option<String>,
        /// Speaker credited when a block names nobody
        #[arg(long)]
        default_speaker: Option<String>,
    },
    /// Load dated CSV files into the SQLite store
    Import {
        #[arg(short, long)]
        dir: PathBuf,
        #[arg(short, long, value_enum)]
        source: Source,
    },
    /// Show row counts per source
    Stats,
}

#[derive(Subcommand)]
enum Site {
    /// Numbered joke pages
    Newsmax(NewsmaxArgs),
    /// Monologue round-up posts
    Latenighter {
        #[arg(long, default_value = "2018-09-29")]
        from_date: String,
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Show transcripts
    Scraps {
        #[arg(long, default_value = "2017-01-01")]
        from_date: String,
        #[command(flatten)]
        window: WindowArgs,
        /// Delete CSVs inside the date window that this run did not produce
        #[arg(long)]
        prune_stale: bool,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Defaults to <output_root>/<source>
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Rewrite dates that already have a CSV
    #[arg(long)]
    overwrite_existing: bool,
}

impl OutputArgs {
    fn policy(self, settings: &Settings, source: Source) -> OutputPolicy {
        OutputPolicy {
            dir: self.output_dir.unwrap_or_else(|| settings.source_dir(source)),
            skip_existing: !self.overwrite_existing,
        }
    }
}

#[derive(Args)]
struct WindowArgs {
    /// Defaults to today (UTC)
    #[arg(long)]
    to_date: Option<String>,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct NewsmaxArgs {
    #[arg(long, default_value = "1756")]
    start_page: i64,
    #[arg(long)]
    end_page: Option<i64>,
    /// Read the latest page id from the archive when --end-page is omitted
    #[arg(long)]
    auto_end: bool,
    /// Pages past --start-page to visit when no end page is known
    #[arg(long, default_value = "1000")]
    fallback_window: i64,
    /// Stop after this many consecutive missing pages
    #[arg(long, default_value = "50")]
    stop_after_miss: usize,
    /// Seconds to pause between pages
    #[arg(long, default_value = "0.1")]
    sleep: f64,
    #[command(flatten)]
    output: OutputArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load()?;

    let result = match cli.command {
        Commands::Crawl { site } => {
            let client = HttpClient::new(&settings)?;
            let counts = match site {
                Site::Newsmax(args) => {
                    let end = crawl::resolve_end_page(
                        &client,
                        args.start_page,
                        args.end_page,
                        args.auto_end,
                        args.fallback_window,
                    )
                    .await;
                    let range = PageRange {
                        start: args.start_page,
                        end,
                        stop_after_miss: args.stop_after_miss,
                        sleep: Duration::from_secs_f64(args.sleep.max(0.0)),
                    };
                    let out = args.output.policy(&settings, Source::Newsmax);
                    println!("Crawling Newsmax pages {}..={} into {}", range.start, range.end, out.dir.display());
                    crawl::crawl_newsmax(&client, &range, &out).await?
                }
                Site::Latenighter { from_date, window } => {
                    let dates = DateWindow::parse(&from_date, window.to_date.as_deref())?;
                    let out = window.output.policy(&settings, Source::Latenighter);
                    println!("Crawling LateNighter {}..={} into {}", dates.from, dates.to, out.dir.display());
                    crawl::crawl_wordpress(&client, &Feed::latenighter(), &dates, &out, false).await?
                }
                Site::Scraps { from_date, window, prune_stale } => {
                    let dates = DateWindow::parse(&from_date, window.to_date.as_deref())?;
                    let out = window.output.policy(&settings, Source::Scraps);
                    println!("Crawling Scraps {}..={} into {}", dates.from, dates.to, out.dir.display());
                    crawl::crawl_wordpress(&client, &Feed::scraps(), &dates, &out, prune_stale).await?
                }
            };
            counts.print();
            Ok(())
        }
        Commands::Extract { source, file, date, default_speaker } => {
            let html = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let mut post = RawPost::page(0, source, html);
            post.publish_date = date.unwrap_or_default();

            let extracted = parser::process_post(&post, &Lexicon::for_source(source), default_speaker.as_deref())?;
            let mut aggregator = Aggregator::new();
            aggregator.extend(extracted.quotes);

            let mut stdout = io::stdout().lock();
            for record in aggregator.into_records() {
                writeln!(stdout, "# {} ({} quotes)", record.date, record.quote_count())?;
                output::write_row(&mut stdout, &output::HEADER)?;
                for (name, monologue) in record.rows() {
                    output::write_row(&mut stdout, &[name, monologue])?;
                }
            }
            Ok(())
        }
        Commands::Import { dir, source } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            println!("Importing {} CSVs from {} into {}", source, dir.display(), settings.db_path.display());
            let stats = db::import_csv_dir(&conn, &dir, source)?;
            println!(
                "Summary: files={} inserted={} duplicates={}",
                stats.files, stats.inserted, stats.duplicates
            );
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let rows = db::get_stats(&conn)?;
            if rows.is_empty() {
                println!("No monologues stored. Run 'import' first.");
                return Ok(());
            }
            println!("{:<12} | {:>8} | {:>6} | {:<10} | {:<10}", "Source", "Rows", "Days", "First", "Last");
            println!("{}", "-".repeat(58));
            for r in &rows {
                println!(
                    "{:<12} | {:>8} | {:>6} | {:<10} | {:<10}",
                    r.source, r.rows, r.days, r.first, r.last
                );
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
