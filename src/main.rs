//! mangasee-dl CLI - downloads manga chapters as CBZ archives.

use anyhow::{Context, Result};
use clap::Parser;
use mangasee_dl::config::Config;
use mangasee_dl::console::Console;
use mangasee_dl::http::{HttpClient, Session};
use mangasee_dl::logger;
use mangasee_dl::{
    Chapter, ChapterLocator, ChapterNumber, FailurePolicy, MangaDownloader, MangaError,
    MetadataLookup,
};
use std::path::PathBuf;

/// Downloads manga chapters as CBZ archives.
#[derive(Parser, Debug)]
#[command(name = "mangasee-dl")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Name of the manga, e.g. "one piece".
    manga: String,

    /// Directory to write archives to (default: config, then current directory).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Start downloading from chapter N (1-based).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    from: Option<u32>,

    /// Stop downloading at chapter N (1-based, inclusive).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    to: Option<u32>,

    /// Download only the chapter with this number, e.g. 4 or 4.5.
    #[arg(long, value_parser = parse_chapter_number, conflicts_with_all = ["from", "to"])]
    chapter: Option<ChapterNumber>,

    /// Chapters downloaded at the same time.
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u32).range(1..))]
    concurrency: Option<u32>,

    /// Images fetched at the same time, per chapter.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    image_concurrency: Option<u32>,

    /// Archive whatever images could be fetched instead of failing the chapter.
    #[arg(long)]
    best_effort: bool,

    /// Only list the chapters.
    #[arg(long)]
    list: bool,

    /// Only show manga information.
    #[arg(long)]
    info: bool,

    /// Use this config file instead of the default location.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// More diagnostic output (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logger::init(args.verbose);
    let console = Console::new();

    console.section("mangasee-dl - Manga Downloader");

    let mut config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;
    apply_overrides(&mut config, &args);
    config.validate().context("Invalid configuration")?;

    let session = Session::open(&config.http).context("Failed to open HTTP session")?;
    run(&args, &config, &console, session.client()).await
}

/// Applies command-line flags on top of the loaded configuration.
fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(output) = &args.output {
        config.download.output_directory = output.clone();
    }
    if let Some(n) = args.concurrency {
        config.download.chapter_concurrency = n as usize;
    }
    if let Some(n) = args.image_concurrency {
        config.download.image_concurrency = n as usize;
    }
    if args.best_effort {
        config.download.failure_policy = FailurePolicy::BestEffort;
    }
}

async fn run(args: &Args, config: &Config, console: &Console, client: &dyn HttpClient) -> Result<()> {
    let locator = ChapterLocator::new(client, config.site.base_url.as_str());

    if args.info {
        return show_info(args, config, console, client, &locator).await;
    }

    console.step(&format!("Fetching chapter list for '{}'...", args.manga));
    let chapters = match locator.locate(&args.manga).await {
        Ok(chapters) => chapters,
        Err(MangaError::MangaNotFound(name)) => {
            console.error(&format!("Manga not found: {}", name));
            return Ok(());
        }
        Err(e) => return Err(e).context("Failed to fetch chapter list"),
    };
    console.success(&format!("Found {} chapters", console.count(chapters.len())));

    if args.list {
        for (idx, chapter) in chapters.iter().enumerate() {
            console.info(&format!(
                "{} {}",
                console.position(idx + 1, chapters.len()),
                chapter.name
            ));
        }
        return Ok(());
    }

    if chapters.is_empty() {
        console.warning("Nothing to download");
        return Ok(());
    }

    let (start, end) = match args.chapter {
        Some(number) => match find_chapter(&chapters, number) {
            Some(position) => (position, position),
            None => {
                console.error(&format!("Chapter not found: {}", number.value()));
                return Ok(());
            }
        },
        None => validate_chapter_range(args.from, args.to, chapters.len(), console)?,
    };
    let selected = &chapters[start - 1..end];
    let destination = &config.download.output_directory;

    console.step(&format!(
        "Downloading {} chapters to {}...",
        console.count(selected.len()),
        console.path(destination)
    ));
    let outcomes = MangaDownloader::from_config(client, &config.download)
        .download_all(selected, destination)
        .await;

    let mut failed = 0;
    for (idx, outcome) in outcomes.iter().enumerate() {
        let position = console.position(start + idx, chapters.len());
        match &outcome.result {
            Ok(path) => console.success(&format!("{} {}", position, console.path(path))),
            Err(e) if e.is_not_found() => {
                failed += 1;
                console.warning(&format!("{} {}", position, e));
            }
            Err(e) => {
                failed += 1;
                console.error(&format!("{} {}: {}", position, outcome.chapter.name, e));
            }
        }
    }

    if failed > 0 {
        console.warning(&format!(
            "{} of {} chapters failed",
            failed,
            outcomes.len()
        ));
    }
    console.section("Done!");
    Ok(())
}

/// Prints manga-level information, enriched with metadata when enabled.
async fn show_info(
    args: &Args,
    config: &Config,
    console: &Console,
    client: &dyn HttpClient,
    locator: &ChapterLocator<'_>,
) -> Result<()> {
    console.step(&format!("Fetching information for '{}'...", args.manga));
    let lookup = MetadataLookup::new(client, config.metadata.api_url.as_str());
    let metadata = config.metadata.enabled.then_some(&lookup);

    let manga = match locator.manga(&args.manga, metadata).await {
        Ok(manga) => manga,
        Err(MangaError::MangaNotFound(name)) => {
            console.error(&format!("Manga not found: {}", name));
            return Ok(());
        }
        Err(e) => return Err(e).context("Failed to fetch manga information"),
    };

    console.success(&manga.title);
    console.info(&format!("Link: {}", manga.link));
    console.info(&format!("Cover: {}", manga.cover));
    console.info(&format!("Chapters: {}", console.count(manga.chapters.len())));
    if let Some(start) = manga.start_date {
        let end = manga
            .end_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "ongoing".to_string());
        console.info(&format!("Published: {} to {}", start, end));
    }
    if let Some(description) = &manga.description {
        console.info(description);
    }
    Ok(())
}

fn parse_chapter_number(value: &str) -> Result<ChapterNumber, String> {
    ChapterNumber::parse(value.trim()).ok_or_else(|| format!("'{}' is not a chapter number", value))
}

/// 1-based position of the chapter numbered `number`.
fn find_chapter(chapters: &[Chapter], number: ChapterNumber) -> Option<usize> {
    chapters
        .iter()
        .position(|chapter| chapter.has_number(number))
        .map(|idx| idx + 1)
}

/// Validates the chapter range arguments against the chapter count.
fn validate_chapter_range(
    start: Option<u32>,
    end: Option<u32>,
    total_chapters: usize,
    console: &Console,
) -> Result<(usize, usize)> {
    let start_chapter = start.map_or(1, |n| n as usize);
    let end_chapter = end.map_or(total_chapters, |n| n as usize);

    if start_chapter > end_chapter {
        anyhow::bail!(
            "Start chapter ({}) cannot be greater than end chapter ({})",
            start_chapter,
            end_chapter
        );
    }

    if end_chapter > total_chapters {
        anyhow::bail!(
            "End chapter ({}) exceeds total chapters ({})",
            end_chapter,
            total_chapters
        );
    }

    console.info(&format!(
        "Processing chapters {} to {} of {}",
        start_chapter, end_chapter, total_chapters
    ));

    Ok((start_chapter, end_chapter))
}
