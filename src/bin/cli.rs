//! greenscan CLI
//!
//! Crawl company websites and flag sustainability claims for review.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use greenscan::{
    error::{AppError, Result},
    models::{Config, merge_keyword_lists, parse_keyword_list, read_keyword_file},
    pipeline::{self, InspectRequest},
    services::{HttpFetcher, PatternSet, SiteCrawler},
    storage::{CsvSink, PageStore, RecordSink},
    utils::fs::read_lines,
};

/// greenscan - Greenwashing Website Scanner
#[derive(Parser, Debug)]
#[command(
    name = "greenscan",
    version,
    about = "Crawl websites and flag sustainability claims"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "greenscan.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Command,
}

/// Flags that take precedence over the configuration file.
#[derive(Args, Debug)]
struct Overrides {
    /// Maximum number of distinct pages per crawl
    #[arg(long, global = true)]
    max_pages: Option<usize>,

    /// Maximum link depth from the seed
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// Delay between requests in milliseconds
    #[arg(long, global = true)]
    delay_ms: Option<u64>,

    /// Keywords, separated by comma, semicolon or newline
    #[arg(long, global = true)]
    keywords: Option<String>,

    /// File with one keyword per line
    #[arg(long, global = true)]
    keywords_file: Option<PathBuf>,

    /// Exclusion patterns, separated by comma, semicolon or newline
    #[arg(long, global = true)]
    exclude: Option<String>,

    /// Honour robots.txt of the crawled site
    #[arg(long, global = true)]
    respect_robots: bool,
}

/// Where scored records go.
#[derive(Args, Debug)]
struct Output {
    /// CSV export path
    #[arg(long, default_value = "results.csv")]
    csv: PathBuf,

    /// JSON page store to update
    #[arg(long)]
    store: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a site breadth-first from a seed URL
    Crawl {
        /// Seed URL or bare domain
        seed: String,

        #[command(flatten)]
        output: Output,
    },

    /// Score an explicit list of URLs without following links
    Scan {
        /// URLs to score
        urls: Vec<String>,

        /// File with one URL per line
        #[arg(long)]
        urls_file: Option<PathBuf>,

        /// Bypass intermediate caches
        #[arg(long)]
        fresh: bool,

        #[command(flatten)]
        output: Output,
    },

    /// Show keyword matches on one page in context
    Snippets {
        /// Page URL
        url: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration and keywords
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Apply command-line overrides on top of the file configuration.
fn apply_overrides(config: &mut Config, overrides: &Overrides) -> Result<()> {
    if let Some(max_pages) = overrides.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(max_depth) = overrides.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if let Some(delay_ms) = overrides.delay_ms {
        config.crawler.delay_ms = delay_ms;
    }
    if overrides.respect_robots {
        config.crawler.respect_robots = true;
    }

    let from_flag = overrides
        .keywords
        .as_deref()
        .map(parse_keyword_list)
        .unwrap_or_default();
    let from_file = match &overrides.keywords_file {
        Some(path) => read_keyword_file(path)?,
        None => Vec::new(),
    };
    if !from_flag.is_empty() || !from_file.is_empty() {
        config.matcher.keywords = merge_keyword_lists(&from_flag, &from_file);
    }

    if let Some(exclude) = overrides.exclude.as_deref() {
        config.matcher.exclude = parse_keyword_list(exclude);
    }

    Ok(())
}

/// Build the crawler for a validated configuration.
fn build_crawler(config: &Config) -> Result<SiteCrawler> {
    let fetcher = HttpFetcher::from_config(&config.crawler)?;
    let patterns = PatternSet::compile(&config.matcher.keywords);
    let exclude = PatternSet::compile(&config.matcher.exclude);

    Ok(SiteCrawler::new(fetcher, patterns, config.crawl_options())
        .with_exclusions(exclude)
        .with_user_agent(config.crawler.user_agent.clone()))
}

/// Open every requested sink.
fn open_sinks(output: &Output) -> Result<Vec<Box<dyn RecordSink>>> {
    let mut sinks: Vec<Box<dyn RecordSink>> = vec![Box::new(CsvSink::create(&output.csv)?)];
    log::info!("Writing CSV to {}", output.csv.display());

    if let Some(path) = &output.store {
        let store = PageStore::open(path)?;
        log::info!(
            "Updating page store {} ({} pages)",
            path.display(),
            store.len()
        );
        sinks.push(Box::new(store));
    }

    Ok(sinks)
}

fn collect_urls(urls: Vec<String>, urls_file: Option<&Path>) -> Result<Vec<String>> {
    let mut all = urls;
    if let Some(path) = urls_file {
        all.extend(read_lines(path)?);
    }
    Ok(all)
}

/// Main entry point for the CLI application.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);
    apply_overrides(&mut config, &cli.overrides)?;

    match cli.command {
        Command::Validate => {
            pipeline::run_validate(&config)?;
        }

        Command::Crawl { seed, output } => {
            config.validate()?;
            let crawler = build_crawler(&config)?;
            let mut sinks = open_sinks(&output)?;
            pipeline::run_crawl(
                &crawler,
                &seed,
                &mut sinks,
                config.output.checkpoint_every,
            )?;
        }

        Command::Scan {
            urls,
            urls_file,
            fresh,
            output,
        } => {
            config.validate()?;
            let urls = collect_urls(urls, urls_file.as_deref())?;
            if urls.is_empty() {
                return Err(AppError::validation(
                    "No URLs given. Pass URLs or --urls-file.",
                ));
            }

            let crawler = build_crawler(&config)?;
            let mut sinks = open_sinks(&output)?;
            pipeline::run_scan(
                &crawler,
                &urls,
                fresh,
                &mut sinks,
                config.output.checkpoint_every,
            )?;
        }

        Command::Snippets { url, json } => {
            config.validate()?;
            let fetcher = HttpFetcher::from_config(&config.crawler)?;
            let patterns = PatternSet::compile(&config.matcher.keywords);
            let exclude = PatternSet::compile(&config.matcher.exclude);
            let extraction = config.crawl_options().extraction;
            let snippet_options = config.snippet_options();

            let request = InspectRequest {
                patterns: &patterns,
                exclude: (!exclude.is_empty()).then_some(&exclude),
                extraction: &extraction,
                snippets: &snippet_options,
            };
            let inspection = pipeline::run_snippets(&fetcher, &url, &request)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&inspection)?);
            } else {
                println!("{} ({} hits)", inspection.url, inspection.total);
                for (keyword, count) in &inspection.counts {
                    println!("  {keyword}: {count}");
                }
                for snippet in &inspection.snippets {
                    println!(
                        "[{}] <{}> {}",
                        snippet.keyword, snippet.tag, snippet.snippet
                    );
                }
            }
        }
    }

    Ok(())
}
