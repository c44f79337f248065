//! Sitequery main entry point
//!
//! This is the command-line interface for crawling a site and answering
//! questions from the crawled pages.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sitequery::answer::{
    fetch_questions, load_questions, questions_to_json, rescore_pages, LinkFollower, Question,
    QuestionAnswerer,
};
use sitequery::config::{compute_config_hash, load_config_with_hash, parse_config, Config};
use sitequery::crawler::{build_http_client, run_crawl, PageFetcher};
use sitequery::oracle::OpenAiOracle;
use sitequery::output::{load_statistics, print_statistics, write_json_output};
use sitequery::report::ReportClient;
use sitequery::scoring::RelevanceScorer;
use sitequery::storage::open_storage;
use sitequery::ConfigError;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Sitequery: crawl a website and answer questions from its pages
///
/// The crawl phase stores every page reachable from a seed URL. The answer
/// phase ranks the stored pages per question and asks a language model to
/// extract the answer.
#[derive(Parser, Debug)]
#[command(name = "sitequery")]
#[command(version)]
#[command(about = "Crawl a website and answer questions from its pages", long_about = None)]
struct Cli {
    /// Path to TOML configuration file; defaults apply when omitted
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a site breadth-first from a seed URL into the page store
    Crawl {
        seed_url: String,

        /// Score fetched pages against this question batch
        #[arg(long, value_name = "FILE")]
        questions: Option<PathBuf>,
    },

    /// Answer a question batch from the stored pages
    Answer {
        questions: PathBuf,

        /// Write the answers here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Submit the answers to the configured report endpoint
        #[arg(long)]
        submit: bool,
    },

    /// Answer questions by following links from a start page
    Follow {
        start_url: String,
        questions: PathBuf,

        /// Write the answers here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Recompute the stored relevance of every page for a question batch
    Rescore { questions: PathBuf },

    /// Download a question batch and save it as an {id, text} array
    FetchQuestions {
        url: String,

        /// Write the questions here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show statistics from the page store and exit
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = load_configuration(cli.config.as_deref())?;

    match cli.command {
        Command::Crawl {
            seed_url,
            questions,
        } => handle_crawl(&config, &config_hash, &seed_url, questions.as_deref()).await,
        Command::Answer {
            questions,
            output,
            submit,
        } => handle_answer(&config, &questions, output.as_deref(), submit).await,
        Command::Follow {
            start_url,
            questions,
            output,
        } => handle_follow(&config, &start_url, &questions, output.as_deref()).await,
        Command::Rescore { questions } => handle_rescore(&config, &questions),
        Command::FetchQuestions { url, output } => {
            handle_fetch_questions(&config, &url, output.as_deref()).await
        }
        Command::Stats => handle_stats(&config),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitequery=info,warn"),
            1 => EnvFilter::new("sitequery=debug,info"),
            2 => EnvFilter::new("sitequery=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads and validates the configuration, or the defaults without a file
fn load_configuration(path: Option<&Path>) -> Result<(Config, String)> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok((config, hash))
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Ok((parse_config("")?, compute_config_hash("")))
        }
    }
}

fn open_store(config: &Config) -> Result<sitequery::SqliteStorage> {
    open_storage(Path::new(&config.store.database_path))
        .with_context(|| format!("Failed to open page store {}", config.store.database_path))
}

fn read_questions(path: &Path) -> Result<Vec<Question>> {
    load_questions(path).with_context(|| format!("Failed to load questions {}", path.display()))
}

/// Handles the crawl command
async fn handle_crawl(
    config: &Config,
    config_hash: &str,
    seed_url: &str,
    questions: Option<&Path>,
) -> Result<()> {
    let question_texts = match questions {
        Some(path) => read_questions(path)?
            .into_iter()
            .map(|q| q.text)
            .collect(),
        None => Vec::new(),
    };

    let report = run_crawl(config, config_hash, seed_url, question_texts)
        .await
        .with_context(|| format!("Crawl from {} failed", seed_url))?;

    println!(
        "Crawl run {} finished: {} pages fetched ({} failed), {} reused",
        report.run_id, report.pages_fetched, report.pages_failed, report.pages_reused
    );
    println!("Page store: {}", config.store.database_path);

    Ok(())
}

/// Handles the answer command
async fn handle_answer(
    config: &Config,
    questions_path: &Path,
    output: Option<&Path>,
    submit: bool,
) -> Result<()> {
    // credentials are checked before any work starts
    let oracle = OpenAiOracle::from_config(&config.oracle)?;
    let reporter = if submit {
        let report_config = config
            .report
            .as_ref()
            .ok_or(ConfigError::MissingSection("report"))?;
        Some(ReportClient::from_config(report_config)?)
    } else {
        None
    };

    let store = open_store(config)?;
    let mut questions = read_questions(questions_path)?;

    let answerer = QuestionAnswerer::new(&store, &oracle)
        .with_scorer(RelevanceScorer::new(config.scoring.clone()))
        .with_top_k(config.answer.top_k);
    let sheet = answerer.answer_all(&mut questions).await;

    write_json_output(&sheet.to_json_pretty()?, output)?;

    if let Some(reporter) = reporter {
        let outcome = reporter.submit(&sheet).await?;
        println!("Report reply: {}", outcome.message);
        if !outcome.incorrect_question_ids.is_empty() {
            println!(
                "Incorrect questions: {}",
                outcome.incorrect_question_ids.join(", ")
            );
        }
        outcome.into_result()?;
    }

    Ok(())
}

/// Handles the follow command
async fn handle_follow(
    config: &Config,
    start_url: &str,
    questions_path: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let oracle = OpenAiOracle::from_config(&config.oracle)?;
    let mut store = open_store(config)?;
    let fetcher = PageFetcher::new(&config.crawler)?;
    let mut questions = read_questions(questions_path)?;

    let mut follower = LinkFollower::new(&mut store, &fetcher, &oracle)
        .with_max_depth(config.answer.follow_max_depth);
    let sheet = follower.follow_all(start_url, &mut questions).await;

    for question in questions.iter().filter(|q| q.answer().is_none()) {
        tracing::info!(
            "Question {} unanswered: {}",
            question.id,
            question.error().unwrap_or("unknown")
        );
    }

    write_json_output(&sheet.to_json_pretty()?, output)?;
    Ok(())
}

/// Handles the rescore command
fn handle_rescore(config: &Config, questions_path: &Path) -> Result<()> {
    let mut store = open_store(config)?;
    let questions = read_questions(questions_path)?;

    let updated = rescore_pages(&mut store, &questions)?;
    println!("Rescored {} pages", updated);
    Ok(())
}

/// Handles the fetch-questions command
async fn handle_fetch_questions(config: &Config, url: &str, output: Option<&Path>) -> Result<()> {
    let client = build_http_client(&config.crawler)?;
    let questions = fetch_questions(&client, url).await?;

    write_json_output(&questions_to_json(&questions)?, output)?;
    tracing::info!("Fetched {} questions", questions.len());
    Ok(())
}

/// Handles the stats command: shows statistics from the page store
fn handle_stats(config: &Config) -> Result<()> {
    println!("Database: {}\n", config.store.database_path);

    let store = open_store(config)?;
    let stats = load_statistics(&store)?;
    print_statistics(&stats);

    Ok(())
}
