//! Page-Lens main entry point
//!
//! This is the command-line interface for the Page-Lens page analyzer.

use anyhow::Context;
use clap::{Parser, Subcommand};
use page_lens::analysis::{build_http_client, AnalysisOptions, PageAnalyzer};
use page_lens::config::{load_config_or_default, Config};
use page_lens::server::{self, AppState};
use page_lens::source::{parse_page_url, HtmlSource, HttpHtmlSource};
use page_lens::LensError;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Page-Lens: structural analysis of web pages
///
/// Extracts the doctype, title, headings and links of a page, detects login
/// forms, and optionally checks every link for reachability.
#[derive(Parser, Debug)]
#[command(name = "page-lens")]
#[command(version)]
#[command(about = "Structural analysis of web pages", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
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
    /// Run the HTTP API
    Serve {
        /// Address to bind (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides the config file)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Analyse a single page and print the result as JSON
    Analyze {
        /// URL of the page to analyse
        url: String,

        /// Also probe every link and print the reachability report
        #[arg(long)]
        deep: bool,

        /// Additional login keyword (repeatable)
        #[arg(long = "keyword", value_name = "KEYWORD")]
        keywords: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = load_config_or_default(cli.config.as_deref())
        .with_context(|| match &cli.config {
            Some(path) => format!("Failed to load configuration from {}", path.display()),
            None => "Invalid default configuration".to_string(),
        })?;
    if let Some(path) = &cli.config {
        tracing::info!("Configuration loaded from {}", path.display());
    }

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            handle_serve(config).await
        }
        Command::Analyze {
            url,
            deep,
            keywords,
        } => handle_analyze(&config, &url, deep, keywords).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("page_lens=info,warn"),
            1 => EnvFilter::new("page_lens=debug,info"),
            2 => EnvFilter::new("page_lens=trace,debug"),
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

/// Handles the `serve` command
async fn handle_serve(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Deferred results kept for {}s, probe concurrency {}",
        config.analysis.cache_lifespan_secs,
        config.analysis.probe_concurrency
    );
    if !config.translation.enabled {
        tracing::info!("Keyword translation disabled");
    }

    let state = AppState::from_config(&config)?;
    server::serve(&config, state).await?;
    Ok(())
}

/// Handles the `analyze` command: fetch, analyse, print JSON to stdout
async fn handle_analyze(
    config: &Config,
    raw_url: &str,
    deep: bool,
    keywords: Vec<String>,
) -> anyhow::Result<()> {
    let url = parse_page_url(raw_url)?;

    let client = build_http_client(&config.user_agent, config.analysis.probe_timeout())?;
    let source = HttpHtmlSource::new(client);
    let analyzer = PageAnalyzer::from_config(config)?;

    let html = source.fetch_html(&url).await?;
    let options = AnalysisOptions {
        perform_deep_analysis: deep,
        elective_keywords: keywords,
    };
    let mut data = analyzer.analyze(&html, url.as_str(), &options).await?;
    let deferred = data.take_advanced_href_data();

    println!("{}", serde_json::to_string_pretty(&data)?);

    if let Some(deferred) = deferred {
        tracing::info!("Waiting for reachability scan to finish");
        let advanced_href_data = deferred
            .await
            .map_err(LensError::Deferred)?;
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "advancedHrefData": advanced_href_data
            }))?
        );
    }

    Ok(())
}
