//! Defines the configuration settings for the email-extractor application.

use crate::extractor::DEFAULT_SUFFIXES;
use anyhow::Context;
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name of the spreadsheet written at the end of a run.
pub(crate) const REPORT_FILE_NAME: &str = "Email Extractor.xlsx";

const DEFAULT_QUERIES: [&str; 2] = ["webbyrå stockholm", "webbyrå göteborg"];

/// Command line arguments for email-extractor. Every flag is optional; without
/// any of them the built-in query list is searched.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Search the web for companies and collect their contact emails into a spreadsheet", long_about = None)]
pub(crate) struct AppArgs {
    /// Comma-separated list of search queries
    #[arg(short, long, env = "EMAIL_EXTRACTOR_QUERIES")]
    pub queries: Option<String>,

    /// Number of search results to fetch per query
    #[arg(short = 'n', long, env = "EMAIL_EXTRACTOR_RESULTS_PER_QUERY")]
    pub results_per_query: Option<usize>,

    /// Region hint passed to the search engine (e.g. "se")
    #[arg(long, env = "EMAIL_EXTRACTOR_REGION")]
    pub region: Option<String>,

    /// Pause before each search request (seconds)
    #[arg(long, env = "EMAIL_EXTRACTOR_SEARCH_PAUSE")]
    pub search_pause: Option<f32>,

    /// HTTP request timeout in seconds
    #[arg(long, env = "EMAIL_EXTRACTOR_REQUEST_TIMEOUT")]
    pub request_timeout: Option<u64>,

    /// User agent string for HTTP requests
    #[arg(long, env = "EMAIL_EXTRACTOR_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Comma-separated list of top-level suffixes always scanned for emails
    #[arg(long, env = "EMAIL_EXTRACTOR_SUFFIXES")]
    pub suffixes: Option<String>,

    /// Path of the spreadsheet to write (defaults to the desktop)
    #[arg(short, long, env = "EMAIL_EXTRACTOR_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Path to configuration file (TOML format)
    #[arg(long, env = "EMAIL_EXTRACTOR_CONFIG")]
    pub config_file: Option<String>,
}

/// TOML Configuration file structure
#[derive(Deserialize, Debug, Default)]
struct ConfigFile {
    search: Option<SearchConfig>,
    network: Option<NetworkConfig>,
    extraction: Option<ExtractionConfig>,
    output: Option<OutputConfig>,
}

#[derive(Deserialize, Debug, Default)]
struct SearchConfig {
    queries: Option<Vec<String>>,
    results_per_query: Option<usize>,
    region: Option<String>,
    pause: Option<f32>,
}

#[derive(Deserialize, Debug, Default)]
struct NetworkConfig {
    request_timeout: Option<u64>,
    user_agent: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct ExtractionConfig {
    suffixes: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default)]
struct OutputConfig {
    output_file: Option<PathBuf>,
}

/// Application configuration settings.
#[derive(Debug, Clone)]
pub(crate) struct Config {
    /// Search queries, processed in this order.
    pub queries: Vec<String>,
    /// Number of results requested from the search engine per query.
    pub results_per_query: usize,
    /// Region hint for the search engine; selects the regional host.
    pub region: String,
    /// Fixed pause before every search request.
    pub search_pause: Duration,
    /// Timeout for individual HTTP requests.
    pub request_timeout: Duration,
    /// User agent string to use for HTTP requests.
    pub user_agent: String,
    /// Top-level suffixes scanned on every page.
    pub email_suffixes: Vec<String>,
    /// Explicit report path. When `None` the report goes to the desktop.
    pub output_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            queries: DEFAULT_QUERIES.iter().map(|s| s.to_string()).collect(),
            results_per_query: 100,
            region: "se".to_string(),
            search_pause: Duration::from_secs(2),
            request_timeout: Duration::from_secs(10),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36".to_string(),
            email_suffixes: DEFAULT_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            output_file: None,
        }
    }
}

impl Config {
    /// Where the report will be written: the configured path, or
    /// `<profile>/Desktop/Email Extractor.xlsx`.
    pub(crate) fn report_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = &self.output_file {
            return Ok(path.clone());
        }
        desktop_report_path(|key| std::env::var(key).ok()).context(
            "Cannot locate the desktop: neither USERPROFILE nor HOME is set. Pass --output instead.",
        )
    }
}

/// Resolves the desktop report path from the user-profile variable, falling
/// back to `HOME` on systems that do not set `USERPROFILE`.
fn desktop_report_path<F>(lookup: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    ["USERPROFILE", "HOME"]
        .iter()
        .filter_map(|key| lookup(key))
        .find(|value| !value.trim().is_empty())
        .map(|profile| PathBuf::from(profile).join("Desktop").join(REPORT_FILE_NAME))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Load configuration from a TOML file
/// Converts a pause given in seconds. Negative values clamp to zero; values
/// too large for a `Duration` (including infinity) fall back to the default.
fn pause_from_secs(seconds: f32) -> Duration {
    match Duration::try_from_secs_f32(seconds.max(0.0)) {
        Ok(pause) => pause,
        Err(e) => {
            let fallback = Config::default().search_pause;
            tracing::warn!(
                "Search pause {} is out of range ({}), using {:?}",
                seconds, e, fallback
            );
            fallback
        }
    }
}

/// Load configuration from a TOML file
fn load_config_file(file_path: &str) -> anyhow::Result<ConfigFile> {
    let path = Path::new(file_path);
    if !path.exists() {
        tracing::warn!("Configuration file {} not found, using defaults", file_path);
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", file_path))?;

    let config = parse_config_file(&content)
        .with_context(|| format!("Failed to parse TOML configuration from {}", file_path))?;

    tracing::info!("Loaded configuration from {}", file_path);
    Ok(config)
}

fn parse_config_file(content: &str) -> crate::error::Result<ConfigFile> {
    Ok(toml::from_str(content)?)
}

fn apply_file_config(config: &mut Config, file_config: &ConfigFile) {
    if let Some(search) = &file_config.search {
        if let Some(queries) = &search.queries {
            config.queries = queries.clone();
        }
        if let Some(limit) = search.results_per_query {
            config.results_per_query = limit;
        }
        if let Some(region) = &search.region {
            config.region = region.clone();
        }
        if let Some(pause) = search.pause {
            config.search_pause = pause_from_secs(pause);
        }
    }

    if let Some(network) = &file_config.network {
        if let Some(timeout) = network.request_timeout {
            config.request_timeout = Duration::from_secs(timeout);
        }
        if let Some(user_agent) = &network.user_agent {
            config.user_agent = user_agent.clone();
        }
    }

    if let Some(extraction) = &file_config.extraction {
        if let Some(suffixes) = &extraction.suffixes {
            config.email_suffixes = suffixes.clone();
        }
    }

    if let Some(output) = &file_config.output {
        if let Some(path) = &output.output_file {
            config.output_file = Some(path.clone());
        }
    }
}

/// Apply command line arguments to the Config instance
fn apply_cli_args(config: &mut Config, args: &AppArgs) {
    if let Some(ref queries) = args.queries {
        config.queries = split_list(queries);
    }

    if let Some(limit) = args.results_per_query {
        config.results_per_query = limit;
    }

    if let Some(ref region) = args.region {
        config.region = region.clone();
    }

    if let Some(pause) = args.search_pause {
        config.search_pause = pause_from_secs(pause);
    }

    if let Some(timeout) = args.request_timeout {
        config.request_timeout = Duration::from_secs(timeout);
    }

    if let Some(ref agent) = args.user_agent {
        config.user_agent = agent.clone();
    }

    if let Some(ref suffixes) = args.suffixes {
        config.email_suffixes = split_list(suffixes);
    }

    if let Some(ref output) = args.output {
        config.output_file = Some(output.clone());
    }
}

fn validate_config(config: &mut Config) -> anyhow::Result<()> {
    config.queries.retain(|q| !q.trim().is_empty());
    if config.queries.is_empty() {
        config.queries = Config::default().queries;
        tracing::warn!(
            "Query list was empty. Using built-in queries: {:?}",
            config.queries
        );
    }

    if config.results_per_query == 0 {
        config.results_per_query = 1;
        tracing::warn!("Results per query was set to 0. Setting to 1.");
    }

    config.region = config.region.trim().trim_start_matches('.').to_lowercase();
    if config.region.is_empty() {
        config.region = "com".to_string();
        tracing::warn!("Region hint was empty. Using the generic search host.");
    }

    if config.email_suffixes.iter().all(|s| s.trim().is_empty()) {
        config.email_suffixes = Config::default().email_suffixes;
        tracing::warn!("Suffix list was empty. Using defaults.");
    }

    if config.request_timeout.is_zero() {
        anyhow::bail!("Request timeout must be greater than zero");
    }

    Ok(())
}

/// Builds the final configuration: defaults, then the TOML file, then CLI/env.
pub(crate) fn build_config(args: &AppArgs) -> anyhow::Result<Config> {
    let mut config = Config::default();

    if let Some(ref file_path) = args.config_file {
        match load_config_file(file_path) {
            Ok(file_config) => apply_file_config(&mut config, &file_config),
            Err(e) => {
                tracing::error!("Failed to load configuration file: {:#}", e);
            }
        }
    } else {
        for path in ["./email-extractor.toml", "./config.toml"].iter() {
            if Path::new(path).exists() {
                match load_config_file(path) {
                    Ok(file_config) => {
                        apply_file_config(&mut config, &file_config);
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load configuration from {}: {:#}", path, e);
                    }
                }
            }
        }
    }

    apply_cli_args(&mut config, args);

    validate_config(&mut config)?;

    tracing::debug!("Final configuration: {:?}", config);

    Ok(config)
}

pub(crate) fn parse_args() -> AppArgs {
    AppArgs::parse()
}
