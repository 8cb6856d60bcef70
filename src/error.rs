//! Defines the custom error types for the email-extractor application.

use std::io;
use thiserror::Error;
use url::ParseError as UrlParseError;

/// The primary error type for the search, harvest and report process.
#[derive(Error, Debug)]
pub(crate) enum AppError {
    /// Error related to file input/output operations.
    #[error("IO Error: {0}")]
    Io(#[from] io::Error),

    /// Error parsing a TOML configuration file.
    #[error("TOML Error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Error parsing a URL.
    #[error("URL Parsing Error: {0}")]
    UrlParse(#[from] UrlParseError),

    /// Error making HTTP requests via reqwest.
    #[error("HTTP Request Error: {0}")]
    Request(#[from] reqwest::Error),

    /// Failed to derive a base URL from a search result.
    #[error("Failed to extract base URL: {0}")]
    DomainExtraction(String),

    /// The search provider refused or failed a query.
    #[error("Search Error for query '{query}': {message}")]
    Search {
        /// The query that was being issued.
        query: String,
        /// What went wrong.
        message: String,
    },

    /// Error while building or saving the spreadsheet.
    #[error("Spreadsheet Error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    /// Compiling an email pattern failed.
    #[error("Pattern Error: {0}")]
    Pattern(#[from] regex::Error),

    /// An underlying error that doesn't fit other categories, using anyhow.
    #[error("Generic Error: {0}")]
    Generic(#[from] anyhow::Error),
}

pub(crate) type Result<T> = std::result::Result<T, AppError>;
