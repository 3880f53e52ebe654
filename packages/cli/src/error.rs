// ABOUTME: Error type for CLI commands
// ABOUTME: Covers HTTP client failures, API error envelopes, and missing sessions

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Request to the OKRDesk API failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with its error envelope
    #[error("{message} ({code}, HTTP {status})")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Not signed in. Run `okrdesk login --email <email>` first")]
    NotSignedIn,

    #[error("Unexpected response from the OKRDesk API: {0}")]
    UnexpectedResponse(String),
}

pub type CliResult<T> = Result<T, CliError>;
