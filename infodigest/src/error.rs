use thiserror::Error;

/// A page (listing or detail) could not be retrieved.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Summarization endpoint failures.
#[derive(Error, Debug)]
pub enum LlmError {
    /// Missing or unusable settings; raised before any request is sent.
    #[error("LLM configuration error: {0}")]
    Configuration(String),

    #[error("LLM API error {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("LLM request timed out after {0}s")]
    Timeout(u64),

    #[error("LLM HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected LLM response: {0}")]
    InvalidResponse(String),
}

/// Message hand-off failures.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("delivery configuration error: {0}")]
    Configuration(String),

    #[error("delivery request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("delivery endpoint answered {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stage failure that aborts a run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("listing scan failed: {0}")]
    Listing(#[from] FetchError),

    #[error("summarization failed: {0}")]
    Summarization(#[from] LlmError),

    #[error("delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
}
