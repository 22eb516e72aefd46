// ABOUTME: Defines all error types for the frameboard library using thiserror.
// ABOUTME: Each concern has its own error enum, unified under FrameboardError.

/// Top-level error type for the frameboard library.
#[derive(Debug, thiserror::Error)]
pub enum FrameboardError {
    #[error("Setup error: {0}")]
    Setup(#[from] SetupError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised while building a coordinator from the initial application list.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("Application listed without an id")]
    MissingId,

    #[error("No container or frame mounted for application '{0}'")]
    MissingMount(String),

    #[error("Application '{0}' is listed more than once")]
    DuplicateApp(String),
}

/// Errors from fetching an application's self-reported configuration.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{reason}")]
    Status { status: u16, reason: String },

    #[error("Invalid application payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
