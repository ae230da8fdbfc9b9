use thiserror::Error;

/// Raised when the user interrupts a run with Ctrl-C.
#[derive(Debug, Error)]
#[error("interrupted by user")]
pub struct Interrupted;

/// Failures while talking to the Maven repository or search endpoint.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("could not fetch {url}: HTTP {status}")]
    Status { url: String, status: u16 },

    /// The request never produced a response (DNS, TLS, connection reset...).
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// `maven-metadata.xml` was fetched but did not name a usable version.
    #[error("could not determine latest version from {url}: {reason}")]
    Metadata { url: String, reason: String },

    /// The search endpoint returned a body we could not decode.
    #[error("unexpected response from {url}: {reason}")]
    Parse { url: String, reason: String },

    #[error("I/O error while saving download: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Interrupted(#[from] Interrupted),
}

/// Failures during the interactive group/version selection.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("no groupIds with versions found for artifactId '{0}'")]
    NoResults(String),

    #[error("nothing to choose from")]
    NoChoices,

    #[error("invalid input: {0:?}")]
    InvalidInput(String),

    #[error("invalid selection: {choice} (expected 1-{max})")]
    OutOfRange { choice: usize, max: usize },

    #[error("could not read selection: {0}")]
    Io(#[from] std::io::Error),
}
