//! Error taxonomy for a scan run.
//!
//! - **Input validation**: `MissingInput`
//! - **Transport / remote**: `Http`, `Status`, `Decode`, `InvalidUrl`, `InvalidApiKey`
//! - **Discovery**: `Io`, `InvalidGlob`, `Interrupted`, `NoManifests`
//! - **Scan outcome**: `ScanFailed`, `ScanFailedWithIssues`, `PollingExhausted`
//!
//! Every variant is fatal to the run; the binary reports it once at the top.

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// A required pipeline input was not supplied.
    #[error("Missing required parameter '{0}'.")]
    MissingInput(&'static str),

    /// Network-level failure, or a body that could not be decoded.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("{operation} failed: {status} ({reason})")]
    Status {
        operation: &'static str,
        status: u16,
        reason: String,
        body: Option<String>,
    },

    /// A 2xx response whose body did not have the expected shape.
    #[error("{operation} returned an unreadable body: {source}")]
    Decode {
        operation: &'static str,
        source: serde_json::Error,
    },

    #[error("the api key contains characters not allowed in a header")]
    InvalidApiKey,

    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("io error: {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid glob '{glob}': {reason}")]
    InvalidGlob { glob: String, reason: String },

    /// The blocking manifest search was cancelled before it finished.
    #[error("manifest search was interrupted: {0}")]
    Interrupted(#[source] tokio::task::JoinError),

    #[error("No matching manifest files found.")]
    NoManifests,

    #[error("Scan failed.")]
    ScanFailed,

    #[error("Scan failed with {vulnerabilities} vulnerabilities and {violations} violations.")]
    ScanFailedWithIssues { vulnerabilities: u64, violations: u64 },

    #[error("Scan did not finish after {attempts} status checks.")]
    PollingExhausted { attempts: u32 },
}

pub type Result<T> = std::result::Result<T, ScanError>;

impl ScanError {
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        ScanError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}
