//! Error types for metadata collection and extractor configuration.

use thiserror::Error;

/// Errors that can occur while collecting instance metadata.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The metadata service reported that the requested path does not exist.
    #[error("metadata not found")]
    NotFound,

    /// A target command or HTTP request timed out.
    #[error("request timeout")]
    Timeout,

    /// HTTP error with status code.
    #[error("http {0}")]
    Http(u16),

    /// A command run on the target exited unsuccessfully.
    #[error("command `{command}` failed with status {status}: {stderr}")]
    Command {
        /// The command line that was executed.
        command: String,
        /// Exit status code, or -1 if the process was killed by a signal.
        status: i32,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// Command output was not valid UTF-8.
    #[error("invalid utf-8")]
    Utf8,

    /// HTTP request error.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while validating the logcat regex configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No regexes were configured.
    #[error("at least one regex must be specified")]
    NoRegexes,

    /// A regex does not declare one of the required named groups.
    #[error("regex \"{regex}\" does not specify \"{group}\" as a named regex group")]
    MissingGroup {
        /// The offending regex.
        regex: String,
        /// Name of the missing group.
        group: &'static str,
    },

    /// A regex failed to compile.
    #[error("regex error in \"{regex}\": {source}")]
    Regex {
        /// The offending regex.
        regex: String,
        /// Underlying compilation error.
        #[source]
        source: regex::Error,
    },
}
