//! Workload-automation plugins for cloud instance metadata and logcat metrics.
//!
//! This crate provides two independent plugins that plug into a host through
//! small collaborator traits ([`Target`], [`RunContext`], [`Output`]):
//!
//! - [`AwsMeta`] walks the AWS instance metadata tree (IMDSv2) and attaches it
//!   to the run context under [`CONTEXT_KEY`].
//! - [`LogcatRegex`] scans a job's `logcat` artifact with user-supplied regexes
//!   and records a numeric metric for every match.
//!
//! # Example
//!
//! ```ignore
//! use serde_json::{Map, Value};
//! use wa_plugins::{AwsMeta, LocalShell, LogcatRegexConfig, JobOutput, Platform};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Collect instance metadata over the local shell
//!     let target = LocalShell::new(Platform::Generic);
//!     let mut context = Map::<String, Value>::new();
//!     AwsMeta::new().initialize(&target, &mut context).await?;
//!
//!     // Extract metrics from a logcat file
//!     let extractor = LogcatRegexConfig::new([r"(?P<key>\w+)=(?P<value>\d+)"]).validate()?;
//!     let mut output = JobOutput::new("wa_output/job-1");
//!     output.add_artifact("logcat", "logcat.log");
//!     extractor.process_job_output(&mut output)?;
//!     Ok(())
//! }
//! ```
//!
//! # Metadata Paths
//!
//! | Condition | Channel |
//! |-----------|---------|
//! | `Platform::Aws` and a direct client is configured | HTTP via [`MetadataClient`] |
//! | Anything else | `curl` commands through [`Target::execute`] |

mod aws_meta;
mod client;
mod error;
mod host;
mod logcat_regex;
mod numeric;
mod platform;
mod shell;
mod source;
mod tree;

pub use aws_meta::{AwsMeta, CONTEXT_KEY, DEFAULT_TOKEN_TTL};
pub use client::MetadataClient;
pub use error::{ConfigError, MetadataError};
pub use host::{Artifact, JobOutput, Metric, Output, RunContext, Target};
pub use logcat_regex::{LogcatRegex, LogcatRegexConfig, LOGCAT_ARTIFACT};
pub use numeric::{Numeric, ParseNumericError};
pub use platform::Platform;
pub use shell::LocalShell;
pub use source::{CommandSource, Fetched, MetadataSource};
