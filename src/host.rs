//! Collaborator interfaces provided by the workload-automation host.

use std::future::Future;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::MetadataError;
use crate::numeric::Numeric;
use crate::platform::Platform;

/// A device that workloads run on.
pub trait Target {
    /// Platform identity of the target.
    fn platform(&self) -> &Platform;

    /// Run a shell command on the target and return its standard output.
    fn execute(&self, command: &str) -> impl Future<Output = Result<String, MetadataError>>;
}

/// Run-level metadata sink.
pub trait RunContext {
    /// Attach `value` to the run under `key`.
    fn add_metadata(&mut self, key: &str, value: Value);
}

impl RunContext for Map<String, Value> {
    fn add_metadata(&mut self, key: &str, value: Value) {
        self.insert(key.to_string(), value);
    }
}

/// A file produced during a job, addressed by logical name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    /// Logical name, e.g. `logcat`.
    pub name: String,
    /// Path relative to the output directory.
    pub path: PathBuf,
}

/// One job's artifacts and metrics.
pub trait Output {
    /// Look up an artifact by logical name.
    fn get_artifact(&self, name: &str) -> Option<&Artifact>;

    /// Resolve a path relative to this output's directory.
    fn get_path(&self, relative: &Path) -> PathBuf;

    /// Record a metric.
    fn add_metric(&mut self, name: &str, value: Numeric);
}

/// A recorded metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    /// Metric name.
    pub name: String,
    /// Metric value.
    pub value: Numeric,
}

/// Directory-backed [`Output`] that keeps metrics in memory.
#[derive(Debug, Clone, Default)]
pub struct JobOutput {
    basepath: PathBuf,
    artifacts: Vec<Artifact>,
    metrics: Vec<Metric>,
}

impl JobOutput {
    /// Create an output rooted at `basepath`.
    pub fn new(basepath: impl Into<PathBuf>) -> Self {
        Self {
            basepath: basepath.into(),
            artifacts: Vec::new(),
            metrics: Vec::new(),
        }
    }

    /// Register an artifact. A later artifact with the same name replaces the
    /// earlier one.
    pub fn add_artifact(&mut self, name: &str, path: impl Into<PathBuf>) {
        let artifact = Artifact {
            name: name.to_string(),
            path: path.into(),
        };
        match self.artifacts.iter_mut().find(|a| a.name == name) {
            Some(existing) => *existing = artifact,
            None => self.artifacts.push(artifact),
        }
    }

    /// Output directory.
    pub fn basepath(&self) -> &Path {
        &self.basepath
    }

    /// Metrics recorded so far, in order.
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }
}

impl Output for JobOutput {
    fn get_artifact(&self, name: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.name == name)
    }

    fn get_path(&self, relative: &Path) -> PathBuf {
        self.basepath.join(relative)
    }

    fn add_metric(&mut self, name: &str, value: Numeric) {
        self.metrics.push(Metric {
            name: name.to_string(),
            value,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_run_context() {
        let mut context = Map::new();
        context.add_metadata("AWS_Instance", Value::from("i-0abc"));
        assert_eq!(context["AWS_Instance"], "i-0abc");
    }

    #[test]
    fn test_job_output_paths() {
        let mut output = JobOutput::new("/tmp/wa/job-1");
        output.add_artifact("logcat", "logcat.log");

        let artifact = output.get_artifact("logcat").unwrap();
        assert_eq!(
            output.get_path(&artifact.path),
            PathBuf::from("/tmp/wa/job-1/logcat.log")
        );
        assert!(output.get_artifact("dmesg").is_none());
    }

    #[test]
    fn test_job_output_replaces_artifact() {
        let mut output = JobOutput::new("out");
        output.add_artifact("logcat", "a.log");
        output.add_artifact("logcat", "b.log");
        assert_eq!(
            output.get_artifact("logcat").unwrap().path,
            PathBuf::from("b.log")
        );
    }

    #[test]
    fn test_job_output_keeps_duplicate_metrics() {
        let mut output = JobOutput::new("out");
        output.add_metric("fps", Numeric::Int(60));
        output.add_metric("fps", Numeric::Float(59.5));
        assert_eq!(output.metrics().len(), 2);
        assert_eq!(
            serde_json::to_string(output.metrics()).unwrap(),
            r#"[{"name":"fps","value":60},{"name":"fps","value":59.5}]"#
        );
    }
}
