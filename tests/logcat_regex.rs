//! Integration tests for the logcat regex metric extractor.

use std::fs;
use std::io::ErrorKind;

use tempfile::TempDir;

use wa_plugins::{JobOutput, LogcatRegexConfig, Numeric, Output, LOGCAT_ARTIFACT};

const KV_REGEX: &str = r"(?P<key>\w+)=(?P<value>\S+)";

fn output_with_logcat(contents: &str) -> (TempDir, JobOutput) {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("logcat.log"), contents).unwrap();
    let mut output = JobOutput::new(dir.path());
    output.add_artifact(LOGCAT_ARTIFACT, "logcat.log");
    (dir, output)
}

fn recorded(output: &JobOutput) -> Vec<(&str, Numeric)> {
    output
        .metrics()
        .iter()
        .map(|m| (m.name.as_str(), m.value))
        .collect()
}

#[test]
fn test_records_metric() {
    let extractor = LogcatRegexConfig::new([r"(?P<key>\w+)=(?P<value>\d+)"])
        .validate()
        .unwrap();
    let (_dir, mut output) = output_with_logcat("cpu_freq=1200\n");

    extractor.process_job_output(&mut output).unwrap();

    assert_eq!(recorded(&output), vec![("cpu_freq", Numeric::Int(1200))]);
}

#[test]
fn test_non_numeric_value_skipped() {
    let extractor = LogcatRegexConfig::new([KV_REGEX]).validate().unwrap();
    let (_dir, mut output) = output_with_logcat("mode=auto\nfps=60\nload=0.75\n");

    extractor.process_job_output(&mut output).unwrap();

    assert_eq!(
        recorded(&output),
        vec![("fps", Numeric::Int(60)), ("load", Numeric::Float(0.75))]
    );
}

#[test]
fn test_nan_value_skipped() {
    let extractor = LogcatRegexConfig::new([KV_REGEX]).validate().unwrap();
    let (_dir, mut output) = output_with_logcat("fps=nan\nfps=NaN%\nfps=inf\n");

    extractor.process_job_output(&mut output).unwrap();

    assert_eq!(recorded(&output), vec![("fps", Numeric::Float(f64::INFINITY))]);
}

#[test]
fn test_missing_artifact_is_noop() {
    let extractor = LogcatRegexConfig::new([KV_REGEX]).validate().unwrap();
    let dir = TempDir::new().unwrap();
    let mut output = JobOutput::new(dir.path());
    output.add_artifact("dmesg", "dmesg.log");

    extractor.process_job_output(&mut output).unwrap();

    assert!(output.metrics().is_empty());
}

#[test]
fn test_missing_file_is_error() {
    let extractor = LogcatRegexConfig::new([KV_REGEX]).validate().unwrap();
    let dir = TempDir::new().unwrap();
    let mut output = JobOutput::new(dir.path());
    output.add_artifact(LOGCAT_ARTIFACT, "gone.log");

    let err = extractor.process_job_output(&mut output).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_rule_set_reused_across_outputs() {
    let extractor = LogcatRegexConfig::new([KV_REGEX]).validate().unwrap();
    let (_a, mut first) = output_with_logcat("a=1\n");
    let (_b, mut second) = output_with_logcat("b=2\nb=3\n");

    extractor.process_job_output(&mut first).unwrap();
    extractor.process_job_output(&mut second).unwrap();

    assert_eq!(recorded(&first), vec![("a", Numeric::Int(1))]);
    assert_eq!(
        recorded(&second),
        vec![("b", Numeric::Int(2)), ("b", Numeric::Int(3))]
    );
}

#[test]
fn test_realistic_logcat() {
    let extractor = LogcatRegexConfig::new([
        r"\S+ \S+\s+\d+\s+\d+ I Benchmark: (?P<key>\w+) took (?P<value>[\d.]+)ms",
    ])
    .validate()
    .unwrap();
    let log = "\
01-01 12:00:00.000  1234  1234 I Benchmark: startup took 512ms
01-01 12:00:00.100  1234  1234 D Other: ignored 7
01-01 12:00:01.000  1234  1234 I Benchmark: render took 16.6ms
";
    let (_dir, mut output) = output_with_logcat(log);

    extractor.process_job_output(&mut output).unwrap();

    assert_eq!(
        recorded(&output),
        vec![("startup", Numeric::Int(512)), ("render", Numeric::Float(16.6))]
    );
}

#[test]
fn test_absolute_artifact_path() {
    let extractor = LogcatRegexConfig::new([KV_REGEX]).validate().unwrap();
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("elsewhere.log");
    fs::write(&file, "x=5\n").unwrap();

    let mut output = JobOutput::new("/nonexistent");
    output.add_artifact(LOGCAT_ARTIFACT, &file);
    assert_eq!(output.get_path(&file), file);

    extractor.process_job_output(&mut output).unwrap();
    assert_eq!(recorded(&output), vec![("x", Numeric::Int(5))]);
}
