//! Regex-driven metric extraction from logcat output.

use std::fs::File;
use std::io::{self, BufRead, BufReader};

use regex::Regex;
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::host::Output;
use crate::numeric::Numeric;

/// Logical name of the artifact that is scanned.
pub const LOGCAT_ARTIFACT: &str = "logcat";

const KEY_GROUP: &str = "(?P<key>";
const VALUE_GROUP: &str = "(?P<value>";

/// Unvalidated extractor configuration.
///
/// `regexes` accepts either a single string or a list of strings when
/// deserialized. Each regex must declare the named groups `key` and `value`,
/// e.g. `(?P<key>\w+)=(?P<value>\d+)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LogcatRegexConfig {
    /// Regexes to match against each logcat line.
    #[serde(deserialize_with = "one_or_many")]
    pub regexes: Vec<String>,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(regex) => vec![regex],
        OneOrMany::Many(regexes) => regexes,
    })
}

impl LogcatRegexConfig {
    /// Create a configuration from a list of regexes.
    pub fn new<I, S>(regexes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            regexes: regexes.into_iter().map(Into::into).collect(),
        }
    }

    /// Check and compile every regex.
    ///
    /// # Errors
    ///
    /// Fails on the first regex that lacks a `key` or `value` named group or
    /// does not compile, and if no regexes are configured at all.
    pub fn validate(self) -> Result<LogcatRegex, ConfigError> {
        if self.regexes.is_empty() {
            return Err(ConfigError::NoRegexes);
        }

        let mut rules = Vec::with_capacity(self.regexes.len());
        for regex in self.regexes {
            if !regex.contains(KEY_GROUP) {
                return Err(ConfigError::MissingGroup { regex, group: "key" });
            }
            if !regex.contains(VALUE_GROUP) {
                return Err(ConfigError::MissingGroup {
                    regex,
                    group: "value",
                });
            }
            let compiled = match Regex::new(&regex) {
                Ok(compiled) => compiled,
                Err(source) => return Err(ConfigError::Regex { regex, source }),
            };
            // Group 0 is the whole match.
            if compiled.captures_len() != 3 {
                warn!(
                    regex = %compiled,
                    "regex has groups other than \"key\" and \"value\" and will never record a metric"
                );
            }
            rules.push(compiled);
        }

        Ok(LogcatRegex { rules })
    }
}

/// Validated extractor holding the compiled rule set.
#[derive(Debug, Clone)]
pub struct LogcatRegex {
    rules: Vec<Regex>,
}

impl LogcatRegex {
    /// Compiled rules, in configuration order.
    pub fn rules(&self) -> &[Regex] {
        &self.rules
    }

    /// Scan the output's `logcat` artifact and record a metric for every
    /// rule that matches at the start of a line.
    ///
    /// Does nothing if the output has no `logcat` artifact. Values that are
    /// not numeric are logged as warnings and skipped.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the artifact cannot be opened or read.
    pub fn process_job_output<O: Output>(&self, output: &mut O) -> io::Result<()> {
        let Some(artifact) = output.get_artifact(LOGCAT_ARTIFACT) else {
            return Ok(());
        };
        let path = output.get_path(&artifact.path);
        let file = BufReader::new(File::open(&path)?);
        debug!(path = %path.display(), "scanning logcat");

        self.scan(file, |key, value| output.add_metric(key, value))
    }

    /// Scan `reader` line by line, passing each extracted metric to `record`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if reading fails.
    pub fn scan<R, F>(&self, reader: R, mut record: F) -> io::Result<()>
    where
        R: BufRead,
        F: FnMut(&str, Numeric),
    {
        for line in reader.lines() {
            let line = line?;
            for rule in &self.rules {
                if let Some((key, value)) = extract(rule, &line) {
                    match value.parse::<Numeric>() {
                        Ok(number) => {
                            debug!(key, %number, "recording metric");
                            record(key, number);
                        }
                        Err(_) => {
                            warn!("Value extracted for \"{key}\": \"{value}\" is not numeric");
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Match `rule` anchored at the start of `line` and return the `key` and
/// `value` captures.
fn extract<'l>(rule: &Regex, line: &'l str) -> Option<(&'l str, &'l str)> {
    if rule.captures_len() != 3 {
        return None;
    }
    let captures = rule.captures(line)?;
    // The leftmost match starts at 0 whenever any match starting at 0 exists.
    if captures.get(0)?.start() != 0 {
        return None;
    }
    let key = captures.name("key")?.as_str();
    let value = captures.name("value")?.as_str();
    Some((key, value))
}
