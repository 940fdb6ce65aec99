//! Depth-first walk of the instance metadata tree.

use std::mem;
use std::vec;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::MetadataError;
use crate::source::{Fetched, MetadataSource};

/// A listing being expanded.
struct Frame {
    /// Key under which the finished listing is stored in its parent.
    key: String,
    /// Path of the listing relative to the meta-data root.
    path: String,
    entries: vec::IntoIter<String>,
    out: Map<String, Value>,
}

impl Frame {
    fn new(key: String, path: String, listing: &str) -> Self {
        let entries: Vec<String> = listing
            .lines()
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            key,
            path,
            entries: entries.into_iter(),
            out: Map::new(),
        }
    }

    fn child_path(&self, entry: &str) -> String {
        let name = entry.trim_end_matches('/');
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.path, name)
        }
    }
}

/// Parse a leaf as JSON, falling back to the raw string.
pub(crate) fn parse_leaf(data: &str) -> Value {
    serde_json::from_str(data).unwrap_or_else(|_| Value::String(data.to_string()))
}

/// Expand `listing` (the root listing) into a metadata tree.
///
/// Entries ending in `/` are subtrees and are expanded in turn; other entries
/// are leaves. When an entry comes back not-found, the listing it belongs to
/// collapses to that entry's name and its remaining entries are skipped.
pub(crate) async fn walk<S: MetadataSource>(
    source: &S,
    token: &str,
    listing: &str,
) -> Result<Value, MetadataError> {
    let mut stack = vec![Frame::new(String::new(), String::new(), listing)];

    while let Some(frame) = stack.last_mut() {
        let (key, value) = match frame.entries.next() {
            Some(entry) => {
                let path = frame.child_path(&entry);
                match source.fetch(token, &path).await? {
                    Fetched::Body(data) => {
                        debug!(path = %path, "fetched metadata");
                        match entry.strip_suffix('/') {
                            Some(name) => {
                                let child = Frame::new(name.to_string(), path, &data);
                                stack.push(child);
                            }
                            None => {
                                frame.out.insert(entry, parse_leaf(&data));
                            }
                        }
                        continue;
                    }
                    Fetched::NotFound => (mem::take(&mut frame.key), Value::String(entry)),
                }
            }
            None => (
                mem::take(&mut frame.key),
                Value::Object(mem::take(&mut frame.out)),
            ),
        };

        stack.pop();
        match stack.last_mut() {
            Some(parent) => {
                parent.out.insert(key, value);
            }
            None => return Ok(value),
        }
    }

    Ok(Value::Object(Map::new()))
}
