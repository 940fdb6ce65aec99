//! Channels through which the metadata tree is read.

use std::future::Future;

use tracing::debug;

use crate::client::{meta_data_url, TOKEN_HEADER, TOKEN_PATH, TOKEN_TTL_HEADER};
use crate::error::MetadataError;
use crate::host::Target;

/// Result of fetching one metadata path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    /// The service returned a body (a listing or a leaf value), trimmed.
    Body(String),
    /// The service reported the path as not found.
    NotFound,
}

/// A way of talking to the instance metadata service.
///
/// Paths passed to [`fetch`](MetadataSource::fetch) are relative to the
/// `latest/meta-data` root; the empty path denotes the root listing.
pub trait MetadataSource {
    /// Request a fresh session token.
    fn token(&self) -> impl Future<Output = Result<String, MetadataError>>;

    /// Fetch a metadata path using `token`.
    fn fetch(
        &self,
        token: &str,
        path: &str,
    ) -> impl Future<Output = Result<Fetched, MetadataError>>;
}

/// Reads metadata by running `curl` on a [`Target`].
///
/// The metadata service is only reachable from the instance itself, so the
/// requests are issued from the target rather than from this process.
#[derive(Debug)]
pub struct CommandSource<'a, T> {
    target: &'a T,
    base_url: String,
    token_ttl: u64,
}

impl<'a, T: Target> CommandSource<'a, T> {
    /// Create a command source for `target` against the service at `base_url`.
    pub fn new(target: &'a T, base_url: &str, token_ttl: u64) -> Self {
        Self {
            target,
            base_url: base_url.trim_end_matches('/').to_string(),
            token_ttl,
        }
    }

    fn token_command(&self) -> String {
        format!(
            "curl -s -X PUT \"{}{}\" -H \"{}: {}\" 2>/dev/null",
            self.base_url, TOKEN_PATH, TOKEN_TTL_HEADER, self.token_ttl
        )
    }

    fn fetch_command(&self, token: &str, path: &str) -> String {
        format!(
            "curl -s -H \"{}: {}\" -v {} 2>/dev/null",
            TOKEN_HEADER,
            token,
            meta_data_url(&self.base_url, path)
        )
    }
}

impl<T: Target> MetadataSource for CommandSource<'_, T> {
    async fn token(&self) -> Result<String, MetadataError> {
        let token = self.target.execute(&self.token_command()).await?;
        Ok(token.trim().to_string())
    }

    async fn fetch(&self, token: &str, path: &str) -> Result<Fetched, MetadataError> {
        let data = self.target.execute(&self.fetch_command(token, path)).await?;
        let data = data.trim();

        // curl without -f prints the error page, so "404" anywhere in the
        // body is the only not-found signal available here.
        if data.contains("404") {
            debug!(path, "metadata path not found");
            return Ok(Fetched::NotFound);
        }
        Ok(Fetched::Body(data.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;
    use crate::shell::LocalShell;

    #[test]
    fn test_token_command() {
        let shell = LocalShell::new(Platform::Generic);
        let source = CommandSource::new(&shell, "http://169.254.169.254/", 21600);
        assert_eq!(
            source.token_command(),
            "curl -s -X PUT \"http://169.254.169.254/latest/api/token\" \
             -H \"X-aws-ec2-metadata-token-ttl-seconds: 21600\" 2>/dev/null"
        );
    }

    #[test]
    fn test_fetch_command() {
        let shell = LocalShell::new(Platform::Generic);
        let source = CommandSource::new(&shell, "http://169.254.169.254", 21600);
        assert_eq!(
            source.fetch_command("tok", "network/interfaces"),
            "curl -s -H \"X-aws-ec2-metadata-token: tok\" -v \
             http://169.254.169.254/latest/meta-data/network/interfaces 2>/dev/null"
        );
    }
}
