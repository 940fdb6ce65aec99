//! AWS instance metadata collector.

use serde_json::Value;
use tracing::info;

use crate::client::{MetadataClient, DEFAULT_BASE_URL};
use crate::error::MetadataError;
use crate::host::{RunContext, Target};
use crate::platform::Platform;
use crate::source::{CommandSource, Fetched, MetadataSource};
use crate::tree;

/// Run context key the metadata tree is stored under.
pub const CONTEXT_KEY: &str = "AWS_Instance";

/// Token TTL requested from the metadata service, in seconds.
pub const DEFAULT_TOKEN_TTL: u64 = 21600;

/// Collects the AWS instance metadata tree and attaches it to a run.
///
/// By default requests are issued as `curl` commands on the target. When the
/// target is an AWS instance and a [`MetadataClient`] has been supplied with
/// [`with_direct_client`](AwsMeta::with_direct_client), the service is
/// queried directly over HTTP instead.
///
/// # Example
///
/// ```ignore
/// use serde_json::Map;
/// use wa_plugins::{AwsMeta, LocalShell, Platform};
///
/// let target = LocalShell::new(Platform::Generic);
/// let mut context = Map::new();
/// AwsMeta::new().initialize(&target, &mut context).await?;
/// println!("{}", context["AWS_Instance"]["instance-id"]);
/// ```
#[derive(Debug, Clone)]
pub struct AwsMeta {
    base_url: String,
    token_ttl: u64,
    direct: Option<MetadataClient>,
}

impl AwsMeta {
    /// Create a collector for the default link-local metadata service.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a collector for a metadata service at `base_url`.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token_ttl: DEFAULT_TOKEN_TTL,
            direct: None,
        }
    }

    /// Set the TTL, in seconds, requested for the session token used by the
    /// command channel.
    pub fn with_token_ttl(mut self, seconds: u64) -> Self {
        self.token_ttl = seconds;
        self
    }

    /// Query the service directly through `client` when the target is an AWS
    /// instance.
    pub fn with_direct_client(mut self, client: MetadataClient) -> Self {
        self.direct = Some(client);
        self
    }

    /// Get the metadata service base URL used by the command channel.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Collect the metadata tree and store it in `context` under
    /// [`CONTEXT_KEY`].
    ///
    /// # Errors
    ///
    /// Returns any error raised while running commands on the target or
    /// talking to the metadata service. Nothing is written to `context` in
    /// that case.
    pub async fn initialize<T, C>(&self, target: &T, context: &mut C) -> Result<(), MetadataError>
    where
        T: Target,
        C: RunContext,
    {
        let metadata = self.collect(target).await?;
        context.add_metadata(CONTEXT_KEY, metadata);
        Ok(())
    }

    /// Collect the metadata tree without attaching it anywhere.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::NotFound` if the root listing itself is
    /// missing, and propagates channel errors.
    pub async fn collect<T: Target>(&self, target: &T) -> Result<Value, MetadataError> {
        match (target.platform(), &self.direct) {
            (Platform::Aws { instance_id }, Some(client)) => {
                info!(%instance_id, "fetching AWS metadata directly");
                describe(client).await
            }
            _ => {
                info!("fetching AWS metadata");
                let source = CommandSource::new(target, &self.base_url, self.token_ttl);
                describe(&source).await
            }
        }
    }
}

impl Default for AwsMeta {
    fn default() -> Self {
        Self::new()
    }
}

async fn describe<S: MetadataSource>(source: &S) -> Result<Value, MetadataError> {
    let token = source.token().await?;
    match source.fetch(&token, "").await? {
        Fetched::Body(listing) => tree::walk(source, &token, &listing).await,
        Fetched::NotFound => Err(MetadataError::NotFound),
    }
}
