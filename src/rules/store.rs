//! Rule table storage.
//!
//! Reads the rule table from any `object_store` backend: S3 in production,
//! a local directory for development, in-memory for tests. Nothing is
//! cached; every call to [`RuleStore::load`] re-reads the object.

use std::sync::Arc;

use object_store::{path::Path, GetOptions, ObjectStore};
use thiserror::Error;

use crate::config::RulesConfig;
use crate::rules::matcher::{find_by_endpoint, find_rule, LookupKey};
use crate::rules::rule::EndpointRule;

/// Failure to produce a usable rule table.
#[derive(Debug, Error)]
pub enum RuleLoadError {
    #[error("failed to create rule store: {0}")]
    Setup(String),

    #[error("failed to fetch {key}: {source}")]
    Fetch {
        key: String,
        #[source]
        source: object_store::Error,
    },

    #[error("rule table is not valid UTF-8: {0}")]
    NotUtf8(#[from] std::str::Utf8Error),

    #[error("rule table is not a valid rule list: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Handle to the stored rule table.
#[derive(Clone)]
pub struct RuleStore {
    inner: Arc<dyn ObjectStore>,
    key: Path,
}

impl std::fmt::Debug for RuleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleStore")
            .field("store", &self.inner.to_string())
            .field("key", &self.key.as_ref())
            .finish()
    }
}

impl RuleStore {
    /// Wrap an existing object store.
    pub fn new(inner: Arc<dyn ObjectStore>, key: impl AsRef<str>) -> Self {
        Self {
            inner,
            key: Path::from(key.as_ref()),
        }
    }

    /// Build the backing store described by the configuration.
    pub fn from_config(config: &RulesConfig) -> Result<Self, RuleLoadError> {
        let inner: Arc<dyn ObjectStore> = match &config.local_dir {
            Some(dir) => Arc::new(
                object_store::local::LocalFileSystem::new_with_prefix(dir).map_err(|e| {
                    RuleLoadError::Setup(format!(
                        "failed to open local rule directory {}: {}",
                        dir.display(),
                        e
                    ))
                })?,
            ),
            None => {
                let mut builder = object_store::aws::AmazonS3Builder::from_env()
                    .with_bucket_name(&config.bucket);

                if let Some(region) = &config.region {
                    builder = builder.with_region(region);
                }
                if let Some(endpoint) = &config.endpoint {
                    builder = builder
                        .with_endpoint(endpoint)
                        .with_allow_http(endpoint.starts_with("http://"));
                }

                Arc::new(builder.build().map_err(|e| {
                    RuleLoadError::Setup(format!("failed to create S3 client: {}", e))
                })?)
            }
        };

        tracing::debug!(key = %config.key, local = config.local_dir.is_some(), "Rule store configured");
        Ok(Self::new(inner, &config.key))
    }

    /// Object key of the rule table.
    pub fn key(&self) -> &str {
        self.key.as_ref()
    }

    /// Fetch and decode the whole rule table.
    pub async fn load(&self) -> Result<Vec<EndpointRule>, RuleLoadError> {
        let result = self
            .inner
            .get_opts(&self.key, GetOptions::default())
            .await
            .map_err(|source| RuleLoadError::Fetch {
                key: self.key.to_string(),
                source,
            })?;
        let bytes = result.bytes().await.map_err(|source| RuleLoadError::Fetch {
            key: self.key.to_string(),
            source,
        })?;

        let content = std::str::from_utf8(&bytes)?;
        let rules: Vec<EndpointRule> = serde_json::from_str(content)?;

        tracing::debug!(key = %self.key, rules = rules.len(), "Rule table loaded");
        Ok(rules)
    }

    /// Load the table and return the first rule matching `key`.
    pub async fn lookup(&self, key: &LookupKey) -> Result<Option<EndpointRule>, RuleLoadError> {
        let rules = self.load().await?;
        Ok(find_rule(&rules, key).cloned())
    }

    /// Load the table and return the first rule for `endpoint`, any method.
    pub async fn lookup_endpoint(
        &self,
        endpoint: &str,
    ) -> Result<Option<EndpointRule>, RuleLoadError> {
        let rules = self.load().await?;
        Ok(find_by_endpoint(&rules, endpoint).cloned())
    }
}
