//! Process-local stand-ins for the parameter store and the registry.
//!
//! Both count the calls they receive and can be switched into failure modes,
//! which lets the promotion flow be exercised without AWS.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use shared_types::{ImageDetail, ImageRef};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use crate::traits::{ImageRegistry, ParameterStore, ParameterWrite};

#[derive(Debug, Clone)]
struct StoredParameter {
    value: String,
    version: i64,
}

#[derive(Default)]
pub struct InMemoryParameterStore {
    parameters: RwLock<HashMap<String, StoredParameter>>,
    fail_reads: AtomicBool,
    reject_writes: AtomicBool,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl InMemoryParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.get_mut().insert(
            name.into(),
            StoredParameter {
                value: value.into(),
                version: 1,
            },
        );
        self
    }

    /// Every read returns an error
    pub fn failing_reads(self) -> Self {
        self.fail_reads.store(true, Ordering::SeqCst);
        self
    }

    /// Every write is rejected and leaves the stored value untouched
    pub fn rejecting_writes(self) -> Self {
        self.reject_writes.store(true, Ordering::SeqCst);
        self
    }

    pub async fn value(&self, name: &str) -> Option<String> {
        self.parameters.read().await.get(name).map(|p| p.value.clone())
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ParameterStore for InMemoryParameterStore {
    async fn get_parameter(&self, name: &str) -> Result<Option<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            bail!("Failed to get parameter '{name}': access denied");
        }

        Ok(self.value(name).await)
    }

    async fn put_parameter(&self, name: &str, value: &str) -> Result<ParameterWrite> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.reject_writes.load(Ordering::SeqCst) {
            bail!("Failed to put parameter '{name}': write rejected");
        }

        let mut parameters = self.parameters.write().await;
        let version = parameters.get(name).map_or(1, |p| p.version + 1);
        parameters.insert(
            name.to_string(),
            StoredParameter {
                value: value.to_string(),
                version,
            },
        );
        debug!("Stored {} = {} (version {})", name, value, version);

        Ok(ParameterWrite {
            version: Some(version),
        })
    }
}

#[derive(Default)]
pub struct InMemoryRegistry {
    repositories: RwLock<HashMap<String, Vec<ImageDetail>>>,
    fail_queries: AtomicBool,
    queries: AtomicUsize,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty repository
    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repositories
            .get_mut()
            .entry(repository.into())
            .or_default();
        self
    }

    /// Push an image into `repository` under the given tags
    pub fn with_image(mut self, repository: impl Into<String>, tags: &[&str]) -> Self {
        let repository = repository.into();
        let images = self
            .repositories
            .get_mut()
            .entry(repository.clone())
            .or_default();
        let digest = format!("sha256:{:064x}", images.len() + 1);
        images.push(ImageDetail {
            repository,
            digest: Some(digest),
            tags: tags.iter().map(ToString::to_string).collect(),
            ..ImageDetail::default()
        });
        self
    }

    /// Every query returns an error
    pub fn failing_queries(self) -> Self {
        self.fail_queries.store(true, Ordering::SeqCst);
        self
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageRegistry for InMemoryRegistry {
    async fn describe_image(&self, image: &ImageRef) -> Result<Vec<ImageDetail>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_queries.load(Ordering::SeqCst) {
            bail!("Failed to describe images in '{}': throttled", image.repository);
        }

        let repositories = self.repositories.read().await;
        let images = repositories
            .get(&image.repository)
            .ok_or_else(|| anyhow!("Repository not found: {}", image.repository))?;

        let matching = images
            .iter()
            .filter(|detail| detail.has_tag(&image.tag))
            .cloned()
            .collect();
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_parameter_overwrite_bumps_version() {
        let store = InMemoryParameterStore::new().with_parameter("/env/svc/version", "v1");

        let write = store.put_parameter("/env/svc/version", "v2").await.unwrap();
        assert_eq!(write.version, Some(2));
        assert_eq!(store.value("/env/svc/version").await.as_deref(), Some("v2"));

        let write = store.put_parameter("/env/other", "v1").await.unwrap();
        assert_eq!(write.version, Some(1));
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test]
    async fn test_rejected_write_keeps_value() {
        let store = InMemoryParameterStore::new()
            .with_parameter("/p", "v1")
            .rejecting_writes();

        assert!(store.put_parameter("/p", "v2").await.is_err());
        assert_eq!(store.value("/p").await.as_deref(), Some("v1"));
    }

    #[tokio::test]
    async fn test_missing_parameter_reads_as_none() {
        let store = InMemoryParameterStore::new();
        assert_eq!(store.get_parameter("/absent").await.unwrap(), None);
        assert_eq!(store.read_count(), 1);
    }

    #[tokio::test]
    async fn test_registry_matches_exact_tag() {
        let registry = InMemoryRegistry::new()
            .with_image("svc", &["v1.2.0"])
            .with_image("svc", &["v1.2.3", "latest"]);

        let found = registry
            .describe_image(&ImageRef::new("svc", "v1.2.3"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].has_tag("latest"));

        let none = registry
            .describe_image(&ImageRef::new("svc", "v1.2"))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_repository_is_an_error() {
        let registry = InMemoryRegistry::new().with_repository("svc");

        assert!(registry
            .describe_image(&ImageRef::new("svc", "v1"))
            .await
            .unwrap()
            .is_empty());
        assert!(registry
            .describe_image(&ImageRef::new("other", "v1"))
            .await
            .is_err());
        assert_eq!(registry.query_count(), 2);
    }
}
