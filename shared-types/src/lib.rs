use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A container image addressed by repository name and tag
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ImageRef {
    pub repository: String,
    pub tag: String,
}

impl ImageRef {
    pub fn new(repository: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            tag: tag.into(),
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}

/// Descriptor of one image as reported by the registry
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageDetail {
    pub repository: String,
    pub digest: Option<String>,
    pub tags: Vec<String>,
    pub size_bytes: Option<i64>,
    pub pushed_at: Option<DateTime<Utc>>,
    pub media_type: Option<String>,
}

impl ImageDetail {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

impl fmt::Display for ImageDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.repository)?;
        if let Some(digest) = &self.digest {
            write!(f, "@{digest}")?;
        }
        if !self.tags.is_empty() {
            write!(f, " [{}]", self.tags.join(", "))?;
        }
        Ok(())
    }
}

/// Result of a promotion run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromotionOutcome {
    pub parameter_name: String,
    pub environment: Option<String>,
    pub previous_version: String,
    pub new_version: String,
    /// False when the write was skipped (dry run)
    pub updated: bool,
    /// Parameter version reported by the store after the write
    pub parameter_version: Option<i64>,
}

impl PromotionOutcome {
    pub fn changed(&self) -> bool {
        self.previous_version != self.new_version
    }
}
