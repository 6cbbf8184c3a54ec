use anyhow::Result;
use async_trait::async_trait;
use shared_types::{ImageDetail, ImageRef};

/// Acknowledgement of a parameter write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterWrite {
    pub version: Option<i64>,
}

#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Read a string parameter. `Ok(None)` when it does not exist or has no value.
    async fn get_parameter(&self, name: &str) -> Result<Option<String>>;

    /// Overwrite a string parameter unconditionally; last writer wins.
    async fn put_parameter(&self, name: &str, value: &str) -> Result<ParameterWrite>;
}

#[async_trait]
pub trait ImageRegistry: Send + Sync {
    /// Descriptors of the images carrying exactly `image.tag`.
    /// Empty when the registry reports no such image.
    async fn describe_image(&self, image: &ImageRef) -> Result<Vec<ImageDetail>>;
}
