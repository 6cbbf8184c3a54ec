use anyhow::Result;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ecrpublic::config::Region;
use aws_sdk_ecrpublic::operation::describe_images::DescribeImagesError;
use aws_sdk_ecrpublic::types::{ImageDetail as SdkImageDetail, ImageIdentifier};
use aws_sdk_ecrpublic::Client;
use chrono::{DateTime, Utc};
use shared_types::{ImageDetail, ImageRef};
use tracing::{debug, instrument};

use crate::traits::ImageRegistry;

pub struct EcrPublicRegistry {
    client: Client,
}

impl EcrPublicRegistry {
    pub fn new(sdk_config: &SdkConfig, region: &str) -> Self {
        let config = aws_sdk_ecrpublic::config::Builder::from(sdk_config)
            .region(Region::new(region.to_string()))
            .build();
        Self::from_client(Client::from_conf(config))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageRegistry for EcrPublicRegistry {
    #[instrument(skip(self))]
    async fn describe_image(&self, image: &ImageRef) -> Result<Vec<ImageDetail>> {
        debug!("Describing image: {}", image);

        let result = self
            .client
            .describe_images()
            .repository_name(&image.repository)
            .image_ids(ImageIdentifier::builder().image_tag(&image.tag).build())
            .send()
            .await;

        match result {
            Ok(output) => Ok(output
                .image_details()
                .iter()
                .map(image_detail_from_sdk)
                .collect()),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(DescribeImagesError::is_image_not_found_exception) =>
            {
                debug!("Registry reports no image for {}", image);
                Ok(Vec::new())
            }
            Err(err) => Err(anyhow::Error::new(err)
                .context(format!("Failed to describe images in '{}'", image.repository))),
        }
    }
}

pub fn image_detail_from_sdk(detail: &SdkImageDetail) -> ImageDetail {
    ImageDetail {
        repository: detail.repository_name().unwrap_or_default().to_string(),
        digest: detail.image_digest().map(str::to_string),
        tags: detail.image_tags().to_vec(),
        size_bytes: detail.image_size_in_bytes(),
        pushed_at: detail
            .image_pushed_at()
            .and_then(|t| DateTime::<Utc>::from_timestamp(t.secs(), t.subsec_nanos())),
        media_type: detail.image_manifest_media_type().map(str::to_string),
    }
}
