use shared_types::{ImageDetail, PromotionOutcome};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::config::PromotionConfig;
use crate::error::PromotionError;
use crate::traits::{ImageRegistry, ParameterStore};

/// Records a registry image tag as the current version held in a parameter.
///
/// The run is strictly sequential: read the current version, confirm the
/// image exists, overwrite the parameter. Every failure ends the run; nothing
/// is retried.
#[derive(Clone)]
pub struct Promoter {
    parameters: Arc<dyn ParameterStore>,
    registry: Arc<dyn ImageRegistry>,
}

impl Promoter {
    pub fn new(parameters: Arc<dyn ParameterStore>, registry: Arc<dyn ImageRegistry>) -> Self {
        Self {
            parameters,
            registry,
        }
    }

    #[instrument(
        skip_all,
        fields(parameter = %config.parameter_name(), image_version = %config.image_version)
    )]
    pub async fn promote(
        &self,
        config: &PromotionConfig,
    ) -> Result<PromotionOutcome, PromotionError> {
        config.validate()?;

        let previous_version = self.current_version(config).await?;
        info!("Current version: {}", previous_version);

        info!("Checking image in ECR...");
        let details = self.find_image(config).await?;
        for detail in &details {
            info!("Image was found in ECR: {}", detail);
        }

        let new_version = config.image_version.trim().to_string();
        if new_version == previous_version {
            warn!(
                "{} already holds {}, overwriting anyway",
                config.parameter_name(), new_version
            );
        }
        info!("New current SSM param: {}", new_version);

        let mut outcome = PromotionOutcome {
            parameter_name: config.parameter_name().to_string(),
            environment: config.environment.clone(),
            previous_version,
            new_version,
            updated: false,
            parameter_version: None,
        };

        if config.dry_run {
            info!("Dry run, leaving {} unchanged", config.parameter_name());
            return Ok(outcome);
        }

        let write = self
            .parameters
            .put_parameter(config.parameter_name(), &outcome.new_version)
            .await
            .map_err(|source| PromotionError::ParameterWrite {
                parameter: config.parameter_name().to_string(),
                source,
            })?;

        outcome.updated = true;
        outcome.parameter_version = write.version;

        info!("Update version COMPLETE!");
        info!("Trigger the deployment process...");
        Ok(outcome)
    }

    async fn current_version(&self, config: &PromotionConfig) -> Result<String, PromotionError> {
        let unsupported = |source| PromotionError::UnsupportedEnvironment {
            environment: config.environment_label().to_string(),
            parameter: config.parameter_name().to_string(),
            source,
        };

        match self.parameters.get_parameter(config.parameter_name()).await {
            Ok(Some(value)) if !value.trim().is_empty() => Ok(value),
            Ok(_) => {
                debug!("{} holds no value", config.parameter_name());
                Err(unsupported(None))
            }
            Err(err) => Err(unsupported(Some(err))),
        }
    }

    async fn find_image(
        &self,
        config: &PromotionConfig,
    ) -> Result<Vec<ImageDetail>, PromotionError> {
        let image = config.image();

        match self.registry.describe_image(&image).await {
            Ok(details) if !details.is_empty() => Ok(details),
            Ok(_) => Err(PromotionError::ImageNotFound {
                image,
                source: None,
            }),
            Err(err) => Err(PromotionError::ImageNotFound {
                image,
                source: Some(err),
            }),
        }
    }
}
