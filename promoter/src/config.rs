use shared_types::ImageRef;

use crate::error::PromotionError;

pub const ENV_REPOSITORY: &str = "ECR_REPOSITORY";
pub const ENV_IMAGE_VERSION: &str = "IMAGE_VERSION";
pub const ENV_PARAMETER_NAME: &str = "SSM_PARAMETER_NAME";
pub const ENV_ENVIRONMENT: &str = "ENVIRONMENT";

/// Inputs of a single promotion run.
///
/// `repository`, `image_version` and `parameter_name` are required; an empty
/// or whitespace-only value counts as missing. `environment` only labels
/// error messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromotionConfig {
    pub repository: String,
    pub image_version: String,
    pub parameter_name: String,
    pub environment: Option<String>,
    pub dry_run: bool,
}

impl PromotionConfig {
    pub fn new(
        repository: impl Into<String>,
        image_version: impl Into<String>,
        parameter_name: impl Into<String>,
    ) -> Self {
        Self {
            repository: repository.into(),
            image_version: image_version.into(),
            parameter_name: parameter_name.into(),
            environment: None,
            dry_run: false,
        }
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Names of the environment variables backing each missing required field
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            (ENV_REPOSITORY, &self.repository),
            (ENV_IMAGE_VERSION, &self.image_version),
            (ENV_PARAMETER_NAME, &self.parameter_name),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn validate(&self) -> Result<(), PromotionError> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PromotionError::MissingConfig { missing })
        }
    }

    pub fn image(&self) -> ImageRef {
        ImageRef::new(self.repository.trim(), self.image_version.trim())
    }

    /// Parameter key as sent to the store
    pub fn parameter_name(&self) -> &str {
        self.parameter_name.trim()
    }

    pub fn environment_label(&self) -> &str {
        self.environment
            .as_deref()
            .map(str::trim)
            .filter(|env| !env.is_empty())
            .unwrap_or("unknown")
    }
}
