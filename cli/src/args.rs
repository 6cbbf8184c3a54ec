use clap::builder::BoolishValueParser;
use clap::{Parser, ValueEnum};
use promoter::backend::DEFAULT_REGISTRY_REGION;
use promoter::{
    PromotionConfig, ENV_ENVIRONMENT, ENV_IMAGE_VERSION, ENV_PARAMETER_NAME, ENV_REPOSITORY,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Promote a container image tag: confirm it exists in ECR Public, then
/// record it as the current version in an SSM parameter.
#[derive(Debug, Parser)]
#[command(name = "promote-image", version)]
pub struct Args {
    /// ECR Public repository name
    #[arg(long, env = ENV_REPOSITORY)]
    pub repository: Option<String>,

    /// Image tag to validate and promote
    #[arg(long, env = ENV_IMAGE_VERSION)]
    pub image_version: Option<String>,

    /// SSM parameter holding the current version
    #[arg(long, env = ENV_PARAMETER_NAME)]
    pub parameter_name: Option<String>,

    /// Environment label used in error messages
    #[arg(long, env = ENV_ENVIRONMENT)]
    pub environment: Option<String>,

    #[arg(long, env = "ECR_PUBLIC_REGION", default_value = DEFAULT_REGISTRY_REGION)]
    pub registry_region: String,

    /// Check the parameter and the image, but do not write
    #[arg(long, env = "PROMOTE_DRY_RUN", value_parser = BoolishValueParser::new())]
    pub dry_run: bool,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

impl Args {
    /// Required fields left unset become empty strings and are caught by
    /// `PromotionConfig::validate`.
    pub fn promotion_config(&self) -> PromotionConfig {
        let config = PromotionConfig::new(
            self.repository.clone().unwrap_or_default(),
            self.image_version.clone().unwrap_or_default(),
            self.parameter_name.clone().unwrap_or_default(),
        )
        .with_dry_run(self.dry_run);

        match &self.environment {
            Some(environment) => config.with_environment(environment.clone()),
            None => config,
        }
    }
}

/// Exit status for an argument error. Help and version output are not
/// failures; every other parse error exits 1 like the rest of the binary.
pub fn parse_error_exit_code(err: &clap::Error) -> u8 {
    u8::from(err.use_stderr())
}
