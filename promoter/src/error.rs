use shared_types::ImageRef;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PromotionError {
    #[error("Missing environment variables: {}", .missing.join(", "))]
    MissingConfig { missing: Vec<&'static str> },

    #[error("This app is not supported in this environment: {environment}")]
    UnsupportedEnvironment {
        environment: String,
        parameter: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("Image {} not found in ECR.", .image.tag)]
    ImageNotFound {
        image: ImageRef,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("Failed to put a new version to {parameter}")]
    ParameterWrite {
        parameter: String,
        #[source]
        source: anyhow::Error,
    },
}
