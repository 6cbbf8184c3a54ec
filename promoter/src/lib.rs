pub mod backend;
mod config;
mod error;
#[cfg(any(test, feature = "testing"))]
pub mod memory;
mod promote;
mod traits;

pub use config::{
    PromotionConfig, ENV_ENVIRONMENT, ENV_IMAGE_VERSION, ENV_PARAMETER_NAME, ENV_REPOSITORY,
};
pub use error::PromotionError;
pub use promote::Promoter;
pub use traits::{ImageRegistry, ParameterStore, ParameterWrite};
