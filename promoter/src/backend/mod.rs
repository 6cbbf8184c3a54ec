mod ecr_public;
mod ssm;

use aws_config::BehaviorVersion;
use tracing::info;

pub use ecr_public::{image_detail_from_sdk, EcrPublicRegistry};
pub use ssm::SsmParameterStore;

/// ECR Public only serves its API from this region.
pub const DEFAULT_REGISTRY_REGION: &str = "us-east-1";

pub struct AwsClients {
    pub parameters: SsmParameterStore,
    pub registry: EcrPublicRegistry,
}

/// Build both clients from the default AWS credential and region chain.
/// The registry client is pinned to `registry_region`.
pub async fn load_aws_clients(registry_region: &str) -> AwsClients {
    let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    info!(
        "Loaded AWS config (region: {:?}, registry region: {})",
        sdk_config.region(),
        registry_region
    );

    AwsClients {
        parameters: SsmParameterStore::new(&sdk_config),
        registry: EcrPublicRegistry::new(&sdk_config, registry_region),
    }
}
