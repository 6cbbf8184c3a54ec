use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ssm::operation::get_parameter::GetParameterError;
use aws_sdk_ssm::types::ParameterType;
use aws_sdk_ssm::Client;
use tracing::{debug, info, instrument};

use crate::traits::{ParameterStore, ParameterWrite};

pub struct SsmParameterStore {
    client: Client,
}

impl SsmParameterStore {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self::from_client(Client::new(sdk_config))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ParameterStore for SsmParameterStore {
    #[instrument(skip(self))]
    async fn get_parameter(&self, name: &str) -> Result<Option<String>> {
        debug!("Reading parameter: {}", name);

        let result = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(true)
            .send()
            .await;

        match result {
            Ok(output) => Ok(output
                .parameter()
                .and_then(|p| p.value())
                .map(str::to_string)),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(GetParameterError::is_parameter_not_found) =>
            {
                debug!("Parameter {} does not exist", name);
                Ok(None)
            }
            Err(err) => {
                Err(anyhow::Error::new(err).context(format!("Failed to get parameter '{name}'")))
            }
        }
    }

    #[instrument(skip(self))]
    async fn put_parameter(&self, name: &str, value: &str) -> Result<ParameterWrite> {
        let output = self
            .client
            .put_parameter()
            .name(name)
            .value(value)
            .r#type(ParameterType::String)
            .overwrite(true)
            .send()
            .await
            .with_context(|| format!("Failed to put parameter '{name}'"))?;

        let version = output.version();
        info!("Stored parameter {} as version {}", name, version);
        Ok(ParameterWrite {
            version: Some(version),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_ssm::operation::get_parameter::GetParameterOutput;
    use aws_sdk_ssm::operation::put_parameter::{PutParameterError, PutParameterOutput};
    use aws_sdk_ssm::types::error::{ParameterNotFound, TooManyUpdates};
    use aws_sdk_ssm::types::Parameter;
    use aws_smithy_mocks::{mock, mock_client};

    const PARAM: &str = "/env/svc/version";

    #[tokio::test]
    async fn test_get_parameter_returns_value() {
        let rule = mock!(Client::get_parameter)
            .match_requests(|req| req.name() == Some(PARAM) && req.with_decryption() == Some(true))
            .then_output(|| {
                GetParameterOutput::builder()
                    .parameter(Parameter::builder().name(PARAM).value("v1.2.0").build())
                    .build()
            });
        let store = SsmParameterStore::from_client(mock_client!(aws_sdk_ssm, [&rule]));

        let value = store.get_parameter(PARAM).await.unwrap();
        assert_eq!(value.as_deref(), Some("v1.2.0"));
        assert_eq!(rule.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_parameter_not_found_reads_as_none() {
        let rule = mock!(Client::get_parameter).then_error(|| {
            GetParameterError::ParameterNotFound(ParameterNotFound::builder().build())
        });
        let store = SsmParameterStore::from_client(mock_client!(aws_sdk_ssm, [&rule]));

        assert_eq!(store.get_parameter(PARAM).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_parameter_overwrites_string_parameter() {
        let rule = mock!(Client::put_parameter)
            .match_requests(|req| {
                req.name() == Some(PARAM)
                    && req.value() == Some("v1.2.3")
                    && req.overwrite() == Some(true)
                    && req.r#type() == Some(&ParameterType::String)
            })
            .then_output(|| PutParameterOutput::builder().version(4).build());
        let store = SsmParameterStore::from_client(mock_client!(aws_sdk_ssm, [&rule]));

        let write = store.put_parameter(PARAM, "v1.2.3").await.unwrap();
        assert_eq!(write.version, Some(4));
        assert_eq!(rule.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_put_parameter_error_is_reported() {
        let rule = mock!(Client::put_parameter).then_error(|| {
            PutParameterError::TooManyUpdates(TooManyUpdates::builder().build())
        });
        let store = SsmParameterStore::from_client(mock_client!(aws_sdk_ssm, [&rule]));

        let err = store.put_parameter(PARAM, "v1.2.3").await.unwrap_err();
        assert!(err.to_string().contains("Failed to put parameter '/env/svc/version'"));
    }
}
