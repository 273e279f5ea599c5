//! Secret lookup by id.

use async_trait::async_trait;
use aws_sdk_secretsmanager::error::SdkError;
use aws_sdk_secretsmanager::operation::get_secret_value::{
    GetSecretValueError, GetSecretValueOutput,
};
use thiserror::Error;

/// Errors produced by a [`SecretSource`].
#[derive(Debug, Error)]
pub enum SecretError {
    /// The secret does not exist or has no value.
    #[error("secret {0} not found")]
    NotFound(String),

    /// The secret store could not be reached or refused the request.
    #[error("secret store request failed: {0}")]
    Upstream(String),
}

/// Store of opaque secret blobs addressed by id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SecretSource: Send + Sync {
    /// Return the current value of secret `id`.
    async fn secret_bytes(&self, id: &str) -> Result<Vec<u8>, SecretError>;
}

/// [`SecretSource`] backed by AWS Secrets Manager (`AWSCURRENT` stage).
#[derive(Clone, Debug)]
pub struct SecretsManagerSource {
    client: aws_sdk_secretsmanager::Client,
}

impl SecretsManagerSource {
    pub fn new(client: aws_sdk_secretsmanager::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretSource for SecretsManagerSource {
    async fn secret_bytes(&self, id: &str) -> Result<Vec<u8>, SecretError> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(id)
            .send()
            .await
            .map_err(|e| classify(id, e))?;

        payload(&output).ok_or_else(|| SecretError::NotFound(id.to_owned()))
    }
}

/// Secret payload: `SecretBinary` when present, otherwise `SecretString`.
fn payload(output: &GetSecretValueOutput) -> Option<Vec<u8>> {
    output
        .secret_binary()
        .map(|b| b.as_ref().to_vec())
        .or_else(|| output.secret_string().map(|s| s.as_bytes().to_vec()))
}

fn classify(id: &str, err: SdkError<GetSecretValueError>) -> SecretError {
    match err.as_service_error() {
        Some(e) if e.is_resource_not_found_exception() => SecretError::NotFound(id.to_owned()),
        _ => SecretError::Upstream(err.to_string()),
    }
}
