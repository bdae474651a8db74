/**
 * Lock API Client
 *
 * Typed HTTP client for the lock endpoint. One method per verb; every
 * request carries the configured timeout, so no call can hang. A timed-out
 * acquire surfaces as `ClientError::Network` and must be treated as failed.
 */

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::client::config::ClientConfig;
use crate::client::error::ClientError;
use crate::shared::{
    AcquireLockRequest, LockErrorResponse, LockIdentity, LockOperationResponse, LockStatus,
};

/// HTTP client for one lock server
#[derive(Debug, Clone)]
pub struct LockApiClient {
    config: ClientConfig,
    client: Client,
}

impl LockApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(config.request_timeout()).build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// GET: current lock state as seen by `requester_id`
    pub async fn check(&self, resource_id: &str, requester_id: &str) -> Result<LockStatus, ClientError> {
        let response = self
            .client
            .get(self.config.lock_url(resource_id)?)
            .query(&[("requesterId", requester_id)])
            .send()
            .await?;
        decode(response).await
    }

    /// POST: acquire, optionally overriding the requester's own lock
    pub async fn acquire(
        &self,
        resource_id: &str,
        requester_id: &str,
        identity: &LockIdentity,
        override_lock: bool,
    ) -> Result<LockStatus, ClientError> {
        let response = self
            .client
            .post(self.config.lock_url(resource_id)?)
            .json(&AcquireLockRequest::new(requester_id, identity, override_lock))
            .send()
            .await?;
        status_of(decode(response).await?)
    }

    /// PUT: extend the requester's lease
    pub async fn refresh(&self, resource_id: &str, requester_id: &str) -> Result<LockStatus, ClientError> {
        let response = self
            .client
            .put(self.config.lock_url(resource_id)?)
            .query(&[("requesterId", requester_id)])
            .send()
            .await?;
        status_of(decode(response).await?)
    }

    /// DELETE: release the lock
    pub async fn release(&self, resource_id: &str, requester_id: &str) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(self.config.lock_url(resource_id)?)
            .query(&[("requesterId", requester_id)])
            .send()
            .await?;
        let _: LockOperationResponse = decode(response).await?;
        Ok(())
    }
}

/// Decode a success body as `T`, or an error body as `ClientError`
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let body = response.text().await.unwrap_or_else(|_| status.to_string());
    match serde_json::from_str::<LockErrorResponse>(&body) {
        Ok(error) => Err(error.into()),
        Err(_) => Err(ClientError::UnexpectedResponse {
            status: status.as_u16(),
            body,
        }),
    }
}

fn status_of(response: LockOperationResponse) -> Result<LockStatus, ClientError> {
    response.lock_status.ok_or_else(|| ClientError::UnexpectedResponse {
        status: 200,
        body: "missing lockStatus".to_string(),
    })
}
