//! Channel Push API client
//!
//! This crate talks to the Channel push-notification REST API. Every call is a
//! signed, form-encoded `POST`; responses are JSON.
//!
//! Pipeline for each operation:
//! - validate the caller's options ([`validation`])
//! - inject `method`, `apikey` and `timestamp` and keep keys in canonical order ([`auth`])
//! - sign with the secret key and send ([`api`])
//! - classify the response by HTTP status and body fields ([`error`])
//!
//! Diagnostics are emitted through `tracing`; without a subscriber they go nowhere.

use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use secrecy::ExposeSecret;

pub mod error;
pub mod types;
pub mod config;
pub mod encoding;
pub mod auth;
pub mod validation;
pub mod api;

pub use error::{PushError, PushErrorCategory, PushResult, ValidationError};
pub use types::*;
pub use config::{APIConfig, Credentials, PushConfig};

use types::json_text;

/// Client for the push API
///
/// Holds credentials and host for its whole lifetime. Calls are independent;
/// the only state shared between them is the last request id, which is
/// overwritten by whichever call finishes last.
#[derive(Debug)]
pub struct PushClient {
    /// Credentials used for `apikey` and signing
    credentials: Credentials,
    /// Configuration
    config: PushConfig,
    /// HTTP executor
    api: api::APIClient,
    /// `request_id` of the most recent response
    last_request_id: Arc<RwLock<Option<String>>>,
}

impl PushClient {
    /// Create new push client
    pub fn new(credentials: Credentials, config: PushConfig) -> PushResult<Self> {
        config.validate().map_err(PushError::Configuration)?;
        let api = api::APIClient::new(&config)?;

        tracing::debug!(host = %config.host, "push client created");

        Ok(Self {
            credentials,
            config,
            api,
            last_request_id: Arc::new(RwLock::new(None)),
        })
    }

    /// Create a client from `BAE_ENV_AK`, `BAE_ENV_SK` and `BAE_ENV_ADDR_CHANNEL`
    pub fn from_env() -> PushResult<Self> {
        Self::new(Credentials::from_env()?, PushConfig::from_env())
    }

    /// Target host
    pub fn host(&self) -> &str {
        &self.config.host
    }

    /// Get configuration
    pub fn config(&self) -> &PushConfig {
        &self.config
    }

    /// `request_id` reported by the most recent response, if any
    pub async fn last_request_id(&self) -> Option<String> {
        self.last_request_id.read().await.clone()
    }

    /// Query the devices bound to a user
    ///
    /// Requires `user_id`. The request goes to `/rest/2.0/channel/{channel_id}`,
    /// or `/rest/2.0/channel/channel` when no channel id is given.
    pub async fn query_bind_list(&self, options: &QueryBindListOptions) -> PushResult<Value> {
        self.call(
            ApiMethod::QueryBindList,
            options.to_params(),
            &options.required_fields(),
            &options.path(),
        )
        .await
    }

    /// Push messages
    ///
    /// Requires `push_type`, `messages` and `msg_keys`; also `user_id` for
    /// push type 1 and `tag` for push type 2.
    pub async fn push_msg(&self, options: &PushMsgOptions) -> PushResult<Value> {
        self.call(
            ApiMethod::PushMsg,
            options.to_params(),
            &options.required_fields(),
            &options.path(),
        )
        .await
    }

    async fn call(
        &self,
        method: ApiMethod,
        mut params: RequestParams,
        required: &[&str],
        path: &str,
    ) -> PushResult<Value> {
        validation::validate(&params, required)?;

        params.insert("method", method.as_str());
        params.insert("apikey", self.credentials.access_key.as_str());
        params.insert("timestamp", chrono::Utc::now().timestamp());

        let result = self
            .api
            .execute(
                &params,
                path,
                self.credentials.secret_key.expose_secret(),
                &self.config.host,
            )
            .await;

        let request_id = match &result {
            Ok(envelope) => envelope.request_id.clone(),
            Err(PushError::Api { body, .. }) => json_text(body.get("request_id")),
            Err(_) => None,
        };
        *self.last_request_id.write().await = request_id;

        match result {
            Ok(envelope) => {
                tracing::debug!(%method, request_id = ?envelope.request_id, "push call succeeded");
                Ok(envelope.body)
            }
            Err(e) => {
                tracing::debug!(%method, error = %e, "push call failed");
                Err(e)
            }
        }
    }
}
