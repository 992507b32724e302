//! HTTP execution of signed push API requests

use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use std::iter;
use std::time::Duration;

use crate::auth;
use crate::config::PushConfig;
use crate::encoding::form_body;
use crate::types::{json_text, ParamValue, RequestParams, ResponseEnvelope};
use crate::{PushError, PushResult};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const UNKNOWN: &str = "Unknown";

/// HTTP client that signs, sends and interprets push API requests
///
/// One request per call: no retries, no batching. Each call either yields a
/// parsed success body or a classified [`PushError`].
#[derive(Debug, Clone)]
pub struct APIClient {
    client: Client,
    scheme: String,
    enable_logging: bool,
}

impl APIClient {
    /// Create new API client
    pub fn new(config: &PushConfig) -> PushResult<Self> {
        let mut builder = Client::builder().user_agent(config.api.user_agent.as_str());
        if let Some(timeout_ms) = config.api.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            scheme: config.scheme.clone(),
            enable_logging: config.api.enable_logging,
        })
    }

    /// Sign `params`, POST them to `host` + `path` and interpret the response
    ///
    /// `params` must already contain `method`; the signature is computed over
    /// them in canonical order and appended to the body as `sign`.
    pub async fn execute(
        &self,
        params: &RequestParams,
        path: &str,
        secret_key: &str,
        host: &str,
    ) -> PushResult<ResponseEnvelope> {
        let has_method = params
            .get("method")
            .is_some_and(|method| !method.to_string().is_empty());
        if !has_method {
            return Err(PushError::Precondition("request method is missing".to_string()));
        }
        if path.is_empty() {
            return Err(PushError::Precondition("request path is missing".to_string()));
        }
        if secret_key.is_empty() {
            return Err(PushError::Precondition("secret key is missing".to_string()));
        }

        // A caller-supplied `sign` is replaced, never signed or sent.
        let mut params = params.clone();
        params.remove("sign");

        let url = format!("{}://{}{}", self.scheme, host, path);
        let sign = ParamValue::Text(auth::sign("POST", &url, &params, secret_key));

        let body = form_body(
            params
                .iter()
                .map(|(key, value)| (key.as_str(), value))
                .chain(iter::once(("sign", &sign))),
        );

        if self.enable_logging {
            tracing::debug!(%url, body_len = body.len(), %body, "sending push request");
        }

        let mut response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header(CONTENT_LENGTH, body.len())
            .body(body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(%url, error = %e, "push request failed before a response arrived");
                PushError::Transport(e)
            })?;

        let status = response.status().as_u16();
        if self.enable_logging {
            tracing::debug!(status, headers = ?response.headers(), "push response received");
        }

        let mut raw = Vec::new();
        // A body cut off mid-stream is reported with the same variant as a
        // failed connection: either way no complete response was received.
        while let Some(chunk) = response.chunk().await.map_err(|e| {
            tracing::warn!(%url, status, error = %e, "push response body interrupted");
            PushError::Transport(e)
        })? {
            raw.extend_from_slice(&chunk);
        }

        if self.enable_logging {
            tracing::debug!(body = %String::from_utf8_lossy(&raw), "push response body");
        }

        let body: Value = serde_json::from_slice(&raw)?;
        interpret_response(status, body)
    }
}

/// Classify a parsed response by its HTTP status
///
/// Status 200 is success. Anything else becomes [`PushError::Api`] built from
/// `error_code`, `error_msg` and `request_id`, each defaulting to `Unknown`.
/// The request id is only taken from the body when `error_msg` is present,
/// matching the error reports existing callers already parse.
pub fn interpret_response(status: u16, body: Value) -> PushResult<ResponseEnvelope> {
    let request_id = json_text(body.get("request_id"));

    if status == 200 {
        return Ok(ResponseEnvelope {
            status,
            body,
            request_id,
        });
    }

    let code = json_text(body.get("error_code")).unwrap_or_else(|| UNKNOWN.to_string());
    let message = json_text(body.get("error_msg"));
    let reported_request_id = match message {
        Some(_) => request_id.unwrap_or_else(|| UNKNOWN.to_string()),
        None => UNKNOWN.to_string(),
    };

    tracing::debug!(status, %code, request_id = %reported_request_id, "push API returned an error");

    Err(PushError::Api {
        status,
        code,
        message: message.unwrap_or_else(|| UNKNOWN.to_string()),
        request_id: reported_request_id,
        body,
    })
}
