//! Type definitions for the push API client

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use crate::PushResult;

/// Production API host
pub const DEFAULT_HOST: &str = "channel.api.duapp.com";

/// Path prefix shared by every REST call
pub const COMMON_PATH: &str = "/rest/2.0/channel/";

/// Path segment used when no channel id is addressed
pub const DEFAULT_CHANNEL: &str = "channel";

/// Remote method names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiMethod {
    #[serde(rename = "query_bindlist")]
    QueryBindList,
    #[serde(rename = "push_msg")]
    PushMsg,
}

impl ApiMethod {
    /// Wire name sent in the `method` parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiMethod::QueryBindList => "query_bindlist",
            ApiMethod::PushMsg => "push_msg",
        }
    }
}

impl fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single request parameter value
///
/// The API distinguishes textual and numeric fields; validation checks the
/// variant, and both render to the same text in the signature and the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(i64),
    Text(String),
}

impl ParamValue {
    /// Text content, if this is a textual value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            ParamValue::Number(_) => None,
        }
    }

    /// Numeric content, if this is a numeric value
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            ParamValue::Text(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(n) => write!(f, "{n}"),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Number(i64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Number(i64::from(value))
    }
}

/// Request parameters keyed by name
///
/// Backed by an ordered map, so iteration always visits keys in ascending
/// byte-wise order. That order feeds the signature base string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestParams(BTreeMap<String, ParamValue>);

impl RequestParams {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Option<ParamValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Set a parameter only when a value is present
    pub fn insert_opt<V: Into<ParamValue>>(&mut self, key: &str, value: Option<V>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    /// Look up a parameter
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// Check whether a parameter is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Remove a parameter
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.0.remove(key)
    }

    /// Copy every entry of `other` over this set; `other` wins on conflicts
    pub fn merge(&mut self, other: &RequestParams) {
        for (key, value) in other {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Iterate in canonical key order
    pub fn iter(&self) -> btree_map::Iter<'_, String, ParamValue> {
        self.0.iter()
    }

    /// Iterate keys in canonical order
    pub fn keys(&self) -> btree_map::Keys<'_, String, ParamValue> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for RequestParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = RequestParams::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

impl<'a> IntoIterator for &'a RequestParams {
    type Item = (&'a String, &'a ParamValue);
    type IntoIter = btree_map::Iter<'a, String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for RequestParams {
    type Item = (String, ParamValue);
    type IntoIter = btree_map::IntoIter<String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Options for querying a user's device binding list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryBindListOptions {
    /// User id, at most 256 bytes (required)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Device type, 1 to 5
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<i64>,
    /// Start position, server default 0
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    /// Number of entries, server default 10
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    /// Channel id; also selects the request path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    /// Additional server parameters passed through untouched
    #[serde(flatten)]
    pub extra: RequestParams,
}

impl QueryBindListOptions {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    pub fn with_device_type(mut self, device_type: i64) -> Self {
        self.device_type = Some(device_type);
        self
    }

    pub fn with_range(mut self, start: i64, limit: i64) -> Self {
        self.start = Some(start);
        self.limit = Some(limit);
        self
    }

    pub fn with_channel_id(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = Some(channel_id.into());
        self
    }

    /// Fields that must be present
    pub fn required_fields(&self) -> Vec<&'static str> {
        vec!["user_id"]
    }

    /// Request path for this query, taken from the merged `channel_id`
    pub fn path(&self) -> String {
        let params = self.to_params();
        let channel = params
            .get("channel_id")
            .map(ToString::to_string)
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| DEFAULT_CHANNEL.to_string());
        format!("{COMMON_PATH}{channel}")
    }

    /// Merge the passthrough parameters with the typed fields, typed fields winning
    pub fn to_params(&self) -> RequestParams {
        let mut params = self.extra.clone();
        params.insert_opt("user_id", self.user_id.clone());
        params.insert_opt("device_type", self.device_type);
        params.insert_opt("start", self.start);
        params.insert_opt("limit", self.limit);
        params.insert_opt("channel_id", self.channel_id.clone());
        params
    }
}

/// Options for pushing messages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushMsgOptions {
    /// Audience: 1 single user, 2 tag, 3 everyone (required)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_type: Option<i64>,
    /// JSON-encoded list of messages (required)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<String>,
    /// JSON-encoded list of message keys (required)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_keys: Option<String>,
    /// Target user, required when `push_type` is 1
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Target tag, required when `push_type` is 2
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<i64>,
    /// 0 message, 1 notification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_type: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_expires: Option<String>,
    /// Additional server parameters passed through untouched
    #[serde(flatten)]
    pub extra: RequestParams,
}

impl PushMsgOptions {
    /// Options with the three always-required fields
    pub fn new(push_type: i64, messages: impl Into<String>, msg_keys: impl Into<String>) -> Self {
        Self {
            push_type: Some(push_type),
            messages: Some(messages.into()),
            msg_keys: Some(msg_keys.into()),
            ..Self::default()
        }
    }

    /// Build options from message and key lists, serializing each list as a JSON array
    pub fn from_lists<M, K>(push_type: i64, messages: &[M], msg_keys: &[K]) -> PushResult<Self>
    where
        M: Serialize,
        K: Serialize,
    {
        Ok(Self::new(
            push_type,
            serde_json::to_string(messages)?,
            serde_json::to_string(msg_keys)?,
        ))
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_device_type(mut self, device_type: i64) -> Self {
        self.device_type = Some(device_type);
        self
    }

    pub fn with_message_type(mut self, message_type: i64) -> Self {
        self.message_type = Some(message_type);
        self
    }

    pub fn with_message_expires(mut self, message_expires: impl Into<String>) -> Self {
        self.message_expires = Some(message_expires.into());
        self
    }

    /// Fields that must be present; depends on the push type
    pub fn required_fields(&self) -> Vec<&'static str> {
        let mut must = vec!["push_type", "messages", "msg_keys"];
        match self.push_type {
            Some(1) => must.push("user_id"),
            Some(2) => must.push("tag"),
            _ => {}
        }
        must
    }

    /// Request path; pushes always go to the shared channel endpoint
    pub fn path(&self) -> String {
        format!("{COMMON_PATH}{DEFAULT_CHANNEL}")
    }

    /// Merge the passthrough parameters with the typed fields, typed fields winning
    pub fn to_params(&self) -> RequestParams {
        let mut params = self.extra.clone();
        params.insert_opt("push_type", self.push_type);
        params.insert_opt("messages", self.messages.clone());
        params.insert_opt("msg_keys", self.msg_keys.clone());
        params.insert_opt("user_id", self.user_id.clone());
        params.insert_opt("tag", self.tag.clone());
        params.insert_opt("channel_id", self.channel_id.clone());
        params.insert_opt("device_type", self.device_type);
        params.insert_opt("message_type", self.message_type);
        params.insert_opt("message_expires", self.message_expires.clone());
        params
    }
}

/// Status and parsed body of a completed request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// HTTP status code
    pub status: u16,
    /// Parsed JSON body
    pub body: Value,
    /// `request_id` carried by the body, if any
    pub request_id: Option<String>,
}

/// Render a JSON scalar the way string concatenation would
pub(crate) fn json_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
