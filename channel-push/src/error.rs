//! Error types for the push API client

use serde_json::Value;

/// Result type for push client operations
pub type PushResult<T> = std::result::Result<T, PushError>;

/// Push client error types
#[derive(thiserror::Error, Debug)]
pub enum PushError {
    /// Caller input rejected before any network activity
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Internal invariant violated while building a request
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// No complete response was received: the connection failed before a
    /// status arrived, or the body stream broke off before its end
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body is not valid JSON
    #[error("Response parsing failed: {0}")]
    Parse(#[from] serde_json::Error),

    /// The server answered with a non-200 status
    #[error("Push error code: {code}, error msg: {message}, request id: {request_id}")]
    Api {
        /// HTTP status of the response
        status: u16,
        /// `error_code` from the body, or `Unknown`
        code: String,
        /// `error_msg` from the body, or `Unknown`
        message: String,
        /// `request_id` from the body, or `Unknown`
        request_id: String,
        /// The full parsed response body
        body: Value,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Option validation failures
///
/// Display strings follow the wording the server-side documentation uses for
/// argument errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Arguments error: {0} is must")]
    MissingField(String),

    #[error("Arguments error: invalid user_id, the length of user_id must be less than 257B")]
    InvalidUserId,

    #[error("Arguments error: invalid start, start must be equal or greater than 0 ")]
    InvalidStart,

    #[error("Arguments error: invalid limit, limit must be greater than 0 ")]
    InvalidLimit,

    #[error("Arguments error: invalid channel_id, type of value must be String")]
    InvalidChannelId,

    #[error("Arguments error: invalid push_type, type of push_type is 1, 2 or 3")]
    InvalidPushType,

    #[error("Arguments error: invalid device_type, type of device_type is 1, 2, 3, 4 or 5")]
    InvalidDeviceType,

    #[error("Arguments error: invalid message_type, type of message_type is 0 or 1")]
    InvalidMessageType,

    #[error("Arguments error: invalid tag, the length of tag must be less than 129B")]
    InvalidTag,

    #[error("Arguments error: invalid messages type of messages must be String")]
    InvalidMessages,

    #[error("Arguments error: invalid msg_keys, type of msg_keys must be String")]
    InvalidMsgKeys,

    #[error("Arguments error: invalid message_expires, type of message_expires must be String")]
    InvalidMessageExpires,
}

impl PushError {
    /// Check if the caller can reasonably try again
    ///
    /// Validation errors are fixed by correcting input; transport failures may
    /// clear up on their own. The client never retries by itself.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PushError::Validation(_) | PushError::Transport(_))
    }

    /// Get error category
    pub fn category(&self) -> PushErrorCategory {
        match self {
            PushError::Validation(_) => PushErrorCategory::Validation,
            PushError::Precondition(_) => PushErrorCategory::Precondition,
            PushError::Transport(_) => PushErrorCategory::Transport,
            PushError::Parse(_) => PushErrorCategory::Parse,
            PushError::Api { .. } => PushErrorCategory::Api,
            PushError::Configuration(_) => PushErrorCategory::Configuration,
            PushError::Io(_) => PushErrorCategory::IO,
        }
    }

    /// Server request id reported with an API error
    pub fn request_id(&self) -> Option<&str> {
        match self {
            PushError::Api { request_id, .. } => Some(request_id),
            _ => None,
        }
    }

    /// Parsed response body delivered alongside an API error
    pub fn response_body(&self) -> Option<&Value> {
        match self {
            PushError::Api { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Push error categories for handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushErrorCategory {
    Validation,
    Precondition,
    Transport,
    Parse,
    Api,
    Configuration,
    IO,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_categories() {
        let error = PushError::from(ValidationError::InvalidStart);
        assert_eq!(error.category(), PushErrorCategory::Validation);
        assert!(error.is_recoverable());

        let error = PushError::Precondition("path".to_string());
        assert_eq!(error.category(), PushErrorCategory::Precondition);
        assert!(!error.is_recoverable());

        let error = PushError::Configuration("empty host".to_string());
        assert_eq!(error.category(), PushErrorCategory::Configuration);
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_api_error_display() {
        let error = PushError::Api {
            status: 400,
            code: "110".to_string(),
            message: "bad sign".to_string(),
            request_id: "Unknown".to_string(),
            body: json!({"error_code": 110, "error_msg": "bad sign"}),
        };

        assert_eq!(
            error.to_string(),
            "Push error code: 110, error msg: bad sign, request id: Unknown"
        );
        assert_eq!(error.request_id(), Some("Unknown"));
        assert_eq!(error.response_body().unwrap()["error_code"], 110);
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_validation_messages_name_the_field() {
        let error = PushError::from(ValidationError::MissingField("user_id".to_string()));
        assert_eq!(error.to_string(), "Arguments error: user_id is must");

        assert!(ValidationError::InvalidTag.to_string().contains("tag"));
        assert!(ValidationError::InvalidPushType.to_string().contains("1, 2 or 3"));
    }
}
