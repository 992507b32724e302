//! Option validation
//!
//! Runs before a request is built: required fields must be present, and every
//! known field that is present must have the right type and range. Fields not
//! listed as required are optional and only checked when supplied. The first
//! violation is reported.

use crate::error::ValidationError;
use crate::types::{ParamValue, RequestParams};

const MAX_USER_ID_BYTES: usize = 256;
const MAX_TAG_BYTES: usize = 128;
const PUSH_TYPES: [i64; 3] = [1, 2, 3];
const DEVICE_TYPES: [i64; 5] = [1, 2, 3, 4, 5];
const MESSAGE_TYPES: [i64; 2] = [0, 1];

/// Validate request options against the field rules
pub fn validate(options: &RequestParams, required: &[&str]) -> Result<(), ValidationError> {
    for field in required {
        if !options.contains_key(field) {
            return Err(ValidationError::MissingField((*field).to_string()));
        }
    }

    check(options, "user_id", ValidationError::InvalidUserId, |v| {
        text_within(v, MAX_USER_ID_BYTES)
    })?;
    check(options, "start", ValidationError::InvalidStart, |v| {
        v.as_i64().is_some_and(|n| n >= 0)
    })?;
    check(options, "limit", ValidationError::InvalidLimit, |v| {
        v.as_i64().is_some_and(|n| n > 0)
    })?;
    check(options, "channel_id", ValidationError::InvalidChannelId, is_text)?;
    check(options, "push_type", ValidationError::InvalidPushType, |v| {
        one_of(v, &PUSH_TYPES)
    })?;
    check(options, "device_type", ValidationError::InvalidDeviceType, |v| {
        one_of(v, &DEVICE_TYPES)
    })?;
    check(options, "message_type", ValidationError::InvalidMessageType, |v| {
        one_of(v, &MESSAGE_TYPES)
    })?;
    check(options, "tag", ValidationError::InvalidTag, |v| {
        text_within(v, MAX_TAG_BYTES)
    })?;
    check(options, "messages", ValidationError::InvalidMessages, is_text)?;
    check(options, "msg_keys", ValidationError::InvalidMsgKeys, is_text)?;
    check(options, "message_expires", ValidationError::InvalidMessageExpires, is_text)?;

    Ok(())
}

fn check<F>(options: &RequestParams, field: &str, error: ValidationError, rule: F) -> Result<(), ValidationError>
where
    F: Fn(&ParamValue) -> bool,
{
    match options.get(field) {
        Some(value) if !rule(value) => {
            tracing::debug!(field, "option rejected");
            Err(error)
        }
        _ => Ok(()),
    }
}

fn is_text(value: &ParamValue) -> bool {
    value.as_str().is_some()
}

fn text_within(value: &ParamValue, max_bytes: usize) -> bool {
    value.as_str().is_some_and(|s| s.len() <= max_bytes)
}

fn one_of(value: &ParamValue, allowed: &[i64]) -> bool {
    value.as_i64().is_some_and(|n| allowed.contains(&n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PushMsgOptions, QueryBindListOptions};

    fn params<const N: usize>(entries: [(&str, ParamValue); N]) -> RequestParams {
        entries.into_iter().collect()
    }

    #[test]
    fn test_missing_required_field() {
        let err = validate(&RequestParams::new(), &["user_id"]).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("user_id".to_string()));
    }

    #[test]
    fn test_user_id_length() {
        let long = params([("user_id", "x".repeat(257).into())]);
        assert_eq!(validate(&long, &[]), Err(ValidationError::InvalidUserId));

        let max = params([("user_id", "x".repeat(256).into())]);
        assert!(validate(&max, &[]).is_ok());

        let multibyte = params([("user_id", "漢".repeat(86).into())]);
        assert_eq!(validate(&multibyte, &[]), Err(ValidationError::InvalidUserId));
    }

    #[test]
    fn test_numeric_ranges() {
        assert_eq!(
            validate(&params([("start", (-1).into())]), &[]),
            Err(ValidationError::InvalidStart)
        );
        assert!(validate(&params([("start", 0.into())]), &[]).is_ok());
        assert_eq!(
            validate(&params([("limit", 0.into())]), &[]),
            Err(ValidationError::InvalidLimit)
        );
        assert!(validate(&params([("limit", 1.into())]), &[]).is_ok());
    }

    #[test]
    fn test_enumerations() {
        assert_eq!(
            validate(&params([("push_type", 4.into())]), &[]),
            Err(ValidationError::InvalidPushType)
        );
        assert_eq!(
            validate(&params([("push_type", 0.into())]), &[]),
            Err(ValidationError::InvalidPushType)
        );
        assert_eq!(
            validate(&params([("device_type", 6.into())]), &[]),
            Err(ValidationError::InvalidDeviceType)
        );
        assert_eq!(
            validate(&params([("message_type", 2.into())]), &[]),
            Err(ValidationError::InvalidMessageType)
        );
        assert!(validate(&params([("message_type", 0.into())]), &[]).is_ok());
    }

    #[test]
    fn test_type_checks() {
        assert_eq!(
            validate(&params([("push_type", "1".into())]), &[]),
            Err(ValidationError::InvalidPushType)
        );
        assert_eq!(
            validate(&params([("channel_id", 42.into())]), &[]),
            Err(ValidationError::InvalidChannelId)
        );
        assert_eq!(
            validate(&params([("messages", 1.into())]), &[]),
            Err(ValidationError::InvalidMessages)
        );
        assert_eq!(
            validate(&params([("msg_keys", 1.into())]), &[]),
            Err(ValidationError::InvalidMsgKeys)
        );
        assert_eq!(
            validate(&params([("message_expires", 86400.into())]), &[]),
            Err(ValidationError::InvalidMessageExpires)
        );
        assert_eq!(
            validate(&params([("tag", "t".repeat(129).into())]), &[]),
            Err(ValidationError::InvalidTag)
        );
    }

    #[test]
    fn test_required_check_runs_first() {
        let options = params([("push_type", 9.into())]);
        assert_eq!(
            validate(&options, &["messages"]),
            Err(ValidationError::MissingField("messages".to_string()))
        );
    }

    #[test]
    fn test_fully_valid_options() {
        let query = QueryBindListOptions::new("1100801892847586532")
            .with_device_type(3)
            .with_range(0, 10)
            .with_channel_id("4385427462549216411");
        assert!(validate(&query.to_params(), &query.required_fields()).is_ok());

        let push = PushMsgOptions::new(2, r#"["m"]"#, r#"["k"]"#)
            .with_tag("news")
            .with_message_type(1)
            .with_message_expires("86400");
        assert!(validate(&push.to_params(), &push.required_fields()).is_ok());
    }

    #[test]
    fn test_push_type_dependent_requirements() {
        let single = PushMsgOptions::new(1, "[]", "[]");
        assert_eq!(
            validate(&single.to_params(), &single.required_fields()),
            Err(ValidationError::MissingField("user_id".to_string()))
        );

        let tagged = PushMsgOptions::new(2, "[]", "[]");
        assert_eq!(
            validate(&tagged.to_params(), &tagged.required_fields()),
            Err(ValidationError::MissingField("tag".to_string()))
        );

        let broadcast = PushMsgOptions::new(3, "[]", "[]");
        assert!(validate(&broadcast.to_params(), &broadcast.required_fields()).is_ok());
    }
}
