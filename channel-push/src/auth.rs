//! Request canonicalization and signing
//!
//! Signature algorithm:
//! `md5_hex(encode(METHOD + URL + k1=v1 + k2=v2 + ... + secret_key))`
//! where pairs are visited in ascending key order, values are raw (not
//! encoded) and `encode` is [`canonical_encode`].

use md5::{Digest, Md5};

use crate::encoding::canonical_encode;
use crate::types::{ParamValue, RequestParams};

/// Build the canonical form of a parameter mapping
///
/// Keys come out in ascending byte-wise order regardless of input order. On
/// duplicate keys the last value wins.
pub fn canonicalize<I, K, V>(params: I) -> RequestParams
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<ParamValue>,
{
    params.into_iter().collect()
}

/// Inputs of a request signature
#[derive(Debug, Clone, Copy)]
pub struct SignatureContext<'a> {
    /// HTTP method, e.g. `POST`
    pub http_method: &'a str,
    /// Full target URL, scheme and host included
    pub url: &'a str,
    /// Parameters in canonical order
    pub params: &'a RequestParams,
    secret_key: &'a str,
}

impl<'a> SignatureContext<'a> {
    pub fn new(http_method: &'a str, url: &'a str, params: &'a RequestParams, secret_key: &'a str) -> Self {
        Self {
            http_method,
            url,
            params,
            secret_key,
        }
    }

    /// Unencoded signature base string. Contains the secret key.
    fn base_string(&self) -> String {
        let mut base = String::new();
        base.push_str(self.http_method);
        base.push_str(self.url);
        for (key, value) in self.params {
            base.push_str(key);
            base.push('=');
            base.push_str(&value.to_string());
        }
        base.push_str(self.secret_key);
        base
    }

    /// Lowercase hex MD5 of the encoded base string
    pub fn signature(&self) -> String {
        let encoded = canonical_encode(&self.base_string());

        let mut hasher = Md5::new();
        hasher.update(encoded.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Compute the request signature
pub fn sign(http_method: &str, url: &str, params: &RequestParams, secret_key: &str) -> String {
    SignatureContext::new(http_method, url, params, secret_key).signature()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn query_params() -> RequestParams {
        canonicalize([
            ("user_id", ParamValue::from("1100801892847586532")),
            ("timestamp", ParamValue::from(1_400_000_000_i64)),
            ("method", ParamValue::from("query_bindlist")),
            ("apikey", ParamValue::from("ak")),
        ])
    }

    #[test]
    fn test_canonicalize_sorts_keys() {
        let params = query_params();
        let keys: Vec<_> = params.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["apikey", "method", "timestamp", "user_id"]);
    }

    #[test]
    fn test_canonicalize_is_byte_wise() {
        let params = canonicalize([("b", "1"), ("B", "2"), ("_x", "3"), ("a", "4")]);
        let keys: Vec<_> = params.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["B", "_x", "a", "b"]);
    }

    #[test]
    fn test_base_string_layout() {
        let params = canonicalize([("a", "1")]);
        let context = SignatureContext::new("POST", "http://h/p", &params, "s");
        assert_eq!(context.base_string(), "POSThttp://h/pa=1s");
    }

    #[test]
    fn test_known_signatures() {
        let params = query_params();
        assert_eq!(
            sign("POST", "http://channel.api.duapp.com/rest/2.0/channel/channel", &params, "sk"),
            "9fe589095b43ec67677c7163cc73ffb5"
        );

        let params = canonicalize([("a", "1")]);
        assert_eq!(sign("POST", "http://h/p", &params, "s"), "b823f81fd2f14a126706da229e2de4d4");
    }

    #[test]
    fn test_signature_changes_with_any_value() {
        let one = canonicalize([("a", "1")]);
        let two = canonicalize([("a", "2")]);
        assert_eq!(sign("POST", "http://h/p", &two, "s"), "39d0cc12e18a11faea44e9ac5f8f59e4");
        assert_ne!(sign("POST", "http://h/p", &one, "s"), sign("POST", "http://h/p", &two, "s"));
        assert_ne!(sign("POST", "http://h/p", &one, "s"), sign("POST", "http://h/p", &one, "t"));
        assert_ne!(sign("POST", "http://h/p", &one, "s"), sign("GET", "http://h/p", &one, "s"));
    }

    proptest! {
        #[test]
        fn prop_canonical_keys_strictly_ascending(
            entries in prop::collection::vec(("[a-z_]{1,8}", "[ -~]{0,16}"), 0..16)
        ) {
            let params = canonicalize(entries);
            let keys: Vec<_> = params.keys().collect();
            prop_assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
        }

        #[test]
        fn prop_canonicalize_is_idempotent(
            entries in prop::collection::vec(("[a-z_]{1,8}", "[ -~]{0,16}"), 0..16)
        ) {
            let once = canonicalize(entries);
            let twice = canonicalize(once.clone());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_signature_is_deterministic(
            entries in prop::collection::vec(("[a-z_]{1,8}", ".{0,16}"), 0..8),
            secret in "[a-zA-Z0-9]{1,32}"
        ) {
            let params = canonicalize(entries);
            let first = sign("POST", "http://h/rest/2.0/channel/channel", &params, &secret);
            let second = sign("POST", "http://h/rest/2.0/channel/channel", &params.clone(), &secret);
            prop_assert_eq!(first.len(), 32);
            prop_assert_eq!(first, second);
        }
    }
}
