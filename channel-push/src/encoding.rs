//! Percent-encoding used by the push server
//!
//! The server decodes requests the way PHP's `urlencode` encodes them: every
//! byte outside `A-Z a-z 0-9 - _ . ~` is percent-escaped (including
//! `! ' ( ) *`), and a space becomes `+`. The same routine is used for the
//! signature base string and for each transmitted value, so both sides of the
//! signature check see identical bytes.

use url::form_urlencoded;

use crate::types::ParamValue;

/// Encode a string in the server's canonical form
pub fn canonical_encode(input: &str) -> String {
    // form_urlencoded leaves `*` bare and escapes `~`; the server expects the opposite.
    form_urlencoded::byte_serialize(input.as_bytes())
        .collect::<String>()
        .replace('*', "%2A")
        .replace("%7E", "~")
}

/// Serialize `key=value` pairs into a form body
///
/// Values are canonically encoded; keys are emitted as given. Pairs appear
/// in iteration order.
pub fn form_body<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a ParamValue)>,
{
    let mut body = String::new();
    for (key, value) in pairs {
        if !body.is_empty() {
            body.push('&');
        }
        body.push_str(key);
        body.push('=');
        body.push_str(&canonical_encode(&value.to_string()));
    }
    body
}
