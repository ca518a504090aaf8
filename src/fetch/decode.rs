//! Per-kind response decoding.
//!
//! The declared payload kind picks the target type at the call site; any
//! serde error is folded into [`FetchError::DecodeFailure`].

use crate::error::{FetchError, FetchResult};
use crate::models::{Character, House, ImageItem, MockResponse, Payload, PayloadKind};
use serde::de::DeserializeOwned;

/// Decode `body` into the payload declared by `kind`.
///
/// The HTTP status is not an input here: a 404 page that
/// happens to be valid JSON for the kind decodes like any other body.
pub fn decode(kind: PayloadKind, url: &str, body: &[u8]) -> FetchResult<Payload> {
    match kind {
        PayloadKind::Characters => {
            decode_json::<Vec<Character>>(kind, url, body).map(Payload::Characters)
        }
        PayloadKind::Houses => decode_json::<Vec<House>>(kind, url, body).map(Payload::Houses),
        PayloadKind::Images => {
            decode_json::<Vec<ImageItem>>(kind, url, body).map(Payload::Images)
        }
        PayloadKind::Mock => decode_json::<MockResponse>(kind, url, body).map(Payload::Mock),
        PayloadKind::None => Ok(Payload::None),
    }
}

fn decode_json<T: DeserializeOwned>(kind: PayloadKind, url: &str, body: &[u8]) -> FetchResult<T> {
    serde_json::from_slice(body).map_err(|e| FetchError::DecodeFailure {
        url: url.to_string(),
        expected: kind_name(kind),
        message: e.to_string(),
    })
}

fn kind_name(kind: PayloadKind) -> &'static str {
    match kind {
        PayloadKind::Characters => "characters",
        PayloadKind::Houses => "houses",
        PayloadKind::Images => "images",
        PayloadKind::Mock => "mock response",
        PayloadKind::None => "nothing",
    }
}
