//! Request signing for the SolisCloud platform API.
//!
//! Every request carries three headers derived from the body and the request
//! time:
//!
//! ```text
//! Content-MD5:   hex(md5(body))
//! Date:          Fri, 16 Oct 2026 12:34:56 GMT
//! Authorization: API {key_id}:base64(hmac-sha1(key_secret, string_to_sign))
//! ```
//!
//! where `string_to_sign` is `POST\n{content_md5}\napplication/json\n{date}\n{path}`.

use std::fmt;

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use sha1::Sha1;

use crate::error::SigningError;

type HmacSha1 = Hmac<Sha1>;

/// The content type that takes part in the signature. The request itself is
/// sent with a `;charset=UTF-8` suffix which is not signed.
const SIGNED_CONTENT_TYPE: &str = "application/json";
const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// API key pair issued by SolisCloud.
#[derive(Clone)]
pub struct Credentials {
    key_id: String,
    key_secret: String,
}

impl Credentials {
    pub fn new(key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            key_secret: key_secret.into(),
        }
    }
}

// credentials must never end up in a log line
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key_id", &"<redacted>")
            .field("key_secret", &"<redacted>")
            .finish()
    }
}

/// Header values to attach to one signed request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedHeaders {
    pub content_md5: String,
    pub date: String,
    pub authorization: String,
}

/// Sign a POST request to `path` carrying `body` at time `timestamp`.
///
/// Identical inputs always produce identical headers.
pub fn sign(
    credentials: &Credentials,
    path: &str,
    body: &[u8],
    timestamp: DateTime<Utc>,
) -> Result<SignedHeaders, SigningError> {
    let content_md5 = hex_encode(&Md5::digest(body));
    let date = timestamp.format(DATE_FORMAT).to_string();
    let string_to_sign = format!("POST\n{content_md5}\n{SIGNED_CONTENT_TYPE}\n{date}\n{path}");

    let mut mac = HmacSha1::new_from_slice(credentials.key_secret.as_bytes())
        .map_err(|_| SigningError::InvalidKey)?;
    mac.update(string_to_sign.as_bytes());
    let signature = general_purpose::STANDARD.encode(mac.finalize().into_bytes());

    Ok(SignedHeaders {
        content_md5,
        date,
        authorization: format!("API {}:{}", credentials.key_id, signature),
    })
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
