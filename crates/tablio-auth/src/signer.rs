//! SharedKeyLite request signing
//!
//! The table service authenticates requests with an HMAC-SHA256
//! signature over the request date and the canonicalized resource,
//! carried in the `Authorization` header as
//! `SharedKeyLite {account}:{base64 signature}`.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use http::{HeaderMap, Method};
use sha2::Sha256;

use crate::credentials::StorageCredentials;
use crate::error::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// Capability that signs outgoing requests
///
/// Implementations return a single `"headerName:headerValue"` string;
/// the dispatcher splits on the first colon and merges the header into
/// the request. Constructed once per adapter; must be safe to share
/// across concurrent calls.
pub trait RequestSigner: Send + Sync {
    fn sign(
        &self,
        method: &Method,
        canonicalized_resource: &str,
        headers: &HeaderMap,
    ) -> Result<String, AuthError>;
}

/// SharedKeyLite signer for the table service
pub struct SharedKeyLiteSigner {
    credentials: StorageCredentials,
}

impl SharedKeyLiteSigner {
    /// Create a signer over the given account credentials
    #[must_use]
    pub fn new(credentials: StorageCredentials) -> Self {
        Self { credentials }
    }

    /// Canonicalized resource for a request path against this account
    #[must_use]
    pub fn canonical_resource(&self, path: &str) -> String {
        format!("/{}{}", self.credentials.account(), path)
    }
}

impl RequestSigner for SharedKeyLiteSigner {
    fn sign(
        &self,
        _method: &Method,
        canonicalized_resource: &str,
        headers: &HeaderMap,
    ) -> Result<String, AuthError> {
        let date = headers
            .get("x-ms-date")
            .ok_or(AuthError::MissingDateHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidHeaderValue)?;

        let string_to_sign = format!("{date}\n{canonicalized_resource}");
        let key = self.credentials.decoded_key()?;
        let signature = BASE64.encode(hmac_sha256(&key, string_to_sign.as_bytes()));

        Ok(format!(
            "Authorization: SharedKeyLite {}:{}",
            self.credentials.account(),
            signature
        ))
    }
}

/// Calculate HMAC-SHA256
fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}
