//! Storage account credentials

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use crate::error::AuthError;

/// Account name plus base64-encoded access key
#[derive(Clone)]
pub struct StorageCredentials {
    account: String,
    access_key: String,
}

impl StorageCredentials {
    /// Create credentials from an account name and its base64 access key
    pub fn new(account: impl Into<String>, access_key: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            access_key: access_key.into(),
        }
    }

    /// Read credentials from `TABLIO_ACCOUNT` / `TABLIO_ACCESS_KEY`
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let account = std::env::var("TABLIO_ACCOUNT").ok()?;
        let access_key = std::env::var("TABLIO_ACCESS_KEY").ok()?;
        Some(Self::new(account, access_key))
    }

    /// The storage account name
    #[must_use]
    pub fn account(&self) -> &str {
        &self.account
    }

    /// Decode the access key into its raw bytes
    pub fn decoded_key(&self) -> Result<Vec<u8>, AuthError> {
        BASE64
            .decode(&self.access_key)
            .map_err(|e| AuthError::InvalidAccountKey(e.to_string()))
    }
}

// Keep the key out of debug output.
impl std::fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("account", &self.account)
            .field("access_key", &"<redacted>")
            .finish()
    }
}
