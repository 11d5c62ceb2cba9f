//! Adapter configuration

use serde::{Deserialize, Serialize};

/// Configuration for a [`TableAdapter`](crate::TableAdapter)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Storage account name; determines the service hostname
    pub account: String,
    /// Endpoint override for emulators and tests; when unset the
    /// canonical `https://{account}.table.core.windows.net` is used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl AdapterConfig {
    /// Create a config for the given storage account
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            endpoint: None,
        }
    }

    /// Override the service endpoint
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Base URL all resource URLs are derived from
    #[must_use]
    pub fn base_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://{}.table.core.windows.net", self.account),
        }
    }
}
