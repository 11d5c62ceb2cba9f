//! Table storage adapter facade
//!
//! Composes the envelope builder, signer and transport into the four
//! storage operations. Each call is one synchronous round trip: build
//! the request, sign, send, translate the outcome. The adapter holds
//! no mutable state; the timestamp every request is stamped with is
//! captured once at construction, so repeated calls within one adapter
//! lifetime use the same instant.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::header::{CONTENT_TYPE, IF_MATCH};
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use tablio_atom::{Entity, EntityKey, entry_document, parse_entry};
use tablio_auth::RequestSigner;
use tracing::debug;

use crate::config::AdapterConfig;
use crate::dispatch::dispatch;
use crate::error::{Error, Result};
use crate::transport::{HttpResponse, HttpTransport};

/// Storage adapter for the table service
pub struct TableAdapter {
    config: AdapterConfig,
    signer: Arc<dyn RequestSigner>,
    transport: Arc<dyn HttpTransport>,
    timestamp: DateTime<Utc>,
}

impl TableAdapter {
    /// Create an adapter, capturing the current instant as its clock
    #[must_use]
    pub fn new(
        config: AdapterConfig,
        signer: Arc<dyn RequestSigner>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self::with_timestamp(config, signer, transport, Utc::now())
    }

    /// Create an adapter with an injected clock
    #[must_use]
    pub fn with_timestamp(
        config: AdapterConfig,
        signer: Arc<dyn RequestSigner>,
        transport: Arc<dyn HttpTransport>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            config,
            signer,
            transport,
            timestamp,
        }
    }

    /// Partial updates are not supported; update overwrites
    #[must_use]
    pub fn supports_partial_updates(&self) -> bool {
        false
    }

    /// Composite primary keys are supported
    #[must_use]
    pub fn supports_composite_primary_keys(&self) -> bool {
        true
    }

    /// Every entity requires the two-component composite key
    #[must_use]
    pub fn requires_composite_primary_keys(&self) -> bool {
        true
    }

    /// Insert a new entity into `table`
    pub async fn insert(&self, table: &str, key: &EntityKey, data: &Entity) -> Result<()> {
        let body = entry_document(self.timestamp, None, key, data)?;
        let url = self.table_url(table);
        let response = self
            .dispatch(Method::POST, &url, Bytes::from(body), self.base_headers()?)
            .await?;
        expect_success(&response)
    }

    /// Overwrite the entity at `key` in `table`
    ///
    /// The envelope's `id` carries the entity's resource URL and the
    /// request goes out with `If-Match: *`; no optimistic-concurrency
    /// check is made.
    pub async fn update(&self, table: &str, key: &EntityKey, data: &Entity) -> Result<()> {
        let url = self.entity_url(table, key);
        let body = entry_document(self.timestamp, Some(&url), key, data)?;
        let mut headers = self.base_headers()?;
        headers.insert(IF_MATCH, HeaderValue::from_static("*"));
        let response = self
            .dispatch(Method::POST, &url, Bytes::from(body), headers)
            .await?;
        expect_success(&response)
    }

    /// Delete the entity at `key` in `table`
    pub async fn delete(&self, table: &str, key: &EntityKey) -> Result<()> {
        let url = self.entity_url(table, key);
        let response = self
            .dispatch(Method::DELETE, &url, Bytes::new(), self.base_headers()?)
            .await?;
        if response.status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound { resource: url });
        }
        expect_success(&response)
    }

    /// Fetch the entity at `key` in `table`
    ///
    /// Returns the full entity, key fields included. A missing entity
    /// is [`Error::NotFound`], never an empty entity.
    pub async fn find(&self, table: &str, key: &EntityKey) -> Result<Entity> {
        let url = self.entity_url(table, key);
        let response = self
            .dispatch(Method::GET, &url, Bytes::new(), self.base_headers()?)
            .await?;
        if response.status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound { resource: url });
        }
        if !response.status.is_success() {
            return Err(unexpected_status(&response));
        }

        let body = std::str::from_utf8(&response.body)
            .map_err(|_| tablio_atom::WireError::malformed("response body is not valid utf-8"))?;
        let entity = parse_entry(body)?;
        debug!(%url, properties = entity.len(), "parsed entity from find response");
        Ok(entity)
    }

    async fn dispatch(
        &self,
        method: Method,
        url: &str,
        body: Bytes,
        headers: HeaderMap,
    ) -> Result<HttpResponse> {
        dispatch(
            self.signer.as_ref(),
            self.transport.as_ref(),
            method,
            url,
            body,
            headers,
        )
        .await
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.config.base_url(), table)
    }

    fn entity_url(&self, table: &str, key: &EntityKey) -> String {
        format!(
            "{}/{}(PartitionKey='{}', RowKey='{}')",
            self.config.base_url(),
            table,
            escape_key_literal(&key.partition_key),
            escape_key_literal(&key.row_key),
        )
    }

    fn base_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/atom+xml"));
        headers.insert(
            HeaderName::from_static("x-ms-date"),
            HeaderValue::from_str(&format_request_date(self.timestamp))
                .map_err(|e| Error::InvalidHeader(e.to_string()))?,
        );
        Ok(headers)
    }
}

/// Quote key literals for the keyed resource URL; embedded single
/// quotes are doubled
fn escape_key_literal(component: &str) -> String {
    component.replace('\'', "''")
}

/// RFC 1123 date the service expects in `x-ms-date`
fn format_request_date(t: DateTime<Utc>) -> String {
    t.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn expect_success(response: &HttpResponse) -> Result<()> {
    if response.status.is_success() {
        Ok(())
    } else {
        Err(unexpected_status(response))
    }
}

fn unexpected_status(response: &HttpResponse) -> Error {
    Error::UnexpectedStatus {
        status: response.status,
        body: response.text(),
    }
}
