//! Request signing and dispatch
//!
//! Signs the base headers, stamps the content length, and hands the
//! request to the transport. Results and errors propagate unchanged;
//! status interpretation happens in the adapter's operations.

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, HeaderName, HeaderValue};
use http::{HeaderMap, Method};
use tablio_auth::RequestSigner;
use tracing::debug;

use crate::error::{Error, Result};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

/// Sign and send a request
///
/// The signer sees the base headers as given, before the content
/// length is stamped. It returns one `"headerName:headerValue"` string,
/// split on the first colon; leading whitespace on the value is
/// trimmed before the header is merged.
pub async fn dispatch(
    signer: &dyn RequestSigner,
    transport: &dyn HttpTransport,
    method: Method,
    url: &str,
    body: Bytes,
    mut headers: HeaderMap,
) -> Result<HttpResponse> {
    let signed = signer.sign(&method, "", &headers)?;
    let (name, value) = split_signed_header(&signed)?;

    headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
    headers.insert(
        HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::InvalidHeader(e.to_string()))?,
        HeaderValue::from_str(value).map_err(|e| Error::InvalidHeader(e.to_string()))?,
    );

    debug!(%method, url, content_length = body.len(), "dispatching table request");

    transport
        .send(HttpRequest {
            method,
            url: url.to_string(),
            headers,
            body,
        })
        .await
}

fn split_signed_header(signed: &str) -> Result<(&str, &str)> {
    let (name, value) = signed.split_once(':').ok_or_else(|| {
        Error::InvalidHeader(format!("signer output has no name:value separator: {signed}"))
    })?;
    Ok((name, value.trim_start()))
}
