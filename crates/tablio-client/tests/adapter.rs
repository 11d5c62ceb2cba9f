//! End-to-end adapter tests against a request-capturing transport

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use http::{HeaderMap, Method, StatusCode};
use tablio_client::{
    AdapterConfig, AuthError, Entity, EntityKey, Error, HttpRequest, HttpResponse, HttpTransport,
    PropertyValue, RequestSigner, SharedKeyLiteSigner, StorageCredentials, TableAdapter,
};

const BASE: &str = "https://acct.table.core.windows.net";

struct MockTransport {
    requests: Mutex<Vec<HttpRequest>>,
    responses: Mutex<VecDeque<HttpResponse>>,
}

impl MockTransport {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            responses: Mutex::new(VecDeque::new()),
        })
    }

    fn respond_with(&self, status: StatusCode, body: &str) {
        self.responses.lock().unwrap().push_back(HttpResponse {
            status,
            headers: HeaderMap::new(),
            body: Bytes::from(body.to_string()),
        });
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn only_request(&self) -> HttpRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1);
        requests.into_iter().next().unwrap()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
        self.requests.lock().unwrap().push(request);
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(HttpResponse {
                status: StatusCode::NO_CONTENT,
                headers: HeaderMap::new(),
                body: Bytes::new(),
            }))
    }
}

/// Signer with a fixed output; the leading space after the colon
/// exercises the dispatcher's value trim.
struct FixedSigner;

impl RequestSigner for FixedSigner {
    fn sign(
        &self,
        _method: &Method,
        _resource: &str,
        _headers: &HeaderMap,
    ) -> Result<String, AuthError> {
        Ok("Authorization: SharedKeyLite acct:c2lnbmF0dXJl".to_string())
    }
}

fn fixed_clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

fn adapter(transport: Arc<MockTransport>) -> TableAdapter {
    TableAdapter::with_timestamp(
        AdapterConfig::new("acct"),
        Arc::new(FixedSigner),
        transport,
        fixed_clock(),
    )
}

fn person_key() -> EntityKey {
    EntityKey::new("p1", "r1")
}

fn header<'a>(request: &'a HttpRequest, name: &str) -> &'a str {
    request
        .headers
        .get(name)
        .unwrap_or_else(|| panic!("missing header {name}"))
        .to_str()
        .unwrap()
}

#[tokio::test]
async fn insert_builds_expected_request() {
    let transport = MockTransport::new();
    let data = Entity::new().with("Age", 30);
    adapter(transport.clone())
        .insert("Person", &person_key(), &data)
        .await
        .unwrap();

    let request = transport.only_request();
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.url, format!("{BASE}/Person"));
    assert_eq!(header(&request, "content-type"), "application/atom+xml");
    assert_eq!(header(&request, "x-ms-date"), "Mon, 01 Jan 2024 12:00:00 GMT");
    assert_eq!(
        header(&request, "authorization"),
        "SharedKeyLite acct:c2lnbmF0dXJl"
    );
    assert_eq!(
        header(&request, "content-length"),
        request.body.len().to_string()
    );
    assert!(request.headers.get("if-match").is_none());

    let body = std::str::from_utf8(&request.body).unwrap();
    assert!(body.contains("<d:PartitionKey>p1</d:PartitionKey>"));
    assert!(body.contains("<d:RowKey>r1</d:RowKey>"));
    assert!(body.contains("<d:Age m:type=\"Edm.Int32\">30</d:Age>"));
    assert!(body.contains("<id/>"));
    assert!(body.contains("<updated>2024-01-01T12:00:00.0000000Z</updated>"));
}

#[tokio::test]
async fn update_targets_keyed_url_with_if_match() {
    let transport = MockTransport::new();
    let data = Entity::new().with("Age", 31);
    adapter(transport.clone())
        .update("Person", &person_key(), &data)
        .await
        .unwrap();

    let request = transport.only_request();
    assert_eq!(request.method, Method::POST);
    assert_eq!(
        request.url,
        format!("{BASE}/Person(PartitionKey='p1', RowKey='r1')")
    );
    assert_eq!(header(&request, "if-match"), "*");

    // The envelope's id element is the entity's own resource URL.
    let body = std::str::from_utf8(&request.body).unwrap();
    assert!(body.contains("<id>"));
    assert!(body.contains("Person(PartitionKey=&apos;p1&apos;, RowKey=&apos;r1&apos;)"));
}

#[tokio::test]
async fn addressed_operations_share_one_url() {
    let transport = MockTransport::new();
    let adapter = adapter(transport.clone());
    transport.respond_with(StatusCode::OK, SAMPLE_ENTRY);

    adapter.find("Person", &person_key()).await.unwrap();
    adapter.delete("Person", &person_key()).await.unwrap();
    adapter
        .update("Person", &person_key(), &Entity::new())
        .await
        .unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].url, requests[1].url);
    assert_eq!(requests[1].url, requests[2].url);
    assert_eq!(requests[0].method, Method::GET);
    assert_eq!(requests[1].method, Method::DELETE);
}

#[tokio::test]
async fn delete_sends_empty_body() {
    let transport = MockTransport::new();
    adapter(transport.clone())
        .delete("Person", &person_key())
        .await
        .unwrap();

    let request = transport.only_request();
    assert_eq!(request.method, Method::DELETE);
    assert!(request.body.is_empty());
    assert_eq!(header(&request, "content-length"), "0");
}

#[tokio::test]
async fn key_quotes_are_escaped_in_url() {
    let transport = MockTransport::new();
    let key = EntityKey::new("O'Neil", "r1");
    adapter(transport.clone())
        .delete("Person", &key)
        .await
        .unwrap();

    let request = transport.only_request();
    assert_eq!(
        request.url,
        format!("{BASE}/Person(PartitionKey='O''Neil', RowKey='r1')")
    );
}

const SAMPLE_ENTRY: &str = r#"<?xml version="1.0" encoding="utf-8" standalone="yes"?>
<entry xmlns:d="http://schemas.microsoft.com/ado/2007/08/dataservices" xmlns:m="http://schemas.microsoft.com/ado/2007/08/dataservices/metadata" xmlns="http://www.w3.org/2005/Atom">
  <id>https://acct.table.core.windows.net/Person(PartitionKey='p1',RowKey='r1')</id>
  <updated>2024-01-01T12:00:00Z</updated>
  <content type="application/xml">
    <m:properties>
      <d:PartitionKey>p1</d:PartitionKey>
      <d:RowKey>r1</d:RowKey>
      <d:Age m:type="Edm.Int32">30</d:Age>
      <d:Nickname m:null="true" />
    </m:properties>
  </content>
</entry>"#;

#[tokio::test]
async fn find_parses_returned_entity() {
    let transport = MockTransport::new();
    transport.respond_with(StatusCode::OK, SAMPLE_ENTRY);

    let entity = adapter(transport.clone())
        .find("Person", &person_key())
        .await
        .unwrap();

    assert_eq!(
        entity.get("PartitionKey"),
        Some(&PropertyValue::String("p1".into()))
    );
    assert_eq!(
        entity.get("RowKey"),
        Some(&PropertyValue::String("r1".into()))
    );
    assert_eq!(entity.get("Age"), Some(&PropertyValue::Int32(30)));
    assert_eq!(entity.get("Nickname"), Some(&PropertyValue::Null));
}

#[tokio::test]
async fn find_missing_entity_is_not_found() {
    let transport = MockTransport::new();
    transport.respond_with(StatusCode::NOT_FOUND, "");

    let err = adapter(transport)
        .find("Person", &person_key())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn delete_missing_entity_is_not_found() {
    let transport = MockTransport::new();
    transport.respond_with(StatusCode::NOT_FOUND, "");

    let err = adapter(transport)
        .delete("Person", &person_key())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn find_rejects_malformed_body() {
    let transport = MockTransport::new();
    transport.respond_with(StatusCode::OK, "<html>service unavailable</html>");

    let err = adapter(transport)
        .find("Person", &person_key())
        .await
        .unwrap_err();
    assert!(err.is_malformed_response());
}

#[tokio::test]
async fn non_success_status_surfaces_unchanged() {
    let transport = MockTransport::new();
    transport.respond_with(StatusCode::CONFLICT, "EntityAlreadyExists");

    let err = adapter(transport)
        .insert("Person", &person_key(), &Entity::new())
        .await
        .unwrap_err();
    match err {
        Error::UnexpectedStatus { status, body } => {
            assert_eq!(status, StatusCode::CONFLICT);
            assert_eq!(body, "EntityAlreadyExists");
        }
        other => panic!("expected UnexpectedStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn clock_is_fixed_for_the_adapter_lifetime() {
    let transport = MockTransport::new();
    let adapter = adapter(transport.clone());

    adapter
        .insert("Person", &person_key(), &Entity::new())
        .await
        .unwrap();
    adapter
        .insert("Person", &EntityKey::new("p2", "r2"), &Entity::new())
        .await
        .unwrap();

    let requests = transport.requests();
    assert_eq!(
        header(&requests[0], "x-ms-date"),
        header(&requests[1], "x-ms-date")
    );
}

#[tokio::test]
async fn shared_key_signer_end_to_end() {
    use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

    let transport = MockTransport::new();
    let signer = SharedKeyLiteSigner::new(StorageCredentials::new(
        "acct",
        BASE64.encode(b"secret key"),
    ));
    let adapter = TableAdapter::with_timestamp(
        AdapterConfig::new("acct"),
        Arc::new(signer),
        transport.clone(),
        fixed_clock(),
    );

    adapter
        .insert("Person", &person_key(), &Entity::new())
        .await
        .unwrap();

    let request = transport.only_request();
    let authorization = header(&request, "authorization");
    let signature = authorization.strip_prefix("SharedKeyLite acct:").unwrap();
    assert_eq!(BASE64.decode(signature).unwrap().len(), 32);
}
