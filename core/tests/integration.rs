//! End-to-end requests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every verb through
//! `UreqTransport` over real HTTP. Validates that request building, the
//! default transport and response decoding agree with an actual server.

use std::collections::BTreeMap;

use mock_server::{Echo, Item};
use rest_engine::{
    CancellationToken, HttpMethod, HttpRequest, Resource, RestError, Session, Transport,
    UreqTransport,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

async fn start_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    format!("http://{addr}")
}

fn session() -> Session<UreqTransport> {
    Session::default()
}

#[tokio::test(flavor = "multi_thread")]
async fn item_lifecycle() {
    let base = start_server().await;
    let session = session();

    // Step 1: list, should be empty.
    let list: Resource<Vec<Item>> = Resource::from_url(format!("{base}/items"));
    assert!(session.get(&list).await.unwrap().is_empty());

    // Step 2: create.
    let create: Resource<Item> =
        Resource::from_url(format!("{base}/items")).with_parameter("name", "widget");
    let created = session.post(&create).await.unwrap();
    assert_eq!(created.name, "widget");
    let id = created.id;

    // Step 3: update.
    let update: Resource<Item> =
        Resource::from_url(format!("{base}/items/{id}")).with_parameter("name", "gadget");
    let updated = session.put(&update).await.unwrap();
    assert_eq!(updated, Item { id, name: "gadget".to_string() });

    // Step 4: get, with parameters that GET must not send.
    let get: Resource<Item> =
        Resource::from_url(format!("{base}/items/{id}")).with_parameter("name", "ignored");
    assert_eq!(session.get(&get).await.unwrap(), updated);

    // Step 5: list, should hold the one item. The resource is reused.
    assert_eq!(session.get(&list).await.unwrap(), vec![updated]);
}

#[tokio::test(flavor = "multi_thread")]
async fn echo_sees_headers_and_body() {
    let base = start_server().await;
    let session = session();
    let mut parameters = serde_json::Map::new();
    parameters.insert("count".to_string(), json!(3));
    parameters.insert("tags".to_string(), json!(["a", "b"]));
    let headers = BTreeMap::from([
        ("authorization".to_string(), "Bearer X".to_string()),
        ("x-request-id".to_string(), "abc".to_string()),
    ]);
    let resource: Resource<Echo> =
        Resource::new(format!("{base}/echo"), parameters.clone(), headers);

    let echo = session.post(&resource).await.unwrap();
    assert_eq!(echo.method, "POST");
    assert_eq!(echo.headers["authorization"], "Bearer X");
    assert_eq!(echo.headers["x-request-id"], "abc");
    assert_eq!(echo.headers["content-type"], "application/json");
    assert_eq!(echo.body, Some(serde_json::Value::Object(parameters)));

    let echo = session.get(&resource).await.unwrap();
    assert_eq!(echo.method, "GET");
    assert!(echo.body.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn not_found_without_body_is_empty_response() {
    let base = start_server().await;
    let session = session();
    let resource: Resource<Item> = Resource::from_url(format!("{base}/items/999"));

    // 404 carries no body.
    let err = session.get(&resource).await.unwrap_err();
    assert!(matches!(err, RestError::EmptyResponse { status: 404 }), "{err:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn no_content_is_empty_response() {
    let base = start_server().await;
    let session = session();
    let resource: Resource<Item> = Resource::from_url(format!("{base}/empty"));

    let err = session.get(&resource).await.unwrap_err();
    assert!(matches!(err, RestError::EmptyResponse { status: 204 }), "{err:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn non_json_body_is_decode_error() {
    let base = start_server().await;
    let session = session();
    let resource: Resource<Item> = Resource::from_url(format!("{base}/garbage"));

    match session.get(&resource).await.unwrap_err() {
        RestError::Decode { status, body, .. } => {
            assert_eq!(status, 200);
            assert_eq!(body, "not json");
        }
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn connection_refused_is_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let session = session();
    let resource: Resource<Item> = Resource::from_url(format!("http://{addr}/items"));

    let err = session.get(&resource).await.unwrap_err();
    assert!(matches!(err, RestError::Transport(_)), "{err:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn callback_delivers_over_http() {
    let base = start_server().await;
    let session = session();
    let resource: Resource<Vec<Item>> = Resource::from_url(format!("{base}/items"));
    let (tx, rx) = oneshot::channel();

    session
        .spawn_get(resource, CancellationToken::new(), move |result| {
            let _ = tx.send(result);
        })
        .await
        .unwrap();

    assert!(rx.await.unwrap().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn body_over_ten_mebibytes_is_decoded() {
    let base = start_server().await;
    let session = session();
    // Each element serializes as "0," so this is about 12 MB of JSON.
    let count = 6_000_000;
    let resource: Resource<Vec<u8>> = Resource::from_url(format!("{base}/zeros/{count}"));

    let zeros = session.get(&resource).await.unwrap();
    assert_eq!(zeros.len(), count);
    assert!(zeros.iter().all(|&b| b == 0));
}

#[tokio::test(flavor = "multi_thread")]
async fn hand_built_get_body_is_not_sent() {
    let base = start_server().await;
    let request = HttpRequest {
        method: HttpMethod::Get,
        url: format!("{base}/echo").parse().unwrap(),
        headers: Vec::new(),
        body: Some(br#"{"dropped":true}"#.to_vec()),
    };

    let response = UreqTransport::default().execute(request).await.unwrap();
    let echo: Echo = serde_json::from_slice(response.body.as_deref().unwrap()).unwrap();
    assert_eq!(echo.method, "GET");
    assert!(echo.body.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn non_utf8_response_header_is_skipped() {
    let base = start_server().await;
    let request = HttpRequest {
        method: HttpMethod::Get,
        url: format!("{base}/latin1").parse().unwrap(),
        headers: Vec::new(),
        body: None,
    };

    let response = UreqTransport::default().execute(request).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.header("x-latin1"), None);
    assert_eq!(response.header("content-type"), Some("application/json"));

    let item: Item = Session::new(UreqTransport::default())
        .parse_response(response)
        .unwrap();
    assert_eq!(item.name, "café");
}
