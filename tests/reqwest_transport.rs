use std::net::TcpListener;

use chrono::NaiveDate;
use leak_intake::fetch::FetchOptions;
use leak_intake::form::IntakeForm;
use leak_intake::model::ServiceOrderStatus;
use leak_intake::{FetchError, Fetcher, ReqwestTransport, ServiceOrderApi};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api(base_url: String) -> ServiceOrderApi<ReqwestTransport> {
    ServiceOrderApi::new(Fetcher::new(ReqwestTransport::new().unwrap(), base_url))
}

/// The transport is blocking; keep it off the runtime that drives the mock server.
async fn blocking<R, F>(task: F) -> R
where
    R: Send + 'static,
    F: FnOnce() -> R + Send + 'static,
{
    tokio::task::spawn_blocking(task).await.unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn submit_posts_json_and_reads_reference() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/emergency-leak-service"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "requestDate": "2026-02-16T00:00:00Z",
            "client": { "accountName": "Acme Corp" },
            "SignatureName": "Jane Doe"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "message": "Request received.", "requestId": "abc-123" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut form = IntakeForm::default();
    form.client_account_name = "Acme Corp".into();
    form.signature_name = "Jane Doe".into();
    let request = form.to_request(NaiveDate::from_ymd_opt(2026, 2, 16).unwrap());

    let base_url = server.uri();
    let outcome = blocking(move || api(base_url).submit(&request)).await.unwrap();
    assert_eq!(outcome.message, "Request received.");
    assert_eq!(outcome.request_id, "abc-123");
}

#[tokio::test(flavor = "multi_thread")]
async fn status_is_a_bodyless_get_with_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/emergency-leak-service/status"))
        .and(query_param("referenceId", "abc-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Success": true,
            "Message": "Service order found",
            "Status": "NEW",
            "Data": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let base_url = server.uri();
    let response = blocking(move || api(base_url).status("abc-123"))
        .await
        .unwrap()
        .unwrap();
    assert!(response.success);
    assert_eq!(response.status_kind(), Some(ServiceOrderStatus::New));
    assert_eq!(response.data, None);

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0].headers.get("content-type").is_none());
    assert!(received[0].body.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn error_status_surfaces_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/emergency-leak-service/lookup/service-order"))
        .and(body_partial_json(json!({ "serviceOrderNumber": "SO-1" })))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Service order not found." })),
        )
        .mount(&server)
        .await;

    let base_url = server.uri();
    let err = blocking(move || api(base_url).lookup_by_service_order("SO-1"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.message(), "Service order not found.");
}

#[tokio::test(flavor = "multi_thread")]
async fn no_content_and_empty_bodies_differ() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/no-content"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let base_url = server.uri();
    let (no_content, empty) = blocking(move || {
        let fetcher = Fetcher::new(ReqwestTransport::new().unwrap(), base_url);
        (
            fetcher.fetch_value("/no-content", FetchOptions::get(), None),
            fetcher.fetch_value("/empty", FetchOptions::get(), None),
        )
    })
    .await;

    assert_eq!(no_content.unwrap(), None);
    assert_eq!(empty.unwrap(), Some(Value::String(String::new())));
}

#[test]
fn refused_connection_is_a_network_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let fetcher = Fetcher::new(ReqwestTransport::new().unwrap(), format!("http://127.0.0.1:{port}"));

    let err = fetcher
        .fetch_value("/api/emergency-leak-service", FetchOptions::get(), Some("Backend unreachable."))
        .unwrap_err();
    assert!(matches!(err, FetchError::Network { .. }));
    assert_eq!(err.message(), "Backend unreachable.");
    assert_eq!(err.status(), None);
}
