//! End-to-end sends through the reqwest-backed transport against a local
//! mock server. These run on the real clock.

use sendpack::{DispatchConfig, DispatchOptions, Dispatcher, FailureKind, HttpTransport, Packet, ResponseBody};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Mirrors the request body back as JSON.
struct EchoBody;

impl Respond for EchoBody {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(request.body.clone(), "application/json")
    }
}

fn fast_options() -> DispatchOptions {
    DispatchOptions {
        retries: 2,
        timeout_ms: 2_000,
        retry_delay_ms: 10,
        ..Default::default()
    }
}

#[tokio::test]
async fn echo_server_returns_the_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/packets"))
        .and(header("content-type", "application/json"))
        .respond_with(EchoBody)
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = format!("{}/packets", server.uri());
    let dispatcher = Dispatcher::new(&endpoint, &fast_options()).unwrap();

    let payload = json!({"from": "0x01", "to": "0x02", "value": 7});
    let outcome = dispatcher
        .send(Packet::with_timestamp("tx-1", 1_700_000_000_000, payload.clone()))
        .await
        .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.status, 200);
    assert_eq!(outcome.attempts, 1);
    let body = outcome.json().expect("JSON echo");
    assert_eq!(body["payload"], payload);
    assert_eq!(body["id"], "tx-1");
    assert_eq!(body["timestamp"], 1_700_000_000_000u64);
}

#[tokio::test]
async fn service_unavailable_is_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("warming up"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"queued": true})))
        .mount(&server)
        .await;

    let dispatcher = Dispatcher::new(&server.uri(), &fast_options()).unwrap();
    let outcome = dispatcher
        .send(Packet::create("tx-2", json!({"n": 1})))
        .await
        .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.status, 202);
    assert_eq!(outcome.attempts, 2);
    assert_eq!(outcome.json(), Some(&json!({"queued": true})));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].body, requests[1].body);
}

#[tokio::test]
async fn configured_headers_reach_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("idempotency-key", "tx-3-v1"))
        .and(header("x-tenant", "acme"))
        .and(header("user-agent", "ingest-bot/2"))
        .and(body_json(json!({"id": "tx-3", "timestamp": 5, "payload": {"ok": true}})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut options = fast_options();
    options.idempotency_key = Some("tx-3-v1".into());
    options.user_agent = Some("ingest-bot/2".into());
    options.headers.insert("X-Tenant".into(), "acme".into());

    let dispatcher = Dispatcher::new(&server.uri(), &options).unwrap();
    let outcome = dispatcher
        .send(Packet::with_timestamp("tx-3", 5, json!({"ok": true})))
        .await
        .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.status, 204);
    assert!(outcome.body.is_none());
}

#[tokio::test]
async fn bad_request_is_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(422).set_body_string("payload rejected"))
        .expect(1)
        .mount(&server)
        .await;

    let config = DispatchConfig::resolve(&server.uri(), &fast_options()).unwrap();
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();
    let dispatcher = Dispatcher::with_transport(config, HttpTransport::with_client(client));
    let outcome = dispatcher
        .send(Packet::create("tx-4", json!({})))
        .await
        .unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.status, 422);
    assert_eq!(outcome.attempts, 1);
    assert_eq!(outcome.failure, Some(FailureKind::TerminalStatus));
    assert_eq!(outcome.body, Some(ResponseBody::Text("payload rejected".into())));
    assert_eq!(outcome.body.as_ref().and_then(ResponseBody::as_text), Some("payload rejected"));
}

#[tokio::test]
async fn redirect_is_terminal_and_not_followed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/packets"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/elsewhere"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/elsewhere"))
        .respond_with(ResponseTemplate::new(200).set_body_string("landing page"))
        .expect(0)
        .mount(&server)
        .await;

    let endpoint = format!("{}/packets", server.uri());
    let dispatcher = Dispatcher::new(&endpoint, &fast_options()).unwrap();
    let outcome = dispatcher
        .send(Packet::create("tx-7", json!({"n": 7})))
        .await
        .unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.status, 302);
    assert_eq!(outcome.attempts, 1);
    assert_eq!(outcome.failure, Some(FailureKind::TerminalStatus));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method.as_str(), "POST");
}

#[tokio::test]
async fn slow_server_hits_the_deadline() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(800)))
        .mount(&server)
        .await;

    let options = DispatchOptions {
        retries: 0,
        timeout_ms: 100,
        ..Default::default()
    };
    let dispatcher = Dispatcher::new(&server.uri(), &options).unwrap();
    let outcome = dispatcher
        .send(Packet::create("tx-5", json!({})))
        .await
        .unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.status, 0);
    assert_eq!(outcome.failure, Some(FailureKind::Timeout));
    assert_eq!(outcome.error.as_deref(), Some("timeout after 100ms"));
}

#[tokio::test]
async fn stalled_connection_is_bounded_by_the_attempt_deadline() {
    // Accepts connections but never answers.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let idle = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let options = DispatchOptions {
        retries: 0,
        timeout_ms: 300,
        ..Default::default()
    };
    let dispatcher = Dispatcher::new(&format!("http://{}/packets", addr), &options).unwrap();
    let outcome = dispatcher
        .send(Packet::create("tx-8", json!({})))
        .await
        .unwrap();
    idle.abort();

    assert!(!outcome.success);
    assert_eq!(outcome.status, 0);
    assert_eq!(outcome.failure, Some(FailureKind::Timeout));
    assert_eq!(outcome.error.as_deref(), Some("timeout after 300ms"));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_failure() {
    let options = DispatchOptions {
        retries: 1,
        timeout_ms: 2_000,
        retry_delay_ms: 10,
        ..Default::default()
    };
    let dispatcher = Dispatcher::new("http://127.0.0.1:1/packets", &options).unwrap();
    let outcome = dispatcher
        .send(Packet::create("tx-6", json!({})))
        .await
        .unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.status, 0);
    assert_eq!(outcome.attempts, 2);
    assert_eq!(outcome.failure, Some(FailureKind::Transport));
    assert!(outcome.body.is_none());
    assert!(outcome.error.is_some());
}
