use agentchat_core::{ChatClient, ChatError, ChatMessage, Config, Session};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sse(events: &[serde_json::Value]) -> String {
    events.iter().map(|e| format!("data: {}\n\n", e)).collect()
}

fn client_for(server: &MockServer) -> ChatClient {
    let mut config = Config::new();
    config.api_url = server.uri();
    ChatClient::from_config(&config)
}

#[tokio::test]
async fn streams_reply_and_reuses_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/agent"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"query": "hi", "session_id": null})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            sse(&[
                json!({"type": "session", "session_id": "abc123"}),
                json!({"type": "delta", "content": "Hel"}),
                json!({"type": "delta", "content": "lo"}),
                json!({"type": "complete", "content": "Hello", "history": [
                    {"role": "user", "content": "hi"},
                    {"role": "assistant", "content": "Hello"}
                ]}),
            ]),
            "text/event-stream",
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/agent"))
        .and(body_json(json!({"query": "again", "session_id": "abc123"})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            sse(&[
                json!({"type": "session", "session_id": "abc123"}),
                json!({"type": "delta", "content": "Sure"}),
            ]),
            "text/event-stream",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut session = Session::new();

    let mut deltas = Vec::new();
    let first = client
        .submit_query(&mut session, "hi", |d| deltas.push(d.delta))
        .await
        .unwrap();
    assert_eq!(first.session_id, "abc123");
    assert_eq!(first.response, "Hello");
    assert_eq!(deltas, vec!["Hel", "lo"]);
    assert_eq!(
        first.history,
        vec![ChatMessage::user("hi"), ChatMessage::assistant("Hello")]
    );
    assert_eq!(session.get(), Some("abc123"));

    let second = client
        .submit_query(&mut session, "again", |_| {})
        .await
        .unwrap();
    assert_eq!(second.response, "Sure");
    assert!(second.history.is_empty());
}

#[tokio::test]
async fn backend_error_event_rejects() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/agent"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            sse(&[
                json!({"type": "delta", "content": "partial"}),
                json!({"type": "error", "content": "backend failure"}),
            ]),
            "text/event-stream",
        ))
        .mount(&server)
        .await;

    let mut session = Session::new();
    let mut deltas = 0;
    let err = client_for(&server)
        .submit_query(&mut session, "q", |_| deltas += 1)
        .await
        .unwrap_err();

    assert!(matches!(err, ChatError::Backend(ref msg) if msg == "backend failure"));
    assert_eq!(deltas, 1);
}

#[tokio::test]
async fn non_success_status_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/agent"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Error: boom"))
        .mount(&server)
        .await;

    let mut session = Session::new();
    let err = client_for(&server)
        .submit_query(&mut session, "q", |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, ChatError::Api { status: 500 }));
    assert!(err.is_transport());
    assert_eq!(session.get(), None);
}

#[tokio::test]
async fn no_content_is_missing_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let mut session = Session::new();
    let err = client_for(&server)
        .submit_query(&mut session, "q", |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, ChatError::MissingBody));
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    let client = ChatClient::new("http://127.0.0.1:9/agent");
    let mut session = Session::new();
    let err = client
        .submit_query(&mut session, "q", |_| {})
        .await
        .unwrap_err();

    assert!(err.is_transport());
}
