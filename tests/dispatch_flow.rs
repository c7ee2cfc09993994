//! End-to-end tests: a request goes through the dispatcher to a scripted IRC server.

mod common;

use async_trait::async_trait;
use common::{Behavior, TestIrcServer};
use postirc::irc::DeliveryEngine;
use postirc::paste::{LongTextSink, Shortened};
use postirc::security::{CounterStore, MemoryCounterStore};
use postirc::{Config, Dispatcher, InboundRequest, Method, RelayError};
use std::sync::Arc;
use std::time::Duration;

struct FixedSink(&'static str);

#[async_trait]
impl LongTextSink for FixedSink {
    async fn shorten(&self, _text: &str) -> Shortened {
        Shortened::ok(self.0)
    }
}

fn dispatcher(config: &Config, store: Arc<dyn CounterStore>) -> Dispatcher {
    Dispatcher::new(config, Arc::new(FixedSink("http://paste.test/xyz")), store)
        .with_engine(DeliveryEngine::with_timeouts(
            Duration::from_secs(5),
            Duration::from_secs(2),
        ))
}

fn post(server: &TestIrcServer, remote: &str, body: &str) -> InboundRequest {
    InboundRequest {
        method: Method::Post,
        path: vec![server.address(), "chat".to_string()],
        remote_addr: remote.to_string(),
        nick: None,
        content_type: None,
        body: body.as_bytes().to_vec(),
    }
}

fn privmsgs(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .filter(|l| l.starts_with("PRIVMSG "))
        .cloned()
        .collect()
}

#[tokio::test]
async fn test_plain_post_is_delivered() {
    let server = TestIrcServer::spawn(Behavior::Normal).await.unwrap();
    let d = dispatcher(&Config::default(), Arc::new(MemoryCounterStore::new()));

    let response = d.handle(&post(&server, "198.51.100.7", "build passed\n")).await;
    assert!(response.delivered, "{:?}", response.lines);
    assert_eq!(
        response.lines[0],
        format!("Sending to {} at #chat", server.address())
    );
    assert_eq!(response.outcome(), Some("Sent successfully!"));
    assert!(response.render().starts_with("Content-Type: text/html"));

    let lines = server.received().await.unwrap();
    assert_eq!(privmsgs(&lines), vec!["PRIVMSG #chat :build passed"]);
}

#[tokio::test]
async fn test_long_post_sends_paste_link() {
    let server = TestIrcServer::spawn(Behavior::Normal).await.unwrap();
    let d = dispatcher(&Config::default(), Arc::new(MemoryCounterStore::new()));

    let body = "log line\n".repeat(100);
    let response = d.handle(&post(&server, "198.51.100.8", &body)).await;
    assert!(response.delivered, "{:?}", response.lines);

    let lines = server.received().await.unwrap();
    assert_eq!(
        privmsgs(&lines),
        vec!["PRIVMSG #chat http://paste.test/xyz"]
    );
}

#[tokio::test]
async fn test_webhook_is_rendered() {
    let server = TestIrcServer::spawn(Behavior::Normal).await.unwrap();
    let d = dispatcher(&Config::default(), Arc::new(MemoryCounterStore::new()));

    let payload = r#"{
        "ref": "refs/heads/main",
        "repository": {"name": "postirc", "url": "https://git.example.org/postirc"},
        "sender": {"login": "octo"},
        "head_commit": {"message": "Fix deadline handling"}
    }"#;
    let mut req = post(&server, "198.51.100.9", payload);
    req.content_type = Some("application/json".to_string());
    req.nick = Some("githook".to_string());

    let response = d.handle(&req).await;
    assert!(response.delivered, "{:?}", response.lines);

    let lines = server.received().await.unwrap();
    assert!(lines.contains(&"NICK githook".to_string()));
    assert_eq!(
        privmsgs(&lines),
        vec![
            "PRIVMSG #chat :[postirc] octo pushed to main: Fix deadline handling https://git.example.org/postirc"
        ]
    );
}

#[tokio::test]
async fn test_second_request_is_rate_limited() {
    let mut config = Config::default();
    config.rate_limit.max_per_minute = 1;
    let store: Arc<dyn CounterStore> = Arc::new(MemoryCounterStore::new());

    let server = TestIrcServer::spawn(Behavior::Normal).await.unwrap();
    let first = dispatcher(&config, store.clone())
        .handle(&post(&server, "203.0.113.5", "one"))
        .await;
    assert!(first.delivered, "{:?}", first.lines);
    server.received().await.unwrap();

    // A fresh dispatcher per request, as with one process per CGI call.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let req = InboundRequest {
        method: Method::Post,
        path: vec![listener.local_addr().unwrap().to_string(), "chat".into()],
        remote_addr: "203.0.113.5".into(),
        nick: None,
        content_type: None,
        body: b"two".to_vec(),
    };
    let second = dispatcher(&config, store.clone()).handle(&req).await;
    assert!(!second.delivered);
    assert_eq!(second.lines.len(), 1);
    assert_eq!(
        second.outcome(),
        Some(RelayError::RateLimitExceeded.to_string().as_str())
    );

    // Nobody ever connected for the denied request.
    let accepted = tokio::time::timeout(Duration::from_millis(100), listener.accept()).await;
    assert!(accepted.is_err());

    // Other addresses have their own window.
    let server = TestIrcServer::spawn(Behavior::Normal).await.unwrap();
    let other = dispatcher(&config, store)
        .handle(&post(&server, "203.0.113.6", "three"))
        .await;
    assert!(other.delivered, "{:?}", other.lines);
}

#[tokio::test]
async fn test_silent_server_reports_timeout() {
    let server = TestIrcServer::spawn(Behavior::Silent).await.unwrap();
    let d = Dispatcher::new(
        &Config::default(),
        Arc::new(FixedSink("unused")),
        Arc::new(MemoryCounterStore::new()),
    )
    .with_engine(DeliveryEngine::with_timeouts(
        Duration::from_millis(200),
        Duration::from_secs(2),
    ));

    let response = d.handle(&post(&server, "198.51.100.10", "hello")).await;
    assert!(!response.delivered);
    assert_eq!(
        response.outcome(),
        Some("Timeout sending message. Please try again later.")
    );

    let lines = server.received().await.unwrap();
    assert!(privmsgs(&lines).is_empty());
}

#[tokio::test]
async fn test_unreachable_server_reports_connect_failure() {
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let d = dispatcher(&Config::default(), Arc::new(MemoryCounterStore::new()));
    let req = InboundRequest {
        method: Method::Post,
        path: vec![addr.to_string(), "chat".into()],
        remote_addr: "198.51.100.11".into(),
        nick: None,
        content_type: None,
        body: b"hello".to_vec(),
    };

    let response = d.handle(&req).await;
    assert!(!response.delivered);
    assert_eq!(response.outcome(), Some("Failed to connect to that irc server!"));
}
