//! Integration tests for client behavior over injected transports.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sortify_client::{
    ClassifierClient, ClassifierTransport, ClientConfig, ClientError, DEFAULT_ENDPOINT,
    TransportResponse,
};
use sortify_core::{AttachmentFlag, ClassifyRequest};
use url::Url;

#[derive(Debug, Default)]
struct CountingTransport {
    calls: AtomicU32,
}

#[async_trait]
impl ClassifierTransport for CountingTransport {
    async fn send(
        &self,
        _endpoint: &Url,
        _request: &ClassifyRequest,
    ) -> Result<TransportResponse, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ClientError::Transport("connection reset".to_string()))
    }
}

#[derive(Debug)]
struct HangingTransport;

#[async_trait]
impl ClassifierTransport for HangingTransport {
    async fn send(
        &self,
        _endpoint: &Url,
        _request: &ClassifyRequest,
    ) -> Result<TransportResponse, ClientError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Err(ClientError::Transport("unreachable".to_string()))
    }
}

fn request() -> ClassifyRequest {
    ClassifyRequest {
        text: "hello".to_string(),
        attachment: AttachmentFlag::Yes,
    }
}

#[test]
fn insecure_endpoint_rejected_by_default() {
    let result = ClassifierClient::new(
        "http://sortify.example.test/classify",
        ClientConfig::default(),
        Arc::new(CountingTransport::default()),
    );
    assert!(matches!(result, Err(ClientError::InvalidEndpoint(_))));
}

#[tokio::test]
async fn transport_failure_is_not_retried() {
    let transport = Arc::new(CountingTransport::default());
    let client = ClassifierClient::new(DEFAULT_ENDPOINT, ClientConfig::default(), transport.clone())
        .expect("client should build");

    let error = client.classify(&request()).await.expect_err("transport should fail");
    assert!(matches!(error, ClientError::Transport(_)));
    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn client_timeout_bounds_hanging_transport() {
    let client = ClassifierClient::new(
        DEFAULT_ENDPOINT,
        ClientConfig {
            timeout: Duration::from_secs(10),
            allow_insecure_http: false,
        },
        Arc::new(HangingTransport),
    )
    .expect("client should build");

    let error = client.classify(&request()).await.expect_err("should time out");
    assert!(error.is_timeout());
}
