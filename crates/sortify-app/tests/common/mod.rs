//! Shared fixtures for app integration tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sortify_app::ClassificationSession;
use sortify_client::{
    ClassifierClient, ClassifierTransport, ClientConfig, ClientError, TransportResponse,
};
use sortify_core::ClassifyRequest;
use sortify_gauge::{GaugeMapper, GaugePolicy};
use url::Url;

/// Endpoint used with scripted transports; never contacted.
#[allow(dead_code)]
pub const SCRIPTED_ENDPOINT: &str = "https://classifier.test/classify";

/// One scripted backend reaction.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum Reply {
    /// Answer immediately.
    Now(u16, &'static str),
    /// Answer after a delay.
    After(Duration, u16, &'static str),
    /// Never answer.
    Hang,
}

/// Transport that replays [`Reply`] values in order and records request
/// texts.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    seen: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().collect()),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().expect("seen lock").clone()
    }
}

#[async_trait]
impl ClassifierTransport for ScriptedTransport {
    async fn send(
        &self,
        _endpoint: &Url,
        request: &ClassifyRequest,
    ) -> Result<TransportResponse, ClientError> {
        self.seen.lock().expect("seen lock").push(request.text.clone());
        let reply = self
            .replies
            .lock()
            .expect("replies lock")
            .pop_front()
            .unwrap_or(Reply::Hang);

        let (status, body) = match reply {
            Reply::Now(status, body) => (status, body),
            Reply::After(delay, status, body) => {
                tokio::time::sleep(delay).await;
                (status, body)
            }
            Reply::Hang => std::future::pending().await,
        };
        Ok(TransportResponse {
            status,
            body: body.to_string(),
        })
    }
}

/// Session over a scripted transport.
#[allow(dead_code)]
pub fn scripted_session(
    transport: Arc<ScriptedTransport>,
    timeout: Duration,
    policy: GaugePolicy,
) -> ClassificationSession {
    let config = ClientConfig {
        timeout,
        allow_insecure_http: false,
    };
    let client =
        ClassifierClient::new(SCRIPTED_ENDPOINT, config, transport).expect("client should build");
    ClassificationSession::new(client, GaugeMapper::new(policy))
}

/// Session over the HTTP transport pointed at a mock server.
#[allow(dead_code)]
pub fn http_session(server_uri: &str) -> ClassificationSession {
    let config = ClientConfig {
        timeout: Duration::from_secs(5),
        allow_insecure_http: true,
    };
    let client = ClassifierClient::http(&format!("{server_uri}/classify"), config)
        .expect("client should build");
    ClassificationSession::new(client, GaugeMapper::default())
}
