//! Transport seams of the stream client and their HTTP implementation.

use async_trait::async_trait;
use futures::future::ready;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::Client;
use reqwest::header::ACCEPT;

use super::sse::SseDecoder;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::model::Snapshot;

/// Lifecycle and payload notifications of one streaming connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Open,
    /// Raw text of one pushed message.
    Message(String),
    Error(String),
    Closed,
}

/// Events of a single connection, ending when the connection is gone.
pub type EventStream = BoxStream<'static, TransportEvent>;

/// One-shot retrieval of the full snapshot.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<Snapshot>;
}

/// Opens streaming connections. Connection failures are reported through the
/// returned stream (`Error`, then `Closed`) rather than as a `Result`.
#[async_trait]
pub trait EventTransport: Send + Sync {
    async fn connect(&self) -> EventStream;
}

/// `GET {service}/snapshot` and server-sent events from `{service}/stream`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: ClientConfig,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> Result<Self> {
        // No request timeout: the event stream is expected to stay open indefinitely.
        let client = Client::builder()
            .user_agent(concat!("livemap/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

fn failed(reason: String) -> EventStream {
    stream::iter([TransportEvent::Error(reason), TransportEvent::Closed]).boxed()
}

#[async_trait]
impl SnapshotSource for HttpTransport {
    async fn fetch_snapshot(&self) -> Result<Snapshot> {
        let response = self
            .client
            .get(self.config.snapshot_url.clone())
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status));
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl EventTransport for HttpTransport {
    async fn connect(&self) -> EventStream {
        let request = self
            .client
            .get(self.config.stream_url.clone())
            .header(ACCEPT, "text/event-stream");
        let response = match request.send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                return failed(format!("stream endpoint returned {}", response.status()));
            }
            Err(e) => return failed(e.to_string()),
        };

        let mut decoder = SseDecoder::new();
        let body = response.bytes_stream().flat_map(move |chunk| {
            let events: Vec<TransportEvent> = match chunk {
                Ok(bytes) => decoder
                    .push(&bytes)
                    .into_iter()
                    .map(TransportEvent::Message)
                    .collect(),
                Err(e) => vec![TransportEvent::Error(e.to_string())],
            };
            stream::iter(events)
        });

        stream::once(ready(TransportEvent::Open))
            .chain(body)
            .chain(stream::once(ready(TransportEvent::Closed)))
            .boxed()
    }
}
