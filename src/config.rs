//! Endpoint configuration for the snapshot/event service.

use std::time::Duration;

use url::Url;

use crate::error::Result;

/// Delay between a transport close and the single reconnection attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// `GET` endpoint returning a full snapshot document.
    pub snapshot_url: Url,
    /// Server-push endpoint delivering `snapshot` / `event` messages.
    pub stream_url: Url,
    pub reconnect_delay: Duration,
}

impl ClientConfig {
    /// Build the configuration from the service base URL, e.g.
    /// `http://localhost:8080/api/living-map` yields `.../snapshot` and `.../stream`.
    pub fn from_service_url(service: &str) -> Result<Self> {
        let mut base = Url::parse(service.trim())?;
        // Url::join replaces the last path segment unless the base ends with '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            snapshot_url: base.join("snapshot")?,
            stream_url: base.join("stream")?,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        })
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }
}
