//! Mock backend for testing
//!
//! Provides configurable canned responses, artificial latency, and forced
//! failures so the gate's race-with-timeout can be exercised without a
//! running LLM server.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::types::{RemoteParse, RemoteRequest};
use super::RemoteBackend;

/// Mock remote backend for testing
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Canned response returned by `parse_entry`
    pub response: Option<RemoteParse>,
    /// Artificial latency before responding
    pub delay: Option<Duration>,
    /// When true, `parse_entry` fails instead of responding
    pub fail: bool,
    /// Whether health_check should return true
    pub healthy: bool,
}

impl MockBackend {
    /// Create a new mock backend (healthy, empty response, no delay)
    pub fn new() -> Self {
        Self {
            healthy: true,
            ..Default::default()
        }
    }

    /// Respond with the given parse
    pub fn with_response(mut self, response: RemoteParse) -> Self {
        self.response = Some(response);
        self
    }

    /// Sleep this long before responding
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail every parse call
    pub fn failing() -> Self {
        Self {
            fail: true,
            healthy: false,
            ..Default::default()
        }
    }
}

#[async_trait]
impl RemoteBackend for MockBackend {
    async fn parse_entry(&self, _request: &RemoteRequest) -> Result<RemoteParse> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(Error::InvalidData("mock backend failure".into()));
        }
        Ok(self.response.clone().unwrap_or_default())
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
