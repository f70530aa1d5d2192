//! Pluggable remote language-understanding backend abstraction
//!
//! This module provides a backend-agnostic interface for the remote
//! augmentation call. The heuristics never depend on a remote service being
//! present; an unconfigured backend simply means local-only parsing.
//!
//! # Architecture
//!
//! - `RemoteBackend` trait: defines the interface for remote parsing
//! - `RemoteClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OllamaBackend`, `MockBackend`
//!
//! # Configuration
//!
//! Environment variables:
//! - `JOT_REMOTE`: Backend to use (ollama, mock). Default: ollama
//! - `JOT_REMOTE_HOST`: Server URL (required for the ollama backend)
//! - `JOT_REMOTE_MODEL`: Model name (default: llama3.2)

mod mock;
mod ollama;
pub mod parsing;
pub mod types;

pub use mock::MockBackend;
pub use ollama::OllamaBackend;
pub use types::{RemoteParse, RemoteRequest};

use async_trait::async_trait;

use crate::error::Result;

/// Trait defining the interface for remote parsing backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    /// Parse one free-form entry into a structured record
    async fn parse_entry(&self, request: &RemoteRequest) -> Result<RemoteParse>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete remote client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum RemoteClient {
    /// Ollama backend (HTTP API)
    Ollama(OllamaBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl RemoteClient {
    /// Create a remote client from environment variables
    ///
    /// Returns None if the required environment variables are not set; the
    /// caller then runs local-only.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("JOT_REMOTE").unwrap_or_else(|_| "ollama".to_string());

        match backend.to_lowercase().as_str() {
            "ollama" => OllamaBackend::from_env().map(RemoteClient::Ollama),
            "mock" => Some(RemoteClient::Mock(MockBackend::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown JOT_REMOTE, falling back to ollama");
                OllamaBackend::from_env().map(RemoteClient::Ollama)
            }
        }
    }

    /// Create an Ollama backend directly
    pub fn ollama(host: &str, model: &str) -> Self {
        RemoteClient::Ollama(OllamaBackend::new(host, model))
    }

    /// Create a mock backend for testing
    pub fn mock(backend: MockBackend) -> Self {
        RemoteClient::Mock(backend)
    }
}

// Implement RemoteBackend for RemoteClient by delegating to the inner backend
#[async_trait]
impl RemoteBackend for RemoteClient {
    async fn parse_entry(&self, request: &RemoteRequest) -> Result<RemoteParse> {
        match self {
            RemoteClient::Ollama(b) => b.parse_entry(request).await,
            RemoteClient::Mock(b) => b.parse_entry(request).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            RemoteClient::Ollama(b) => b.health_check().await,
            RemoteClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            RemoteClient::Ollama(b) => b.model(),
            RemoteClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            RemoteClient::Ollama(b) => b.host(),
            RemoteClient::Mock(b) => b.host(),
        }
    }
}
