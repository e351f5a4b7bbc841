//! Authenticated gateway to the DreamEcho backend.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::RwLock;

use crate::config::ClientConfig;
use crate::credentials::CredentialStore;
use crate::error::{ApiError, ApiResult};
use crate::model::{Dream, DreamId, HealthStatus, Session};

mod auth;
mod dreams;
mod events;
mod http;
mod token;
mod types;
pub use self::types::DreamSubmission;

/// Cheap to clone; clones share the token and the connection pool.
#[derive(Clone)]
pub struct SessionClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    base_url: String,
    events_url: String,
    http: reqwest::Client,
    request_timeout: Duration,
    stream_read_timeout: Duration,

    // Single writer: every mutation holds the write guard across the store
    // update, so cache and store never disagree once a mutation returns.
    token: RwLock<Option<String>>,
    store: Arc<dyn CredentialStore>,
}

impl SessionClient {
    /// Build a client and adopt any token already persisted in `store`.
    pub async fn new(cfg: &ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
        cfg.validate()?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("dreamecho/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(cfg.connect_timeout())
            .build()
            .context("build reqwest client")?;

        let persisted = token::load_persisted(store.clone()).await;

        Ok(Self {
            inner: Arc::new(ClientInner {
                base_url: cfg.base_url.trim_end_matches('/').to_string(),
                events_url: cfg.events_base().trim_end_matches('/').to_string(),
                http,
                request_timeout: cfg.request_timeout(),
                stream_read_timeout: cfg.stream_read_timeout(),
                token: RwLock::new(persisted),
                store,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }
}

impl std::fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionClient")
            .field("base_url", &self.inner.base_url)
            .field("events_url", &self.inner.events_url)
            .finish_non_exhaustive()
    }
}
