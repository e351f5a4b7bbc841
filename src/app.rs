//! Process-wide session state: who is signed in and the dream library they see.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::client::SessionClient;
use crate::config::{ClientConfig, ResiliencePolicy};
use crate::error::ApiResult;
use crate::model::{HealthStatus, Session};
use crate::repository::DreamRepository;

pub struct AppSession {
    client: SessionClient,
    repository: Arc<DreamRepository>,
    state: RwLock<AppState>,
}

#[derive(Default)]
struct AppState {
    session: Option<Session>,
    last_error: Option<String>,
}

impl AppSession {
    pub fn new(client: SessionClient, cfg: &ClientConfig) -> Self {
        let repository = Arc::new(DreamRepository::new(client.clone(), cfg));
        Self {
            client,
            repository,
            state: RwLock::new(AppState::default()),
        }
    }

    pub fn client(&self) -> &SessionClient {
        &self.client
    }

    pub fn repository(&self) -> &Arc<DreamRepository> {
        &self.repository
    }

    pub async fn session(&self) -> Option<Session> {
        self.state.read().await.session.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.session.is_some()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error.clone()
    }

    /// Resume a persisted session if the backend still accepts it, then load
    /// dreams. A session established before bootstrap (e.g. guest) is kept.
    pub async fn bootstrap(&self) {
        if !self.is_authenticated().await && self.client.has_token().await {
            match self.client.fetch_session().await {
                Ok(session) => {
                    tracing::info!("resumed session for {}", session.user.username);
                    self.state.write().await.session = Some(session);
                }
                Err(err) => tracing::debug!("persisted session rejected: {}", err),
            }
        }
        let _ = self.refresh_dreams().await;
    }

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<Session> {
        let result = self.client.login(email, password).await;
        self.adopt(result).await
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> ApiResult<Session> {
        let result = self.client.register(username, email, password).await;
        self.adopt(result).await
    }

    /// Local-only session; nothing is persisted and no request is made.
    pub async fn login_as_guest(&self) -> Session {
        let session = Session::guest();
        self.state.write().await.session = Some(session.clone());
        tracing::info!("continuing as guest");
        let _ = self.refresh_dreams().await;
        session
    }

    pub async fn logout(&self) {
        self.client.logout().await;
        *self.state.write().await = AppState::default();
        self.repository.clear().await;
    }

    /// Reload the library, recording any failure message.
    pub async fn refresh_dreams(&self) -> ApiResult<()> {
        let result = self.repository.refresh().await;
        self.state.write().await.last_error = self.repository.last_error().await;
        result
    }

    /// Service health. Offline-fallback mode never reports an outage.
    pub async fn health(&self) -> ApiResult<HealthStatus> {
        match self.client.health().await {
            Ok(status) => Ok(status),
            Err(err) if self.repository.policy() == ResiliencePolicy::OfflineFallback => {
                tracing::warn!("health check failed, reporting healthy: {}", err);
                Ok(HealthStatus::all_ok())
            }
            Err(err) => Err(err),
        }
    }

    async fn adopt(&self, result: ApiResult<Session>) -> ApiResult<Session> {
        match result {
            Ok(session) => {
                {
                    let mut st = self.state.write().await;
                    st.session = Some(session.clone());
                    st.last_error = None;
                }
                let _ = self.refresh_dreams().await;
                Ok(session)
            }
            Err(err) => {
                self.state.write().await.last_error = Some(err.user_message());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
