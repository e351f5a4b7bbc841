use super::*;

pub(super) async fn load_persisted(store: Arc<dyn CredentialStore>) -> Option<String> {
    match tokio::task::spawn_blocking(move || store.load()).await {
        Ok(Ok(token)) => token,
        Ok(Err(err)) => {
            tracing::warn!("load persisted token: {:#}", err);
            None
        }
        Err(err) => {
            tracing::warn!("credential store task: {}", err);
            None
        }
    }
}

async fn persist(store: Arc<dyn CredentialStore>, token: Option<String>) -> Result<()> {
    tokio::task::spawn_blocking(move || match token {
        Some(token) => store.save(&token),
        None => store.clear(),
    })
    .await
    .context("credential store task")?
}

impl SessionClient {
    /// Snapshot of the cached token; never observes a half-applied mutation.
    pub async fn current_token(&self) -> Option<String> {
        self.inner.token.read().await.clone()
    }

    pub async fn has_token(&self) -> bool {
        self.inner.token.read().await.is_some()
    }

    /// Replace the token in cache and store as one step.
    ///
    /// A store failure is logged; the cached value still applies so the
    /// running process stays consistent with what the server handed out.
    pub(super) async fn replace_token(&self, token: Option<String>) {
        let mut slot = self.inner.token.write().await;
        if let Err(err) = persist(self.inner.store.clone(), token.clone()).await {
            tracing::warn!("persist token: {:#}", err);
        }
        *slot = token;
    }

    /// Drop the token after a 401, unless it was already replaced since the
    /// failing request read it.
    pub(super) async fn invalidate_token(&self, sent: Option<&str>) {
        let mut slot = self.inner.token.write().await;
        if slot.as_deref() != sent {
            tracing::debug!("401 for a superseded token; keeping the current one");
            return;
        }
        if slot.is_none() {
            return;
        }
        if let Err(err) = persist(self.inner.store.clone(), None).await {
            tracing::warn!("clear token: {:#}", err);
        }
        *slot = None;
        tracing::info!("session token invalidated by server");
    }
}

#[cfg(test)]
#[path = "../tests/client/token_tests.rs"]
mod tests;
