//! Client-side view of the user's dreams and the resilience policy applied
//! when the backend cannot be reached.

use std::collections::HashSet;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::client::{DreamSubmission, SessionClient};
use crate::config::{ClientConfig, ResiliencePolicy};
use crate::error::{ApiError, ApiResult};
use crate::model::{Dream, DreamId, DreamStatus};
use crate::stream::ProgressStream;

mod fallback;
mod partitions;
pub use self::partitions::DreamPartitions;

pub struct DreamRepository {
    client: SessionClient,
    policy: ResiliencePolicy,
    step_delay: Duration,
    state: RwLock<RepoState>,
}

#[derive(Default)]
struct RepoState {
    partitions: DreamPartitions,
    last_error: Option<String>,
    /// Dreams completed locally by a fallback reload. The next server copy
    /// replaces them outright.
    provisional: HashSet<DreamId>,
}

impl RepoState {
    /// Drop the local copy of `id` if its status was synthesized here, so a
    /// server status can take its place.
    fn release_provisional(&mut self, id: &DreamId) {
        if self.provisional.remove(id) {
            self.partitions.remove(id);
        }
    }
}

impl DreamRepository {
    pub fn new(client: SessionClient, cfg: &ClientConfig) -> Self {
        Self {
            client,
            policy: cfg.policy(),
            step_delay: cfg.fallback_step_delay(),
            state: RwLock::new(RepoState::default()),
        }
    }

    pub fn client(&self) -> &SessionClient {
        &self.client
    }

    pub fn policy(&self) -> ResiliencePolicy {
        self.policy
    }

    /// Both partitions from one consistent read.
    pub async fn snapshot(&self) -> DreamPartitions {
        self.state.read().await.partitions.clone()
    }

    pub async fn pending(&self) -> Vec<Dream> {
        self.state.read().await.partitions.pending.clone()
    }

    pub async fn completed(&self) -> Vec<Dream> {
        self.state.read().await.partitions.completed.clone()
    }

    /// Message of the most recent refresh failure, cleared by a successful
    /// refresh.
    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error.clone()
    }

    /// Forget everything, e.g. after logout.
    pub async fn clear(&self) {
        let mut st = self.state.write().await;
        *st = RepoState::default();
    }

    /// Whether the configured policy swallows `err`.
    fn absorbs(&self, err: &ApiError) -> bool {
        self.policy == ResiliencePolicy::OfflineFallback && fallback::recoverable(err)
    }

    /// Fetch all dreams and repartition. On failure the previous view is kept.
    pub async fn refresh(&self) -> ApiResult<()> {
        match self.client.list_dreams().await {
            Ok(dreams) => {
                let keep_local = self.policy == ResiliencePolicy::OfflineFallback;
                let mut st = self.state.write().await;
                for dream in &dreams {
                    st.release_provisional(&dream.id);
                }
                st.partitions.replace_with(dreams, keep_local);
                let RepoState {
                    partitions,
                    provisional,
                    ..
                } = &mut *st;
                provisional.retain(|id| partitions.contains(id));
                st.last_error = None;
                Ok(())
            }
            Err(err) => {
                let absorbed = self.absorbs(&err);
                let mut st = self.state.write().await;
                st.last_error = Some(err.user_message());
                if !absorbed {
                    return Err(err);
                }
                tracing::warn!("refresh failed, keeping local view: {}", err);
                if st.partitions.is_empty() {
                    let samples = Dream::pending_samples().into_iter().chain(Dream::showcase());
                    st.partitions = DreamPartitions::from_dreams(samples);
                }
                Ok(())
            }
        }
    }

    /// Submit a new dream and file it under pending.
    pub async fn submit(&self, submission: &DreamSubmission) -> ApiResult<Dream> {
        let dream = match self.client.submit_dream(submission).await {
            Ok(dream) => dream,
            Err(err) if self.absorbs(&err) => {
                tracing::warn!("submit failed, continuing with a local placeholder: {}", err);
                Dream::placeholder(
                    submission.title.clone(),
                    submission.description.clone(),
                    DreamStatus::Processing,
                    submission.tags.clone(),
                )
            }
            Err(err) => return Err(err),
        };
        let mut st = self.state.write().await;
        Ok(st.partitions.upsert(dream))
    }

    /// Fetch the authoritative copy of `id` and refile it.
    pub async fn reload_dream(&self, id: &DreamId) -> ApiResult<Dream> {
        match self.client.poll_dream(id).await {
            Ok(fresh) => {
                let mut st = self.state.write().await;
                st.release_provisional(&fresh.id);
                Ok(st.partitions.upsert(fresh))
            }
            Err(err) if self.absorbs(&err) => {
                let mut st = self.state.write().await;
                let Some(mut dream) = st.partitions.remove(id) else {
                    return Err(err);
                };
                tracing::warn!("reload of {} failed, completing locally: {}", id, err);
                if dream.status.is_pending() && dream.advance(DreamStatus::Completed) {
                    st.provisional.insert(id.clone());
                }
                Ok(st.partitions.upsert(dream))
            }
            Err(err) => Err(err),
        }
    }

    /// Live progress for `dream`. In fallback mode a failed stream turns into
    /// a synthesized ramp that finishes `completed`.
    pub fn watch_progress(&self, dream: &Dream) -> ProgressStream {
        let live = self.client.open_progress_stream(&dream.id);
        match self.policy {
            ResiliencePolicy::Strict => live,
            ResiliencePolicy::OfflineFallback => {
                ProgressStream::from_events(fallback::with_ramp(live, self.step_delay))
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/repository_tests.rs"]
mod tests;
