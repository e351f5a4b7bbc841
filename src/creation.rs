//! The dream submission wizard: describe, review, then follow generation
//! progress until the model is ready.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::app::AppSession;
use crate::client::DreamSubmission;
use crate::error::{ApiError, ApiResult};
use crate::haptics::HapticsSignal;

mod task;

pub(crate) const READY: &str = "Ready";
pub(crate) const QUEUED: &str = "DreamSync is queued";
pub(crate) const GENERATING: &str = "Generating model";
pub(crate) const FAILED: &str = "Generation failed";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CreationStep {
    #[default]
    Describing,
    Reviewing,
    InProgress,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CreationError {
    #[error("a title is required")]
    MissingTitle,

    #[error("a description is required")]
    MissingDescription,

    #[error("cannot review from the {0:?} step")]
    WrongStep(CreationStep),
}

/// What the user has entered so far, plus the tags the server extracted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CreationDraft {
    pub title: String,
    pub description: String,
    pub mood: String,
    pub style: String,
    pub extracted_tags: Vec<String>,
}

impl CreationDraft {
    fn validate(&self) -> Result<(), CreationError> {
        if self.title.trim().is_empty() {
            return Err(CreationError::MissingTitle);
        }
        if self.description.trim().is_empty() {
            return Err(CreationError::MissingDescription);
        }
        Ok(())
    }

    fn submission(&self) -> DreamSubmission {
        // Tags are extracted server-side.
        DreamSubmission {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            style: self.style.clone(),
            mood: self.mood.clone(),
            tags: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CreationSnapshot {
    pub step: CreationStep,
    pub draft: CreationDraft,
    pub is_submitting: bool,
    pub progress: f64,
    pub status_message: String,
    pub toast: Option<String>,
}

impl Default for CreationSnapshot {
    fn default() -> Self {
        Self {
            step: CreationStep::Describing,
            draft: CreationDraft::default(),
            is_submitting: false,
            progress: 0.0,
            status_message: READY.to_string(),
            toast: None,
        }
    }
}

pub struct CreationController {
    app: Arc<AppSession>,
    haptics: Arc<dyn HapticsSignal>,
    shared: Arc<Shared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

/// State shared with the submission task.
struct Shared {
    generation: AtomicU64,
    state: watch::Sender<CreationSnapshot>,
}

impl Shared {
    /// Apply `f` only while `generation` is still the current submission.
    fn update_if_current(
        &self,
        generation: u64,
        f: impl FnOnce(&mut CreationSnapshot),
    ) -> ApiResult<()> {
        let mut current = false;
        self.state.send_if_modified(|snap| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            current = true;
            f(snap);
            true
        });
        if current {
            Ok(())
        } else {
            Err(ApiError::Cancelled)
        }
    }
}

impl CreationController {
    pub fn new(app: Arc<AppSession>, haptics: Arc<dyn HapticsSignal>) -> Self {
        let (state, _) = watch::channel(CreationSnapshot::default());
        Self {
            app,
            haptics,
            shared: Arc::new(Shared {
                generation: AtomicU64::new(0),
                state,
            }),
            task: Mutex::new(None),
        }
    }

    pub fn snapshot(&self) -> CreationSnapshot {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CreationSnapshot> {
        self.shared.state.subscribe()
    }

    /// The pending toast, if any. Each toast is handed out once.
    pub fn take_toast(&self) -> Option<String> {
        let mut toast = None;
        self.shared.state.send_if_modified(|snap| {
            toast = snap.toast.take();
            toast.is_some()
        });
        toast
    }

    pub fn set_title(&self, title: impl Into<String>) {
        let title = title.into();
        self.shared.state.send_modify(|snap| snap.draft.title = title);
    }

    pub fn set_description(&self, description: impl Into<String>) {
        let description = description.into();
        self.shared
            .state
            .send_modify(|snap| snap.draft.description = description);
    }

    pub fn set_mood(&self, mood: impl Into<String>) {
        let mood = mood.into();
        self.shared.state.send_modify(|snap| snap.draft.mood = mood);
    }

    pub fn set_style(&self, style: impl Into<String>) {
        let style = style.into();
        self.shared.state.send_modify(|snap| snap.draft.style = style);
    }

    pub fn can_reset(&self) -> bool {
        let snap = self.shared.state.borrow();
        !snap.draft.title.is_empty() || !snap.draft.description.is_empty()
    }

    pub fn go_to_review(&self) -> Result<(), CreationError> {
        let mut result = Ok(());
        self.shared.state.send_if_modified(|snap| {
            if snap.step != CreationStep::Describing {
                result = Err(CreationError::WrongStep(snap.step));
                return false;
            }
            result = snap.draft.validate();
            if result.is_err() {
                return false;
            }
            snap.step = CreationStep::Reviewing;
            true
        });
        result
    }

    /// Step back one screen. Refused while a submission is running.
    pub fn go_back(&self) -> bool {
        self.shared.state.send_if_modified(|snap| {
            let previous = match snap.step {
                CreationStep::Describing => return false,
                CreationStep::Reviewing => CreationStep::Describing,
                CreationStep::InProgress if snap.is_submitting => return false,
                CreationStep::InProgress => CreationStep::Reviewing,
            };
            snap.step = previous;
            true
        })
    }

    /// Start a submission from the review step, or retry one that failed.
    /// Returns whether a submission was started. Must be called from within
    /// a Tokio runtime.
    pub fn submit(&self) -> bool {
        let mut submission = None;
        let mut generation = 0;
        self.shared.state.send_if_modified(|snap| {
            let allowed = match snap.step {
                CreationStep::Reviewing => true,
                CreationStep::InProgress => !snap.is_submitting,
                CreationStep::Describing => false,
            };
            if !allowed || snap.is_submitting || snap.draft.validate().is_err() {
                return false;
            }
            submission = Some(snap.draft.submission());
            generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
            snap.step = CreationStep::InProgress;
            snap.is_submitting = true;
            snap.progress = 0.0;
            snap.status_message = QUEUED.to_string();
            snap.toast = None;
            true
        });
        let Some(submission) = submission else {
            return false;
        };

        self.haptics.impact();

        let handle = tokio::spawn(task::run(
            task::TaskContext {
                app: self.app.clone(),
                haptics: self.haptics.clone(),
                shared: self.shared.clone(),
            },
            generation,
            submission,
        ));
        if let Some(previous) = self.lock_task().replace(handle) {
            previous.abort();
        }
        true
    }

    /// Abandon any running submission and start over with an empty draft.
    pub fn reset(&self) {
        self.cancel_task();
        self.shared
            .state
            .send_modify(|snap| *snap = CreationSnapshot::default());
    }

    /// Leave the progress screen for the library. Same effect as [`reset`].
    ///
    /// [`reset`]: CreationController::reset
    pub fn finish(&self) {
        self.reset();
    }

    fn cancel_task(&self) {
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.lock_task().take() {
            task.abort();
        }
    }

    fn lock_task(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.task.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for CreationController {
    fn drop(&mut self) {
        self.cancel_task();
    }
}

#[cfg(test)]
#[path = "tests/creation_tests.rs"]
mod tests;
