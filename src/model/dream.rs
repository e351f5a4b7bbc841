use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::DreamId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DreamStatus {
    Pending,
    Processing,
    #[serde(alias = "complete")]
    Completed,
    Failed,
}

impl DreamStatus {
    /// Pending and processing dreams live in the pending partition.
    pub fn is_pending(self) -> bool {
        matches!(self, DreamStatus::Pending | DreamStatus::Processing)
    }

    pub fn is_terminal(self) -> bool {
        !self.is_pending()
    }

    /// pending -> processing -> {completed | failed}; terminal states are final.
    pub fn can_transition_to(self, next: DreamStatus) -> bool {
        match (self, next) {
            (a, b) if a == b => true,
            (DreamStatus::Pending, _) => true,
            (DreamStatus::Processing, next) => next != DreamStatus::Pending,
            _ => false,
        }
    }

    pub fn progress_message(self) -> &'static str {
        match self {
            DreamStatus::Pending | DreamStatus::Processing => "DreamSync is generating your model",
            DreamStatus::Completed => "Model generation complete",
            DreamStatus::Failed => "Generation failed, please try again",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DreamStatus::Pending => "pending",
            DreamStatus::Processing => "processing",
            DreamStatus::Completed => "completed",
            DreamStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for DreamStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dream {
    pub id: DreamId,
    pub title: String,

    #[serde(default)]
    pub description: String,

    pub status: DreamStatus,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(with = "super::timestamp")]
    pub created_at: OffsetDateTime,

    #[serde(with = "super::timestamp")]
    pub updated_at: OffsetDateTime,

    #[serde(
        rename = "previewImageURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub preview_image_url: Option<String>,

    #[serde(rename = "modelURL", default, skip_serializing_if = "Option::is_none")]
    pub model_url: Option<String>,
}

impl Dream {
    /// A dream that exists only on this device.
    pub fn placeholder(
        title: impl Into<String>,
        description: impl Into<String>,
        status: DreamStatus,
        tags: Vec<String>,
    ) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: DreamId::local(),
            title: title.into(),
            description: description.into(),
            status,
            tags,
            created_at: now,
            updated_at: now,
            preview_image_url: None,
            model_url: None,
        }
    }

    /// Apply a status change, refusing to leave a terminal state.
    pub fn advance(&mut self, next: DreamStatus) -> bool {
        if !self.status.can_transition_to(next) {
            return false;
        }
        if self.status != next {
            self.status = next;
            self.updated_at = OffsetDateTime::now_utc();
        }
        true
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub status: DreamStatus,
    pub progress: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProgressEvent {
    pub fn new(status: DreamStatus, progress: f64) -> Self {
        Self {
            status,
            progress,
            message: None,
        }
    }

    /// The event's own message, or the default for its status.
    pub fn display_message(&self) -> &str {
        self.message
            .as_deref()
            .unwrap_or_else(|| self.status.progress_message())
    }
}

#[cfg(test)]
#[path = "../tests/model/dream_tests.rs"]
mod tests;
