//! Request and response payloads.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(super) struct LoginRequest<'a> {
    pub(super) email: &'a str,
    pub(super) password: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct RegisterRequest<'a> {
    pub(super) username: &'a str,
    pub(super) email: &'a str,
    pub(super) password: &'a str,
}

/// Body of `POST /api/dreams`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DreamSubmission {
    pub title: String,
    pub description: String,

    #[serde(default)]
    pub style: String,

    #[serde(default)]
    pub mood: String,

    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct HealthResponse {
    pub(super) deepseek: String,
    pub(super) tripo: String,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ErrorBody {
    #[serde(default)]
    pub(super) message: Option<String>,
    #[serde(default)]
    pub(super) error: Option<String>,
}
