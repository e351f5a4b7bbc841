use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.dreamecho.ai";

/// Process-wide client settings. Built once at startup and handed to the
/// client and repository constructors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,

    /// Host serving progress streams; `None` means `base_url`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events_url: Option<String>,

    /// Substitute local data for failed network calls instead of surfacing
    /// the failure.
    pub offline_fallback: bool,

    pub enable_haptics: bool,

    pub request_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub stream_read_timeout_ms: u64,

    /// Pause between synthesized progress events in fallback mode.
    pub fallback_step_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            events_url: None,
            offline_fallback: false,
            enable_haptics: true,
            request_timeout_ms: 30_000,
            connect_timeout_ms: 10_000,
            stream_read_timeout_ms: 60_000,
            fallback_step_delay_ms: 800,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResiliencePolicy {
    /// Failures propagate to the caller.
    Strict,
    /// Failures are absorbed and replaced by synthesized local data.
    OfflineFallback,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Read `config.json` if present, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut cfg = if path.exists() {
            let bytes =
                std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
            serde_json::from_slice(&bytes).with_context(|| format!("parse {}", path.display()))?
        } else {
            Self::default()
        };
        cfg.apply_env(|key| std::env::var(key).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("API_BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.base_url = v.trim().to_string();
        }
        if let Some(v) = lookup("API_EVENTS_URL").filter(|v| !v.trim().is_empty()) {
            self.events_url = Some(v.trim().to_string());
        }
        if let Some(v) = lookup("ENABLE_HAPTICS") {
            self.enable_haptics = !v.trim().eq_ignore_ascii_case("false");
        }
        if let Some(v) = lookup("DREAMECHO_OFFLINE_FALLBACK") {
            self.offline_fallback = matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            );
        }
    }

    pub fn validate(&self) -> Result<()> {
        reqwest::Url::parse(&self.base_url)
            .with_context(|| format!("invalid base url {:?}", self.base_url))?;
        if let Some(events) = &self.events_url {
            reqwest::Url::parse(events)
                .with_context(|| format!("invalid events url {:?}", events))?;
        }
        Ok(())
    }

    pub fn events_base(&self) -> &str {
        self.events_url.as_deref().unwrap_or(&self.base_url)
    }

    pub fn policy(&self) -> ResiliencePolicy {
        if self.offline_fallback {
            ResiliencePolicy::OfflineFallback
        } else {
            ResiliencePolicy::Strict
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn stream_read_timeout(&self) -> Duration {
        Duration::from_millis(self.stream_read_timeout_ms)
    }

    pub fn fallback_step_delay(&self) -> Duration {
        Duration::from_millis(self.fallback_step_delay_ms)
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
