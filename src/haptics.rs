use std::sync::Arc;

use crate::config::ClientConfig;

/// Fire-and-forget feedback hooks invoked at wizard transitions.
pub trait HapticsSignal: Send + Sync {
    fn notify_success(&self);
    fn notify_error(&self);
    fn impact(&self);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoHaptics;

impl HapticsSignal for NoHaptics {
    fn notify_success(&self) {}
    fn notify_error(&self) {}
    fn impact(&self) {}
}

/// Emits a debug trace per signal; stands in for a device where there is none.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingHaptics;

impl HapticsSignal for TracingHaptics {
    fn notify_success(&self) {
        tracing::debug!(target: "dreamecho::haptics", "success");
    }

    fn notify_error(&self) {
        tracing::debug!(target: "dreamecho::haptics", "error");
    }

    fn impact(&self) {
        tracing::debug!(target: "dreamecho::haptics", "impact");
    }
}

/// `signal` when haptics are enabled, a no-op otherwise.
pub fn configured(cfg: &ClientConfig, signal: Arc<dyn HapticsSignal>) -> Arc<dyn HapticsSignal> {
    if cfg.enable_haptics {
        signal
    } else {
        Arc::new(NoHaptics)
    }
}
