use std::collections::VecDeque;
use std::time::Duration;

use futures_util::stream::{self, BoxStream};
use futures_util::StreamExt;

use crate::error::{ApiError, ApiResult};
use crate::model::{DreamStatus, ProgressEvent};
use crate::stream::ProgressStream;

const RAMP: [f64; 4] = [0.2, 0.5, 0.8, 1.0];
const RAMP_MESSAGE: &str = "Generating offline";

/// Errors fallback never hides: the session is gone, or the caller asked to stop.
pub(super) fn recoverable(err: &ApiError) -> bool {
    !matches!(err, ApiError::Unauthorized | ApiError::Cancelled)
}

/// Steps still ahead of `last`, ending in one `completed` event at 1.0.
pub(super) fn ramp_after(last: f64) -> VecDeque<ProgressEvent> {
    let mut steps: VecDeque<ProgressEvent> = RAMP
        .iter()
        .copied()
        .filter(|p| *p < 1.0 && *p > last)
        .map(|p| ProgressEvent {
            status: DreamStatus::Processing,
            progress: p,
            message: Some(RAMP_MESSAGE.to_string()),
        })
        .collect();
    steps.push_back(ProgressEvent {
        status: DreamStatus::Completed,
        progress: 1.0,
        message: Some(DreamStatus::Completed.progress_message().to_string()),
    });
    steps
}

enum Phase {
    Live { live: ProgressStream, last: f64 },
    Ramp(VecDeque<ProgressEvent>),
}

pub(super) fn with_ramp(
    live: ProgressStream,
    step_delay: Duration,
) -> BoxStream<'static, ApiResult<ProgressEvent>> {
    stream::unfold(Phase::Live { live, last: 0.0 }, move |phase| async move {
        let mut phase = phase;
        loop {
            match phase {
                Phase::Live { mut live, last } => match live.next().await {
                    Some(Ok(event)) => {
                        let last = last.max(event.progress);
                        return Some((Ok(event), Phase::Live { live, last }));
                    }
                    Some(Err(err)) if recoverable(&err) => {
                        tracing::warn!("progress stream failed, synthesizing: {}", err);
                        phase = Phase::Ramp(ramp_after(last));
                    }
                    Some(Err(err)) => return Some((Err(err), Phase::Ramp(VecDeque::new()))),
                    None => return None,
                },
                Phase::Ramp(mut steps) => {
                    let event = steps.pop_front()?;
                    tokio::time::sleep(step_delay).await;
                    return Some((Ok(event), Phase::Ramp(steps)));
                }
            }
        }
    })
    .boxed()
}

#[cfg(test)]
#[path = "../tests/repository/fallback_tests.rs"]
mod tests;
