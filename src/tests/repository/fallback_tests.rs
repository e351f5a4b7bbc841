use std::time::Duration;

use super::*;

fn live(items: Vec<ApiResult<ProgressEvent>>) -> ProgressStream {
    ProgressStream::from_events(stream::iter(items).boxed())
}

fn processing(p: f64) -> ProgressEvent {
    ProgressEvent::new(DreamStatus::Processing, p)
}

#[test]
fn ramp_from_zero_is_the_full_sequence() {
    let steps: Vec<f64> = ramp_after(0.0).iter().map(|e| e.progress).collect();
    assert_eq!(steps, vec![0.2, 0.5, 0.8, 1.0]);
    assert_eq!(ramp_after(0.0).back().map(|e| e.status), Some(DreamStatus::Completed));
}

#[test]
fn ramp_never_goes_backwards() {
    let steps: Vec<f64> = ramp_after(0.6).iter().map(|e| e.progress).collect();
    assert_eq!(steps, vec![0.8, 1.0]);

    let steps = ramp_after(1.0);
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0].status, DreamStatus::Completed);
}

#[test]
fn only_unauthorized_and_cancelled_are_unrecoverable() {
    assert!(!recoverable(&ApiError::Unauthorized));
    assert!(!recoverable(&ApiError::Cancelled));
    assert!(recoverable(&ApiError::Transport("dns".to_string())));
    assert!(recoverable(&ApiError::InvalidResponse(502)));
    assert!(recoverable(&ApiError::NotFound));
}

#[tokio::test]
async fn mid_stream_failure_continues_with_ramp() {
    let s = with_ramp(
        live(vec![
            Ok(processing(0.3)),
            Err(ApiError::Transport("reset".to_string())),
        ]),
        Duration::from_millis(1),
    );
    let events: Vec<ProgressEvent> = s.map(|e| e.expect("no error surfaces")).collect().await;
    let progress: Vec<f64> = events.iter().map(|e| e.progress).collect();
    assert_eq!(progress, vec![0.3, 0.5, 0.8, 1.0]);
    assert_eq!(events.last().map(|e| e.status), Some(DreamStatus::Completed));
}

#[tokio::test]
async fn clean_close_does_not_synthesize() {
    let s = with_ramp(live(vec![Ok(processing(0.4))]), Duration::from_millis(1));
    let events: Vec<ApiResult<ProgressEvent>> = s.collect().await;
    assert_eq!(events, vec![Ok(processing(0.4))]);
}

#[tokio::test]
async fn unauthorized_passes_through() {
    let s = with_ramp(live(vec![Err(ApiError::Unauthorized)]), Duration::from_millis(1));
    let events: Vec<ApiResult<ProgressEvent>> = s.collect().await;
    assert_eq!(events, vec![Err(ApiError::Unauthorized)]);
}
