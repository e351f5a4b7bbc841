use futures_util::StreamExt;

use super::*;
use crate::model::DreamStatus;

pub(super) struct TaskContext {
    pub(super) app: Arc<AppSession>,
    pub(super) haptics: Arc<dyn HapticsSignal>,
    pub(super) shared: Arc<Shared>,
}

pub(super) async fn run(ctx: TaskContext, generation: u64, submission: DreamSubmission) {
    match drive(&ctx, generation, submission).await {
        Ok(()) => {}
        Err(ApiError::Cancelled) => {
            tracing::debug!("submission {} superseded", generation);
        }
        Err(err) => {
            tracing::warn!("submission failed: {}", err);
            let failed = ctx.shared.update_if_current(generation, |snap| {
                snap.is_submitting = false;
                snap.status_message = FAILED.to_string();
                snap.toast = Some(err.user_message());
            });
            if failed.is_ok() {
                ctx.haptics.notify_error();
            }
        }
    }
}

async fn drive(ctx: &TaskContext, generation: u64, submission: DreamSubmission) -> ApiResult<()> {
    let repository = ctx.app.repository().clone();

    let dream = repository.submit(&submission).await?;
    ctx.shared.update_if_current(generation, |snap| {
        if !dream.tags.is_empty() {
            snap.draft.extracted_tags = dream.tags.clone();
        }
        snap.status_message = GENERATING.to_string();
    })?;
    let _ = ctx.app.refresh_dreams().await;

    let mut events = repository.watch_progress(&dream);
    while let Some(event) = events.next().await {
        let event = event?;
        ctx.shared.update_if_current(generation, |snap| {
            snap.progress = event.progress;
            snap.status_message = event.display_message().to_string();
        })?;
    }
    drop(events);

    let updated = repository.reload_dream(&dream.id).await?;
    ctx.shared.update_if_current(generation, |snap| {
        if updated.status == DreamStatus::Completed {
            snap.progress = 1.0;
        }
        if !updated.tags.is_empty() {
            snap.draft.extracted_tags = updated.tags.clone();
        }
        snap.status_message = updated.status.progress_message().to_string();
        snap.is_submitting = false;
    })?;
    match updated.status {
        DreamStatus::Completed => ctx.haptics.notify_success(),
        DreamStatus::Failed => ctx.haptics.notify_error(),
        _ => {}
    }

    let _ = ctx.app.refresh_dreams().await;
    Ok(())
}
