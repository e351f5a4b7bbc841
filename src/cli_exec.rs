use std::sync::Arc;

use anyhow::{Context, Result};
use futures_util::StreamExt;

use dreamecho::creation::CreationController;
use dreamecho::haptics::{self, TracingHaptics};
use dreamecho::model::{Dream, DreamId};

use crate::Commands;
use crate::cli_commands::{CreateArgs, JsonArgs, ShowArgs, WatchArgs};
use crate::cli_runtime::CliContext;

pub(crate) async fn handle_command(ctx: &CliContext, command: Commands) -> Result<()> {
    let app = &ctx.app;
    match command {
        Commands::Login(args) => {
            let session = app.login(&args.email, &args.password).await.context("login")?;
            println!("Logged in as {}", session.user.username);
        }
        Commands::Register(args) => {
            let session = app
                .register(&args.username, &args.email, &args.password)
                .await
                .context("register")?;
            println!("Registered {}", session.user.username);
        }
        Commands::Logout => {
            app.logout().await;
            println!("Logged out");
        }
        Commands::Session(JsonArgs { json }) => {
            let session = app.client().fetch_session().await.context("fetch session")?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&session.user).context("serialize session json")?
                );
            } else {
                println!("id: {}", session.user.id);
                println!("username: {}", session.user.username);
                println!("email: {}", session.user.email);
            }
        }
        Commands::Dreams(JsonArgs { json }) => {
            app.refresh_dreams().await.context("list dreams")?;
            let dreams = app.repository().snapshot().await;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&dreams).context("serialize dreams json")?
                );
            } else {
                for dream in dreams.pending.iter().chain(dreams.completed.iter()) {
                    println!("{} {:<10} {}", dream.id, dream.status.as_str(), dream.title);
                }
            }
        }
        Commands::Show(ShowArgs { dream_id, json }) => {
            let dream = app
                .client()
                .poll_dream(&DreamId::new(dream_id))
                .await
                .context("fetch dream")?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&dream).context("serialize dream json")?
                );
            } else {
                print_dream(&dream);
            }
        }
        Commands::Create(args) => create(ctx, args).await?,
        Commands::Watch(WatchArgs { dream_id }) => watch(ctx, DreamId::new(dream_id)).await?,
        Commands::Health(JsonArgs { json }) => {
            let health = app.health().await.context("health check")?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&health).context("serialize health json")?
                );
            } else {
                println!("analysis: {}", if health.analysis_ok { "ok" } else { "down" });
                println!("modeling: {}", if health.modeling_ok { "ok" } else { "down" });
            }
        }
    }
    Ok(())
}

fn print_dream(dream: &Dream) {
    println!("id: {}", dream.id);
    println!("title: {}", dream.title);
    println!("status: {}", dream.status);
    if !dream.tags.is_empty() {
        println!("tags: {}", dream.tags.join(", "));
    }
    if let Some(url) = &dream.preview_image_url {
        println!("preview: {}", url);
    }
    if let Some(url) = &dream.model_url {
        println!("model: {}", url);
    }
    if !dream.description.is_empty() {
        println!();
        println!("{}", dream.description);
    }
}

async fn create(ctx: &CliContext, args: CreateArgs) -> Result<()> {
    let signal = haptics::configured(&ctx.cfg, Arc::new(TracingHaptics));
    let controller = CreationController::new(ctx.app.clone(), signal);
    controller.set_title(args.title);
    controller.set_description(args.description);
    controller.set_mood(args.mood);
    controller.set_style(args.style);
    controller.go_to_review()?;

    let mut updates = controller.subscribe();
    if !controller.submit() {
        anyhow::bail!("submission could not be started");
    }

    let mut last_message = String::new();
    loop {
        let snap = updates.borrow_and_update().clone();
        if snap.status_message != last_message {
            println!("[{:>3.0}%] {}", snap.progress * 100.0, snap.status_message);
            last_message = snap.status_message;
        }
        if !snap.is_submitting {
            break;
        }
        tokio::select! {
            changed = updates.changed() => changed.context("creation state closed")?,
            _ = tokio::signal::ctrl_c() => {
                controller.reset();
                anyhow::bail!("cancelled");
            }
        }
    }

    if let Some(toast) = controller.take_toast() {
        anyhow::bail!(toast);
    }
    let tags = controller.snapshot().draft.extracted_tags;
    if !tags.is_empty() {
        println!("tags: {}", tags.join(", "));
    }
    Ok(())
}

async fn watch(ctx: &CliContext, id: DreamId) -> Result<()> {
    let repository = ctx.app.repository();
    repository.refresh().await.context("list dreams")?;
    let dream = match repository.snapshot().await.get(&id) {
        Some(dream) => dream.clone(),
        None => ctx.app.client().poll_dream(&id).await.context("fetch dream")?,
    };
    if dream.status.is_terminal() {
        println!("{} is already {}", dream.id, dream.status);
        return Ok(());
    }

    let mut events = repository.watch_progress(&dream);
    loop {
        tokio::select! {
            next = events.next() => match next {
                Some(event) => {
                    let event = event.context("progress stream")?;
                    println!("[{:>3.0}%] {}", event.progress * 100.0, event.display_message());
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                events.cancel();
                anyhow::bail!("cancelled");
            }
        }
    }
    drop(events);

    let updated = repository.reload_dream(&id).await.context("reload dream")?;
    println!("{} {}", updated.id, updated.status.progress_message());
    Ok(())
}
