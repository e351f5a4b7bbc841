use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dreamecho::app::AppSession;
use dreamecho::client::SessionClient;
use dreamecho::config::ClientConfig;
use dreamecho::credentials::FileCredentialStore;

use crate::Commands;

#[derive(Parser)]
#[command(name = "dreamecho")]
#[command(about = "DreamEcho dream-to-3D client", long_about = None)]
pub(crate) struct Cli {
    /// Directory holding config.json and the session token
    #[arg(long, global = true, env = "DREAMECHO_STATE_DIR", value_name = "DIR")]
    state_dir: Option<PathBuf>,

    /// Backend URL (overrides config.json and API_BASE_URL)
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    /// Substitute local data when the backend cannot be reached
    #[arg(long, global = true)]
    offline_fallback: bool,

    #[command(subcommand)]
    command: Commands,
}

pub(crate) struct CliContext {
    pub(crate) cfg: ClientConfig,
    pub(crate) app: Arc<AppSession>,
}

pub(crate) fn run() -> Result<()> {
    let Cli {
        state_dir,
        base_url,
        offline_fallback,
        command,
    } = Cli::parse();
    init_tracing();

    let state_dir = match state_dir {
        Some(dir) => dir,
        None => default_state_dir()?,
    };
    let mut cfg = ClientConfig::load(&state_dir.join("config.json"))?;
    if let Some(url) = base_url {
        cfg.base_url = url;
    }
    if offline_fallback {
        cfg.offline_fallback = true;
    }
    cfg.validate()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start tokio runtime")?;
    runtime.block_on(async move {
        let ctx = connect(cfg, &state_dir).await?;
        crate::cli_exec::handle_command(&ctx, command).await
    })
}

async fn connect(cfg: ClientConfig, state_dir: &Path) -> Result<CliContext> {
    let store = Arc::new(FileCredentialStore::new(state_dir));
    let client = SessionClient::new(&cfg, store).await?;
    tracing::debug!("using backend {}", client.base_url());
    let app = Arc::new(AppSession::new(client, &cfg));
    Ok(CliContext { cfg, app })
}

fn default_state_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("cannot determine config directory (use --state-dir)")?;
    Ok(base.join("dreamecho"))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("DREAMECHO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
