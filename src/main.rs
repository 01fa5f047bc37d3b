//! Allowlist Vault server
//!
//! ```text
//! allowlist_vault [--env <name>] [--port <port>] [--reseal | --gen-key]
//! ```
//!
//! - `--env`: selects `config/<name>.yaml` (default `dev`)
//! - `--port`: overrides the configured gateway port
//! - `--reseal`: re-seal every stored token under the current key and exit
//! - `--gen-key`: print a new random encryption key (hex) and exit

use std::sync::Arc;

use anyhow::Context;

use allowlist_vault::api_auth::Authenticator;
use allowlist_vault::config::AppConfig;
use allowlist_vault::db::Database;
use allowlist_vault::entries::{EntryStore, MemoryEntryStore};
use allowlist_vault::gateway::{self, state::AppState};
use allowlist_vault::logging::init_logging;
use allowlist_vault::migration;
use allowlist_vault::vault::{self, Vault};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

fn use_gen_key_mode() -> bool {
    std::env::args().any(|a| a == "--gen-key")
}

fn use_reseal_mode() -> bool {
    std::env::args().any(|a| a == "--reseal")
}

async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn EntryStore>> {
    match config.database_url.as_deref() {
        Some(url) => {
            let db = Database::open(url)
                .await
                .context("Failed to open PostgreSQL entry store")?;
            Ok(Arc::new(db.entry_store()))
        }
        None => {
            tracing::warn!("No database_url configured; using in-memory store (data is lost on exit)");
            Ok(Arc::new(MemoryEntryStore::new()))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Needs no config: run before anything is loaded
    if use_gen_key_mode() {
        println!("{}", vault::generate_hex().as_str());
        return Ok(());
    }

    let env = get_env();
    let mut app_config = AppConfig::load(&env)?;
    if let Some(port) = get_port_override() {
        app_config.gateway.port = port;
    }
    let _log_guard = init_logging(&app_config);

    tracing::info!(
        "Starting Allowlist Vault in {} mode (git {})",
        env,
        env!("GIT_HASH")
    );

    // Validate keys once, before anything binds
    let vault = Arc::new(Vault::from_config(&app_config.vault).context("Invalid encryption key")?);
    let authenticator = Arc::new(Authenticator::from_config(&app_config.auth));
    if authenticator.static_key_count() == 0 && !authenticator.hmac_enabled() {
        tracing::warn!("No API key or HMAC secret configured; every non-public request will be denied");
    }
    tracing::info!(
        static_keys = authenticator.static_key_count(),
        hmac = authenticator.hmac_enabled(),
        replay_window_secs = authenticator.replay_window_secs(),
        "Request gate configured"
    );

    let store = open_store(&app_config).await?;

    if use_reseal_mode() {
        let report = migration::reseal_all(store.as_ref(), &vault).await?;
        println!("{}", serde_json::to_string(&report)?);
        return Ok(());
    }

    let state = Arc::new(AppState::new(
        store,
        vault,
        authenticator,
        app_config.gateway.max_body_bytes,
    ));
    gateway::run_server(&app_config.gateway, state).await
}
