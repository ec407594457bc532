//! DID authentication gateway
//!
//! ```text
//! ┌──────────┐  GET /auth/challenge   ┌───────────────┐
//! │  Client  │───────────────────────▶│ ChallengeStore│
//! │ (DID key)│  POST /auth/verify     ├───────────────┤
//! │          │───────────────────────▶│  DidVerifier  │──▶ TokenIssuer
//! └──────────┘  Bearer <token>        └───────────────┘
//!       │                                    │
//!       └──────────── /campaigns ────────────┘
//! ```
//!
//! Usage: `did_auth_gateway [--env <name>] [--port <port>]`

use std::sync::Arc;

use did_auth_gateway::config::AppConfig;
use did_auth_gateway::did_auth::SystemClock;
use did_auth_gateway::gateway;

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

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut app_config = AppConfig::load(&env)?;
    if let Some(port) = get_port_override() {
        app_config.gateway.port = port;
    }

    let _log_guard = did_auth_gateway::logging::init_logging(&app_config);
    tracing::info!(env = %env, "starting DID authentication gateway");

    let state = gateway::build_state(&app_config, Arc::new(SystemClock))?;
    gateway::run_server(&app_config, state).await
}
