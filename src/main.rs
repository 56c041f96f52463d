mod api;
mod attendance;
mod config;
mod ipc;
mod model;
mod screen;
mod stats;
mod wizard;

use std::io::{self, BufRead, Write};

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // stdout is the protocol channel; all logging goes to stderr.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cfg = config::Config::from_env();
    let mut state = ipc::AppState::new();
    if cfg.mock {
        match api::ApiClient::mock() {
            Ok(client) => state.api = Some(client),
            Err(e) => warn!("could not seed mock backend: {}", e),
        }
    } else if let Some(url) = &cfg.backend_url {
        match api::ApiClient::http(url) {
            Ok(client) => state.api = Some(client),
            Err(e) => warn!("could not build http client for {}: {}", url, e),
        }
    }
    info!(
        backend = state.api.as_ref().map(|a| a.mode()).unwrap_or("none"),
        "schooldeskd ready"
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line.context("reading request line")?;
        if line.trim().is_empty() {
            continue;
        }

        let resp = match serde_json::from_str::<ipc::Request>(&line) {
            Ok(req) => ipc::handle_request(&mut state, req),
            // No id to echo back for an unparseable line.
            Err(e) => serde_json::json!({
                "ok": false,
                "error": { "code": "bad_json", "message": e.to_string() },
            }),
        };
        writeln!(stdout, "{}", resp).context("writing response")?;
        stdout.flush().context("flushing response")?;
    }
    Ok(())
}
