//! postirc - CGI entry point.
//!
//! Reads one request from the CGI environment and stdin, relays it, and
//! writes the response to stdout.

use postirc::config::validation;
use postirc::paste::PasteService;
use postirc::{Config, Dispatcher, InboundRequest, security, telemetry};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("POSTIRC_CONFIG").ok())
        .unwrap_or_else(|| "postirc.toml".to_string());

    let config = Config::load_or_default(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = validation::validate(&config) {
        for e in &errors {
            error!(path = %config_path, error = %e, "Invalid config");
        }
        anyhow::bail!("{} configuration error(s) in {}", errors.len(), config_path);
    }

    let store = security::counter_store(&config.rate_limit)?;
    let sink = Arc::new(PasteService::new(&config.paste));
    let dispatcher = Dispatcher::new(&config, sink, store);

    let env: HashMap<String, String> = std::env::vars().collect();
    let request = InboundRequest::from_cgi(&env, tokio::io::stdin()).await?;
    info!(
        method = ?request.method,
        path = ?request.path,
        remote = %request.remote_addr,
        "Handling request"
    );

    let response = dispatcher.handle(&request).await;

    let mut stdout = tokio::io::stdout();
    stdout.write_all(response.render().as_bytes()).await?;
    stdout.flush().await?;

    Ok(())
}
