use std::sync::Arc;
use web_server::AppState;

// Entry point for `cargo run -p web-server`: a bare server with the file/env configuration
// and no CLI flags. The `tradelog serve` command does the same with overrides.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = configuration::load_config(None)?;
    let _guard = configuration::init_tracing(&config.logging)?;

    let state = Arc::new(AppState::from_settings(&config.analytics)?);
    web_server::run_server(config.server.socket_addr()?, state).await
}
