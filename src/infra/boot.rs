use std::net::SocketAddr;
use std::sync::Arc;

use crate::clients::quickitquote::QuickItQuoteRemote;
use crate::core::dispatch::Dispatcher;
use crate::infra::config::Config;
use crate::infra::http_app::{build_app, AppState};
use crate::tools::search::SearchBackend;

pub fn search_backend(cfg: &Config) -> anyhow::Result<Arc<dyn SearchBackend>> {
    let remote = QuickItQuoteRemote::new(cfg.search_base_url.clone(), cfg.upstream_timeout())?;
    Ok(Arc::new(remote))
}

pub async fn run_server() -> anyhow::Result<()> {
    let cfg = Config::from_env()?;
    tracing::info!(
        mode = %cfg.mode,
        port = cfg.port,
        upstream = %cfg.search_base_url,
        root_transport = ?cfg.root_transport,
        "BOOT quickitquote-mcp"
    );
    let search = search_backend(&cfg)?;

    // Stdio mode: JSON-RPC over stdin/stdout only, no HTTP listener.
    if cfg.mode == "stdio" {
        let dispatcher = Dispatcher::new(search);
        crate::infra::runtime::stdio::serve_stdio(&dispatcher).await?;
        return Ok(());
    }

    let app = build_app(AppState::from_config(search, &cfg), cfg.root_transport);
    let addr: SocketAddr = ([0, 0, 0, 0], cfg.port).into();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
