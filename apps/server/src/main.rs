use pushwatch_server::api::app_router;
use pushwatch_server::config::Config;
use pushwatch_server::shutdown::shutdown_signal;
use pushwatch_server::{build_runtime, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing();
    let runtime = build_runtime(&config).await?;

    let router = app_router(runtime.state.clone());
    tracing::info!("Health endpoint listening on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    runtime.shutdown().await;
    tracing::info!("Shutdown complete");
    Ok(())
}
