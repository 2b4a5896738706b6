//! Runs the hello service until Ctrl-C.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use wisent::CancellationToken;
use wisent_demo::HelloApp;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let debug = std::env::var("DEBUG").is_ok_and(|v| v.eq_ignore_ascii_case("true") || v == "1");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if debug { "debug" } else { "info" })
    });

    // Human-readable output when debugging, JSON lines otherwise
    if debug {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    }

    let app = HelloApp::from_env()?;
    tracing::info!(
        addr = %app.addr(),
        "Starting hello server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let (token, cancel) = CancellationToken::new();
    let shutdown = app.start(cancel.clone()).await;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Received Ctrl-C, shutting down");
    token.cancel();
    shutdown.shutdown(cancel).await;

    Ok(())
}
