use anyhow::Context;
use pdf_builder_api::app;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Listen address used when `PDF_BUILDER_ADDR` is unset
const DEFAULT_ADDR: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_builder_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("PDF_BUILDER_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let app = app().layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("pdf-builder API listening on http://{addr}");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
