mod config;
mod errors;
mod export;
mod layout;
mod models;
mod payments;
mod render;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::layout::{HelveticaMetrics, PageGeometry};
use crate::payments::PaystackClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CVForge API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize payment gateway
    let payments = Arc::new(PaystackClient::new(
        config.paystack_secret_key.clone(),
        config.paystack_base_url.clone(),
        config.payment_currency.clone(),
    )?);
    info!(
        "Payment gateway initialized ({}, fee {:.2} {})",
        config.paystack_base_url, config.export_fee, config.payment_currency
    );

    // Layout defaults: A4 portrait, Helvetica metrics to match the PDF fonts
    let geometry = PageGeometry::default();
    geometry.validate()?;
    info!(
        "Layout: {}x{}mm, default theme {:?}, dates {:?}",
        geometry.width, geometry.height, config.default_theme, config.date_style
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        payments,
        geometry,
        measurer: Arc::new(HelveticaMetrics),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the CV builder's host once it is configurable

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
