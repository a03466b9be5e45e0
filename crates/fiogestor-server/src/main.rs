//! FioGestor Billing Server
//!
//! Axum-based backend for the subscription storefront: serves the plan
//! catalog, turns validated checkout forms into hosted-checkout redirects,
//! and records purchase-funnel analytics.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fiogestor_billing::{
    Catalog, CheckoutDispatcher, EventLogTracker, Funnel, PaymentLinks, PixelLogTracker,
};

use crate::handlers::{confirm_purchase, create_checkout_session, health_check, list_plans};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    // Build the catalog; a misconfigured catalog must stop the process here.
    let catalog = Arc::new(
        Catalog::from_env().map_err(|e| anyhow::anyhow!("invalid plan catalog: {e}"))?,
    );
    tracing::info!("✓ Catalog loaded with {} plans", catalog.plans().len());
    for plan in catalog.plans() {
        tracing::info!(
            "  Plan: {} ({}/mês, {}% off anual)",
            plan.id,
            fiogestor_billing::format_price(plan.monthly_cents),
            plan.yearly_discount_percent()
        );
    }

    // Register funnel trackers for whichever integrations are configured
    let mut funnel = Funnel::new();
    match EventLogTracker::from_env() {
        Some(tracker) => {
            tracing::info!("✓ Site analytics configured");
            funnel.register(tracker);
        }
        None => tracing::warn!("⚠ GA_MEASUREMENT_ID not set - site analytics disabled"),
    }
    match PixelLogTracker::from_env() {
        Some(tracker) => {
            tracing::info!("✓ Ad pixel configured");
            funnel.register(tracker);
        }
        None => tracing::warn!("⚠ META_PIXEL_ID not set - ad pixel disabled"),
    }
    let funnel = Arc::new(funnel);

    // Checkout dispatcher over the catalog and payment link table
    let dispatcher = Arc::new(CheckoutDispatcher::new(
        catalog.clone(),
        PaymentLinks::from_env(),
        funnel.clone(),
    ));

    // Build application state
    let state = AppState {
        catalog,
        dispatcher,
        funnel,
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // Health & catalog
        .route("/health", get(health_check))
        .route("/api/plans", get(list_plans))
        // Checkout
        .route("/api/create-checkout-session", post(create_checkout_session))
        .route("/api/confirm-purchase", post(confirm_purchase))
        // Static files (marketing pages)
        .fallback_service(tower_http::services::ServeDir::new("static"))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 fiogestor-server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                      - Health check");
    tracing::info!("  GET  /api/plans                   - Plan catalog");
    tracing::info!("  POST /api/create-checkout-session - Validate and dispatch checkout");
    tracing::info!("  POST /api/confirm-purchase        - Record purchase funnel event");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
