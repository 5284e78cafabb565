//! HTTP API server with observability for the storefront service.
//!
//! Provides REST endpoints for the catalog, carts, checkout and orders,
//! with structured logging (tracing) and Prometheus metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use application::{InMemoryPaymentGateway, Mediator, PaymentGateway};
use axum::Router;
use axum::routing::{delete, get, post, put};
use domain::TaxRate;
use metrics_exporter_prometheus::PrometheusHandle;
use store::{InMemoryStore, Repositories};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
#[derive(Debug)]
pub struct AppState {
    pub mediator: Mediator,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/users", post(routes::users::register))
        .route("/users/{id}", get(routes::users::get))
        .route(
            "/products",
            get(routes::products::list).post(routes::products::create),
        )
        .route("/products/{id}", get(routes::products::get))
        .route("/products/{id}/stock", put(routes::products::update_stock))
        .route("/cart", get(routes::cart::get))
        .route("/cart/items", post(routes::cart::add_item))
        .route(
            "/cart/items/{product_id}",
            delete(routes::cart::remove_item),
        )
        .route("/cart/total", get(routes::cart::total))
        .route("/checkout", post(routes::checkout::checkout))
        .route("/orders", get(routes::orders::list))
        .route("/orders/{id}", get(routes::orders::get))
        .route("/orders/{id}/status", put(routes::orders::update_status))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state over the given repositories and gateway.
pub fn create_state(
    repositories: Repositories,
    payments: Arc<dyn PaymentGateway>,
    tax_rate: TaxRate,
) -> Arc<AppState> {
    let mediator = Mediator::new(repositories, payments).with_tax_rate(tax_rate);
    Arc::new(AppState { mediator })
}

/// Creates state backed by in-memory stores and an in-memory gateway.
///
/// The store and gateway are returned as well so callers can seed data and
/// steer the gateway.
pub fn create_default_state() -> (Arc<AppState>, InMemoryStore, InMemoryPaymentGateway) {
    let store = InMemoryStore::new();
    let payments = InMemoryPaymentGateway::new();
    let state = create_state(
        Repositories::from_store(store.clone()),
        Arc::new(payments.clone()),
        TaxRate::default(),
    );
    (state, store, payments)
}
