//! API server entry point.

use std::sync::Arc;

use api::config::Config;
use application::{HttpPaymentGateway, InMemoryPaymentGateway, PaymentGateway};
use store::{InMemoryStore, PostgresStore, Repositories};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

async fn repositories(config: &Config) -> Repositories {
    match &config.database_url {
        Some(url) => {
            let store = PostgresStore::connect(url)
                .await
                .expect("failed to connect to PostgreSQL");
            store
                .run_migrations()
                .await
                .expect("failed to run migrations");
            tracing::info!("using PostgreSQL store");
            Repositories::from_store(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store");
            Repositories::from_store(InMemoryStore::new())
        }
    }
}

fn payment_gateway(config: &Config) -> Arc<dyn PaymentGateway> {
    match &config.payment_gateway_url {
        Some(url) => {
            let gateway =
                HttpPaymentGateway::new(url.as_str()).expect("failed to build payment client");
            tracing::info!(base_url = gateway.base_url(), "using HTTP payment gateway");
            Arc::new(gateway)
        }
        None => {
            tracing::warn!("PAYMENT_GATEWAY_URL not set, approving payments in memory");
            Arc::new(InMemoryPaymentGateway::new())
        }
    }
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Wire the store, payment gateway and mediator
    let state = api::create_state(
        repositories(&config).await,
        payment_gateway(&config),
        config.tax_rate(),
    );

    // 4. Build the application
    let app = api::create_app(state, metrics_handle);

    // 5. Start server
    let addr = config.addr();
    tracing::info!(%addr, tax_rate_bps = config.tax_rate_bps, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}
