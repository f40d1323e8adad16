use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::InvoiceConfig;
use crate::handlers::{
    health::{health_check, simple_health_check},
    invoices::{parse_invoice, process_and_save, save_invoice, supported_formats},
    metrics::metrics,
};
use crate::services::{init_metrics, Database, InvoiceExtractor, InvoiceWriter};
use service_core::error::AppError;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<InvoiceConfig>,
    pub db: Database,
    pub writer: InvoiceWriter,
    pub extractor: Arc<dyn InvoiceExtractor>,
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    pub async fn build(
        config: InvoiceConfig,
        extractor: Arc<dyn InvoiceExtractor>,
    ) -> Result<Self, AppError> {
        init_metrics();

        let db = Database::new(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await?;
        db.run_migrations().await?;

        let writer = InvoiceWriter::new(db.clone());

        let state = AppState {
            config: Arc::new(config.clone()),
            db,
            writer,
            extractor,
        };

        let address = format!("0.0.0.0:{}", config.common.port);
        let listener = TcpListener::bind(&address).await?;
        let port = listener.local_addr()?.port();

        let router = build_router(state, config.upload.max_bytes);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), AppError> {
        info!(port = self.port, "Invoice service listening");
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/api/parse-invoice", post(parse_invoice))
        .route("/api/save-invoice", post(save_invoice))
        .route("/api/process-and-save", post(process_and_save))
        .route("/api/supported-formats", get(supported_formats))
        .route("/api/health", get(health_check))
        .route("/api/health/simple", get(simple_health_check))
        .route("/metrics", get(metrics))
        // Multipart bodies carry the image plus form overhead
        .layer(DefaultBodyLimit::max(max_upload_bytes + 1024 * 1024))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
