use invoice_service::config::InvoiceConfig;
use invoice_service::services::extractor::gemini::{GeminiConfig, GeminiExtractor};
use invoice_service::services::InvoiceExtractor;
use invoice_service::startup::Application;
use service_core::observability::init_tracing;
use std::sync::Arc;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = InvoiceConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing(&config.service_name, &config.log_level);

    let gemini_config = GeminiConfig {
        api_key: config.gemini.api_key.clone(),
        model: config.gemini.model.clone(),
    };
    let extractor: Arc<dyn InvoiceExtractor> = Arc::new(GeminiExtractor::new(gemini_config));

    tracing::info!(model = %config.gemini.model, "Initialized Gemini extractor");

    let application = Application::build(config, extractor).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    application.run_until_stopped().await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        std::io::Error::other(format!("Server error: {}", e))
    })?;

    Ok(())
}
