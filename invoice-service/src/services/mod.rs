//! Services module for invoice-service.

pub mod company;
pub mod database;
pub mod extractor;
pub mod invoice;
pub mod metrics;
pub mod status;

pub use company::resolve_company;
pub use database::Database;
pub use extractor::{ExtractorError, InvoiceExtractor};
pub use invoice::{InvoiceWriter, SaveOutcome};
pub use metrics::{get_metrics, init_metrics};
pub use status::{pipeline_status, PipelineStatus};
