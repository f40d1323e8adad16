//! Domain models for invoice-service.

mod company;
mod extracted;
mod invoice;
mod line_item;
mod tax_calculation;

pub use company::{Address, Company};
pub use extracted::{
    CompanyDescription, Confidence, ExtractedAddress, ExtractedInvoice, ExtractedLineItem,
    TaxBreakdown,
};
pub use invoice::Invoice;
pub use line_item::LineItem;
pub use tax_calculation::TaxCalculation;
