//! Request/response DTOs for the HTTP surface.

mod invoices;

pub use invoices::{ParseResponse, ProcessAndSaveResponse, ProcessParams};
