// Job metadata: CSV-backed catalog and its listing endpoint.

pub mod catalog;
pub mod handlers;
