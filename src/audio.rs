//! Sample ingestion and cross-context row delivery.

pub mod input_port;
pub mod row_tap;
pub mod tone;
