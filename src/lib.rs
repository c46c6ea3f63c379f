//! Library crate for netguard-scan: scan job orchestration for the NetGuard dashboard.
pub mod client;
pub mod enrich;
pub mod error;
pub mod netdetect;
pub mod orchestrator;
pub mod parser;
pub mod server;
pub mod sse;
pub mod stream;
pub mod target;
pub mod types;

pub use error::{ScanError, ScanResult};
