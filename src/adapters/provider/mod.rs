//! Provider seams used by the orchestrator

pub mod traits;

pub use traits::{ExportDriver, QuotaGate, WorkEnumerator};
