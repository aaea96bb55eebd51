// Progress records and the store access layer

pub mod manager;
pub mod record;

pub use manager::ProgressManager;
pub use record::{ExportStatus, ProgressRecord, ProgressRecordBuilder};
