// Export orchestration

pub mod orchestrator;
pub mod summary;
pub mod window;

pub use orchestrator::{Orchestrator, RunCursor, RunSettings};
pub use summary::{RunError, RunErrorType, RunPhase, RunSummary, UnitOutcome};
pub use window::ExportWindow;
