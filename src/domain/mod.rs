//! Domain models and types for Archivist.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`Region`], [`LogGroupName`], [`JobHandle`])
//! - **Units of work** ([`ExportUnit`], [`ExportDestination`])
//! - **Provider task states** ([`JobState`])
//! - **Error types** ([`ArchivistError`], [`SubmitError`])
//! - **Result type alias** ([`Result`])
//!
//! ```rust
//! use archivist::domain::{ExportUnit, LogGroupName, Region};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let unit = ExportUnit::new(
//!     Region::new("eu-west-1")?,
//!     LogGroupName::new("/aws/lambda/checkout")?,
//! );
//! assert_eq!(unit.to_string(), "eu-west-1:/aws/lambda/checkout");
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod ids;
pub mod job;
pub mod result;
pub mod unit;

// Re-export commonly used types for convenience
pub use errors::{ArchivistError, SubmitError};
pub use ids::{JobHandle, LogGroupName, Region};
pub use job::JobState;
pub use result::Result;
pub use unit::{ExportDestination, ExportUnit};
