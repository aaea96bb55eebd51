//! Result type alias for Archivist

use super::errors::ArchivistError;

/// Result type alias for Archivist operations
///
/// # Examples
///
/// ```
/// use archivist::domain::result::Result;
/// use archivist::domain::errors::ArchivistError;
///
/// fn failing_function() -> Result<()> {
///     Err(ArchivistError::Validation("Invalid input".to_string()))
/// }
///
/// assert!(failing_function().is_err());
/// ```
pub type Result<T> = std::result::Result<T, ArchivistError>;
