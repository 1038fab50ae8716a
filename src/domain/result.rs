//! Result type alias for Stockpile

use super::errors::StockpileError;

/// Result type alias for Stockpile operations
///
/// # Examples
///
/// ```
/// use stockpile::domain::{Result, StockpileError};
///
/// fn failing() -> Result<()> {
///     Err(StockpileError::Storage("bucket unreachable".to_string()))
/// }
///
/// assert!(failing().is_err());
/// ```
pub type Result<T> = std::result::Result<T, StockpileError>;
