//! CLI command implementations
//!
//! Every command returns a process exit code:
//! - `0`: success
//! - `1`: the export or sweep failed
//! - `2`: configuration error

pub mod export;
pub mod init;
pub mod prune;
pub mod validate;

use crate::domain::StockpileError;

/// Exit code for a successful command
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for a failed export or sweep
pub const EXIT_FAILURE: i32 = 1;

/// Exit code for configuration errors
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Exit code for a library error
pub fn exit_code_for(error: &StockpileError) -> i32 {
    match error {
        StockpileError::Configuration(_) => EXIT_CONFIG_ERROR,
        _ => EXIT_FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExportTable;

    #[test]
    fn test_exit_code_for() {
        assert_eq!(
            exit_code_for(&StockpileError::Configuration("bad".to_string())),
            EXIT_CONFIG_ERROR
        );
        assert_eq!(
            exit_code_for(&StockpileError::for_table(
                ExportTable::Item,
                StockpileError::Cancelled
            )),
            EXIT_FAILURE
        );
    }
}
