//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ApiError, StoreError};

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::Store(StoreError::Unavailable(_))
        | ApiError::Store(StoreError::InvalidResponse(_))
        | ApiError::ConflictRetriesExhausted { .. } => {
            format!("Update failed, please retry ({})", e)
        }
        _ => e.to_string(),
    }
}
