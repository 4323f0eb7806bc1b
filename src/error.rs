use thiserror::Error;

/// Errors raised while building or editing board data.
///
/// Clearance resolution itself never fails; see [`crate::Board::clearance`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClearanceError {
    /// A builder or setter received an invalid value.
    #[error("invalid configuration: {reason}")]
    Config {
        /// What was wrong.
        reason: String,
    },

    /// No net with this code on the board.
    #[error("net code {code} is not present in the board net registry")]
    UnknownNet {
        /// Requested net code.
        code: i32,
    },

    /// A net with this code already exists.
    #[error("net code {code} is already registered")]
    DuplicateNet {
        /// Conflicting net code.
        code: i32,
    },

    /// No netclass with this name on the board.
    #[error("netclass `{name}` is not defined on this board")]
    UnknownNetClass {
        /// Requested netclass name.
        name: String,
    },

    /// A netclass with this name already exists.
    #[error("netclass `{name}` is already defined")]
    DuplicateNetClass {
        /// Conflicting netclass name.
        name: String,
    },

    /// Layer name not recognised.
    #[error("unknown board layer `{name}`")]
    UnknownLayer {
        /// Name that failed to parse.
        name: String,
    },
}

pub(crate) fn ensure_non_negative(field: &str, value_nm: i64) -> Result<(), ClearanceError> {
    if value_nm < 0 {
        return Err(ClearanceError::Config {
            reason: format!("`{field}` must be non-negative, got {value_nm} nm"),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ensure_non_negative, ClearanceError};

    #[test]
    fn ensure_non_negative_rejects_negative_lengths() {
        let err = ensure_non_negative("min_clearance", -1)
            .expect_err("negative clearance should be rejected");
        assert!(matches!(err, ClearanceError::Config { .. }));
        assert!(err.to_string().contains("min_clearance"));
    }

    #[test]
    fn ensure_non_negative_accepts_zero() {
        assert!(ensure_non_negative("min_clearance", 0).is_ok());
    }
}
