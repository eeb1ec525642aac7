//! Stage-level errors.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
// (thiserror derive)

// Layer 3: Internal module imports
// (none)

/// Errors from stage operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StageError {
    /// The stage is closing or closed; no new actors are accepted.
    #[error("stage is closed")]
    Closed,

    /// A supervisor with this name is already registered.
    #[error("supervisor `{0}` is already registered")]
    DuplicateSupervisor(String),

    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(StageError::Closed.to_string(), "stage is closed");
        assert_eq!(
            StageError::DuplicateSupervisor("billing".to_string()).to_string(),
            "supervisor `billing` is already registered"
        );
        assert_eq!(
            StageError::InvalidConfig("buckets must be >= 1".to_string()).to_string(),
            "invalid configuration: buckets must be >= 1"
        );
    }
}
