//! Error type shared by every operation in this crate.

use thiserror::Error;

/// Errors raised while validating the geometry of an unfold or fold call.
///
/// All checks happen before any element is touched, so an error never
/// leaves a caller-provided buffer half written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnfoldError {
    /// A stride, padding, dilation or kernel argument does not fit the
    /// spatial rank of the input, or describes a degenerate window.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// A tensor or output buffer does not have the shape implied by the
    /// convolution dimensions.
    #[error("dimension mismatch for {what}: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        what: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
}

pub type Result<T> = std::result::Result<T, UnfoldError>;

pub(crate) fn invalid_argument(name: &'static str, reason: impl Into<String>) -> UnfoldError {
    UnfoldError::InvalidArgument {
        name,
        reason: reason.into(),
    }
}

pub(crate) fn check_shape(what: &'static str, expected: &[usize], actual: &[usize]) -> Result<()> {
    if expected != actual {
        return Err(UnfoldError::DimensionMismatch {
            what,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_shape_reports_both_sides() {
        let err = check_shape("windows", &[1, 4, 3], &[1, 3, 4]).unwrap_err();
        assert_eq!(
            err,
            UnfoldError::DimensionMismatch {
                what: "windows",
                expected: vec![1, 4, 3],
                actual: vec![1, 3, 4],
            }
        );
        assert_eq!(
            err.to_string(),
            "dimension mismatch for windows: expected [1, 4, 3], got [1, 3, 4]"
        );
    }

    #[test]
    fn invalid_argument_names_the_parameter() {
        let err = invalid_argument("stride", "expected 2 values, got 3");
        assert_eq!(
            err.to_string(),
            "invalid argument `stride`: expected 2 values, got 3"
        );
    }
}
