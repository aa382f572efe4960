use std::error::Error;
use std::fmt;

/// Failures raised by the cleaning pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum CleanError {
    /// The uploaded table does not have the expected number of columns.
    ColumnCountMismatch { expected: usize, found: usize },
    /// A cell could not be coerced to the declared column type.
    Conversion {
        column: String,
        row: usize,
        value: String,
    },
}

impl fmt::Display for CleanError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CleanError::ColumnCountMismatch { expected, found } => write!(
                f,
                "expected {} columns but the input has {}",
                expected, found
            ),
            CleanError::Conversion { column, row, value } => write!(
                f,
                "cannot convert value '{}' in column '{}' (row {})",
                value, column, row
            ),
        }
    }
}

impl Error for CleanError {}

/// Failures raised on the prediction path.
///
/// Callers can react per variant instead of catching one broad error:
/// `ModelNotReady` means fit has not happened yet, `ShapeMismatch` means the
/// input row does not match the trained feature set, and `Unexpected` wraps
/// anything else.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictError {
    ModelNotReady,
    ShapeMismatch { expected: usize, found: usize },
    Unexpected(String),
}

impl fmt::Display for PredictError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PredictError::ModelNotReady => write!(f, "model has not been fitted yet"),
            PredictError::ShapeMismatch { expected, found } => write!(
                f,
                "input has {} features but the model was trained on {}",
                found, expected
            ),
            PredictError::Unexpected(msg) => write!(f, "prediction failed: {}", msg),
        }
    }
}

impl Error for PredictError {}
