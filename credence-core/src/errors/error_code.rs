//! CredenceErrorCode trait for boundary-layer conversion.

/// Trait for mapping Credence errors to stable error code strings.
/// Every error enum implements this so callers on the far side of an
/// HTTP or FFI boundary can branch on a code instead of a message.
pub trait CredenceErrorCode {
    /// Returns the error code string (e.g., "SHAPE_MISMATCH").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted error string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const SHAPE_MISMATCH: &str = "SHAPE_MISMATCH";
pub const EMPTY_INPUT: &str = "EMPTY_INPUT";
pub const NON_FINITE: &str = "NON_FINITE";
pub const INVALID_RECORD: &str = "INVALID_RECORD";
pub const INVALID_WEIGHTS: &str = "INVALID_WEIGHTS";
pub const TRANSFORM_FAILED: &str = "TRANSFORM_FAILED";
pub const CANCELLED: &str = "CANCELLED";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
