//! Error type shared by every calculator.

use std::collections::TryReserveError;
use thiserror::Error;

/// Why a computation produced no result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxError {
    /// The caller supplied no input.
    #[error("input is missing")]
    MissingInput,

    /// The breakdown ledger could not be allocated or grown.
    #[error("memory allocation failed: {0}")]
    Allocation(#[from] TryReserveError),

    /// The input is present but cannot be computed.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl TaxError {
    /// Stable identifier for bindings.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingInput => "MISSING_INPUT",
            Self::Allocation(_) => "ALLOCATION_FAILED",
            Self::InvalidInput(_) => "INVALID_INPUT",
        }
    }

    /// HTTP status the API answers with.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::MissingInput | Self::InvalidInput(_) => 400,
            Self::Allocation(_) => 500,
        }
    }
}
