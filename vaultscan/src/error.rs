//! Error types for the discovery core

use rust_decimal::Decimal;
use thiserror::Error;

/// Custom error type for discovery operations
#[derive(Error, Debug)]
pub enum Error {
    /// The device answered a command with a non-success status word.
    #[error("device returned status {status:#06x}")]
    TransportStatus { status: u16 },

    /// The user declined to confirm the address on the device screen.
    #[error("user refused to confirm the address on the device")]
    UserRefusedAddress,

    #[error("no device registered under id {0}")]
    DeviceNotFound(String),

    /// Device communication failed for a reason other than an expected
    /// refusal. Aborts the whole discovery run.
    #[error("device error: {0}")]
    Device(String),

    /// The wallet holds no account at this index. Triggers the account
    /// creation path, never surfaced to callers.
    #[error("account at index {index} does not exist in this wallet")]
    AccountNotFound { index: u32 },

    #[error("ledger engine error: {0}")]
    Engine(String),

    #[error("unknown currency: {0}")]
    UnknownCurrency(String),

    #[error("swap amount is below the {min} {unit} minimum")]
    SwapRateAmountTooLow { unit: String, min: Decimal },

    #[error("swap amount is above the {max} {unit} maximum")]
    SwapRateAmountTooHigh { unit: String, max: Decimal },
}

impl Error {
    /// Expected device variability during address resolution.
    ///
    /// Older apps answer some derivations with a status-level rejection, and
    /// the user may simply refuse the address prompt. Both mean the scheme
    /// is unusable on this device: the scheme is skipped and scanning moves
    /// on to the next one.
    pub fn is_expected_address_rejection(&self) -> bool {
        matches!(
            self,
            Error::TransportStatus { .. } | Error::UserRefusedAddress
        )
    }

    /// Distinguished "not found" raised by the engine's account lookup.
    pub fn is_account_not_found(&self) -> bool {
        matches!(self, Error::AccountNotFound { .. })
    }
}

/// Normalize an engine failure into the caller-facing taxonomy.
///
/// Known variants pass through untouched; anything else the engine raised is
/// folded into [`Error::Engine`].
pub fn remap_engine_error(err: Error) -> Error {
    match err {
        e @ (Error::AccountNotFound { .. } | Error::Engine(_)) => e,
        other => Error::Engine(other.to_string()),
    }
}

/// Result type for discovery operations
pub type Result<T> = std::result::Result<T, Error>;
