//! Vaultscan - hardware signing device account discovery SDK
//!
//! This library discovers every account a hardware signing device controls
//! for a given currency, across all applicable key-derivation schemes, and
//! streams each discovered account to the caller. Address derivation math,
//! wallet persistence and history synchronization are delegated to an
//! external ledger engine behind the [`engine`] traits; device communication
//! happens behind the [`device`] transport trait.

pub mod account;
pub mod currency;
pub mod derivation;
pub mod device;
pub mod engine;
pub mod error;
pub mod scan;
pub mod swap;

// Re-export commonly used types for convenience
pub use account::{is_account_empty, Account};
pub use currency::CryptoCurrency;
pub use derivation::DerivationMode;
pub use error::{Error, Result};
pub use scan::{scan_accounts, AccountScan, ScanAccountEvent, ScanRequest};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
