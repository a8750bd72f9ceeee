//! Ledger engine boundary
//!
//! The native ledger engine owns derivation math, wallet persistence and
//! transaction-history synchronization. It sits behind an FFI-style
//! boundary: these traits mirror its message set and nothing more. The
//! discovery core is strictly a consumer of them.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::currency::CryptoCurrency;
use crate::derivation::DerivationMode;
use crate::device::AddressRecord;
use crate::error::Result;

/// Opaque synchronization parameters, forwarded verbatim to the engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub params: Value,
}

/// Raw data the engine reports after syncing one account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncedAccountData {
    /// Extended public key (plain public key for single-address families)
    pub xpub: String,
    /// Next unused receive address
    pub fresh_address: String,
    /// Derivation path of the fresh address
    pub fresh_address_path: String,
    pub operations_count: u64,
    /// Confirmed balance in base units
    pub balance: u64,
}

/// Entry point into the engine
#[async_trait]
pub trait LedgerEngine: Send + Sync {
    /// Resolve the wallet registered under `name`, creating it lazily.
    ///
    /// The name is a deterministic function of seed identifier, currency and
    /// scheme, so repeat scans of the same seed reuse the same wallet.
    async fn get_or_create_wallet(
        &self,
        name: &str,
        currency: &CryptoCurrency,
        mode: DerivationMode,
    ) -> Result<Arc<dyn EngineWallet>>;
}

/// Engine-owned wallet, keyed by (seed identifier, currency, scheme)
#[async_trait]
pub trait EngineWallet: Send + Sync {
    /// Account at `index`.
    ///
    /// An absent account raises [`crate::Error::AccountNotFound`]; any other
    /// failure is fatal to the discovery run.
    async fn get_account(&self, index: u32) -> Result<Arc<dyn EngineAccount>>;

    /// Register a new account from device-derived key material
    async fn create_account(
        &self,
        index: u32,
        address: &AddressRecord,
    ) -> Result<Arc<dyn EngineAccount>>;
}

/// Engine-owned account handle
#[async_trait]
pub trait EngineAccount: Send + Sync {
    /// Pull history and balance, returning the synced snapshot data
    async fn sync(&self, config: &SyncConfig) -> Result<SyncedAccountData>;
}
