//! Per-scheme account scanning loop
//!
//! Scans sequential account indices within one derivation scheme, creating
//! missing accounts from device key material, syncing each candidate through
//! the engine and classifying it against the gap-limit policy. The loop is
//! iterative on purpose: state is exactly `(account_index, empty_run)`, so
//! the scan never grows the stack with the account count.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use crate::account::{
    account_display_name, encode_account_id, is_account_empty, Account,
};
use crate::currency::CryptoCurrency;
use crate::derivation::{
    account_derivation_path, derivation_mode_starts_at, derivation_mode_supports_index,
    is_iterable_derivation_mode, mandatory_empty_account_skip, DerivationMode,
};
use crate::device::{AddressRecord, DeviceTransport};
use crate::engine::{EngineAccount, EngineWallet, SyncConfig, SyncedAccountData};
use crate::error::{remap_engine_error, Result};
use crate::scan::ScanAccountEvent;

static SYNC_LOG_ID: AtomicU64 = AtomicU64::new(1);

fn next_sync_log_id() -> u64 {
    SYNC_LOG_ID.fetch_add(1, Ordering::SeqCst)
}

/// Scratch address cache for one scan invocation.
///
/// Owned by the scan that created it and discarded when the scan ends;
/// repeat scans start from an empty cache.
#[derive(Debug, Default)]
pub struct DerivationsCache {
    entries: HashMap<String, AddressRecord>,
}

impl DerivationsCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, path: &str) -> Option<&AddressRecord> {
        self.entries.get(path)
    }

    fn insert(&mut self, path: String, record: AddressRecord) {
        self.entries.insert(path, record);
    }
}

/// Everything one scheme's scan needs, borrowed from the coordinator
pub(super) struct SchemeScan<'a> {
    pub wallet: Arc<dyn EngineWallet>,
    pub transport: &'a dyn DeviceTransport,
    pub currency: &'static CryptoCurrency,
    pub mode: DerivationMode,
    pub seed_identifier: &'a str,
    pub show_new_account: bool,
    pub sync_config: &'a SyncConfig,
    pub cancel: &'a CancellationToken,
    pub events: &'a mpsc::Sender<Result<ScanAccountEvent>>,
    pub derivations_cache: &'a mut DerivationsCache,
    pub scan_id: Uuid,
}

/// Scan one scheme's account indices from `(0, 0)` until its policy stops.
///
/// Guarantees the classic gap-limit discovery property: any non-empty
/// account within the trailing empty-run budget is found, and every empty
/// step consumes one unit of that finite budget, so termination is
/// structural. Non-iterable schemes stop after index 0 regardless.
pub(super) async fn scan_scheme(mut scan: SchemeScan<'_>) -> Result<()> {
    let gap_limit = mandatory_empty_account_skip(scan.mode);
    let starts_at = derivation_mode_starts_at(scan.mode);
    let iterable = is_iterable_derivation_mode(scan.mode);

    let mut account_index: u32 = 0;
    let mut empty_run: u32 = 0;

    loop {
        if scan.cancel.is_cancelled() {
            return Ok(());
        }

        let log_id = next_sync_log_id();
        debug!(
            scan_id = %scan.scan_id,
            log_id,
            currency = scan.currency.id,
            mode = ?scan.mode,
            index = account_index,
            "scanning account index"
        );

        let engine_account = match scan.wallet.get_account(account_index).await {
            Ok(account) => Some(account),
            Err(err) if err.is_account_not_found() => {
                if scan.cancel.is_cancelled() {
                    return Ok(());
                }
                create_account_from_device(&mut scan, account_index).await?
            }
            Err(err) => return Err(remap_engine_error(err)),
        };

        // creation observed cancellation mid-way
        let Some(engine_account) = engine_account else {
            return Ok(());
        };
        if scan.cancel.is_cancelled() {
            return Ok(());
        }

        let synced = sync_account(&scan, engine_account.as_ref()).await?;
        if scan.cancel.is_cancelled() {
            return Ok(());
        }

        let account = build_account(&scan, account_index, synced);
        let empty = is_account_empty(&account);
        let should_skip = account_index < starts_at
            || (empty && !scan.show_new_account)
            || !derivation_mode_supports_index(scan.mode, account_index);

        debug!(
            scan_id = %scan.scan_id,
            log_id,
            index = account_index,
            operations = account.operations_count,
            balance = account.balance,
            empty,
            skipped = should_skip,
            "account scanned"
        );

        if !should_skip {
            // a closed receiver means the caller dropped the stream
            if scan
                .events
                .send(Ok(ScanAccountEvent::Discovered { account }))
                .await
                .is_err()
            {
                return Ok(());
            }
        }

        let keep_scanning = if empty {
            empty_run < gap_limit
        } else {
            iterable
        };
        if !keep_scanning {
            debug!(
                scan_id = %scan.scan_id,
                mode = ?scan.mode,
                last_index = account_index,
                "scheme scan complete"
            );
            return Ok(());
        }

        empty_run = if empty { empty_run + 1 } else { 0 };
        account_index += 1;
    }
}

/// Create the missing account at `index` from device key material.
///
/// Returns `None` when cancellation was observed between the device call and
/// the wallet mutation; the resolved address stays in the cache but nothing
/// is registered with the engine.
async fn create_account_from_device(
    scan: &mut SchemeScan<'_>,
    index: u32,
) -> Result<Option<Arc<dyn EngineAccount>>> {
    let path = account_derivation_path(scan.currency, scan.mode, index);

    let record = match scan.derivations_cache.get(&path) {
        Some(record) => record.clone(),
        None => {
            let record = scan
                .transport
                .get_address(scan.currency, &path, scan.mode, false)
                .await?;
            scan.derivations_cache.insert(path, record.clone());
            record
        }
    };

    if scan.cancel.is_cancelled() {
        return Ok(None);
    }

    let account = scan
        .wallet
        .create_account(index, &record)
        .await
        .map_err(remap_engine_error)?;
    Ok(Some(account))
}

async fn sync_account(
    scan: &SchemeScan<'_>,
    account: &dyn EngineAccount,
) -> Result<SyncedAccountData> {
    account
        .sync(scan.sync_config)
        .await
        .map_err(remap_engine_error)
}

fn build_account(scan: &SchemeScan<'_>, index: u32, data: SyncedAccountData) -> Account {
    Account {
        id: encode_account_id(scan.currency, scan.mode, &data.xpub),
        name: account_display_name(scan.currency, index),
        currency_id: scan.currency.id.to_string(),
        derivation_mode: scan.mode,
        index,
        seed_identifier: scan.seed_identifier.to_string(),
        xpub: data.xpub,
        fresh_address: data.fresh_address,
        fresh_address_path: data.fresh_address_path,
        operations_count: data.operations_count,
        balance: data.balance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivations_cache_round_trips_records() {
        let mut cache = DerivationsCache::new();
        assert!(cache.get("44'/0'/0'").is_none());

        let record = AddressRecord {
            address: "1abc".into(),
            public_key: vec![2, 3],
            chain_code: None,
        };
        cache.insert("44'/0'/0'".into(), record.clone());
        assert_eq!(cache.get("44'/0'/0'"), Some(&record));
        assert!(cache.get("44'/0'/1'").is_none());
    }

    #[test]
    fn sync_log_ids_increase() {
        let a = next_sync_log_id();
        let b = next_sync_log_id();
        assert!(b > a);
    }
}
