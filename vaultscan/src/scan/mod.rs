//! Account discovery scan
//!
//! [`scan_accounts`] walks every applicable derivation scheme of a currency
//! on one device, creating and syncing candidate accounts through the ledger
//! engine, and streams each discovered account to the caller. The stream is
//! single-subscriber and cooperatively cancellable: cancellation never
//! interrupts an in-flight device or engine call, it suppresses the next
//! side effect instead.

mod scanner;

pub use scanner::DerivationsCache;

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::account::{should_show_new_account, wallet_name, Account};
use crate::currency::CryptoCurrency;
use crate::derivation::{derivation_modes_for_currency, seed_identifier_path, DerivationMode};
use crate::device::{gate, DeviceRegistry};
use crate::engine::{LedgerEngine, SyncConfig};
use crate::error::{remap_engine_error, Result};

/// Accounts buffered ahead of the consumer before the producer suspends
const EVENT_BUFFER: usize = 16;

/// Parameters of one discovery run
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub currency: &'static CryptoCurrency,
    pub device_id: String,
    /// Restrict the run to a single scheme
    pub scheme: Option<DerivationMode>,
    pub sync_config: SyncConfig,
}

impl ScanRequest {
    pub fn new(currency: &'static CryptoCurrency, device_id: impl Into<String>) -> Self {
        Self {
            currency,
            device_id: device_id.into(),
            scheme: None,
            sync_config: SyncConfig::default(),
        }
    }
}

/// Event emitted on the discovery stream
#[derive(Debug, Clone)]
pub enum ScanAccountEvent {
    /// A synced candidate account passed the emission rules
    Discovered { account: Account },
}

/// Cancellable, single-subscriber stream of discovery events.
///
/// Yields `Ok(event)` per discovered account, then ends: naturally after all
/// schemes were processed, or with one terminal `Err`. Cancellation ends the
/// stream silently, with no event and no error. Dropping the stream cancels
/// the scan.
pub struct AccountScan {
    events: ReceiverStream<Result<ScanAccountEvent>>,
    cancel: CancellationToken,
}

impl AccountScan {
    /// Token cancelling the scan.
    ///
    /// Cooperative: a device or engine call already issued completes and its
    /// result is discarded; no further side effect happens afterwards.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel the scan
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Stream for AccountScan {
    type Item = Result<ScanAccountEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.events).poll_next(cx)
    }
}

impl Drop for AccountScan {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Start a discovery run for `request`.
///
/// Device commands and engine calls are strictly sequential within one run;
/// independent runs on different devices may proceed concurrently.
pub fn scan_accounts(
    engine: Arc<dyn LedgerEngine>,
    devices: Arc<DeviceRegistry>,
    request: ScanRequest,
) -> AccountScan {
    let cancel = CancellationToken::new();
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);

    let token = cancel.clone();
    tokio::spawn(async move {
        let scan_id = Uuid::new_v4();
        debug!(
            %scan_id,
            currency = request.currency.id,
            device = %request.device_id,
            scheme = ?request.scheme,
            "scan started"
        );

        match run_scan(engine, devices, &request, &token, &tx, scan_id).await {
            Ok(()) => {
                debug!(%scan_id, "scan finished");
            }
            Err(err) => {
                if token.is_cancelled() {
                    debug!(%scan_id, error = %err, "scan error after cancellation, dropped");
                } else {
                    warn!(%scan_id, error = %err, "scan failed");
                    let _ = tx.send(Err(err)).await;
                }
            }
        }
    });

    AccountScan {
        events: ReceiverStream::new(rx),
        cancel,
    }
}

/// Iterate the currency's schemes in canonical order, sequentially.
async fn run_scan(
    engine: Arc<dyn LedgerEngine>,
    devices: Arc<DeviceRegistry>,
    request: &ScanRequest,
    cancel: &CancellationToken,
    events: &mpsc::Sender<Result<ScanAccountEvent>>,
    scan_id: Uuid,
) -> Result<()> {
    // exclusive transport access, released on drop whatever the outcome
    let device = devices.acquire(&request.device_id).await?;
    let transport = device.transport();
    let currency = request.currency;

    let mut derivations_cache = DerivationsCache::new();

    for &mode in derivation_modes_for_currency(currency) {
        if let Some(filter) = request.scheme {
            if mode != filter {
                continue;
            }
        }
        if cancel.is_cancelled() {
            return Ok(());
        }

        if let Some(min) = gate::scheme_minimum_app_version(currency, mode) {
            let app = transport.get_app_and_version().await?;
            if app.version < min {
                info!(
                    %scan_id,
                    mode = ?mode,
                    app = %app.version,
                    %min,
                    "app below scheme minimum, skipping"
                );
                continue;
            }
        }

        let path = seed_identifier_path(currency, mode);
        let record = match transport.get_address(currency, &path, mode, false).await {
            Ok(record) => record,
            Err(err) if err.is_expected_address_rejection() => {
                // feature detection: old apps reject some derivations at the
                // status level, and the user may refuse outright
                info!(%scan_id, mode = ?mode, %err, "scheme unusable on this device, skipping");
                continue;
            }
            Err(err) => return Err(err),
        };

        if cancel.is_cancelled() {
            return Ok(());
        }

        let seed_identifier = record.seed_identifier();
        let name = wallet_name(&seed_identifier, currency, mode);
        let wallet = engine
            .get_or_create_wallet(&name, currency, mode)
            .await
            .map_err(remap_engine_error)?;

        if cancel.is_cancelled() {
            return Ok(());
        }

        scanner::scan_scheme(scanner::SchemeScan {
            wallet,
            transport,
            currency,
            mode,
            seed_identifier: &seed_identifier,
            show_new_account: should_show_new_account(currency, mode),
            sync_config: &request.sync_config,
            cancel,
            events,
            derivations_cache: &mut derivations_cache,
            scan_id,
        })
        .await?;
    }

    Ok(())
}
