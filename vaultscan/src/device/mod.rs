//! Device transport seam and scoped device access
//!
//! The wire encoding of device commands is owned elsewhere; this module only
//! defines the high-level command surface ([`DeviceTransport`]) and a
//! registry granting exclusive, scoped access to one device at a time. A
//! device link serializes commands, so whoever holds a [`DeviceHandle`] is
//! the only issuer until the handle is dropped.

pub mod gate;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use semver::Version;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::currency::CryptoCurrency;
use crate::derivation::DerivationMode;
use crate::error::{Error, Result};

/// Address/public-key pair resolved on the device for one derivation path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRecord {
    pub address: String,
    /// Raw public key at the path
    pub public_key: Vec<u8>,
    /// Chain code, when the path is extended-key capable
    pub chain_code: Option<Vec<u8>>,
}

impl AddressRecord {
    /// Stable string identifying the seed behind this key
    pub fn seed_identifier(&self) -> String {
        hex::encode(&self.public_key)
    }
}

/// Identity of the signing app currently open on the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppAndVersion {
    pub name: String,
    pub version: Version,
}

/// High-level command surface of a connected signing device
#[async_trait]
pub trait DeviceTransport: Send + Sync {
    /// Resolve the address and public key at `path`.
    ///
    /// Expected refusals surface as [`Error::TransportStatus`] (the app
    /// cannot serve this command or derivation) or
    /// [`Error::UserRefusedAddress`]; anything else is a device failure.
    async fn get_address(
        &self,
        currency: &CryptoCurrency,
        path: &str,
        mode: DerivationMode,
        verify: bool,
    ) -> Result<AddressRecord>;

    /// Report the signing app currently open on the device
    async fn get_app_and_version(&self) -> Result<AppAndVersion>;
}

struct DeviceSlot {
    transport: Arc<dyn DeviceTransport>,
    lock: Arc<Mutex<()>>,
}

/// Registry of connected devices
///
/// [`DeviceRegistry::acquire`] hands out exclusive handles; the per-device
/// lock is released when the handle drops, whether the scan completed,
/// failed or was cancelled.
#[derive(Default)]
pub struct DeviceRegistry {
    slots: RwLock<HashMap<String, DeviceSlot>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the transport for a device id
    pub async fn register(&self, device_id: impl Into<String>, transport: Arc<dyn DeviceTransport>) {
        let mut slots = self.slots.write().await;
        slots.insert(
            device_id.into(),
            DeviceSlot {
                transport,
                lock: Arc::new(Mutex::new(())),
            },
        );
    }

    /// Forget a device
    pub async fn remove(&self, device_id: &str) {
        let mut slots = self.slots.write().await;
        slots.remove(device_id);
    }

    /// Exclusive access to a device's transport.
    ///
    /// Waits until no other holder remains, then returns a handle that keeps
    /// the device reserved for as long as it lives.
    pub async fn acquire(&self, device_id: &str) -> Result<DeviceHandle> {
        let (transport, lock) = {
            let slots = self.slots.read().await;
            let slot = slots
                .get(device_id)
                .ok_or_else(|| Error::DeviceNotFound(device_id.to_string()))?;
            (slot.transport.clone(), slot.lock.clone())
        };
        let guard = lock.lock_owned().await;
        Ok(DeviceHandle {
            transport,
            _guard: guard,
        })
    }
}

/// Exclusive handle on one device transport
pub struct DeviceHandle {
    transport: Arc<dyn DeviceTransport>,
    _guard: OwnedMutexGuard<()>,
}

impl DeviceHandle {
    pub fn transport(&self) -> &dyn DeviceTransport {
        self.transport.as_ref()
    }
}
