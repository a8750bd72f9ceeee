//! Derivation scheme policies
//!
//! Each derivation mode carries a pure scanning policy: which paths it
//! generates, where scanning starts, whether it iterates past the first
//! index, and how many consecutive empty accounts it tolerates before the
//! scan gives up on it.

use serde::{Deserialize, Serialize};

use crate::currency::{CryptoCurrency, CurrencyFamily};

/// A named key-path generation scheme with its own scanning policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivationMode {
    /// Plain BIP44 accounts
    Legacy,
    /// P2SH-wrapped segwit accounts (BIP49)
    Segwit,
    /// Bech32 native segwit accounts (BIP84)
    NativeSegwit,
    /// Forked coins kept on the original pre-split path
    Unsplit,
    /// MEW-style ethereum accounts sharing a single hardened account node
    EthMew,
}

impl DerivationMode {
    /// Stable tag used in wallet names and account ids.
    ///
    /// Legacy is the historical default and maps to the empty tag so that
    /// wallets created before scheme tagging keep their names.
    pub fn as_tag(&self) -> &'static str {
        match self {
            DerivationMode::Legacy => "",
            DerivationMode::Segwit => "segwit",
            DerivationMode::NativeSegwit => "native_segwit",
            DerivationMode::Unsplit => "unsplit",
            DerivationMode::EthMew => "eth_mew",
        }
    }

    /// BIP purpose field of the scheme
    fn purpose(&self) -> u32 {
        match self {
            DerivationMode::Segwit => 49,
            DerivationMode::NativeSegwit => 84,
            _ => 44,
        }
    }
}

/// Ordered schemes to scan for a currency
pub fn derivation_modes_for_currency(currency: &CryptoCurrency) -> &'static [DerivationMode] {
    currency.derivation_modes
}

/// Derivation path of the account at `index` for a scheme
pub fn account_derivation_path(
    currency: &CryptoCurrency,
    mode: DerivationMode,
    index: u32,
) -> String {
    match (currency.family, mode) {
        (_, DerivationMode::EthMew) => format!("44'/{}'/0'/{}", currency.coin_type, index),
        (CurrencyFamily::Ethereum, _) => {
            format!("44'/{}'/{}'/0/0", currency.coin_type, index)
        }
        (CurrencyFamily::Bitcoin, _) => {
            format!("{}'/{}'/{}'", mode.purpose(), currency.coin_type, index)
        }
    }
}

/// Canonical path used only to derive the seed identifier.
///
/// Independent of the account index: the key at this path names the seed,
/// so repeat scans of the same seed resolve the same wallets.
pub fn seed_identifier_path(currency: &CryptoCurrency, mode: DerivationMode) -> String {
    format!("{}'/{}'", mode.purpose(), currency.coin_type)
}

/// Whether the scheme scans more than one account index
pub fn is_iterable_derivation_mode(mode: DerivationMode) -> bool {
    !matches!(mode, DerivationMode::Unsplit)
}

/// Consecutive empty accounts tolerated before the scheme's scan stops.
///
/// Zero means the scan halts at the first empty account, which keeps exactly
/// one empty candidate per scheme. Only the MEW scheme scans a deeper window.
pub fn mandatory_empty_account_skip(mode: DerivationMode) -> u32 {
    match mode {
        DerivationMode::EthMew => 10,
        _ => 0,
    }
}

/// First index eligible for emission.
///
/// Indices below it are still scanned (their accounts are created and
/// synced) but suppressed from the output. EthMew starts at 1 because its
/// index 0 derives the same key as the standard first ethereum account.
pub fn derivation_mode_starts_at(mode: DerivationMode) -> u32 {
    match mode {
        DerivationMode::EthMew => 1,
        _ => 0,
    }
}

/// Per-index support predicate
pub fn derivation_mode_supports_index(mode: DerivationMode, index: u32) -> bool {
    match mode {
        DerivationMode::Unsplit => index == 0,
        // MEW exposes a fixed window of ten account slots
        DerivationMode::EthMew => index < 10,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::{BITCOIN, BITCOIN_CASH, ETHEREUM};

    #[test]
    fn bitcoin_account_paths_follow_the_scheme_purpose() {
        assert_eq!(
            account_derivation_path(&BITCOIN, DerivationMode::Legacy, 2),
            "44'/0'/2'"
        );
        assert_eq!(
            account_derivation_path(&BITCOIN, DerivationMode::Segwit, 0),
            "49'/0'/0'"
        );
        assert_eq!(
            account_derivation_path(&BITCOIN, DerivationMode::NativeSegwit, 1),
            "84'/0'/1'"
        );
        assert_eq!(
            account_derivation_path(&BITCOIN_CASH, DerivationMode::Unsplit, 0),
            "44'/145'/0'"
        );
    }

    #[test]
    fn ethereum_paths_address_a_single_key() {
        assert_eq!(
            account_derivation_path(&ETHEREUM, DerivationMode::Legacy, 1),
            "44'/60'/1'/0/0"
        );
        assert_eq!(
            account_derivation_path(&ETHEREUM, DerivationMode::EthMew, 3),
            "44'/60'/0'/3"
        );
    }

    #[test]
    fn seed_identifier_path_is_index_independent() {
        assert_eq!(
            seed_identifier_path(&BITCOIN, DerivationMode::Legacy),
            "44'/0'"
        );
        assert_eq!(
            seed_identifier_path(&BITCOIN, DerivationMode::NativeSegwit),
            "84'/0'"
        );
        assert_eq!(
            seed_identifier_path(&ETHEREUM, DerivationMode::EthMew),
            "44'/60'"
        );
    }

    #[test]
    fn unsplit_never_iterates() {
        assert!(!is_iterable_derivation_mode(DerivationMode::Unsplit));
        assert!(is_iterable_derivation_mode(DerivationMode::Legacy));
        assert!(is_iterable_derivation_mode(DerivationMode::EthMew));
        assert_eq!(mandatory_empty_account_skip(DerivationMode::Unsplit), 0);
    }

    #[test]
    fn only_the_mew_scheme_tolerates_empty_runs() {
        assert_eq!(mandatory_empty_account_skip(DerivationMode::EthMew), 10);
        assert_eq!(mandatory_empty_account_skip(DerivationMode::Legacy), 0);
        assert_eq!(mandatory_empty_account_skip(DerivationMode::Segwit), 0);
        assert_eq!(mandatory_empty_account_skip(DerivationMode::NativeSegwit), 0);
    }

    #[test]
    fn eth_mew_policy_starts_at_one_with_a_bounded_window() {
        assert_eq!(derivation_mode_starts_at(DerivationMode::EthMew), 1);
        assert_eq!(derivation_mode_starts_at(DerivationMode::Legacy), 0);
        assert!(derivation_mode_supports_index(DerivationMode::EthMew, 9));
        assert!(!derivation_mode_supports_index(DerivationMode::EthMew, 10));
        assert!(derivation_mode_supports_index(DerivationMode::Legacy, 1_000));
        assert!(!derivation_mode_supports_index(DerivationMode::Unsplit, 1));
    }

    #[test]
    fn legacy_has_the_empty_tag() {
        assert_eq!(DerivationMode::Legacy.as_tag(), "");
        assert_eq!(DerivationMode::NativeSegwit.as_tag(), "native_segwit");
    }
}
