//! Account snapshots and the shared account predicates

use serde::{Deserialize, Serialize};

use crate::currency::CryptoCurrency;
use crate::derivation::DerivationMode;

/// Synced snapshot of one discovered account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Stable identifier, see [`encode_account_id`]
    pub id: String,
    /// Default display name
    pub name: String,
    pub currency_id: String,
    pub derivation_mode: DerivationMode,
    /// Account index within its scheme
    pub index: u32,
    /// Identifier of the seed this account was derived from
    pub seed_identifier: String,
    /// Extended public key (or plain public key for single-address families)
    pub xpub: String,
    /// Next unused receive address
    pub fresh_address: String,
    /// Derivation path of the fresh address
    pub fresh_address_path: String,
    pub operations_count: u64,
    /// Confirmed balance in base units
    pub balance: u64,
}

/// The single authoritative emptiness predicate, shared by every scheme.
///
/// An account is empty when it has no operations and holds no balance.
pub fn is_account_empty(account: &Account) -> bool {
    account.operations_count == 0 && account.balance == 0
}

/// Deterministic wallet name for a (seed, currency, scheme) triple.
///
/// Repeat scans of the same seed and scheme must converge on the same
/// engine wallet, so the name is a pure function of its inputs.
pub fn wallet_name(
    seed_identifier: &str,
    currency: &CryptoCurrency,
    mode: DerivationMode,
) -> String {
    let tag = mode.as_tag();
    if tag.is_empty() {
        format!("{}_{}", seed_identifier, currency.id)
    } else {
        format!("{}_{}_{}", seed_identifier, currency.id, tag)
    }
}

/// Stable account identifier
pub fn encode_account_id(currency: &CryptoCurrency, mode: DerivationMode, xpub: &str) -> String {
    format!("vaultscan:1:{}:{}:{}", currency.id, xpub, mode.as_tag())
}

/// Default display name for a freshly discovered account
pub fn account_display_name(currency: &CryptoCurrency, index: u32) -> String {
    format!("{} {}", currency.name, index + 1)
}

/// Whether an empty account may be offered as a "new account" for a scheme.
///
/// Only the currency's preferred scheme shows one, so a multi-scheme
/// currency does not offer several empty accounts at once.
pub fn should_show_new_account(currency: &CryptoCurrency, mode: DerivationMode) -> bool {
    preferred_new_account_mode(currency) == mode
}

fn preferred_new_account_mode(currency: &CryptoCurrency) -> DerivationMode {
    if currency
        .derivation_modes
        .contains(&DerivationMode::NativeSegwit)
    {
        DerivationMode::NativeSegwit
    } else {
        currency.derivation_modes[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::{BITCOIN, BITCOIN_CASH, ETHEREUM};

    fn account(operations_count: u64, balance: u64) -> Account {
        Account {
            id: "vaultscan:1:bitcoin:xpub000:".into(),
            name: "Bitcoin 1".into(),
            currency_id: "bitcoin".into(),
            derivation_mode: DerivationMode::Legacy,
            index: 0,
            seed_identifier: "02abcd".into(),
            xpub: "xpub000".into(),
            fresh_address: "1BoatSLRHtKNngkdXEeobR76b53LETtpyT".into(),
            fresh_address_path: "44'/0'/0'/0/0".into(),
            operations_count,
            balance,
        }
    }

    #[test]
    fn empty_requires_zero_operations_and_zero_balance() {
        assert!(is_account_empty(&account(0, 0)));
        assert!(!is_account_empty(&account(1, 0)));
        assert!(!is_account_empty(&account(0, 42)));
        assert!(!is_account_empty(&account(7, 42)));
    }

    #[test]
    fn wallet_names_are_deterministic() {
        let a = wallet_name("02abcd", &BITCOIN, DerivationMode::Segwit);
        let b = wallet_name("02abcd", &BITCOIN, DerivationMode::Segwit);
        assert_eq!(a, b);
        assert_eq!(a, "02abcd_bitcoin_segwit");
    }

    #[test]
    fn legacy_wallet_names_carry_no_tag() {
        assert_eq!(
            wallet_name("02abcd", &BITCOIN, DerivationMode::Legacy),
            "02abcd_bitcoin"
        );
        assert_eq!(
            wallet_name("02abcd", &BITCOIN, DerivationMode::NativeSegwit),
            "02abcd_bitcoin_native_segwit"
        );
    }

    #[test]
    fn new_accounts_show_only_on_the_preferred_mode() {
        assert!(should_show_new_account(&BITCOIN, DerivationMode::NativeSegwit));
        assert!(!should_show_new_account(&BITCOIN, DerivationMode::Legacy));
        assert!(!should_show_new_account(&BITCOIN, DerivationMode::Segwit));

        // no native segwit: the first listed mode wins
        assert!(should_show_new_account(&ETHEREUM, DerivationMode::Legacy));
        assert!(!should_show_new_account(&ETHEREUM, DerivationMode::EthMew));
        assert!(!should_show_new_account(&BITCOIN_CASH, DerivationMode::Unsplit));
    }

    #[test]
    fn account_ids_embed_currency_xpub_and_scheme() {
        assert_eq!(
            encode_account_id(&BITCOIN, DerivationMode::NativeSegwit, "zpub123"),
            "vaultscan:1:bitcoin:zpub123:native_segwit"
        );
    }

    #[test]
    fn display_names_are_one_based() {
        assert_eq!(account_display_name(&BITCOIN, 0), "Bitcoin 1");
        assert_eq!(account_display_name(&ETHEREUM, 4), "Ethereum 5");
    }
}
