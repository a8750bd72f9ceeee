//! Currency registry
//!
//! Static descriptions of the currencies the discovery core can scan: which
//! signing app serves them, their BIP44 coin type, their units and the
//! ordered set of derivation schemes that apply to them.

use serde::Serialize;

use crate::derivation::DerivationMode;

/// Derivation path family a currency belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CurrencyFamily {
    /// Account-level xpub currencies (bitcoin and its forks)
    Bitcoin,
    /// Single-address-per-account currencies
    Ethereum,
}

/// A unit of account for a currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Unit {
    /// Ticker code
    pub code: &'static str,
    /// Number of decimal digits between this unit and the base unit
    pub magnitude: u32,
}

/// A currency the discovery core can scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CryptoCurrency {
    /// Stable identifier ("bitcoin", "ethereum", ...)
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Name of the signing app that serves this currency on the device
    pub manager_app_name: &'static str,
    /// BIP44 coin type
    pub coin_type: u32,
    pub family: CurrencyFamily,
    /// Units, largest first
    pub units: &'static [Unit],
    /// Applicable derivation schemes, in canonical scan order
    pub derivation_modes: &'static [DerivationMode],
}

impl CryptoCurrency {
    /// The unit amounts are quoted in
    pub fn main_unit(&self) -> &Unit {
        &self.units[0]
    }
}

pub const BITCOIN: CryptoCurrency = CryptoCurrency {
    id: "bitcoin",
    name: "Bitcoin",
    manager_app_name: "Bitcoin",
    coin_type: 0,
    family: CurrencyFamily::Bitcoin,
    units: &[
        Unit { code: "BTC", magnitude: 8 },
        Unit { code: "sat", magnitude: 0 },
    ],
    derivation_modes: &[
        DerivationMode::Legacy,
        DerivationMode::Segwit,
        DerivationMode::NativeSegwit,
    ],
};

pub const LITECOIN: CryptoCurrency = CryptoCurrency {
    id: "litecoin",
    name: "Litecoin",
    manager_app_name: "Litecoin",
    coin_type: 2,
    family: CurrencyFamily::Bitcoin,
    units: &[
        Unit { code: "LTC", magnitude: 8 },
        Unit { code: "litoshi", magnitude: 0 },
    ],
    derivation_modes: &[
        DerivationMode::Legacy,
        DerivationMode::Segwit,
        DerivationMode::NativeSegwit,
    ],
};

pub const DOGECOIN: CryptoCurrency = CryptoCurrency {
    id: "dogecoin",
    name: "Dogecoin",
    manager_app_name: "Dogecoin",
    coin_type: 3,
    family: CurrencyFamily::Bitcoin,
    units: &[Unit { code: "DOGE", magnitude: 8 }],
    derivation_modes: &[DerivationMode::Legacy],
};

pub const BITCOIN_CASH: CryptoCurrency = CryptoCurrency {
    id: "bitcoin_cash",
    name: "Bitcoin Cash",
    manager_app_name: "Bitcoin Cash",
    coin_type: 145,
    family: CurrencyFamily::Bitcoin,
    units: &[
        Unit { code: "BCH", magnitude: 8 },
        Unit { code: "sat", magnitude: 0 },
    ],
    // Unsplit covers coins left on the pre-fork bitcoin path
    derivation_modes: &[DerivationMode::Legacy, DerivationMode::Unsplit],
};

pub const ETHEREUM: CryptoCurrency = CryptoCurrency {
    id: "ethereum",
    name: "Ethereum",
    manager_app_name: "Ethereum",
    coin_type: 60,
    family: CurrencyFamily::Ethereum,
    units: &[
        Unit { code: "ETH", magnitude: 18 },
        Unit { code: "Gwei", magnitude: 9 },
        Unit { code: "wei", magnitude: 0 },
    ],
    derivation_modes: &[DerivationMode::Legacy, DerivationMode::EthMew],
};

/// Every supported currency
pub const CURRENCIES: &[&CryptoCurrency] =
    &[&BITCOIN, &LITECOIN, &DOGECOIN, &BITCOIN_CASH, &ETHEREUM];

/// Look a currency up by its stable identifier
pub fn currency_by_id(id: &str) -> Option<&'static CryptoCurrency> {
    CURRENCIES.iter().find(|c| c.id == id).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_currencies_up_by_id() {
        assert_eq!(currency_by_id("bitcoin"), Some(&BITCOIN));
        assert_eq!(currency_by_id("ethereum"), Some(&ETHEREUM));
        assert_eq!(currency_by_id("monopoly_money"), None);
    }

    #[test]
    fn main_unit_is_the_largest() {
        assert_eq!(BITCOIN.main_unit().code, "BTC");
        assert_eq!(BITCOIN.main_unit().magnitude, 8);
        assert_eq!(ETHEREUM.main_unit().magnitude, 18);
    }

    #[test]
    fn every_currency_has_at_least_one_mode() {
        for currency in CURRENCIES {
            assert!(
                !currency.derivation_modes.is_empty(),
                "{} has no derivation modes",
                currency.id
            );
        }
    }
}
