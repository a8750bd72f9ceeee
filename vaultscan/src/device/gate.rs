//! Feature gating on the signing app version
//!
//! Some schemes only work from a given app version up. The gate is checked
//! before any address resolution is attempted for the scheme; a device below
//! the minimum simply skips the scheme, it is not an error.

use semver::Version;

use crate::currency::CryptoCurrency;
use crate::derivation::DerivationMode;

/// First app versions shipping native segwit, keyed by manager app name.
/// Apps missing from the map never gate the scheme.
const NATIVE_SEGWIT_MIN_APP_VERSIONS: &[(&str, &str)] = &[
    ("Bitcoin", "1.4.6"),
    ("Litecoin", "1.4.6"),
];

/// Minimum app version required for a scheme on this currency's app, if any
pub fn scheme_minimum_app_version(
    currency: &CryptoCurrency,
    mode: DerivationMode,
) -> Option<Version> {
    match mode {
        DerivationMode::NativeSegwit => NATIVE_SEGWIT_MIN_APP_VERSIONS
            .iter()
            .find(|(app, _)| *app == currency.manager_app_name)
            .and_then(|(_, min)| Version::parse(min).ok()),
        _ => None,
    }
}
