//! Mocked swap-quote provider
//!
//! Development stub for the exchange flow: fixed delays, fixed return
//! values, no real pricing. Useful to exercise loading states in callers.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use tokio::time::sleep;

use crate::account::Account;
use crate::currency::currency_by_id;
use crate::error::{Error, Result};

/// Fake latency so callers can show their loading UI
const MOCK_DELAY: std::time::Duration = std::time::Duration::from_millis(800);

/// Accounts on both sides of a swap
#[derive(Debug, Clone)]
pub struct Exchange {
    pub from_account: Account,
    pub to_account: Account,
}

/// A quoted rate from a provider
#[derive(Debug, Clone)]
pub struct ExchangeRate {
    pub rate: Decimal,
    pub magnitude_aware_rate: Decimal,
    pub rate_id: String,
    pub provider: String,
    pub expiration_date: DateTime<Utc>,
}

/// A swap provider and the currencies it serves
#[derive(Debug, Clone)]
pub struct SwapProvider {
    pub provider: String,
    pub supported_currencies: Vec<String>,
}

/// Event emitted while initiating a swap
#[derive(Debug, Clone)]
pub enum SwapRequestEvent {
    InitSwapResult { swap_id: String },
}

/// Status of one in-flight swap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapStatus {
    pub provider: String,
    pub swap_id: String,
    pub status: String,
}

/// Quote `amount` (in base units of the source account's currency).
///
/// Always quotes a flat 4.2 after the mock delay; only the min/max amount
/// guards are real.
pub async fn mock_get_exchange_rates(
    exchange: &Exchange,
    amount: Decimal,
) -> Result<Vec<ExchangeRate>> {
    let currency = currency_by_id(&exchange.from_account.currency_id)
        .ok_or_else(|| Error::UnknownCurrency(exchange.from_account.currency_id.clone()))?;
    let unit = currency.main_unit();

    let one_unit = Decimal::from(10u64.pow(unit.magnitude));
    let amount_from = amount / one_unit;

    let min_amount_from = Decimal::new(1, 4); // 0.0001
    let max_amount_from = Decimal::new(1000, 0);

    if amount_from <= min_amount_from {
        return Err(Error::SwapRateAmountTooLow {
            unit: unit.code.to_string(),
            min: min_amount_from,
        });
    }
    if amount_from >= max_amount_from {
        return Err(Error::SwapRateAmountTooHigh {
            unit: unit.code.to_string(),
            max: max_amount_from,
        });
    }

    sleep(MOCK_DELAY).await;

    let rate = Decimal::new(42, 1); // 4.2
    Ok(vec![ExchangeRate {
        rate,
        magnitude_aware_rate: rate,
        rate_id: "mockedRateId".to_string(),
        provider: "changelly".to_string(),
        expiration_date: Utc::now() + Duration::minutes(1),
    }])
}

/// Initiate a swap; resolves immediately with a fixed swap id
pub async fn mock_init_swap(
    _exchange: &Exchange,
    _rate: &ExchangeRate,
) -> Result<SwapRequestEvent> {
    Ok(SwapRequestEvent::InitSwapResult {
        swap_id: "mockedSwapId".to_string(),
    })
}

/// List the available providers after the mock delay
pub async fn mock_get_providers() -> Result<Vec<SwapProvider>> {
    sleep(MOCK_DELAY).await;

    Ok(vec![SwapProvider {
        provider: "changelly".to_string(),
        supported_currencies: vec![
            "bitcoin".to_string(),
            "litecoin".to_string(),
            "ethereum".to_string(),
        ],
    }])
}

/// Report every queried swap as failed after the mock delay
pub async fn mock_get_status(statuses: Vec<SwapStatus>) -> Result<Vec<SwapStatus>> {
    sleep(MOCK_DELAY).await;

    Ok(statuses
        .into_iter()
        .map(|s| SwapStatus {
            status: "failed".to_string(),
            ..s
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derivation::DerivationMode;

    fn btc_account() -> Account {
        Account {
            id: "vaultscan:1:bitcoin:xpub000:".into(),
            name: "Bitcoin 1".into(),
            currency_id: "bitcoin".into(),
            derivation_mode: DerivationMode::Legacy,
            index: 0,
            seed_identifier: "02abcd".into(),
            xpub: "xpub000".into(),
            fresh_address: "1abc".into(),
            fresh_address_path: "44'/0'/0'/0/0".into(),
            operations_count: 4,
            balance: 100_000_000,
        }
    }

    fn exchange() -> Exchange {
        Exchange {
            from_account: btc_account(),
            to_account: btc_account(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn quotes_a_flat_rate_inside_the_bounds() {
        // 0.5 BTC in sats
        let rates = mock_get_exchange_rates(&exchange(), Decimal::from(50_000_000u64))
            .await
            .unwrap();
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].rate, Decimal::new(42, 1));
        assert_eq!(rates[0].provider, "changelly");
    }

    #[tokio::test(start_paused = true)]
    async fn rejects_amounts_outside_the_bounds() {
        let too_low = mock_get_exchange_rates(&exchange(), Decimal::from(100u64)).await;
        assert!(matches!(too_low, Err(Error::SwapRateAmountTooLow { .. })));

        // 2000 BTC in sats
        let too_high =
            mock_get_exchange_rates(&exchange(), Decimal::from(200_000_000_000u64)).await;
        assert!(matches!(too_high, Err(Error::SwapRateAmountTooHigh { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn providers_and_statuses_are_fixed() {
        let providers = mock_get_providers().await.unwrap();
        assert_eq!(providers[0].provider, "changelly");
        assert!(providers[0]
            .supported_currencies
            .contains(&"bitcoin".to_string()));

        let statuses = mock_get_status(vec![SwapStatus {
            provider: "changelly".into(),
            swap_id: "swap-1".into(),
            status: "pending".into(),
        }])
        .await
        .unwrap();
        assert_eq!(statuses[0].status, "failed");
        assert_eq!(statuses[0].swap_id, "swap-1");
    }

    #[tokio::test]
    async fn init_swap_resolves_immediately() {
        let rate = ExchangeRate {
            rate: Decimal::new(42, 1),
            magnitude_aware_rate: Decimal::new(42, 1),
            rate_id: "mockedRateId".into(),
            provider: "changelly".into(),
            expiration_date: Utc::now(),
        };
        let SwapRequestEvent::InitSwapResult { swap_id } =
            mock_init_swap(&exchange(), &rate).await.unwrap();
        assert_eq!(swap_id, "mockedSwapId");
    }
}
