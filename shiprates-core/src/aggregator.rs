use std::sync::Arc;

use crate::error::CoreResult;
use crate::model::{QuoteResponse, ShipmentRequest};
use crate::normalizer::normalize;
use crate::provider::RateProvider;

/// Merges rate quotes from an ordered list of providers.
///
/// Error policy: a provider failure degrades that provider's contribution to
/// zero rates (logged at WARN) instead of failing the whole request.
/// Validation errors still fail the request before any provider is called.
pub struct QuoteAggregator {
    providers: Vec<Arc<dyn RateProvider>>,
}

impl QuoteAggregator {
    pub fn new(providers: Vec<Arc<dyn RateProvider>>) -> Self {
        Self { providers }
    }

    /// Normalize the request, query each provider in order, and concatenate
    /// whatever each returned. Calls are sequential, not parallel.
    pub async fn quote(&self, req: ShipmentRequest) -> CoreResult<QuoteResponse> {
        let shipment = normalize(req)?;

        let mut merged = QuoteResponse::default();
        for provider in &self.providers {
            match provider.rates(&shipment).await {
                Ok(rates) => merged.rates.extend(rates),
                Err(err) => {
                    tracing::warn!(provider = provider.name(), error = %err, "provider failed, dropping its rates");
                }
            }
        }
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShipRatesError;
    use crate::model::{PackageItem, Rate};
    use crate::normalizer::NormalizedShipment;
    use async_trait::async_trait;

    struct FixedProvider {
        name: &'static str,
        rates: Vec<Rate>,
    }

    #[async_trait]
    impl RateProvider for FixedProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn rates(&self, _shipment: &NormalizedShipment) -> CoreResult<Vec<Rate>> {
            Ok(self.rates.clone())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl RateProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        async fn rates(&self, _shipment: &NormalizedShipment) -> CoreResult<Vec<Rate>> {
            Err(ShipRatesError::ProviderUnavailable {
                provider: "failing".to_string(),
            })
        }
    }

    fn rate(provider: &str, price: &str) -> Rate {
        Rate {
            rates_provider: provider.to_string(),
            price: price.to_string(),
            ..Rate::default()
        }
    }

    fn valid_request() -> ShipmentRequest {
        ShipmentRequest {
            destination_zip: Some("10001".to_string()),
            items: vec![PackageItem {
                weight: 2.0,
                ..PackageItem::default()
            }],
            ..ShipmentRequest::default()
        }
    }

    #[tokio::test]
    async fn concatenates_in_provider_order() {
        let agg = QuoteAggregator::new(vec![
            Arc::new(FixedProvider {
                name: "broker",
                rates: vec![rate("broker", "10.00"), rate("broker", "12.50")],
            }),
            Arc::new(FixedProvider {
                name: "postal",
                rates: vec![rate("USPS", "8.15")],
            }),
        ]);
        let resp = agg.quote(valid_request()).await.unwrap();
        let providers: Vec<_> = resp.rates.iter().map(|r| r.rates_provider.as_str()).collect();
        assert_eq!(providers, vec!["broker", "broker", "USPS"]);
    }

    #[tokio::test]
    async fn failing_provider_degrades_to_partial_success() {
        let agg = QuoteAggregator::new(vec![
            Arc::new(FailingProvider),
            Arc::new(FixedProvider {
                name: "postal",
                rates: vec![rate("USPS", "8.15")],
            }),
        ]);
        let resp = agg.quote(valid_request()).await.unwrap();
        assert_eq!(resp.rates.len(), 1);
        assert_eq!(resp.rates[0].rates_provider, "USPS");
    }

    #[tokio::test]
    async fn all_providers_failing_still_returns_empty_list() {
        let agg = QuoteAggregator::new(vec![Arc::new(FailingProvider)]);
        let resp = agg.quote(valid_request()).await.unwrap();
        assert!(resp.rates.is_empty());
    }

    #[tokio::test]
    async fn validation_error_propagates_before_any_provider_call() {
        let agg = QuoteAggregator::new(vec![Arc::new(FailingProvider)]);
        let err = agg
            .quote(ShipmentRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ShipRatesError::Validation(_)));
    }
}
