use async_trait::async_trait;

use crate::error::CoreResult;
use crate::model::Rate;
use crate::normalizer::NormalizedShipment;

/// A rate-quoting upstream. Implementations receive an already-normalized
/// shipment and return their rates in the merged output shape.
#[async_trait]
pub trait RateProvider: Send + Sync {
    fn name(&self) -> &str;
    async fn rates(&self, shipment: &NormalizedShipment) -> CoreResult<Vec<Rate>>;
}

/// A provider that always returns no rates. Placeholder and test double.
pub struct NullProvider;

#[async_trait]
impl RateProvider for NullProvider {
    fn name(&self) -> &str {
        "null"
    }

    async fn rates(&self, _shipment: &NormalizedShipment) -> CoreResult<Vec<Rate>> {
        Ok(Vec::new())
    }
}
