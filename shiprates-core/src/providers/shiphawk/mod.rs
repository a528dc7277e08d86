use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::error::CoreResult;
use crate::http_client::HttpClient;
use crate::model::{Address, Carrier, PackageItem, QuoteResponse, Rate};
use crate::normalizer::NormalizedShipment;
use crate::provider::RateProvider;

/// Multi-carrier rate broker adapter. Rates come back already in the merged
/// output shape and are passed through unchanged.
#[derive(Debug, Clone)]
pub struct ShipHawk {
    http: HttpClient,
    base: String,
    name: String, // "shiphawk"
    api_key: SecretString,
}

impl ShipHawk {
    pub fn new(http: HttpClient, api_key: SecretString, base: String) -> Self {
        Self {
            http,
            api_key,
            base,
            name: "shiphawk".into(),
        }
    }

    #[cfg(test)]
    pub fn new_for_tests(server_base: &str) -> Self {
        ShipHawk::new(
            HttpClient::new_default().unwrap(),
            SecretString::new("test-key".into()),
            server_base.to_string(),
        )
    }

    fn headers(&self) -> Vec<(String, String)> {
        vec![
            ("X-API-KEY".to_string(), self.api_key.expose_secret().to_string()),
            ("Content-Type".to_string(), "application/json".to_string()),
        ]
    }

    /// Fetch the broker's carrier listing. Called once at startup; the result
    /// is held as a read-only snapshot for the lifetime of the process.
    pub async fn carriers(&self) -> CoreResult<Vec<Carrier>> {
        let owned_headers = self.headers();
        let hdrs: Vec<(&str, &str)> = owned_headers
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let url = format!("{}/api/v4/carriers", self.base);
        self.http.get_json::<Vec<Carrier>>(&self.name, &url, &hdrs).await
    }
}

// ----- Wire structs -----
#[derive(Serialize)]
struct SHRateReq<'a> {
    items: &'a [PackageItem],
    #[serde(skip_serializing_if = "Option::is_none")]
    origin_address: Option<&'a Address>,
    destination_address: &'a Address,
    warehouse_code: &'a str,
    carrier_filter: &'a [String],
}

#[async_trait]
impl RateProvider for ShipHawk {
    fn name(&self) -> &str {
        &self.name
    }

    async fn rates(&self, shipment: &NormalizedShipment) -> CoreResult<Vec<Rate>> {
        let payload = SHRateReq {
            items: &shipment.items,
            origin_address: shipment.origin_address.as_ref(),
            destination_address: &shipment.destination_address,
            warehouse_code: &shipment.warehouse_code,
            carrier_filter: &shipment.carrier_filter,
        };
        let owned_headers = self.headers();
        let hdrs: Vec<(&str, &str)> = owned_headers
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let url = format!("{}/api/v4/rates", self.base);
        let resp = self
            .http
            .post_json::<_, QuoteResponse>(&self.name, &url, &payload, &hdrs)
            .await?;
        Ok(resp.rates)
    }
}
