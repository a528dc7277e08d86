use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::http_client::HttpClient;
use crate::model::Rate;
use crate::normalizer::NormalizedShipment;
use crate::provider::RateProvider;

pub mod token;
use token::TokenProvider;

/// National postal API adapter. Quotes are requested for the shipment's zip
/// pair and first package, then filtered down to machinable single-piece
/// retail-network rates before being mapped into the merged output shape.
pub struct Usps {
    http: HttpClient,
    base: String,
    name: String, // "usps"
    tokens: TokenProvider,
}

impl Usps {
    pub fn new(http: HttpClient, tokens: TokenProvider, base: String) -> Self {
        Self {
            http,
            base,
            tokens,
            name: "usps".into(),
        }
    }

    #[cfg(test)]
    pub fn new_for_tests(server_base: &str) -> Self {
        use secrecy::SecretString;
        let http = HttpClient::new_default().unwrap();
        let tokens = TokenProvider::new(
            http.clone(),
            server_base,
            SecretString::new("test-key".into()),
            SecretString::new("test-secret".into()),
        );
        Usps::new(http, tokens, server_base.to_string())
    }
}

// ----- Wire structs -----

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum MailClass {
    PriorityMail,
    UspsGroundAdvantage,
    PriorityMailExpress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
enum ProcessingCategory {
    #[serde(rename = "MACHINABLE")]
    Machinable,
    #[serde(rename = "NON_MACHINABLE")]
    NonMachinable,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
enum RateIndicator {
    #[serde(rename = "SP")]
    SinglePiece,
    #[serde(rename = "PA")]
    PriorityExpressSinglePiece,
    #[serde(rename = "CP")]
    CubicParcel,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
enum DestinationEntryFacilityType {
    #[serde(rename = "NONE")]
    None,
    #[serde(other)]
    Other,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UspsRateReq<'a> {
    #[serde(rename = "originZIPCode")]
    origin_zip_code: &'a str,
    #[serde(rename = "destinationZIPCode")]
    destination_zip_code: &'a str,
    weight: f64,
    length: f64,
    width: f64,
    height: f64,
    mail_classes: &'a [MailClass],
    price_type: &'a str,
    account_type: &'a str,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct UspsRateResp {
    rate_options: Vec<UspsRateOption>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct UspsRateOption {
    rates: Vec<UspsRate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UspsRate {
    #[serde(default)]
    description: String,
    #[serde(default)]
    price: f64,
    #[serde(default)]
    product_name: String,
    processing_category: ProcessingCategory,
    rate_indicator: RateIndicator,
    destination_entry_facility_type: DestinationEntryFacilityType,
}

impl UspsRate {
    /// Only machinable, single-piece rates entering the network at no
    /// particular facility are quotable for this flow.
    fn is_surfaced(&self) -> bool {
        self.processing_category == ProcessingCategory::Machinable
            && matches!(
                self.rate_indicator,
                RateIndicator::SinglePiece | RateIndicator::PriorityExpressSinglePiece
            )
            && self.destination_entry_facility_type == DestinationEntryFacilityType::None
    }
}

fn service_days(product_name: &str) -> u32 {
    match product_name {
        "Priority Mail" => 3,
        "Priority Mail Express" => 2,
        _ => 4,
    }
}

fn standardize_service_name(product_name: &str) -> &str {
    match product_name {
        "USPS Ground Advantage" => "Ground",
        "Priority Mail" => "Three-Day",
        "Priority Mail Express" => "Two-Day",
        other => other,
    }
}

fn to_rate(raw: UspsRate) -> Rate {
    let days = service_days(&raw.product_name);
    let est_delivery_date = (Utc::now() + chrono::Duration::days(i64::from(days)))
        .format("%Y-%m-%d")
        .to_string();
    Rate {
        carrier: "USPS".to_string(),
        carrier_code: "USPS".to_string(),
        service_name: raw.product_name.clone(),
        service_code: raw.description,
        standard_service_name: standardize_service_name(&raw.product_name).to_string(),
        rate_display_name: raw.product_name,
        price: format!("{:.2}", raw.price),
        currency_code: "USD".to_string(),
        service_days: days,
        est_delivery_date,
        rates_provider: "USPS".to_string(),
        ..Rate::default()
    }
}

#[async_trait]
impl RateProvider for Usps {
    fn name(&self) -> &str {
        &self.name
    }

    async fn rates(&self, shipment: &NormalizedShipment) -> CoreResult<Vec<Rate>> {
        // The postal API quotes one parcel at a time; use the first item.
        let item = &shipment.items[0];
        let payload = UspsRateReq {
            origin_zip_code: shipment.origin_zip(),
            destination_zip_code: shipment.destination_zip(),
            weight: item.weight,
            length: item.length.unwrap_or_default(),
            width: item.width.unwrap_or_default(),
            height: item.height.unwrap_or_default(),
            mail_classes: &[
                MailClass::PriorityMail,
                MailClass::UspsGroundAdvantage,
                MailClass::PriorityMailExpress,
            ],
            price_type: "COMMERCIAL",
            account_type: "EPS",
        };

        let bearer = self.tokens.bearer().await?;
        let auth = format!("Bearer {bearer}");
        let url = format!("{}/prices/v3/total-rates/search", self.base);
        let resp = self
            .http
            .post_json::<_, UspsRateResp>(
                &self.name,
                &url,
                &payload,
                &[
                    ("Authorization", auth.as_str()),
                    ("Content-Type", "application/json"),
                ],
            )
            .await?;

        Ok(resp
            .rate_options
            .into_iter()
            .flat_map(|opt| opt.rates)
            .filter(UspsRate::is_surfaced)
            .map(to_rate)
            .collect())
    }
}
