use serde::{Deserialize, Serialize};

fn is_zero_u32(n: &u32) -> bool {
    *n == 0
}

fn is_zero_f64(n: &f64) -> bool {
    *n == 0.0
}

/// A single item to be shipped. Field names match the upstream wire schema.
/// `qty` is a legacy alias for `quantity`; the normalizer resolves the two.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct PackageItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default)]
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_uom: Option<String>,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub qty: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "is_zero_f64")]
    pub value: f64,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hs_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_of_origin: Option<String>,
}

/// A shipping address. When the caller only supplies a zip code, the
/// normalizer synthesizes one of these with the remaining fields empty.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Address {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default)]
    pub street1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street2: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

/// Caller input for a rate quote. Origin and destination may each be given
/// as a zip code, a full address, or both (the address wins).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ShipmentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_zip: Option<String>,
    #[serde(default)]
    pub items: Vec<PackageItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warehouse_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier_filter: Option<Vec<String>>,
    /// Overrides the destination country when the destination was supplied
    /// as a bare zip code (defaults to "US").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_country_id: Option<String>,
}

/// One normalized rate option, merged from whichever provider produced it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Rate {
    pub id: String,
    pub carrier: String,
    pub carrier_code: String,
    pub service_name: String,
    pub service_code: String,
    pub service_level: String,
    #[serde(rename = "standardized_service_name")]
    pub standard_service_name: String,
    pub rate_display_name: String,
    pub price: String,
    pub currency_code: String,
    pub est_delivery_date: String,
    pub est_delivery_time: Option<String>,
    pub service_days: u32,
    pub rates_provider: String,
    pub insurance_price: f64,
}

/// Merged response returned to the caller.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct QuoteResponse {
    pub rates: Vec<Rate>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct CarrierType {
    #[serde(default)]
    pub code: String,
}

/// One entry of the broker's carrier listing, fetched once at startup.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Carrier {
    pub code: String,
    pub carrier_type: CarrierType,
    pub name: String,
    pub is_enabled: bool,
    pub activatable: bool,
    pub required_credentials: Vec<String>,
    pub optional_credentials: Vec<String>,
    pub test_mode: bool,
    pub status: String,
    pub logo: String,
}
