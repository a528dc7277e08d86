use crate::error::{CoreResult, ShipRatesError};
use crate::model::{Address, PackageItem, ShipmentRequest};

const DEFAULT_COUNTRY: &str = "US";
const DEFAULT_WAREHOUSE_CODE: &str = "01";

/// A shipment request after validation and defaulting. Every provider
/// payload is derived from this; none of them re-apply defaults.
/// Invariant: `items` is non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedShipment {
    pub items: Vec<PackageItem>,
    pub origin_address: Option<Address>,
    pub destination_address: Address,
    pub warehouse_code: String,
    pub carrier_filter: Vec<String>,
}

impl NormalizedShipment {
    pub fn origin_zip(&self) -> &str {
        self.origin_address.as_ref().map(|a| a.zip.as_str()).unwrap_or("")
    }

    pub fn destination_zip(&self) -> &str {
        &self.destination_address.zip
    }
}

/// Validate a caller's shipment request and fill in defaults.
///
/// Rejected: empty items list; no resolvable destination (neither a
/// destination address with a zip nor a bare destination zip).
pub fn normalize(req: ShipmentRequest) -> CoreResult<NormalizedShipment> {
    if req.items.is_empty() {
        return Err(ShipRatesError::Validation(
            "at least one package item is required".to_string(),
        ));
    }

    let destination_address = resolve_destination(&req)?;
    let origin_address = resolve_origin(&req);

    let items = req
        .items
        .into_iter()
        .enumerate()
        .map(|(i, item)| normalize_item(i, item))
        .collect();

    Ok(NormalizedShipment {
        items,
        origin_address,
        destination_address,
        warehouse_code: req
            .warehouse_code
            .filter(|w| !w.is_empty())
            .unwrap_or_else(|| DEFAULT_WAREHOUSE_CODE.to_string()),
        carrier_filter: req.carrier_filter.unwrap_or_default(),
    })
}

fn normalize_item(index: usize, mut item: PackageItem) -> PackageItem {
    // Two legacy spellings: `quantity` wins, then `qty`, then 1.
    if item.quantity == 0 {
        item.quantity = item.qty;
    }
    if item.quantity == 0 {
        item.quantity = 1;
    }
    if item.country_of_origin.as_deref().unwrap_or("").is_empty() {
        item.country_of_origin = Some(DEFAULT_COUNTRY.to_string());
    }
    if item.name.as_deref().unwrap_or("").is_empty() {
        item.name = Some(format!("Package {}", index + 1));
    }
    item
}

fn resolve_destination(req: &ShipmentRequest) -> CoreResult<Address> {
    let country_override = req
        .destination_country_id
        .as_deref()
        .filter(|c| !c.is_empty());

    if let Some(addr) = &req.destination_address
        && !addr.zip.is_empty()
    {
        let mut addr = addr.clone();
        if let Some(country) = country_override {
            addr.country = country.to_string();
        }
        return Ok(addr);
    }

    match req.destination_zip.as_deref().filter(|z| !z.is_empty()) {
        Some(zip) => Ok(Address {
            zip: zip.to_string(),
            country: country_override.unwrap_or(DEFAULT_COUNTRY).to_string(),
            ..Address::default()
        }),
        None => Err(ShipRatesError::Validation(
            "destination address or zip code is required".to_string(),
        )),
    }
}

fn resolve_origin(req: &ShipmentRequest) -> Option<Address> {
    if let Some(addr) = &req.origin_address {
        return Some(addr.clone());
    }
    req.origin_zip
        .as_deref()
        .filter(|z| !z.is_empty())
        .map(|zip| Address {
            zip: zip.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            ..Address::default()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mk_req(items: Vec<PackageItem>) -> ShipmentRequest {
        ShipmentRequest {
            destination_zip: Some("10001".to_string()),
            items,
            ..ShipmentRequest::default()
        }
    }

    fn item_with(quantity: u32, qty: u32) -> PackageItem {
        PackageItem {
            weight: 1.0,
            quantity,
            qty,
            ..PackageItem::default()
        }
    }

    #[test]
    fn legacy_qty_wins_when_quantity_is_zero() {
        let out = normalize(mk_req(vec![item_with(0, 5)])).unwrap();
        assert_eq!(out.items[0].quantity, 5);
    }

    #[test]
    fn quantity_takes_precedence_over_qty() {
        let out = normalize(mk_req(vec![item_with(2, 5)])).unwrap();
        assert_eq!(out.items[0].quantity, 2);
    }

    #[test]
    fn both_zero_defaults_to_one() {
        let out = normalize(mk_req(vec![item_with(0, 0)])).unwrap();
        assert_eq!(out.items[0].quantity, 1);
    }

    #[test]
    fn missing_names_are_synthesized_by_position() {
        let out = normalize(mk_req(vec![
            item_with(1, 0),
            PackageItem {
                weight: 2.0,
                name: Some("Kettlebell".to_string()),
                ..PackageItem::default()
            },
            item_with(1, 0),
        ]))
        .unwrap();
        assert_eq!(out.items[0].name.as_deref(), Some("Package 1"));
        assert_eq!(out.items[1].name.as_deref(), Some("Kettlebell"));
        assert_eq!(out.items[2].name.as_deref(), Some("Package 3"));
    }

    #[test]
    fn country_of_origin_defaults_to_us() {
        let out = normalize(mk_req(vec![item_with(1, 0)])).unwrap();
        assert_eq!(out.items[0].country_of_origin.as_deref(), Some("US"));
    }

    #[test]
    fn explicit_country_of_origin_is_kept() {
        let mut item = item_with(1, 0);
        item.country_of_origin = Some("CA".to_string());
        let out = normalize(mk_req(vec![item])).unwrap();
        assert_eq!(out.items[0].country_of_origin.as_deref(), Some("CA"));
    }

    #[test]
    fn empty_items_rejected() {
        let err = normalize(mk_req(vec![])).unwrap_err();
        assert!(matches!(err, ShipRatesError::Validation(_)));
    }

    #[test]
    fn missing_destination_rejected() {
        let req = ShipmentRequest {
            items: vec![item_with(1, 0)],
            ..ShipmentRequest::default()
        };
        let err = normalize(req).unwrap_err();
        match err {
            ShipRatesError::Validation(msg) => assert!(msg.contains("destination")),
            other => panic!("expected Validation, got: {other:?}"),
        }
    }

    #[test]
    fn zip_only_destination_builds_synthetic_address() {
        let out = normalize(mk_req(vec![item_with(0, 0)])).unwrap();
        assert_eq!(out.destination_address.zip, "10001");
        assert_eq!(out.destination_address.country, "US");
        assert!(out.destination_address.street1.is_empty());
    }

    #[test]
    fn destination_country_override_applies_to_synthetic_address() {
        let mut req = mk_req(vec![item_with(0, 0)]);
        req.destination_country_id = Some("CA".to_string());
        let out = normalize(req).unwrap();
        assert_eq!(out.destination_address.country, "CA");
    }

    #[test]
    fn destination_country_override_applies_to_full_address() {
        let mut req = mk_req(vec![item_with(0, 0)]);
        req.destination_zip = None;
        req.destination_address = Some(Address {
            zip: "K1A0B1".to_string(),
            country: "US".to_string(),
            city: "Ottawa".to_string(),
            ..Address::default()
        });
        req.destination_country_id = Some("CA".to_string());
        let out = normalize(req).unwrap();
        assert_eq!(out.destination_address.country, "CA");
        assert_eq!(out.destination_address.city, "Ottawa");
    }

    #[test]
    fn full_destination_address_wins_over_zip() {
        let mut req = mk_req(vec![item_with(0, 0)]);
        req.destination_address = Some(Address {
            zip: "30301".to_string(),
            country: "US".to_string(),
            ..Address::default()
        });
        let out = normalize(req).unwrap();
        assert_eq!(out.destination_address.zip, "30301");
    }

    #[test]
    fn origin_zip_builds_synthetic_origin() {
        let mut req = mk_req(vec![item_with(0, 0)]);
        req.origin_zip = Some("29201".to_string());
        let out = normalize(req).unwrap();
        let origin = out.origin_address.as_ref().unwrap();
        assert_eq!(origin.zip, "29201");
        assert_eq!(origin.country, "US");
        assert_eq!(out.origin_zip(), "29201");
    }

    #[test]
    fn missing_origin_is_allowed() {
        let out = normalize(mk_req(vec![item_with(0, 0)])).unwrap();
        assert!(out.origin_address.is_none());
        assert_eq!(out.origin_zip(), "");
    }

    #[test]
    fn warehouse_and_carrier_filter_defaults() {
        let out = normalize(mk_req(vec![item_with(0, 0)])).unwrap();
        assert_eq!(out.warehouse_code, "01");
        assert!(out.carrier_filter.is_empty());
    }

    #[test]
    fn explicit_warehouse_and_filter_are_kept() {
        let mut req = mk_req(vec![item_with(0, 0)]);
        req.warehouse_code = Some("02".to_string());
        req.carrier_filter = Some(vec!["ups".to_string()]);
        let out = normalize(req).unwrap();
        assert_eq!(out.warehouse_code, "02");
        assert_eq!(out.carrier_filter, vec!["ups".to_string()]);
    }
}
