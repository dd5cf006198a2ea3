//! Server-origin records (PascalCase on the wire) and the canonical lookup result.
//!
//! Every field is defaulted and decoded leniently,
//! so partial or mistyped objects from the backend still decode.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::lenient;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ClientInfo {
    #[serde(deserialize_with = "lenient::optional_id")]
    pub dynamo_account_id: Option<i64>,
    #[serde(alias = "DynamoCountId", deserialize_with = "lenient::optional_id")]
    pub dynamo_contact_id: Option<i64>,
    #[serde(deserialize_with = "lenient::text")]
    pub account_name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub account_contact_name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub email: String,
    #[serde(deserialize_with = "lenient::text")]
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BillingInfo {
    #[serde(deserialize_with = "lenient::optional_id")]
    pub dynamo_id: Option<i64>,
    #[serde(deserialize_with = "lenient::text")]
    pub entity_bill_to_name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub bill_to_address: String,
    #[serde(deserialize_with = "lenient::text")]
    pub bill_to_address2: String,
    #[serde(deserialize_with = "lenient::text")]
    pub bill_to_city: String,
    #[serde(deserialize_with = "lenient::text")]
    pub bill_to_zip: String,
    #[serde(deserialize_with = "lenient::text")]
    pub bill_to_email: String,
}

/// Where on the roof the leak is. `1..=3` on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum LeakLocation {
    #[default]
    Front,
    Middle,
    Back,
    Unrecognized(i64),
}

impl LeakLocation {
    pub const ALL: [LeakLocation; 3] = [LeakLocation::Front, LeakLocation::Middle, LeakLocation::Back];
}

impl From<i64> for LeakLocation {
    fn from(value: i64) -> Self {
        match value {
            1 => LeakLocation::Front,
            2 => LeakLocation::Middle,
            3 => LeakLocation::Back,
            other => LeakLocation::Unrecognized(other),
        }
    }
}

impl From<LeakLocation> for i64 {
    fn from(value: LeakLocation) -> Self {
        match value {
            LeakLocation::Front => 1,
            LeakLocation::Middle => 2,
            LeakLocation::Back => 3,
            LeakLocation::Unrecognized(other) => other,
        }
    }
}

impl fmt::Display for LeakLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeakLocation::Front => f.write_str("Front"),
            LeakLocation::Middle => f.write_str("Middle"),
            LeakLocation::Back => f.write_str("Back"),
            LeakLocation::Unrecognized(other) => write!(f, "{other}"),
        }
    }
}

/// What the leak is next to. `1..=5` on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum LeakNear {
    #[default]
    HvacDuct,
    Skylight,
    Wall,
    Drain,
    Other,
    Unrecognized(i64),
}

impl LeakNear {
    pub const ALL: [LeakNear; 5] = [
        LeakNear::HvacDuct,
        LeakNear::Skylight,
        LeakNear::Wall,
        LeakNear::Drain,
        LeakNear::Other,
    ];
}

impl From<i64> for LeakNear {
    fn from(value: i64) -> Self {
        match value {
            1 => LeakNear::HvacDuct,
            2 => LeakNear::Skylight,
            3 => LeakNear::Wall,
            4 => LeakNear::Drain,
            5 => LeakNear::Other,
            other => LeakNear::Unrecognized(other),
        }
    }
}

impl From<LeakNear> for i64 {
    fn from(value: LeakNear) -> Self {
        match value {
            LeakNear::HvacDuct => 1,
            LeakNear::Skylight => 2,
            LeakNear::Wall => 3,
            LeakNear::Drain => 4,
            LeakNear::Other => 5,
            LeakNear::Unrecognized(other) => other,
        }
    }
}

impl fmt::Display for LeakNear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeakNear::HvacDuct => f.write_str("HVAC Duct"),
            LeakNear::Skylight => f.write_str("Skylight"),
            LeakNear::Wall => f.write_str("Wall"),
            LeakNear::Drain => f.write_str("Drain"),
            LeakNear::Other => f.write_str("Other"),
            LeakNear::Unrecognized(other) => write!(f, "{other}"),
        }
    }
}

/// `1` flat, `2` steep / shingle / tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum RoofPitch {
    #[default]
    FlatRoof,
    SteepShingleTile,
    Unrecognized(i64),
}

impl RoofPitch {
    pub const ALL: [RoofPitch; 2] = [RoofPitch::FlatRoof, RoofPitch::SteepShingleTile];
}

impl From<i64> for RoofPitch {
    fn from(value: i64) -> Self {
        match value {
            1 => RoofPitch::FlatRoof,
            2 => RoofPitch::SteepShingleTile,
            other => RoofPitch::Unrecognized(other),
        }
    }
}

impl From<RoofPitch> for i64 {
    fn from(value: RoofPitch) -> Self {
        match value {
            RoofPitch::FlatRoof => 1,
            RoofPitch::SteepShingleTile => 2,
            RoofPitch::Unrecognized(other) => other,
        }
    }
}

impl fmt::Display for RoofPitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoofPitch::FlatRoof => f.write_str("Flat Roof"),
            RoofPitch::SteepShingleTile => f.write_str("Steep / Shingle / Tile"),
            RoofPitch::Unrecognized(other) => write!(f, "{other}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LeakDetails {
    #[serde(deserialize_with = "lenient::optional_id")]
    pub dynamo_id: Option<i64>,
    #[serde(deserialize_with = "lenient::text")]
    pub job_no: String,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub job_date: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub site_name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub site_address: String,
    #[serde(deserialize_with = "lenient::text")]
    pub site_address2: String,
    #[serde(deserialize_with = "lenient::text")]
    pub site_city: String,
    #[serde(deserialize_with = "lenient::text")]
    pub site_zip: String,
    #[serde(deserialize_with = "lenient::text")]
    pub tenant_business_name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub tenant_contact_name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub tenant_contact_phone: String,
    #[serde(deserialize_with = "lenient::text")]
    pub tenant_contact_cell: String,
    #[serde(deserialize_with = "lenient::text")]
    pub tenant_contact_email: String,
    #[serde(deserialize_with = "lenient::text")]
    pub hours_of_operation: String,
    #[serde(deserialize_with = "lenient::code")]
    pub leak_location: Option<LeakLocation>,
    #[serde(deserialize_with = "lenient::code")]
    pub leak_near: Option<LeakNear>,
    #[serde(deserialize_with = "lenient::text")]
    pub leak_near_other: String,
    #[serde(deserialize_with = "lenient::flag")]
    pub has_access_code: bool,
    #[serde(deserialize_with = "lenient::text")]
    pub access_code: String,
    #[serde(deserialize_with = "lenient::flag")]
    pub is_saturday_access_permitted: bool,
    #[serde(deserialize_with = "lenient::flag")]
    pub is_key_required: bool,
    #[serde(deserialize_with = "lenient::flag")]
    pub is_ladder_required: bool,
    #[serde(deserialize_with = "lenient::code")]
    pub roof_pitch: Option<RoofPitch>,
    #[serde(deserialize_with = "lenient::text")]
    pub comments: String,
}

impl LeakDetails {
    /// Free-text "other" wins over the enumerated value.
    pub fn leak_near_label(&self) -> String {
        if !self.leak_near_other.trim().is_empty() {
            return self.leak_near_other.clone();
        }
        self.leak_near.map(|near| near.to_string()).unwrap_or_default()
    }

    /// Street lines joined, then city and zip.
    pub fn address_line(&self) -> String {
        let street = [self.site_address.as_str(), self.site_address2.as_str()]
            .into_iter()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        let locality = format!("{} {}", self.site_city, self.site_zip);
        match (street.is_empty(), locality.trim().is_empty()) {
            (true, _) => locality.trim().to_string(),
            (false, true) => street,
            (false, false) => format!("{street}, {}", locality.trim()),
        }
    }
}

/// Service-order ids are numeric in lookups and GUID strings in status responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderId {
    Number(i64),
    Text(String),
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderId::Number(id) => write!(f, "{id}"),
            OrderId::Text(id) => f.write_str(id),
        }
    }
}

fn order_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<OrderId>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => Some(match number.as_i64() {
            Some(id) => OrderId::Number(id),
            None => OrderId::Text(number.to_string()),
        }),
        Value::String(text) => Some(OrderId::Text(text)),
        _ => None,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServiceOrder {
    #[serde(deserialize_with = "order_id")]
    pub id: Option<OrderId>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub request_date: Option<String>,
    #[serde(deserialize_with = "lenient::record")]
    pub client: Option<ClientInfo>,
    #[serde(deserialize_with = "lenient::record")]
    pub billing: Option<BillingInfo>,
    #[serde(deserialize_with = "lenient::record")]
    pub leak_details: Option<LeakDetails>,
    #[serde(deserialize_with = "lenient::records")]
    pub additional_leaks: Vec<LeakDetails>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub created_at: Option<String>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub updated_at: Option<String>,
}

impl ServiceOrder {
    /// Primary leak followed by the additional ones.
    pub fn leaks(&self) -> impl Iterator<Item = &LeakDetails> {
        self.leak_details.iter().chain(self.additional_leaks.iter())
    }
}

/// Canonical shape of every service-order lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LookupResult {
    pub clients: Vec<ClientInfo>,
    pub billings: Vec<BillingInfo>,
    pub leaks: Vec<LeakDetails>,
    pub service_orders: Vec<ServiceOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LookupResult {
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
            && self.billings.is_empty()
            && self.leaks.is_empty()
            && self.service_orders.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceOrderStatus {
    New,
    InProgress,
    Completed,
    Cancelled,
}

impl ServiceOrderStatus {
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "NEW" => Some(ServiceOrderStatus::New),
            "IN_PROGRESS" => Some(ServiceOrderStatus::InProgress),
            "COMPLETED" => Some(ServiceOrderStatus::Completed),
            "CANCELLED" => Some(ServiceOrderStatus::Cancelled),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ServiceOrderStatus::New => "New",
            ServiceOrderStatus::InProgress => "In Progress",
            ServiceOrderStatus::Completed => "Completed",
            ServiceOrderStatus::Cancelled => "Cancelled",
        }
    }
}

/// Envelope returned by the status endpoint, kept exactly as received.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct StatusResponse {
    #[serde(deserialize_with = "lenient::flag")]
    pub success: bool,
    #[serde(deserialize_with = "lenient::text")]
    pub message: String,
    #[serde(deserialize_with = "lenient::text")]
    pub status: String,
    #[serde(deserialize_with = "lenient::record")]
    pub data: Option<ServiceOrder>,
}

impl StatusResponse {
    pub fn status_kind(&self) -> Option<ServiceOrderStatus> {
        ServiceOrderStatus::from_wire(&self.status)
    }

    /// Display label, falling back to the raw status value.
    pub fn status_label(&self) -> String {
        self.status_kind()
            .map(|status| status.label().to_string())
            .unwrap_or_else(|| self.status.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn partial_client_decodes_with_defaults() {
        let client: ClientInfo = serde_json::from_value(json!({
            "AccountName": "Acme",
            "Email": null,
            "DynamoCountId": 200
        }))
        .unwrap();
        assert_eq!(client.account_name, "Acme");
        assert_eq!(client.email, "");
        assert_eq!(client.dynamo_contact_id, Some(200));
        assert_eq!(client.dynamo_account_id, None);
    }

    #[test]
    fn leak_enums_use_numeric_codes() {
        let leak: LeakDetails = serde_json::from_value(json!({
            "SiteName": "Site A",
            "LeakLocation": 2,
            "LeakNear": 5,
            "RoofPitch": 9
        }))
        .unwrap();
        assert_eq!(leak.leak_location, Some(LeakLocation::Middle));
        assert_eq!(leak.leak_near, Some(LeakNear::Other));
        assert_eq!(leak.roof_pitch, Some(RoofPitch::Unrecognized(9)));
        assert_eq!(leak.roof_pitch.unwrap().to_string(), "9");

        let encoded = serde_json::to_value(&leak).unwrap();
        assert_eq!(encoded["LeakLocation"], json!(2));
        assert_eq!(encoded["RoofPitch"], json!(9));
    }

    #[test]
    fn mistyped_fields_do_not_reject_the_record() {
        let order: ServiceOrder = serde_json::from_value(json!({
            "Id": 9,
            "RequestDate": 20260216,
            "Client": { "AccountName": "Acme", "Phone": 5551234 },
            "Billing": { "DynamoId": "300", "BillToZip": 80202 },
            "LeakDetails": { "SiteName": "Site A", "LeakLocation": "1", "LeakNear": "near", "IsKeyRequired": "true" },
            "AdditionalLeaks": [{ "SiteName": "Annex" }, "bogus"]
        }))
        .unwrap();

        let client = order.client.unwrap();
        assert_eq!(client.phone, "5551234");
        let billing = order.billing.unwrap();
        assert_eq!(billing.dynamo_id, Some(300));
        assert_eq!(billing.bill_to_zip, "80202");
        let leak = order.leak_details.unwrap();
        assert_eq!(leak.leak_location, Some(LeakLocation::Front));
        assert_eq!(leak.leak_near, None);
        assert!(leak.is_key_required);
        assert_eq!(order.additional_leaks.len(), 1);
        assert_eq!(order.request_date.as_deref(), Some("20260216"));
    }

    #[test]
    fn status_envelope_tolerates_bad_data() {
        let response: StatusResponse = serde_json::from_value(json!({
            "Success": 1,
            "Message": null,
            "Status": "COMPLETED",
            "Data": { "Id": true, "Client": "Acme" }
        }))
        .unwrap();
        assert!(response.success);
        assert_eq!(response.message, "");
        let data = response.data.unwrap();
        assert_eq!(data.id, None);
        assert_eq!(data.client, None);

        let bare: StatusResponse = serde_json::from_value(json!({ "Status": "NEW", "Data": [1, 2] })).unwrap();
        assert_eq!(bare.data, None);
    }

    #[test]
    fn leak_near_other_overrides_label() {
        let mut leak = LeakDetails {
            leak_near: Some(LeakNear::Other),
            ..LeakDetails::default()
        };
        assert_eq!(leak.leak_near_label(), "Other");
        leak.leak_near_other = "Chimney flashing".into();
        assert_eq!(leak.leak_near_label(), "Chimney flashing");
    }

    #[test]
    fn address_line_skips_blank_parts() {
        let leak = LeakDetails {
            site_address: "1 Main St".into(),
            site_city: "Denver".into(),
            site_zip: "80202".into(),
            ..LeakDetails::default()
        };
        assert_eq!(leak.address_line(), "1 Main St, Denver 80202");
    }

    #[test]
    fn order_id_accepts_numbers_and_strings() {
        let numeric: ServiceOrder = serde_json::from_value(json!({ "Id": 7 })).unwrap();
        let text: ServiceOrder = serde_json::from_value(json!({ "Id": "abc-123" })).unwrap();
        assert_eq!(numeric.id, Some(OrderId::Number(7)));
        assert_eq!(text.id.unwrap().to_string(), "abc-123");
    }

    #[test]
    fn status_label_falls_back_to_raw_value() {
        let mut response = StatusResponse {
            status: "IN_PROGRESS".into(),
            ..StatusResponse::default()
        };
        assert_eq!(response.status_label(), "In Progress");
        response.status = "ON_HOLD".into();
        assert_eq!(response.status_kind(), None);
        assert_eq!(response.status_label(), "ON_HOLD");
    }

    #[test]
    fn lookup_result_serializes_camel_case_keys() {
        let value = serde_json::to_value(LookupResult::default()).unwrap();
        assert_eq!(
            value,
            json!({ "clients": [], "billings": [], "leaks": [], "serviceOrders": [] })
        );
    }
}
