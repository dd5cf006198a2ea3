//! Client-submitted request bodies (camelCase on the wire) and the small
//! response envelopes that go with them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::form::PrefillData;
use crate::lenient;
use crate::model::{LeakLocation, LeakNear, RoofPitch};

pub const DEFAULT_SUBMIT_MESSAGE: &str = "Request submitted successfully.";
pub const PENDING_REQUEST_ID: &str = "Pending";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfoRequest {
    pub dynamo_account_id: Option<i64>,
    pub dynamo_contact_id: Option<i64>,
    pub account_name: String,
    pub account_contact_name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingInfoRequest {
    pub dynamo_id: Option<i64>,
    pub entity_bill_to_name: String,
    pub bill_to_address: String,
    pub bill_to_address2: String,
    pub bill_to_city: String,
    pub bill_to_zip: String,
    pub bill_to_email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeakDetailsRequest {
    pub dynamo_id: Option<i64>,
    pub job_no: String,
    pub job_date: Option<String>,
    pub site_name: String,
    pub site_address: String,
    pub site_address2: String,
    pub site_city: String,
    pub site_zip: String,
    pub tenant_business_name: String,
    pub tenant_contact_name: String,
    pub tenant_contact_phone: String,
    pub tenant_contact_cell: String,
    pub tenant_contact_email: String,
    pub hours_of_operation: String,
    pub leak_location: LeakLocation,
    pub leak_near: LeakNear,
    pub leak_near_other: String,
    pub has_access_code: bool,
    pub access_code: String,
    pub is_saturday_access_permitted: bool,
    pub is_key_required: bool,
    pub is_ladder_required: bool,
    pub roof_pitch: RoofPitch,
    pub comments: String,
}

/// Body of `POST /api/emergency-leak-service`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOrderIntakeRequest {
    pub request_date: String,
    pub client: ClientInfoRequest,
    pub billing: BillingInfoRequest,
    pub leak_details: LeakDetailsRequest,
    pub additional_leaks: Vec<LeakDetailsRequest>,
    #[serde(rename = "SignatureData")]
    pub signature_data: String,
    #[serde(rename = "SignatureName")]
    pub signature_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrefillRequest<'a> {
    pub company_name: &'a str,
    pub email: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOrderNumberLookup<'a> {
    pub service_order_number: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailLookup<'a> {
    pub email: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PrefillResponse {
    #[serde(deserialize_with = "lenient::flag")]
    pub found: bool,
    #[serde(deserialize_with = "lenient::record")]
    pub data: Option<PrefillData>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub message: Option<String>,
}

/// What the caller reports after a successful submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub message: String,
    pub request_id: String,
}

impl SubmitOutcome {
    /// Reads `{ message?, requestId? }`, applying the defaults for anything
    /// missing. Any other payload shape gets both defaults.
    pub fn from_payload(payload: Option<&Value>) -> Self {
        let message = payload
            .and_then(|value| value.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_SUBMIT_MESSAGE.to_string());

        let request_id = payload
            .and_then(|value| value.get("requestId"))
            .and_then(|id| match id {
                Value::String(text) => Some(text.trim().to_string()),
                Value::Number(number) => Some(number.to_string()),
                _ => None,
            })
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| PENDING_REQUEST_ID.to_string());

        Self { message, request_id }
    }
}
