//! Backend calls used by the intake flow. Each is a single fetch.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::FetchError;
use crate::fetch::{FetchOptions, Fetcher, Transport};
use crate::model::{LookupResult, StatusResponse};
use crate::normalize::normalize_lookup_response;
use crate::payload::{
    EmailLookup, PrefillRequest, PrefillResponse, ServiceOrderIntakeRequest,
    ServiceOrderNumberLookup, SubmitOutcome,
};

pub const SUBMIT_ENDPOINT: &str = "/api/emergency-leak-service";
pub const PREFILL_ENDPOINT: &str = "/api/emergency-leak-service/prefill";
pub const LOOKUP_SERVICE_ORDER_ENDPOINT: &str = "/api/emergency-leak-service/lookup/service-order";
pub const LOOKUP_EMAIL_ENDPOINT: &str = "/api/emergency-leak-service/lookup/email";
pub const STATUS_ENDPOINT: &str = "/api/emergency-leak-service/status";

const SUBMIT_FAILED: &str = "Submit request failed.";
const PREFILL_FAILED: &str = "Prefill request failed.";
const SERVICE_ORDER_LOOKUP_FAILED: &str = "Service order lookup failed.";
const EMAIL_LOOKUP_FAILED: &str = "Email lookup failed.";
const STATUS_FAILED: &str = "Unable to load service order status.";

pub struct ServiceOrderApi<T> {
    fetcher: Fetcher<T>,
}

impl<T: Transport> ServiceOrderApi<T> {
    pub fn new(fetcher: Fetcher<T>) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &Fetcher<T> {
        &self.fetcher
    }

    pub fn submit(&self, request: &ServiceOrderIntakeRequest) -> Result<SubmitOutcome, FetchError> {
        let payload = self
            .fetcher
            .fetch_value(SUBMIT_ENDPOINT, post(request)?, Some(SUBMIT_FAILED))?;
        let outcome = SubmitOutcome::from_payload(payload.as_ref());
        info!(request_id = %outcome.request_id, "service order submitted");
        Ok(outcome)
    }

    /// Anything but a JSON object counts as "nothing found".
    pub fn prefill(&self, company_name: &str, email: &str) -> Result<PrefillResponse, FetchError> {
        let body = PrefillRequest { company_name, email };
        let payload = self
            .fetcher
            .fetch_value(PREFILL_ENDPOINT, post(&body)?, Some(PREFILL_FAILED))?;
        Ok(self.object(PREFILL_ENDPOINT, payload)?.unwrap_or_default())
    }

    pub fn lookup_by_service_order(&self, service_order_number: &str) -> Result<LookupResult, FetchError> {
        let body = ServiceOrderNumberLookup { service_order_number };
        self.lookup(LOOKUP_SERVICE_ORDER_ENDPOINT, post(&body)?, SERVICE_ORDER_LOOKUP_FAILED)
    }

    pub fn lookup_by_email(&self, email: &str) -> Result<LookupResult, FetchError> {
        let body = EmailLookup { email };
        self.lookup(LOOKUP_EMAIL_ENDPOINT, post(&body)?, EMAIL_LOOKUP_FAILED)
    }

    /// The reference id goes into the query string verbatim. `None` when the
    /// body is not a JSON object.
    pub fn status(&self, reference_id: &str) -> Result<Option<StatusResponse>, FetchError> {
        let url = format!("{STATUS_ENDPOINT}?referenceId={reference_id}");
        let payload = self
            .fetcher
            .fetch_value(&url, FetchOptions::get(), Some(STATUS_FAILED))?;
        self.object(&url, payload)
    }

    fn lookup(&self, url: &str, options: FetchOptions, fallback: &str) -> Result<LookupResult, FetchError> {
        let payload = self.fetcher.fetch_value(url, options, Some(fallback))?;
        let result = payload
            .as_ref()
            .map(normalize_lookup_response)
            .unwrap_or_default();
        info!(orders = result.service_orders.len(), "lookup completed");
        Ok(result)
    }

    fn object<D: DeserializeOwned>(&self, url: &str, payload: Option<Value>) -> Result<Option<D>, FetchError> {
        match payload {
            Some(value @ Value::Object(_)) => serde_json::from_value(value)
                .map(Some)
                .map_err(|source| FetchError::Decode {
                    url: self.fetcher.resolve(url),
                    source,
                }),
            Some(other) => {
                debug!(%url, payload = %other, "ignoring non-object payload");
                Ok(None)
            }
            None => Ok(None),
        }
    }
}

fn post<B: Serialize>(body: &B) -> Result<FetchOptions, FetchError> {
    let value = serde_json::to_value(body).map_err(FetchError::Encode)?;
    Ok(FetchOptions::post(value))
}
