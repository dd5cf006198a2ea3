//! Reshapes whatever a lookup endpoint returned into a [`LookupResult`].
//!
//! Accepted shapes, checked in this order:
//!
//! 1. an array of orders,
//! 2. a `{ "matches": [...], "message": ... }` envelope,
//! 3. an already-canonical `{ "serviceOrders": [...], ... }` response,
//! 4. a single order (an object with a non-null `Id`).
//!
//! Anything else normalizes to an empty result.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::model::{BillingInfo, ClientInfo, LeakDetails, LookupResult, OrderId, ServiceOrder};

pub fn normalize_lookup_response(raw: &Value) -> LookupResult {
    match raw {
        Value::Array(orders) => collect_orders(orders, None),
        Value::Object(object) => {
            if let Some(Value::Array(matches)) = object.get("matches") {
                return collect_orders(matches, envelope_message(object));
            }
            if let Some(Value::Array(_)) = object.get("serviceOrders") {
                return canonical(object);
            }
            if object.get("Id").is_some_and(|id| !id.is_null()) {
                return collect_orders(std::slice::from_ref(raw), None);
            }
            debug!(keys = ?object.keys().collect::<Vec<_>>(), "unrecognized lookup response");
            LookupResult::default()
        }
        other => {
            debug!(kind = json_kind(other), "unrecognized lookup response");
            LookupResult::default()
        }
    }
}

fn collect_orders(orders: &[Value], message: Option<String>) -> LookupResult {
    let mut result = LookupResult {
        message,
        ..LookupResult::default()
    };

    for (index, order) in orders.iter().enumerate() {
        let Value::Object(object) = order else {
            debug!(index, kind = json_kind(order), "skipping non-object order");
            continue;
        };

        let clients: Vec<ClientInfo> = one_or_many(object, "Client", "Clients");
        let billings: Vec<BillingInfo> = one_or_many(object, "Billing", "BillingInfos");
        // A legacy `LeakDetails` array keeps its first entry as the primary
        // leak; the rest go ahead of `AdditionalLeaks`.
        let mut leaks = one_or_many::<LeakDetails>(object, "LeakDetails", "LeakDetails")
            .into_iter()
            .chain(records(object.get("AdditionalLeaks")));

        let service_order = ServiceOrder {
            id: field::<OrderId>(object, "Id"),
            request_date: field(object, "RequestDate"),
            client: clients.first().cloned(),
            billing: billings.first().cloned(),
            leak_details: leaks.next(),
            additional_leaks: leaks.collect(),
            created_at: field(object, "CreatedAt"),
            updated_at: field(object, "UpdatedAt"),
        };

        result.clients.extend(clients);
        result.billings.extend(billings);
        result.leaks.extend(service_order.leaks().cloned());
        result.service_orders.push(service_order);
    }

    result
}

/// Already in the canonical shape; each collection is decoded record by
/// record so one bad entry cannot empty the others.
fn canonical(object: &Map<String, Value>) -> LookupResult {
    LookupResult {
        clients: records(object.get("clients")),
        billings: records(object.get("billings")),
        leaks: records(object.get("leaks")),
        service_orders: records(object.get("serviceOrders")),
        message: envelope_message(object),
    }
}

fn envelope_message(object: &Map<String, Value>) -> Option<String> {
    object.get("message").and_then(Value::as_str).map(str::to_string)
}

/// Reads `single` as one record, or `legacy` as an array of records.
fn one_or_many<T: DeserializeOwned>(
    object: &Map<String, Value>,
    single: &str,
    legacy: &str,
) -> Vec<T> {
    match object.get(single) {
        Some(value @ Value::Object(_)) => record(value).into_iter().collect(),
        Some(Value::Array(_)) if single == legacy => records(object.get(single)),
        _ => records(object.get(legacy)),
    }
}

fn records<T: DeserializeOwned>(value: Option<&Value>) -> Vec<T> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(record).collect(),
        _ => Vec::new(),
    }
}

fn record<T: DeserializeOwned>(value: &Value) -> Option<T> {
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value.clone())
        .map_err(|error| debug!(%error, "skipping undecodable record"))
        .ok()
}

fn field<T: DeserializeOwned>(object: &Map<String, Value>, key: &str) -> Option<T> {
    object
        .get(key)
        .filter(|value| !value.is_null())
        .and_then(|value| serde_json::from_value(value.clone()).ok())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LeakLocation;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn order(id: i64, additional: usize) -> Value {
        let extra: Vec<Value> = (0..additional)
            .map(|n| json!({ "SiteName": format!("Extra {n}"), "LeakLocation": 3 }))
            .collect();
        json!({
            "Id": id,
            "RequestDate": "2026-02-16T00:00:00Z",
            "Client": {
                "DynamoAccountId": 100,
                "DynamoContactId": 200,
                "AccountName": "Acme Corp",
                "AccountContactName": "John",
                "Email": "john@acme.com",
                "Phone": "555-1234"
            },
            "Billing": {
                "DynamoId": 300,
                "EntityBillToName": "Acme Billing",
                "BillToAddress": "123 Main St",
                "BillToAddress2": "",
                "BillToCity": "Denver",
                "BillToZip": "80202",
                "BillToEmail": "billing@acme.com"
            },
            "LeakDetails": { "SiteName": "Main Site", "LeakLocation": 1, "LeakNear": 2, "RoofPitch": 1 },
            "AdditionalLeaks": extra,
            "CreatedAt": "2026-02-16T00:00:00Z",
            "UpdatedAt": null
        })
    }

    #[test]
    fn single_order_becomes_one_entry_each() {
        let result = normalize_lookup_response(&order(1, 2));

        assert_eq!(result.service_orders.len(), 1);
        assert_eq!(result.clients.len(), 1);
        assert_eq!(result.billings.len(), 1);
        assert_eq!(result.leaks.len(), 3);
        assert_eq!(result.clients[0].account_name, "Acme Corp");
        assert_eq!(result.message, None);

        let sites: Vec<&str> = result.leaks.iter().map(|leak| leak.site_name.as_str()).collect();
        assert_eq!(sites, vec!["Main Site", "Extra 0", "Extra 1"]);

        let service_order = &result.service_orders[0];
        assert_eq!(service_order.id, Some(OrderId::Number(1)));
        assert_eq!(service_order.additional_leaks.len(), 2);
        assert_eq!(service_order.updated_at, None);
    }

    #[test]
    fn array_of_orders_preserves_order() {
        let result = normalize_lookup_response(&json!([order(1, 0), order(2, 1), order(3, 0)]));

        assert_eq!(result.service_orders.len(), 3);
        assert_eq!(result.clients.len(), 3);
        assert_eq!(result.billings.len(), 3);
        assert_eq!(result.leaks.len(), 4);
        let ids: Vec<String> = result
            .service_orders
            .iter()
            .map(|o| o.id.as_ref().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn matches_envelope_carries_message() {
        let raw = json!({ "matches": [order(1, 0)], "message": "Found 1 match" });
        let result = normalize_lookup_response(&raw);
        assert_eq!(result.service_orders.len(), 1);
        assert_eq!(result.message.as_deref(), Some("Found 1 match"));
    }

    #[test]
    fn unrecognized_shape_is_empty() {
        for raw in [json!({ "someUnknownField": true }), json!("text"), json!(null), json!({ "Id": null })] {
            let result = normalize_lookup_response(&raw);
            assert!(result.is_empty(), "{raw} should normalize to nothing");
            assert_eq!(result.message, None);
        }
    }

    #[test]
    fn canonical_response_passes_through() {
        let raw = json!({
            "clients": [],
            "billings": [],
            "leaks": [],
            "serviceOrders": [],
            "message": "Email lookup stub is ready."
        });
        let result = normalize_lookup_response(&raw);
        assert!(result.is_empty());
        assert_eq!(result.message.as_deref(), Some("Email lookup stub is ready."));
    }

    #[test]
    fn missing_nested_records_are_skipped() {
        let result = normalize_lookup_response(&json!([{ "Id": 5 }, { "Id": 6, "Client": { "AccountName": "Solo" } }]));
        assert_eq!(result.service_orders.len(), 2);
        assert_eq!(result.clients.len(), 1);
        assert!(result.billings.is_empty());
        assert!(result.leaks.is_empty());
        assert_eq!(result.service_orders[0].client, None);
    }

    #[test]
    fn legacy_plural_collections_are_flattened() {
        let raw = json!({
            "Id": 1,
            "RequestDate": "2026-02-16T00:00:00Z",
            "Clients": [{ "DynamoAccountId": 100, "DynamoCountId": 200, "AccountName": "Acme Corp" }],
            "BillingInfos": [{ "DynamoId": 300, "EntityBillToName": "Acme Billing" }],
            "LeakDetails": [],
            "CreatedAt": "2026-02-16T00:00:00Z"
        });
        let result = normalize_lookup_response(&raw);

        assert_eq!(result.service_orders.len(), 1);
        assert_eq!(result.clients.len(), 1);
        assert_eq!(result.clients[0].account_name, "Acme Corp");
        assert_eq!(result.clients[0].dynamo_contact_id, Some(200));
        assert_eq!(result.billings.len(), 1);
        assert!(result.leaks.is_empty());
    }

    #[test]
    fn mistyped_nested_fields_keep_their_records() {
        let raw = json!({
            "Id": 1,
            "Client": { "AccountName": "Acme Corp", "Phone": 5551234 },
            "Billing": { "DynamoId": "300", "EntityBillToName": "Acme Billing" },
            "LeakDetails": { "SiteName": "Main Site", "LeakLocation": "1" }
        });
        let result = normalize_lookup_response(&raw);

        assert_eq!(result.service_orders.len(), 1);
        assert_eq!(result.clients.len(), 1);
        assert_eq!(result.clients[0].phone, "5551234");
        assert_eq!(result.billings.len(), 1);
        assert_eq!(result.billings[0].dynamo_id, Some(300));
        assert_eq!(result.leaks.len(), 1);
        assert_eq!(result.leaks[0].leak_location, Some(LeakLocation::Front));
    }

    #[test]
    fn canonical_collections_survive_a_bad_record() {
        let raw = json!({
            "serviceOrders": [{ "Id": 1 }, "junk"],
            "clients": [{ "AccountName": "Acme" }, { "Phone": 1 }],
            "billings": "not a list",
            "leaks": [{ "SiteName": "Site A", "LeakNear": {} }]
        });
        let result = normalize_lookup_response(&raw);

        assert_eq!(result.service_orders.len(), 1);
        assert_eq!(result.service_orders[0].id, Some(OrderId::Number(1)));
        assert_eq!(result.clients.len(), 2);
        assert_eq!(result.clients[1].phone, "1");
        assert!(result.billings.is_empty());
        assert_eq!(result.leaks.len(), 1);
        assert_eq!(result.leaks[0].leak_near, None);
        assert_eq!(result.message, None);
    }

    #[test]
    fn legacy_leak_array_fills_the_order_aggregate() {
        let raw = json!({
            "Id": 3,
            "LeakDetails": [{ "SiteName": "First" }, { "SiteName": "Second" }],
            "AdditionalLeaks": [{ "SiteName": "Third" }]
        });
        let result = normalize_lookup_response(&raw);

        let order = &result.service_orders[0];
        assert_eq!(order.leak_details.as_ref().map(|l| l.site_name.as_str()), Some("First"));
        let order_sites: Vec<&str> = order.leaks().map(|l| l.site_name.as_str()).collect();
        let flat_sites: Vec<&str> = result.leaks.iter().map(|l| l.site_name.as_str()).collect();
        assert_eq!(order_sites, vec!["First", "Second", "Third"]);
        assert_eq!(flat_sites, order_sites);
    }

    #[test]
    fn non_object_elements_are_skipped() {
        let result = normalize_lookup_response(&json!([order(1, 0), 42, "x"]));
        assert_eq!(result.service_orders.len(), 1);
        assert_eq!(result.clients.len(), 1);
    }
}
