//! Terminal rendering of lookup results and the status panel.

use chrono::DateTime;
use comfy_table::{Attribute, Cell, Color, Table};

use crate::model::{LeakDetails, LookupResult, ServiceOrderStatus, StatusResponse};

const NO_RESULTS: &str = "No matching service orders found.";

fn status_color(status: ServiceOrderStatus) -> Color {
    match status {
        ServiceOrderStatus::New => Color::Rgb { r: 30, g: 64, b: 175 },
        ServiceOrderStatus::InProgress => Color::Rgb { r: 146, g: 64, b: 14 },
        ServiceOrderStatus::Completed => Color::Rgb { r: 4, g: 120, b: 87 },
        ServiceOrderStatus::Cancelled => Color::Rgb { r: 185, g: 28, b: 28 },
    }
}

/// `Feb 16, 2026 00:00` for RFC 3339 input, anything else unchanged.
pub fn format_timestamp(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|timestamp| timestamp.format("%b %-d, %Y %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

fn yes_no(flag: bool) -> String {
    let label = if flag { "Yes" } else { "No" };
    label.to_string()
}

/// Two-column label/value table; rows with blank values are left out.
fn detail_table(rows: Vec<(&str, String)>) -> Table {
    let mut table = Table::new();
    for (label, value) in rows {
        if value.trim().is_empty() {
            continue;
        }
        table.add_row(vec![Cell::new(label).add_attribute(Attribute::Bold), Cell::new(value)]);
    }
    table
}

fn leak_rows(leak: &LeakDetails) -> Vec<(&'static str, String)> {
    let access_code = match (leak.has_access_code, leak.access_code.trim().is_empty()) {
        (false, _) => "None".to_string(),
        (true, true) => "Yes".to_string(),
        (true, false) => leak.access_code.clone(),
    };
    vec![
        ("Site Name", leak.site_name.clone()),
        ("Address", leak.address_line()),
        ("Tenant", leak.tenant_business_name.clone()),
        ("Tenant Contact", leak.tenant_contact_name.clone()),
        ("Phone", leak.tenant_contact_phone.clone()),
        ("Cell", leak.tenant_contact_cell.clone()),
        ("Email", leak.tenant_contact_email.clone()),
        ("Hours", leak.hours_of_operation.clone()),
        ("Leak Location", leak.leak_location.map(|l| l.to_string()).unwrap_or_default()),
        ("Leak Near", leak.leak_near_label()),
        ("Roof Pitch", leak.roof_pitch.map(|p| p.to_string()).unwrap_or_default()),
        ("Access Code", access_code),
        ("Saturday Access", yes_no(leak.is_saturday_access_permitted)),
        ("Key Required", yes_no(leak.is_key_required)),
        ("Ladder Required", yes_no(leak.is_ladder_required)),
        ("Comments", leak.comments.clone()),
    ]
}

pub fn render_lookup(result: &LookupResult) -> String {
    let mut sections = Vec::new();
    if let Some(message) = &result.message {
        sections.push(message.clone());
    }
    if result.is_empty() {
        sections.push(NO_RESULTS.to_string());
        return sections.join("\n");
    }

    if !result.service_orders.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Order", "Request Date", "Account", "Primary Site", "Leaks"]);
        for order in &result.service_orders {
            table.add_row(vec![
                Cell::new(order.id.as_ref().map(|id| id.to_string()).unwrap_or_default()),
                Cell::new(order.request_date.as_deref().map(format_timestamp).unwrap_or_default()),
                Cell::new(order.client.as_ref().map(|c| c.account_name.as_str()).unwrap_or_default()),
                Cell::new(order.leak_details.as_ref().map(|l| l.site_name.as_str()).unwrap_or_default()),
                Cell::new(order.leaks().count()),
            ]);
        }
        sections.push(format!("--- Service Orders ({}) ---\n{table}", result.service_orders.len()));
    }

    if !result.clients.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Account", "Contact", "Email", "Phone"]);
        for client in &result.clients {
            table.add_row(vec![
                &client.account_name,
                &client.account_contact_name,
                &client.email,
                &client.phone,
            ]);
        }
        sections.push(format!("--- Clients ---\n{table}"));
    }

    if !result.billings.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Bill To", "Address", "City", "Zip", "Email"]);
        for billing in &result.billings {
            let address = [billing.bill_to_address.as_str(), billing.bill_to_address2.as_str()]
                .into_iter()
                .filter(|line| !line.trim().is_empty())
                .collect::<Vec<_>>()
                .join(", ");
            table.add_row(vec![
                billing.entity_bill_to_name.clone(),
                address,
                billing.bill_to_city.clone(),
                billing.bill_to_zip.clone(),
                billing.bill_to_email.clone(),
            ]);
        }
        sections.push(format!("--- Billing ---\n{table}"));
    }

    if !result.leaks.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Site", "Address", "Location", "Near", "Roof Pitch"]);
        for leak in &result.leaks {
            table.add_row(vec![
                leak.site_name.clone(),
                leak.address_line(),
                leak.leak_location.map(|l| l.to_string()).unwrap_or_default(),
                leak.leak_near_label(),
                leak.roof_pitch.map(|p| p.to_string()).unwrap_or_default(),
            ]);
        }
        sections.push(format!("--- Leaks ---\n{table}"));
    }

    sections.join("\n\n")
}

pub fn render_status(reference_id: &str, response: &StatusResponse) -> String {
    let mut sections = Vec::new();

    let status_cell = match response.status_kind() {
        Some(kind) => Cell::new(kind.label())
            .fg(status_color(kind))
            .add_attribute(Attribute::Bold),
        None => Cell::new(&response.status),
    };
    let mut summary = Table::new();
    summary.add_row(vec![Cell::new("Reference").add_attribute(Attribute::Bold), Cell::new(reference_id)]);
    summary.add_row(vec![Cell::new("Status").add_attribute(Attribute::Bold), status_cell]);
    if !response.message.trim().is_empty() {
        summary.add_row(vec![
            Cell::new("Message").add_attribute(Attribute::Bold),
            Cell::new(&response.message),
        ]);
    }
    sections.push(format!("--- Service Order Status ---\n{summary}"));

    let Some(order) = &response.data else {
        if !response.success {
            sections.push("No service order details are available for this reference.".to_string());
        }
        return sections.join("\n\n");
    };

    let client = order.client.clone().unwrap_or_default();
    let billing = order.billing.clone().unwrap_or_default();
    let overview = detail_table(vec![
        ("Request Date", order.request_date.as_deref().map(format_timestamp).unwrap_or_default()),
        ("Submitted", order.created_at.as_deref().map(format_timestamp).unwrap_or_default()),
        ("Last Updated", order.updated_at.as_deref().map(format_timestamp).unwrap_or_default()),
        ("Account", client.account_name),
        ("Contact", client.account_contact_name),
        ("Email", client.email),
        ("Phone", client.phone),
        ("Bill To", billing.entity_bill_to_name),
        ("Billing Address", billing.bill_to_address),
        ("Billing City", format!("{} {}", billing.bill_to_city, billing.bill_to_zip)),
        ("Billing Email", billing.bill_to_email),
    ]);
    sections.push(format!("--- Request Details ---\n{overview}"));

    for (index, leak) in order.leaks().enumerate() {
        let title = if index == 0 {
            "--- Primary Leak ---".to_string()
        } else {
            format!("--- Additional Leak #{index} ---")
        };
        sections.push(format!("{title}\n{}", detail_table(leak_rows(leak))));
    }

    sections.join("\n\n")
}
