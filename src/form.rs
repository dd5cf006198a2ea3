//! Local intake form state: validation, prefill merging and the mapping onto
//! the submission payload.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::{LeakLocation, LeakNear, RoofPitch};
use crate::payload::{
    BillingInfoRequest, ClientInfoRequest, LeakDetailsRequest, ServiceOrderIntakeRequest,
};

/// Copies every `Some` field of `$source` onto `$target`.
macro_rules! merge {
    ($target:expr, $source:expr; $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $source.$field {
                $target.$field = value;
            }
        )+
    };
}

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9+()\-\s]{10,}$").unwrap());

pub fn is_email(value: &str) -> bool {
    EMAIL_RE.is_match(value.trim())
}

pub fn is_phone(value: &str) -> bool {
    PHONE_RE.is_match(value.trim())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeakingProperty {
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

impl LeakingProperty {
    fn to_request(&self) -> LeakDetailsRequest {
        LeakDetailsRequest {
            dynamo_id: None,
            job_no: String::new(),
            job_date: None,
            site_name: self.site_name.clone(),
            site_address: self.site_address.clone(),
            site_address2: self.site_address2.clone(),
            site_city: self.site_city.clone(),
            site_zip: self.site_zip.clone(),
            tenant_business_name: self.tenant_business_name.clone(),
            tenant_contact_name: self.tenant_contact_name.clone(),
            tenant_contact_phone: self.tenant_contact_phone.clone(),
            tenant_contact_cell: self.tenant_contact_cell.clone(),
            tenant_contact_email: self.tenant_contact_email.clone(),
            hours_of_operation: self.hours_of_operation.clone(),
            leak_location: self.leak_location,
            leak_near: self.leak_near,
            leak_near_other: self.leak_near_other.clone(),
            has_access_code: self.has_access_code,
            access_code: self.access_code.clone(),
            is_saturday_access_permitted: self.is_saturday_access_permitted,
            is_key_required: self.is_key_required,
            is_ladder_required: self.is_ladder_required,
            roof_pitch: self.roof_pitch,
            comments: self.comments.clone(),
        }
    }
}

/// Everything the customer fills in. Also the on-disk TOML format for
/// `leak-intake submit <file>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeForm {
    pub leaking_properties: Vec<LeakingProperty>,
    pub client_account_name: String,
    pub client_account_contact_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub billing_entity_bill_to_name: String,
    pub billing_bill_to_address: String,
    pub billing_bill_to_address2: String,
    pub billing_bill_to_city: String,
    pub billing_bill_to_zip: String,
    pub billing_bill_to_email: String,
    pub signature_name: String,
    pub signature_data: String,
}

impl Default for IntakeForm {
    fn default() -> Self {
        Self {
            leaking_properties: vec![LeakingProperty::default()],
            client_account_name: String::new(),
            client_account_contact_name: String::new(),
            client_email: String::new(),
            client_phone: String::new(),
            billing_entity_bill_to_name: String::new(),
            billing_bill_to_address: String::new(),
            billing_bill_to_address2: String::new(),
            billing_bill_to_city: String::new(),
            billing_bill_to_zip: String::new(),
            billing_bill_to_email: String::new(),
            signature_name: String::new(),
            signature_data: String::new(),
        }
    }
}

impl IntakeForm {
    /// First property; the one validation looks at.
    pub fn primary_property(&self) -> Option<&LeakingProperty> {
        self.leaking_properties.first()
    }

    pub fn primary_property_mut(&mut self) -> &mut LeakingProperty {
        if self.leaking_properties.is_empty() {
            self.leaking_properties.push(LeakingProperty::default());
        }
        &mut self.leaking_properties[0]
    }

    /// Submission payload. The first property becomes `leakDetails`, the rest
    /// `additionalLeaks`; `request_date` is sent as midnight UTC.
    pub fn to_request(&self, request_date: NaiveDate) -> ServiceOrderIntakeRequest {
        let mut leaks = self.leaking_properties.iter().map(LeakingProperty::to_request);
        let leak_details = leaks.next().unwrap_or_default();

        ServiceOrderIntakeRequest {
            request_date: request_date.format("%Y-%m-%dT00:00:00Z").to_string(),
            client: ClientInfoRequest {
                dynamo_account_id: None,
                dynamo_contact_id: None,
                account_name: self.client_account_name.clone(),
                account_contact_name: self.client_account_contact_name.clone(),
                email: self.client_email.clone(),
                phone: self.client_phone.clone(),
            },
            billing: BillingInfoRequest {
                dynamo_id: None,
                entity_bill_to_name: self.billing_entity_bill_to_name.clone(),
                bill_to_address: self.billing_bill_to_address.clone(),
                bill_to_address2: self.billing_bill_to_address2.clone(),
                bill_to_city: self.billing_bill_to_city.clone(),
                bill_to_zip: self.billing_bill_to_zip.clone(),
                bill_to_email: self.billing_bill_to_email.clone(),
            },
            leak_details,
            additional_leaks: leaks.collect(),
            signature_data: self.signature_data.clone(),
            signature_name: self.signature_name.clone(),
        }
    }

    /// Overwrites every field the prefill data carries. A prefilled property
    /// is merged field-by-field into the first property.
    pub fn apply_prefill(&mut self, data: PrefillData) {
        merge!(self, data;
            client_account_name,
            client_account_contact_name,
            client_email,
            client_phone,
            billing_entity_bill_to_name,
            billing_bill_to_address,
            billing_bill_to_address2,
            billing_bill_to_city,
            billing_bill_to_zip,
            billing_bill_to_email
        );

        if let Some(property) = data.leaking_properties.and_then(|p| p.into_iter().next()) {
            let target = self.primary_property_mut();
            merge!(target, property;
                site_name,
                site_address,
                site_address2,
                site_city,
                site_zip,
                tenant_business_name,
                tenant_contact_name,
                tenant_contact_phone,
                tenant_contact_cell,
                tenant_contact_email,
                hours_of_operation,
                leak_location,
                leak_near,
                leak_near_other,
                has_access_code,
                access_code,
                is_saturday_access_permitted,
                is_key_required,
                is_ladder_required,
                roof_pitch,
                comments
            );
        }
    }
}

/// Partial form returned by the prefill endpoint (camelCase keys).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrefillData {
    pub leaking_properties: Option<Vec<PrefillProperty>>,
    pub client_account_name: Option<String>,
    pub client_account_contact_name: Option<String>,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub billing_entity_bill_to_name: Option<String>,
    pub billing_bill_to_address: Option<String>,
    pub billing_bill_to_address2: Option<String>,
    pub billing_bill_to_city: Option<String>,
    pub billing_bill_to_zip: Option<String>,
    pub billing_bill_to_email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrefillProperty {
    pub site_name: Option<String>,
    pub site_address: Option<String>,
    pub site_address2: Option<String>,
    pub site_city: Option<String>,
    pub site_zip: Option<String>,
    pub tenant_business_name: Option<String>,
    pub tenant_contact_name: Option<String>,
    pub tenant_contact_phone: Option<String>,
    pub tenant_contact_cell: Option<String>,
    pub tenant_contact_email: Option<String>,
    pub hours_of_operation: Option<String>,
    pub leak_location: Option<LeakLocation>,
    pub leak_near: Option<LeakNear>,
    pub leak_near_other: Option<String>,
    pub has_access_code: Option<bool>,
    pub access_code: Option<String>,
    pub is_saturday_access_permitted: Option<bool>,
    pub is_key_required: Option<bool>,
    pub is_ladder_required: Option<bool>,
    pub roof_pitch: Option<RoofPitch>,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    SiteName,
    SiteAddress,
    SiteCity,
    SiteZip,
    ClientAccountName,
    ClientAccountContactName,
    ClientPhone,
    ClientEmail,
    BillingEntityBillToName,
    BillingBillToAddress,
    BillingBillToCity,
    BillingBillToZip,
    BillingBillToEmail,
}

impl FormField {
    /// Field name as used by the wire form (`clientAccountName`, ...).
    pub fn key(self) -> &'static str {
        match self {
            FormField::SiteName => "siteName",
            FormField::SiteAddress => "siteAddress",
            FormField::SiteCity => "siteCity",
            FormField::SiteZip => "siteZip",
            FormField::ClientAccountName => "clientAccountName",
            FormField::ClientAccountContactName => "clientAccountContactName",
            FormField::ClientPhone => "clientPhone",
            FormField::ClientEmail => "clientEmail",
            FormField::BillingEntityBillToName => "billingEntityBillToName",
            FormField::BillingBillToAddress => "billingBillToAddress",
            FormField::BillingBillToCity => "billingBillToCity",
            FormField::BillingBillToZip => "billingBillToZip",
            FormField::BillingBillToEmail => "billingBillToEmail",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

pub type ValidationErrors = BTreeMap<FormField, &'static str>;

pub fn validate(form: &IntakeForm) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    let mut require = |field: FormField, value: &str, message: &'static str| {
        if value.trim().is_empty() {
            errors.insert(field, message);
        }
    };

    let empty = LeakingProperty::default();
    let property = form.primary_property().unwrap_or(&empty);

    require(FormField::SiteName, &property.site_name, "Site Name is required.");
    require(FormField::SiteAddress, &property.site_address, "Site Address is required.");
    require(FormField::SiteCity, &property.site_city, "Site City is required.");
    require(FormField::SiteZip, &property.site_zip, "Site Zip Code is required.");
    require(FormField::ClientAccountName, &form.client_account_name, "Company Name is required.");
    require(
        FormField::ClientAccountContactName,
        &form.client_account_contact_name,
        "Your Name is required.",
    );
    require(
        FormField::BillingEntityBillToName,
        &form.billing_entity_bill_to_name,
        "Billing Entity Name is required.",
    );
    require(
        FormField::BillingBillToAddress,
        &form.billing_bill_to_address,
        "Billing Address is required.",
    );
    require(FormField::BillingBillToCity, &form.billing_bill_to_city, "Billing City is required.");
    require(FormField::BillingBillToZip, &form.billing_bill_to_zip, "Billing Zip Code is required.");

    if !is_phone(&form.client_phone) {
        errors.insert(FormField::ClientPhone, "Enter a valid phone number.");
    }
    if !is_email(&form.client_email) {
        errors.insert(FormField::ClientEmail, "Enter a valid email address.");
    }
    if !is_email(&form.billing_bill_to_email) {
        errors.insert(FormField::BillingBillToEmail, "Enter a valid billing email address.");
    }

    errors
}
