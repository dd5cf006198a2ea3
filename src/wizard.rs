use std::fmt::Display;
use std::time::Instant;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use inquire::validator::{Validation, ValueRequiredValidator};
use inquire::{Confirm, CustomUserError, DateSelect, Select, Text};
use tracing::debug;

use leak_intake::api::ServiceOrderApi;
use leak_intake::fetch::Transport;
use leak_intake::form::{self, IntakeForm, LeakingProperty};
use leak_intake::model::{LeakLocation, LeakNear, RoofPitch};
use leak_intake::prefill::PrefillGate;

// ==========================================
// Constants
// ==========================================
const SUBMIT_OPT: &str = "📨 Submit Request";
const EDIT_CONTACT_OPT: &str = "✏️  Edit Contact Info";
const EDIT_PROPERTIES_OPT: &str = "✏️  Edit Leaking Properties";
const EDIT_BILLING_OPT: &str = "✏️  Edit Billing Info";
const CANCEL_OPT: &str = "❌ Cancel";

pub struct CompletedIntake {
    pub form: IntakeForm,
    pub request_date: NaiveDate,
}

pub struct IntakeWizard<'a, T> {
    api: &'a ServiceOrderApi<T>,
    gate: PrefillGate,
}

impl<'a, T: Transport> IntakeWizard<'a, T> {
    pub fn new(api: &'a ServiceOrderApi<T>, gate: PrefillGate) -> Self {
        Self { api, gate }
    }

    /// Forget the last prefill pair so the next form looks it up again.
    pub fn reset_prefill(&mut self) {
        self.gate.reset();
    }

    /// Walks through every section, then loops on a review menu until the
    /// form is submitted (`Some`) or abandoned (`None`).
    pub fn run(&mut self) -> Result<Option<CompletedIntake>> {
        let mut form = IntakeForm::default();
        println!("\n🚨 --- Emergency Leak Service Request ---");

        self.contact_section(&mut form)?;
        form.leaking_properties = property_section(&form.leaking_properties)?;
        billing_section(&mut form)?;

        form.signature_name = Text::new("Signature (type your full name):")
            .with_default(or_fallback(&form.signature_name, &form.client_account_contact_name))
            .with_validator(ValueRequiredValidator::new("A signature is required."))
            .prompt()?;

        let request_date = DateSelect::new("Request Date:")
            .with_default(Local::now().date_naive())
            .prompt()?;

        loop {
            let errors = form::validate(&form);
            let mut options = Vec::new();
            if errors.is_empty() {
                println!("\n✅ All required fields are complete.");
                options.push(SUBMIT_OPT);
            } else {
                println!("\n⚠️  Please fix the following before submitting:");
                for (field, message) in &errors {
                    println!("   • {field}: {message}");
                }
            }
            options.extend([EDIT_CONTACT_OPT, EDIT_PROPERTIES_OPT, EDIT_BILLING_OPT, CANCEL_OPT]);

            match Select::new("What next?", options).prompt()? {
                SUBMIT_OPT => return Ok(Some(CompletedIntake { form, request_date })),
                EDIT_CONTACT_OPT => self.contact_section(&mut form)?,
                EDIT_PROPERTIES_OPT => {
                    form.leaking_properties = property_section(&form.leaking_properties)?;
                }
                EDIT_BILLING_OPT => billing_section(&mut form)?,
                _ => return Ok(None),
            }
        }
    }

    // ==========================================
    // 1. Contact & Prefill
    // ==========================================

    fn contact_section(&mut self, form: &mut IntakeForm) -> Result<()> {
        println!("\n--- Contact Information ---");

        form.client_account_name = Text::new("Company Name:")
            .with_default(&form.client_account_name)
            .with_validator(ValueRequiredValidator::new("Company Name is required."))
            .prompt()?;
        self.gate
            .observe(&form.client_account_name, &form.client_email, Instant::now());

        form.client_email = Text::new("Email:")
            .with_default(&form.client_email)
            .with_validator(email_validator)
            .prompt()?;
        self.gate
            .observe(&form.client_account_name, &form.client_email, Instant::now());
        self.try_prefill(form);

        form.client_account_contact_name = Text::new("Your Name:")
            .with_default(&form.client_account_contact_name)
            .with_validator(ValueRequiredValidator::new("Your Name is required."))
            .prompt()?;
        form.client_phone = Text::new("Phone:")
            .with_default(&form.client_phone)
            .with_validator(phone_validator)
            .prompt()?;
        Ok(())
    }

    /// Waits out the debounce delay, then merges whatever the backend knows
    /// about this company / email. Failures are ignored.
    fn try_prefill(&mut self, form: &mut IntakeForm) {
        let Some(due) = self.gate.deadline() else {
            return;
        };
        std::thread::sleep(due.saturating_duration_since(Instant::now()));
        let Some(key) = self.gate.poll(Instant::now()) else {
            return;
        };

        match self.api.prefill(&key.company_name, &key.email) {
            Ok(response) if response.found => {
                if let Some(data) = response.data {
                    form.apply_prefill(data);
                    println!("✨ Prefilled details from a previous request.");
                }
            }
            Ok(response) => debug!(message = ?response.message, "no prefill match"),
            Err(err) => debug!(error = %err, "prefill lookup failed"),
        }
    }
}

// ==========================================
// 2. Leaking Properties
// ==========================================

fn property_section(existing: &[LeakingProperty]) -> Result<Vec<LeakingProperty>> {
    let mut properties = Vec::new();
    let primary = existing.first().cloned().unwrap_or_default();
    properties.push(prompt_property(&primary, "Leaking Property")?);

    for (index, current) in existing.iter().enumerate().skip(1) {
        let keep = Confirm::new(&format!("Keep additional property #{index} ({})?", current.site_name))
            .with_default(true)
            .prompt()?;
        if keep {
            let title = format!("Additional Property #{index}");
            properties.push(prompt_property(current, &title)?);
        }
    }

    loop {
        let add = Confirm::new("Add another leaking property?")
            .with_default(false)
            .prompt()?;
        if !add {
            break;
        }
        let title = format!("Additional Property #{}", properties.len());
        properties.push(prompt_property(&LeakingProperty::default(), &title)?);
    }

    Ok(properties)
}

fn prompt_property(current: &LeakingProperty, title: &str) -> Result<LeakingProperty> {
    println!("\n--- {title} ---");
    let mut property = current.clone();

    property.site_name = Text::new("Site Name / ID:")
        .with_default(&current.site_name)
        .with_validator(ValueRequiredValidator::new("Site Name is required."))
        .prompt()?;
    property.site_address = Text::new("Site Address:")
        .with_default(&current.site_address)
        .with_validator(ValueRequiredValidator::new("Site Address is required."))
        .prompt()?;
    property.site_address2 = Text::new("Site Address 2 (Optional):")
        .with_default(&current.site_address2)
        .prompt()?;
    property.site_zip = Text::new("Site Zip Code:")
        .with_default(&current.site_zip)
        .with_validator(ValueRequiredValidator::new("Site Zip Code is required."))
        .prompt()?;
    let looked_up = city_for_zip(&property.site_zip);
    property.site_city = Text::new("Site City:")
        .with_default(looked_up.as_deref().unwrap_or(&current.site_city))
        .with_validator(ValueRequiredValidator::new("Site City is required."))
        .prompt()?;

    property.tenant_business_name = Text::new("Tenant Business Name (Optional):")
        .with_default(&current.tenant_business_name)
        .prompt()?;
    property.tenant_contact_name = Text::new("Tenant Contact Name (Optional):")
        .with_default(&current.tenant_contact_name)
        .prompt()?;
    property.tenant_contact_phone = Text::new("Tenant Contact Phone (Optional):")
        .with_default(&current.tenant_contact_phone)
        .prompt()?;
    property.tenant_contact_cell = Text::new("Tenant Contact Cell (Optional):")
        .with_default(&current.tenant_contact_cell)
        .prompt()?;
    property.tenant_contact_email = Text::new("Tenant Contact Email (Optional):")
        .with_default(&current.tenant_contact_email)
        .with_validator(optional_email_validator)
        .prompt()?;
    property.hours_of_operation = Text::new("Hours of Operation (Optional):")
        .with_default(&current.hours_of_operation)
        .prompt()?;

    property.leak_location = select_option("Leak Location:", &LeakLocation::ALL, current.leak_location)?;
    property.leak_near = select_option("Leak Near:", &LeakNear::ALL, current.leak_near)?;
    property.leak_near_other = if property.leak_near == LeakNear::Other {
        Text::new("Describe what the leak is near:")
            .with_default(&current.leak_near_other)
            .prompt()?
    } else {
        String::new()
    };
    property.roof_pitch = select_option("Roof Pitch:", &RoofPitch::ALL, current.roof_pitch)?;

    property.has_access_code = Confirm::new("Is an access code needed to reach the roof?")
        .with_default(current.has_access_code)
        .prompt()?;
    property.access_code = if property.has_access_code {
        Text::new("Access Code:").with_default(&current.access_code).prompt()?
    } else {
        String::new()
    };
    property.is_saturday_access_permitted = Confirm::new("Is Saturday access permitted?")
        .with_default(current.is_saturday_access_permitted)
        .prompt()?;
    property.is_key_required = Confirm::new("Is a key required?")
        .with_default(current.is_key_required)
        .prompt()?;
    property.is_ladder_required = Confirm::new("Is a ladder required?")
        .with_default(current.is_ladder_required)
        .prompt()?;

    property.comments = Text::new("Comments (Optional):")
        .with_default(&current.comments)
        .prompt()?;

    Ok(property)
}

// ==========================================
// 3. Billing
// ==========================================

fn billing_section(form: &mut IntakeForm) -> Result<()> {
    println!("\n--- Billing Information ---");

    form.billing_entity_bill_to_name = Text::new("Bill To (Entity Name):")
        .with_default(or_fallback(&form.billing_entity_bill_to_name, &form.client_account_name))
        .with_validator(ValueRequiredValidator::new("Billing Entity Name is required."))
        .prompt()?;

    let site = form.primary_property().cloned().unwrap_or_default();
    let reuse_site = form.billing_bill_to_address.trim().is_empty()
        && !site.site_address.trim().is_empty()
        && {
            println!("Found Site Address: {}", site.site_address);
            Confirm::new("Use the site address for billing?")
                .with_default(false)
                .prompt()?
        };

    if reuse_site {
        form.billing_bill_to_address = site.site_address;
        form.billing_bill_to_address2 = site.site_address2;
        form.billing_bill_to_city = site.site_city;
        form.billing_bill_to_zip = site.site_zip;
    } else {
        form.billing_bill_to_address = Text::new("Billing Address:")
            .with_default(&form.billing_bill_to_address)
            .with_validator(ValueRequiredValidator::new("Billing Address is required."))
            .prompt()?;
        form.billing_bill_to_address2 = Text::new("Billing Address 2 (Optional):")
            .with_default(&form.billing_bill_to_address2)
            .prompt()?;
        form.billing_bill_to_zip = Text::new("Billing Zip Code:")
            .with_default(&form.billing_bill_to_zip)
            .with_validator(ValueRequiredValidator::new("Billing Zip Code is required."))
            .prompt()?;
        let looked_up = city_for_zip(&form.billing_bill_to_zip);
        form.billing_bill_to_city = Text::new("Billing City:")
            .with_default(looked_up.as_deref().unwrap_or(&form.billing_bill_to_city))
            .with_validator(ValueRequiredValidator::new("Billing City is required."))
            .prompt()?;
    }

    form.billing_bill_to_email = Text::new("Billing Email:")
        .with_default(or_fallback(&form.billing_bill_to_email, &form.client_email))
        .with_validator(email_validator)
        .prompt()?;
    Ok(())
}

// ==========================================
// 4. Prompt Helpers
// ==========================================

fn select_option<E: Copy + PartialEq + Display>(message: &str, options: &[E], current: E) -> Result<E> {
    let cursor = options.iter().position(|option| *option == current).unwrap_or(0);
    Ok(Select::new(message, options.to_vec())
        .with_starting_cursor(cursor)
        .prompt()?)
}

fn or_fallback<'s>(value: &'s str, fallback: &'s str) -> &'s str {
    if value.trim().is_empty() { fallback } else { value }
}

fn city_for_zip(zip: &str) -> Option<String> {
    let zip = zip.trim();
    if zip.is_empty() {
        return None;
    }
    match zipcodes::matching(zip, None) {
        Ok(results) => results.first().map(|info| {
            println!("🚀 Found: {}, {}", info.city, info.state);
            info.city.to_string()
        }),
        Err(_) => None,
    }
}

fn email_validator(input: &str) -> Result<Validation, CustomUserError> {
    if form::is_email(input) {
        Ok(Validation::Valid)
    } else {
        Ok(Validation::Invalid("Enter a valid email address.".into()))
    }
}

fn optional_email_validator(input: &str) -> Result<Validation, CustomUserError> {
    if input.trim().is_empty() {
        return Ok(Validation::Valid);
    }
    email_validator(input)
}

fn phone_validator(input: &str) -> Result<Validation, CustomUserError> {
    if form::is_phone(input) {
        Ok(Validation::Valid)
    } else {
        Ok(Validation::Invalid("Enter a valid phone number.".into()))
    }
}
