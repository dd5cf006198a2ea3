mod wizard;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use clap::{CommandFactory, Parser, Subcommand};
use inquire::{Confirm, CustomType, InquireError, Select, Text};
use tracing::{error, info};

use leak_intake::api::ServiceOrderApi;
use leak_intake::fetch::{Fetcher, ReqwestTransport};
use leak_intake::form::{self, IntakeForm};
use leak_intake::logging::init_logging;
use leak_intake::prefill::PrefillGate;
use leak_intake::report::{render_lookup, render_status};
use leak_intake::settings::{self, AppSettings};

use crate::wizard::IntakeWizard;

// ==========================================
// Constants
// ==========================================
const SUBMIT_FAILED_NOTICE: &str = "Submission failed. Check the backend endpoint and try again.";
const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

// ==========================================
// Structs & Enums
// ==========================================

#[derive(Parser)]
#[command(name = "leak-intake", version, about = "Emergency leak service requests")]
struct Cli {
    /// Backend URL (overrides the configured one)
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill in and submit a new service request
    New,
    /// Submit a request saved as a TOML form
    Submit {
        file: PathBuf,
        /// Print the JSON payload instead of sending it
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the status of a submitted request
    Status { reference_id: String },
    /// Look up prior service orders
    Lookup {
        #[command(subcommand)]
        by: LookupBy,
    },
    /// Fetch saved details for a company / email pair
    Prefill {
        company_name: String,
        #[arg(default_value = "")]
        email: String,
    },
    /// Configure backend URL and logging
    Config,
}

#[derive(Subcommand)]
enum LookupBy {
    /// By service order number
    Order { number: String },
    /// By contact email
    Email { email: String },
}

// ==========================================
// Main Function
// ==========================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    // 1. Settings first, they carry the log level
    let settings_path = settings::config_path();
    let settings = match AppSettings::load_or_init(&settings_path) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("⚠️  {err}. Using default settings.");
            AppSettings::default()
        }
    };
    init_logging(&settings.log_level);

    let Some(command) = cli.command else {
        let _ = Cli::command().print_help();
        return ExitCode::SUCCESS;
    };

    match run(command, cli.base_url, settings, &settings_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if is_cancelled(&err) => {
            println!("Cancelled");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("❌ {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, base_url: Option<String>, settings: AppSettings, settings_path: &Path) -> Result<()> {
    let base_url = base_url.unwrap_or_else(|| settings.base_url.clone());
    match command {
        Commands::New => new_request(&connect(base_url)?, &settings),
        Commands::Submit { file, dry_run } => submit_file(&connect(base_url)?, &file, dry_run),
        Commands::Status { reference_id } => show_status(&connect(base_url)?, &reference_id),
        Commands::Lookup { by } => lookup(&connect(base_url)?, by),
        Commands::Prefill { company_name, email } => show_prefill(&connect(base_url)?, &company_name, &email),
        Commands::Config => configure(&settings, settings_path),
    }
}

fn connect(base_url: String) -> Result<ServiceOrderApi<ReqwestTransport>> {
    let transport = ReqwestTransport::new().context("Failed to create HTTP client")?;
    info!(%base_url, "using backend");
    Ok(ServiceOrderApi::new(Fetcher::new(transport, base_url)))
}

fn is_cancelled(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<InquireError>(),
        Some(InquireError::OperationCanceled | InquireError::OperationInterrupted)
    )
}

// ==========================================
// Submit
// ==========================================

fn new_request(api: &ServiceOrderApi<ReqwestTransport>, settings: &AppSettings) -> Result<()> {
    let mut wizard = IntakeWizard::new(api, PrefillGate::new(settings.prefill_delay()));
    loop {
        let Some(intake) = wizard.run()? else {
            println!("Cancelled");
            return Ok(());
        };
        submit(api, &intake.form, intake.request_date)?;
        wizard.reset_prefill();

        let another = Confirm::new("Submit another request?")
            .with_default(false)
            .prompt()?;
        if !another {
            return Ok(());
        }
    }
}

fn submit_file(api: &ServiceOrderApi<ReqwestTransport>, file: &Path, dry_run: bool) -> Result<()> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let form: IntakeForm = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    let errors = form::validate(&form);
    if !errors.is_empty() {
        eprintln!("⚠️  The form has problems:");
        for (field, message) in &errors {
            eprintln!("   • {field}: {message}");
        }
        bail!("{} field(s) need attention in {}", errors.len(), file.display());
    }

    let today = Local::now().date_naive();
    if dry_run {
        let payload = serde_json::to_string_pretty(&form.to_request(today))
            .context("Failed to encode request")?;
        println!("{payload}");
        return Ok(());
    }
    submit(api, &form, today)
}

fn submit(api: &ServiceOrderApi<ReqwestTransport>, form: &IntakeForm, request_date: NaiveDate) -> Result<()> {
    match api.submit(&form.to_request(request_date)) {
        Ok(outcome) => {
            println!("✅ {}", outcome.message);
            println!("📄 Reference ID: {}", outcome.request_id);
            println!("   Check progress with: leak-intake status {}", outcome.request_id);
            Ok(())
        }
        Err(err) => {
            error!(error = %err, status = ?err.status(), "submission failed");
            bail!(SUBMIT_FAILED_NOTICE)
        }
    }
}

// ==========================================
// Status, Lookup & Prefill
// ==========================================

fn show_status(api: &ServiceOrderApi<ReqwestTransport>, reference_id: &str) -> Result<()> {
    match api.status(reference_id) {
        Ok(Some(response)) => println!("{}", render_status(reference_id, &response)),
        Ok(None) => println!("No status information was returned for {reference_id}."),
        Err(err) => bail!(
            "{}\nRun `leak-intake status {reference_id}` again to retry.",
            err.message()
        ),
    }
    Ok(())
}

fn lookup(api: &ServiceOrderApi<ReqwestTransport>, by: LookupBy) -> Result<()> {
    let result = match by {
        LookupBy::Order { number } => api.lookup_by_service_order(&number),
        LookupBy::Email { email } => api.lookup_by_email(&email),
    };
    match result {
        Ok(result) => {
            println!("{}", render_lookup(&result));
            Ok(())
        }
        Err(err) => bail!(err.message()),
    }
}

fn show_prefill(api: &ServiceOrderApi<ReqwestTransport>, company_name: &str, email: &str) -> Result<()> {
    let response = api.prefill(company_name, email).map_err(|err| anyhow::anyhow!(err.message()))?;
    match response.data.filter(|_| response.found) {
        Some(data) => {
            let rendered = toml::to_string_pretty(&data).context("Failed to render prefill data")?;
            println!("{rendered}");
        }
        None => {
            let message = response.message.as_deref().unwrap_or("No saved details found.");
            println!("{message}");
        }
    }
    Ok(())
}

// ==========================================
// Configuration
// ==========================================

fn configure(current: &AppSettings, path: &Path) -> Result<()> {
    println!("\n⚙️  --- Configuration Setup ---");

    let base_url = Text::new("Backend URL:")
        .with_default(&current.base_url)
        .prompt()?;
    let prefill_debounce_ms = CustomType::<u64>::new("Prefill delay (ms):")
        .with_default(current.prefill_debounce_ms)
        .with_error_message("Enter a whole number of milliseconds.")
        .prompt()?;
    let cursor = LOG_LEVELS
        .iter()
        .position(|level| level.eq_ignore_ascii_case(&current.log_level))
        .unwrap_or(1);
    let log_level = Select::new("Log level:", LOG_LEVELS.to_vec())
        .with_starting_cursor(cursor)
        .prompt()?
        .to_string();

    let updated = AppSettings {
        base_url: base_url.trim().trim_end_matches('/').to_string(),
        prefill_debounce_ms,
        log_level,
    };
    updated
        .save_to(path)
        .with_context(|| format!("Failed to save settings to {}", path.display()))?;
    println!("✅ Settings saved to {}", path.display());
    Ok(())
}
