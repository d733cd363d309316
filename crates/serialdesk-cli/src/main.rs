use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt};

use serialdesk_client::{ClientError, FormRunner, HttpSerialBackend, SerialBackend};
use serialdesk_core::page::{with_query, ENTRY_PATH, SERIAL_PARAM};
use serialdesk_core::{
    AppConfig, DetailsResponse, ExitCode, FormAssistant, LookupOutcome, MemoryPage, Page,
};
use serialdesk_tui::App;

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "serialdesk",
    about = "Serial-number lookup desk for warranty and service requests",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output in JSON format (for scripts).
    /// Also enabled by setting SERIALDESK_JSON=1.
    #[arg(long, global = true)]
    json: bool,

    /// Backend base URL. Wins over the config file and SERIALDESK_BASE_URL.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Open the TUI with this serial number already looked up.
    #[arg(long)]
    serial_no: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List serial numbers matching a partial query.
    Suggest { query: String },

    /// Fetch and classify the record for one serial number.
    Details { serial: String },

    /// Run the full lookup flow on a page and report what it did.
    Lookup {
        serial: String,
        /// Page path the lookup starts from.
        #[arg(long, default_value = ENTRY_PATH)]
        page: String,
    },

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show all config values.
    List,
    /// Get a specific config key.
    Get { key: String },
    /// Print the config file path.
    Path,
}

/// Detail keys in display order.
const DETAIL_KEYS: &[&str] = &[
    "customer",
    "customer_address",
    "item_name",
    "zonal_manager",
    "amc_type",
    "maintenance_status",
    "warranty_expiry_date",
];

// ─── Main ────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();

    // ── Env var overrides ──────────────────────────────────────────────────
    let json_output = cli.json || std::env::var("SERIALDESK_JSON").as_deref() == Ok("1");

    let mut config = AppConfig::load()?;
    if let Some(base_url) = cli.base_url {
        config.backend.base_url = base_url;
    }

    init_logging(&config, cli.command.is_none())?;
    debug!(base_url = %config.backend.base_url, "config loaded");

    let rt = tokio::runtime::Runtime::new()?;

    match cli.command {
        None => {
            let backend = open_backend(&config, json_output, start);
            let url = match cli.serial_no.as_deref().map(str::trim) {
                Some(serial) if !serial.is_empty() => with_query(ENTRY_PATH, SERIAL_PARAM, serial),
                _ => ENTRY_PATH.to_string(),
            };

            let _guard = rt.enter();
            let mut app = App::new(config, backend, &url)?;
            info!(url = %url, "starting TUI");
            serialdesk_tui::run_tui(&mut app)?;
        }

        Some(Commands::Suggest { query }) => {
            let query = query.trim();
            let min = config.form.min_query_chars;
            let rows = if query.chars().count() < min {
                if !json_output {
                    eprintln!("Query must be at least {min} characters.");
                }
                Vec::new()
            } else {
                let backend = open_backend(&config, json_output, start);
                rt.block_on(backend.search_serials(query))
                    .unwrap_or_else(|e| fail_client(&e, json_output, start))
            };
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&json!({
                    "status": "ok",
                    "data": { "items": rows, "total": rows.len(), "query": query },
                    "meta": { "duration_ms": dur }
                }))?;
            } else if rows.is_empty() {
                println!("No serial numbers match: {query}");
            } else {
                for row in &rows {
                    println!("{row}");
                }
            }
        }

        Some(Commands::Details { serial }) => {
            let serial = require_serial(&serial, json_output, start);
            let backend = open_backend(&config, json_output, start);
            let resp = rt
                .block_on(backend.serial_details(serial))
                .unwrap_or_else(|e| fail_client(&e, json_output, start));
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&json!({"status":"ok","data":resp,"meta":{"duration_ms":dur}}))?;
            } else {
                match &resp {
                    DetailsResponse::Found(details) => {
                        println!("{serial}");
                        for key in DETAIL_KEYS {
                            println!("  {key:<22} {}", details.field(key).unwrap_or("─"));
                        }
                    }
                    DetailsResponse::NotFound { message } => println!("{serial}: {message}"),
                }
            }

            if matches!(resp, DetailsResponse::NotFound { .. }) {
                std::process::exit(ExitCode::NotFound.code());
            }
        }

        Some(Commands::Lookup { serial, page }) => {
            let serial = require_serial(&serial, json_output, start);
            if !page.starts_with('/') {
                fail(
                    ExitCode::InvalidArgs,
                    &format!("page must be a path starting with '/', got {page:?}"),
                    json_output,
                    start,
                );
            }
            let backend = open_backend(&config, json_output, start);
            let url = with_query(&page, SERIAL_PARAM, serial);

            let (mut assistant, effects) =
                FormAssistant::attach(MemoryPage::full(&url), config.form.clone())?;
            rt.block_on(async {
                let mut runner = FormRunner::new(backend);
                runner.dispatch(effects);
                runner.run_until_idle(&mut assistant).await;
            });
            let dur = start.elapsed().as_millis();

            let page_view = assistant.page();
            let outcome = assistant.outcome();

            if json_output {
                print_json(&json!({
                    "status": "ok",
                    "data": {
                        "outcome": outcome,
                        "page": {
                            "url": url,
                            "input": page_view.input_value(),
                            "fields": page_view.fields(),
                            "dialog": page_view.dialog_message(),
                            "alerts": page_view.alerts(),
                            "navigations": page_view.navigations(),
                        }
                    },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                match outcome {
                    Some(LookupOutcome::Redirected { url, .. }) => {
                        println!("{serial}: redirect to {url}");
                    }
                    Some(LookupOutcome::Prefilled { .. }) => {
                        println!("{serial}: pre-filled {page}");
                        for (id, value) in page_view.fields() {
                            println!("  {id:<18} {value}");
                        }
                    }
                    Some(LookupOutcome::NotFound { message, .. }) => println!("{message}"),
                    Some(LookupOutcome::Failed { .. }) | None => {}
                }
            }

            match outcome {
                Some(LookupOutcome::NotFound { .. }) => {
                    std::process::exit(ExitCode::NotFound.code());
                }
                Some(LookupOutcome::Failed { reason, .. }) => {
                    if !json_output {
                        eprintln!("error: {reason}");
                    }
                    std::process::exit(ExitCode::NetworkError.code());
                }
                _ => {}
            }
        }

        Some(Commands::Config { action }) => {
            let dur = start.elapsed().as_millis();
            match action {
                ConfigAction::List => {
                    let kv = config.key_values();
                    if json_output {
                        print_json(&json!({"status":"ok","data":kv,"meta":{"duration_ms":dur}}))?;
                    } else {
                        for (k, v) in &kv {
                            println!("{k} = {v}");
                        }
                    }
                }
                ConfigAction::Get { key } => match config.get(&key) {
                    Ok(val) => {
                        if json_output {
                            print_json(&json!({"status":"ok","data":{"key":key,"value":val},"meta":{"duration_ms":dur}}))?;
                        } else {
                            println!("{val}");
                        }
                    }
                    Err(e) => fail(ExitCode::NotFound, &e.to_string(), json_output, start),
                },
                ConfigAction::Path => {
                    let path = AppConfig::config_path();
                    if json_output {
                        print_json(&json!({"status":"ok","data":{"path":path,"exists":path.exists()},"meta":{"duration_ms":dur}}))?;
                    } else {
                        println!("{}", path.display());
                    }
                }
            }
        }
    }

    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Headless commands log to stderr. The TUI owns the terminal, so it logs
/// to a file instead.
fn init_logging(config: &AppConfig, to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_env("SERIALDESK_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .or_else(|_| EnvFilter::try_new(&config.log.level))?;

    if to_file {
        let path = config.log_file_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }
    Ok(())
}

fn open_backend(config: &AppConfig, json_output: bool, start: Instant) -> Arc<dyn SerialBackend> {
    match HttpSerialBackend::new(&config.backend) {
        Ok(backend) => Arc::new(backend),
        Err(e @ ClientError::InvalidBaseUrl(_)) => {
            fail(ExitCode::InvalidArgs, &e.to_string(), json_output, start)
        }
        Err(e) => fail(ExitCode::GeneralError, &e.to_string(), json_output, start),
    }
}

fn require_serial(serial: &str, json_output: bool, start: Instant) -> &str {
    let serial = serial.trim();
    if serial.is_empty() {
        fail(ExitCode::InvalidArgs, "serial number is empty", json_output, start);
    }
    serial
}

fn fail_client(e: &ClientError, json_output: bool, start: Instant) -> ! {
    let code = if e.is_network() {
        ExitCode::NetworkError
    } else {
        ExitCode::GeneralError
    };
    fail(code, &e.to_string(), json_output, start)
}

fn fail(code: ExitCode, message: &str, json_output: bool, start: Instant) -> ! {
    if json_output {
        let _ = print_json(&json!({
            "status": "error",
            "error": { "code": code.code(), "message": message },
            "meta": { "duration_ms": start.elapsed().as_millis() }
        }));
    } else {
        eprintln!("error: {message}");
    }
    std::process::exit(code.code());
}

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}
