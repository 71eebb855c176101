//! Loadboard CLI
//!
//! Command-line client for the Loadboard API:
//! - Browse and inspect loads
//! - Post loads through the form wizard
//! - Update progress and claim loads
//! - Generate a default config file

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use loadboard::forms::{LoadForm, Wizard, WizardStep};
use reqwest::{Method, RequestBuilder};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "loadboard-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Command-line client for the Loadboard freight marketplace")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, env = "LOADBOARD_API_URL", default_value = "http://localhost:8082", global = true)]
    pub api_url: String,

    /// Backend auth token sent as a bearer token
    #[arg(long, env = "LOADBOARD_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Work with loads
    Loads {
        #[command(subcommand)]
        command: LoadCommands,
    },

    /// Dashboard counts
    Stats,

    /// Show the signed-in user
    Whoami,

    /// Show server health
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum LoadCommands {
    /// List a view of loads
    List {
        /// available, mine, shipper, tracking or clearing
        #[arg(short, long)]
        view: Option<String>,
        /// Search text
        #[arg(short, long)]
        search: Option<String>,
        /// Status filter
        #[arg(long)]
        status: Option<String>,
        /// Equipment filter
        #[arg(short, long)]
        equipment: Option<String>,
        /// Customs clearance filter (pending, in-progress, completed, delayed)
        #[arg(long)]
        clearance: Option<String>,
    },

    /// Show one load
    Show {
        id: String,
    },

    /// Post a new load after checking every wizard step locally
    Post {
        /// Form values in key=value format (e.g. origin=Lagos)
        #[arg(short = 'F', long = "field")]
        fields: Vec<String>,
        /// JSON file with form values
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Update status, location or driver
    Update {
        id: String,
        #[arg(long)]
        status: Option<String>,
        /// Current location; empty clears it
        #[arg(long)]
        location: Option<String>,
        /// Driver name; empty clears it
        #[arg(long)]
        driver: Option<String>,
        /// Customs clearance status
        #[arg(long)]
        clearance: Option<String>,
    },

    /// Claim a posted load as the signed-in carrier or truck owner
    Claim {
        id: String,
    },

    /// Summarize your posted loads by status
    Manage,
}

struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and decode; failures print the response body and exit 1
    async fn send(&self, builder: RequestBuilder, what: &str) -> Result<Value> {
        let response = builder
            .send()
            .await
            .with_context(|| format!("Cannot reach Loadboard API at {}", self.base_url))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            eprintln!("{} failed ({}): {}", what, status, text);
            std::process::exit(1);
        }

        response
            .json()
            .await
            .with_context(|| format!("Invalid response to {}", what))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let api = ApiClient {
        http: reqwest::Client::new(),
        base_url: cli.api_url.clone(),
        token: cli.token.clone().filter(|t| !t.is_empty()),
    };
    let as_json = cli.format == "json";

    match cli.command {
        Commands::Loads { command } => run_loads(&api, command, as_json).await?,

        Commands::Stats => {
            let stats = api
                .send(api.request(Method::GET, "/api/v1/loads/stats"), "Stats")
                .await?;
            if as_json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Total loads:   {}", stats["total"].as_u64().unwrap_or(0));
                println!("Under review:  {}", stats["under_review"].as_u64().unwrap_or(0));
                println!("Approved:      {}", stats["approved"].as_u64().unwrap_or(0));
            }
        }

        Commands::Whoami => {
            if api.token.is_none() {
                bail!("No token; pass --token or set LOADBOARD_TOKEN");
            }
            let session = api
                .send(api.request(Method::GET, "/api/v1/session"), "Session")
                .await?;
            println!("{}", serde_json::to_string_pretty(&session)?);
        }

        Commands::Status => {
            let health = api
                .send(api.request(Method::GET, "/health"), "Health check")
                .await?;
            println!("Loadboard v{}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("API Status: {}", health["status"].as_str().unwrap_or("unknown"));
            println!(
                "Backend:    {} ({})",
                health["backend"].as_str().unwrap_or("unknown"),
                health["backend_kind"].as_str().unwrap_or("-")
            );
            println!("Notifier:   {}", health["notifier"].as_str().unwrap_or("-"));
            if let Some(uptime) = health["uptime_seconds"].as_u64() {
                println!("Uptime:     {}", format_duration(uptime));
            }
        }

        Commands::Config { output } => {
            let config = loadboard::config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)
                            .with_context(|| format!("Failed to create {:?}", parent))?;
                    }
                    std::fs::write(&path, &config)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

async fn run_loads(api: &ApiClient, command: LoadCommands, as_json: bool) -> Result<()> {
    match command {
        LoadCommands::List {
            view,
            search,
            status,
            equipment,
            clearance,
        } => {
            let params: Vec<(&str, String)> = [
                ("view", view),
                ("search", search),
                ("status", status),
                ("equipment", equipment),
                ("clearance", clearance),
            ]
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .collect();

            let body = api
                .send(
                    api.request(Method::GET, "/api/v1/loads").query(&params),
                    "Listing loads",
                )
                .await?;

            if as_json {
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                let loads = body["loads"].as_array().cloned().unwrap_or_default();
                println!(
                    "View: {} ({} loads)",
                    body["view"].as_str().unwrap_or("-"),
                    loads.len()
                );
                println!();
                print_loads(&loads);

                if let Some(clearance) = body["clearance"].as_array() {
                    println!();
                    println!("Customs:");
                    for entry in clearance {
                        let docs = &entry["documents"];
                        println!(
                            "  {:<16} {:<12} {:<7} docs {}/{} approved, {} outstanding",
                            entry["load_id"].as_str().unwrap_or("-"),
                            entry["status"].as_str().unwrap_or("-"),
                            entry["priority"].as_str().unwrap_or("-"),
                            docs["approved"],
                            docs["total"],
                            docs["pending"],
                        );
                    }
                }
            }
        }

        LoadCommands::Show { id } => {
            let path = format!("/api/v1/loads/{}", urlencoding::encode(&id));
            let load = api.send(api.request(Method::GET, &path), "Fetching load").await?;
            println!("{}", serde_json::to_string_pretty(&load)?);
        }

        LoadCommands::Post { fields, file } => {
            let form = read_form(&fields, file.as_ref())?;
            run_wizard(&form);

            let values: Map<String, Value> = form
                .iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                .collect();
            let created = api
                .send(
                    api.request(Method::POST, "/api/v1/loads").json(&values),
                    "Posting load",
                )
                .await?;

            if as_json {
                println!("{}", serde_json::to_string_pretty(&created)?);
            } else {
                let load = &created["load"];
                println!(
                    "Created {} ({}) as {}",
                    load["reference_number"].as_str().unwrap_or("-"),
                    load["id"].as_str().unwrap_or("-"),
                    load["status"].as_str().unwrap_or("-")
                );
                let report = &created["notifications"];
                println!(
                    "Notified {} of {} carriers",
                    report["sent"].as_u64().unwrap_or(0),
                    report["attempted"].as_u64().unwrap_or(0)
                );
            }
        }

        LoadCommands::Update {
            id,
            status,
            location,
            driver,
            clearance,
        } => {
            let mut patch = Map::new();
            if let Some(status) = status {
                patch.insert("status".into(), json!(status));
            }
            if let Some(location) = location {
                patch.insert("current_location".into(), json!(location));
            }
            if let Some(driver) = driver {
                patch.insert("driver_name".into(), json!(driver));
            }
            if let Some(clearance) = clearance {
                patch.insert("clearanceStatus".into(), json!(clearance));
            }
            if patch.is_empty() {
                bail!("Nothing to update; pass --status, --location, --driver or --clearance");
            }

            let path = format!("/api/v1/loads/{}", urlencoding::encode(&id));
            let load = api
                .send(api.request(Method::PATCH, &path).json(&patch), "Updating load")
                .await?;
            println!(
                "{} is now {}",
                load["reference_number"].as_str().unwrap_or(&id),
                load["status"].as_str().unwrap_or("-")
            );
        }

        LoadCommands::Claim { id } => {
            let path = format!("/api/v1/loads/{}/claim", urlencoding::encode(&id));
            let body = api
                .send(api.request(Method::POST, &path), "Claiming load")
                .await?;
            let load = &body["load"];
            println!(
                "Claimed {}: {} -> {}",
                load["reference_number"].as_str().unwrap_or(&id),
                load["origin"].as_str().unwrap_or("?"),
                load["destination"].as_str().unwrap_or("?")
            );
        }

        LoadCommands::Manage => {
            let body = api
                .send(
                    api.request(Method::GET, "/api/v1/loads").query(&[("view", "shipper")]),
                    "Listing your loads",
                )
                .await?;
            let loads = body["loads"].as_array().cloned().unwrap_or_default();

            let mut by_status: BTreeMap<String, usize> = BTreeMap::new();
            for load in &loads {
                let status = load["status"].as_str().unwrap_or("draft").to_string();
                *by_status.entry(status).or_default() += 1;
            }

            if as_json {
                let summary = json!({"by_status": by_status, "loads": loads});
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{} loads", loads.len());
                for (status, count) in &by_status {
                    println!("  {:<12} {}", status, count);
                }
                println!();
                print_loads(&loads);
            }
        }
    }

    Ok(())
}

/// Collect form values from a JSON file, then `key=value` flags
fn read_form(fields: &[String], file: Option<&PathBuf>) -> Result<LoadForm> {
    let mut form = match file {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {:?}", path))?;
            let value: Value = serde_json::from_str(&content)
                .with_context(|| format!("{:?} is not valid JSON", path))?;
            LoadForm::from_json(&value)
        }
        None => LoadForm::new(),
    };

    for field in fields {
        let Some((key, value)) = field.split_once('=') else {
            bail!("Invalid field {:?}; expected key=value", field);
        };
        form.set(key.trim(), value.trim());
    }

    Ok(form)
}

/// Walk the wizard to the review step; exits 1 at the first failing step
fn run_wizard(form: &LoadForm) {
    let mut wizard = Wizard::new();
    while wizard.step() != WizardStep::Review {
        let step = wizard.step();
        match wizard.advance(form) {
            Ok(_) => println!("Step {} ({}): ok", step.number(), step.title()),
            Err(e) => {
                eprintln!("Step {} ({}) has errors:", step.number(), step.title());
                for error in &e.errors {
                    eprintln!("  {}: {}", error.field, error.message);
                }
                std::process::exit(1);
            }
        }
    }
}

fn print_loads(loads: &[Value]) {
    if loads.is_empty() {
        println!("No loads found.");
        return;
    }

    println!(
        "{:<12} {:<12} {:<36} {:<16} {}",
        "Reference", "Status", "Route", "Equipment", "Carrier"
    );
    println!("{}", "-".repeat(92));

    for load in loads {
        let route = format!(
            "{} -> {}",
            load["origin"].as_str().unwrap_or("?"),
            load["destination"].as_str().unwrap_or("?")
        );
        println!(
            "{:<12} {:<12} {:<36} {:<16} {}",
            load["reference_number"].as_str().unwrap_or("-"),
            load["status"].as_str().unwrap_or("-"),
            route,
            load["equipment_type"].as_str().unwrap_or("-"),
            load["carrier"].as_str().filter(|c| !c.is_empty()).unwrap_or("-"),
        );
    }
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}
