//! VitisGuard - vineyard weather monitor
//!
//! Tracks vineyard parcels and reports disease risk, severe-weather alerts and
//! irrigation guidance from the Open-Meteo forecast.

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;
use vitisguard_client::external::WeatherClient;
use vitisguard_client::report::ParcelReport;
use vitisguard_client::services::{
    FetchStatus, FileStorage, ParcelStore, WeatherOrchestrator,
};
use vitisguard_client::Config;
use vitisguard_shared::{Parcel, ParcelUpdate, WeatherOptions};

#[derive(Parser)]
#[command(name = "vitisguard")]
#[command(about = "Vineyard weather monitoring and advisories")]
struct Cli {
    /// Debug-level logging unless RUST_LOG is set
    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage tracked parcels
    Parcels {
        #[command(subcommand)]
        command: ParcelCommand,
    },
    /// Fetch the forecast once and print prioritized advisories
    Report {
        /// Parcel id; every parcel when omitted
        #[arg(long)]
        parcel: Option<String>,
        /// Override the dry streak derived from the forecast
        #[arg(long)]
        days_without_rain: Option<u32>,
        /// Keep the N most severe advisories; 0 keeps all
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Poll the forecast until interrupted
    Watch {
        /// Parcel id; the selected parcel when omitted
        #[arg(long)]
        parcel: Option<String>,
    },
}

#[derive(Subcommand)]
enum ParcelCommand {
    List,
    Add {
        name: String,
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
        /// Explicit id; generated when omitted
        #[arg(long)]
        id: Option<String>,
    },
    Remove {
        id: String,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        latitude: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        longitude: Option<f64>,
    },
    Select {
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "vitisguard=debug,vitisguard_client=debug"
    } else {
        "vitisguard=info,vitisguard_client=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load().context("Failed to load configuration")?;
    tracing::debug!(environment = %config.environment, "Configuration loaded");

    let mut parcels = ParcelStore::load(FileStorage::new(&config.storage.data_dir));

    match cli.command {
        Commands::Parcels { command } => run_parcels(&mut parcels, command),
        Commands::Report {
            parcel,
            days_without_rain,
            limit,
            json,
        } => {
            let targets: Vec<Parcel> = match parcel {
                Some(id) => vec![parcels.resolve(Some(&id))?.clone()],
                None => parcels.parcels().to_vec(),
            };
            if targets.is_empty() {
                println!("No parcels tracked. Add one with `vitisguard parcels add`.");
                return Ok(());
            }
            run_report(&config, targets, days_without_rain, limit, json).await
        }
        Commands::Watch { parcel } => {
            let target = parcels.resolve(parcel.as_deref())?.clone();
            run_watch(&config, target).await
        }
    }
}

fn run_parcels(parcels: &mut ParcelStore<FileStorage>, command: ParcelCommand) -> anyhow::Result<()> {
    match command {
        ParcelCommand::List => {
            if !parcels.has_parcels() {
                println!("No parcels tracked.");
            }
            let selected = parcels.selected_id().map(str::to_string);
            for parcel in parcels.parcels() {
                let marker = if selected.as_deref() == Some(parcel.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!("{} {}  {}  [{}]", marker, parcel.id, parcel.name, parcel.location());
            }
        }
        ParcelCommand::Add {
            name,
            latitude,
            longitude,
            id,
        } => {
            let id = id.unwrap_or_else(|| format!("parcel-{}", Uuid::new_v4()));
            if parcels.add(Parcel::new(id.clone(), name, latitude, longitude))? {
                println!("Added parcel {}", id);
            } else {
                println!("Parcel {} already exists", id);
            }
        }
        ParcelCommand::Remove { id } => {
            if parcels.remove(&id) {
                println!("Removed parcel {}", id);
            } else {
                anyhow::bail!("Parcel {} not found", id);
            }
        }
        ParcelCommand::Update {
            id,
            name,
            latitude,
            longitude,
        } => {
            let update = ParcelUpdate {
                name,
                latitude,
                longitude,
            };
            if !parcels.update(&id, update)? {
                anyhow::bail!("Parcel {} not found", id);
            }
            println!("Updated parcel {}", id);
        }
        ParcelCommand::Select { id } => {
            if !parcels.select(&id) {
                anyhow::bail!("Parcel {} not found", id);
            }
            println!("Selected parcel {}", id);
        }
    }
    Ok(())
}

fn build_orchestrator(config: &Config) -> anyhow::Result<(WeatherOrchestrator<WeatherClient>, WeatherOptions)> {
    let client = WeatherClient::with_base_url(config.weather.base_url.clone())
        .with_timeout(config.request_timeout());
    let orchestrator = WeatherOrchestrator::with_policy(client, config.fetch_policy()?);
    Ok((orchestrator, config.weather_options()?))
}

async fn run_report(
    config: &Config,
    targets: Vec<Parcel>,
    days_without_rain: Option<u32>,
    limit: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let (orchestrator, options) = build_orchestrator(config)?;
    let mut reports = Vec::new();
    let mut failures = 0;

    for parcel in targets {
        match orchestrator.load(parcel.location(), options.clone()).await {
            Some(response) => {
                let mut report =
                    ParcelReport::build(parcel, &response, days_without_rain, chrono::Utc::now());
                if let Some(limit) = limit.filter(|&limit| limit > 0) {
                    report.advisories.truncate(limit);
                }
                reports.push(report);
            }
            None => {
                failures += 1;
                let error = orchestrator
                    .error()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "unknown error".to_string());
                tracing::error!(parcel = %parcel.id, %error, "Failed to load forecast");
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            print!("{}", report.render());
        }
    }

    if reports.is_empty() && failures > 0 {
        anyhow::bail!("No forecast could be loaded");
    }
    Ok(())
}

async fn run_watch(config: &Config, parcel: Parcel) -> anyhow::Result<()> {
    let (orchestrator, options) = build_orchestrator(config)?;
    let mut updates = orchestrator.subscribe();

    match orchestrator.load(parcel.location(), options).await {
        Some(response) => print!(
            "{}",
            ParcelReport::build(parcel.clone(), &response, None, chrono::Utc::now()).render()
        ),
        None => tracing::warn!(parcel = %parcel.id, "Initial load failed, polling anyway"),
    }
    drop(updates.borrow_and_update());
    orchestrator.start_polling();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                match (state.status, state.data) {
                    (FetchStatus::Success, Some(response)) => print!(
                        "{}",
                        ParcelReport::build(parcel.clone(), &response, None, chrono::Utc::now())
                            .render()
                    ),
                    (FetchStatus::Failed, _) => {
                        if let Some(error) = state.error {
                            tracing::warn!(%error, "Refresh failed");
                        }
                    }
                    _ => {}
                }
            }
            _ = &mut shutdown => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    orchestrator.stop_polling();
    Ok(())
}
