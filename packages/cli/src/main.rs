#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for running emergency dispatch scenarios.
//!
//! `dispatch` seeds an in-memory responder registry from a scenario file,
//! creates the scenario's incident and prints the created incident with
//! its dispatch outcome as JSON. Notifications go through the channel
//! selected by `NOTIFICATION_CHANNEL` (or FCM when `FCM_PROJECT_ID` and
//! `FCM_ACCESS_TOKEN` are set), unless `--dry-run` is given.

mod scenario;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use emergency_dispatch::{DispatchConfig, Dispatcher, NotificationChannel};
use emergency_geo::Coordinates;
use emergency_incident_models::{IncidentCategory, ResponderCategory};
use emergency_notification::log_channel::LogChannel;
use emergency_store::{MemoryIncidentStore, ResponderRegistry};

use crate::scenario::Scenario;

#[derive(Parser)]
#[command(name = "emergency_dispatch", about = "Emergency incident dispatch tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the incident from a scenario file and dispatch it
    Dispatch {
        /// Path to a scenario TOML file
        #[arg(long)]
        scenario: PathBuf,
        /// Optional dispatch config TOML (overrides the scenario's `[config]`)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Log notifications instead of delivering them
        #[arg(long)]
        dry_run: bool,
    },
    /// Print which responder category handles each incident category
    Categories,
    /// List the configured notification channels
    Channels,
    /// Great-circle distance in kilometers between two points
    #[command(allow_negative_numbers = true)]
    Distance {
        lat1: f64,
        lon1: f64,
        lat2: f64,
        lon2: f64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Dispatch {
            scenario,
            config,
            dry_run,
        } => {
            let scenario = Scenario::load(&scenario)?;
            let config = match config {
                Some(path) => DispatchConfig::from_toml_str(&std::fs::read_to_string(path)?)?,
                None => {
                    let config = scenario.config.clone().unwrap_or_default();
                    config.validate()?;
                    config
                }
            }
            .with_env_overrides()?;
            log::debug!("Dispatch config: {config:?}");

            let registry = Arc::new(ResponderRegistry::new());
            let seeded = scenario.seed(&registry).await?;
            log::info!("Seeded {seeded} responder(s)");

            let channel: Arc<dyn NotificationChannel> = if dry_run {
                Arc::new(LogChannel)
            } else {
                emergency_notification::create_channel_from_env()?
            };

            let dispatcher = Dispatcher::new(
                config,
                registry,
                Arc::new(MemoryIncidentStore::new()),
                channel,
            );
            let created = dispatcher
                .create_incident(scenario.reporter_id, scenario.incident_request())
                .await?;

            println!("{}", serde_json::to_string_pretty(&created)?);
        }
        Commands::Categories => {
            println!("{:<20} RESPONDER", "INCIDENT");
            println!("{}", "-".repeat(40));
            for category in IncidentCategory::all() {
                let handlers = category.required_capability().map_or_else(
                    || {
                        ResponderCategory::all()
                            .iter()
                            .filter(|r| r.is_field_unit())
                            .map(ToString::to_string)
                            .collect::<Vec<_>>()
                            .join(", ")
                    },
                    |r| r.to_string(),
                );
                println!("{:<20} {handlers}", category.to_string());
            }
        }
        Commands::Channels => {
            let services = emergency_notification::service_registry::all_services()?;
            println!("{:<10} {:<8} NAME", "ID", "ENABLED");
            println!("{}", "-".repeat(50));
            for service in &services {
                println!("{:<10} {:<8} {}", service.id, service.enabled, service.name);
            }
        }
        Commands::Distance {
            lat1,
            lon1,
            lat2,
            lon2,
        } => {
            let a = Coordinates::new(lat1, lon1)?;
            let b = Coordinates::new(lat2, lon2)?;
            println!("{:.3} km", a.distance_km(&b));
        }
    }

    Ok(())
}
