use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use gsm_dbal::{ConnectionDescriptor, ConnectionInput, DbalEnvConfig, normalize, supported_schemes};
use gsm_extensions::SlotValue;

mod bootstrap;

#[derive(Parser, Debug)]
#[command(author, version, about = "Greentic transport bootstrap CLI")]
struct Cli {
    /// Emit JSON output
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Normalize a DSN (or the ENQUEUE_* environment when omitted)
    Normalize {
        #[arg()]
        dsn: Option<String>,
    },
    /// Normalize every transport connection and assemble its consumption extensions
    Build {
        #[arg(long)]
        config: PathBuf,
    },
    /// List supported DSN schemes
    Schemes,
}

fn main() -> Result<()> {
    gsm_telemetry::install("transport-bootstrap")?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Normalize { dsn } => {
            let input = match dsn {
                Some(dsn) => ConnectionInput::from(dsn),
                None => DbalEnvConfig::from_env().into_input(),
            };
            let descriptor = normalize(input)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&descriptor)?);
            } else {
                print_descriptor(&descriptor);
            }
        }
        Commands::Build { config } => {
            let reports = bootstrap::run(bootstrap::load(&config)?)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else if reports.is_empty() {
                println!("No transports declared in {}", config.display());
            } else {
                print_table(&reports);
            }
        }
        Commands::Schemes => {
            let schemes = supported_schemes();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&schemes)?);
            } else {
                for scheme in schemes {
                    println!("{scheme}");
                }
            }
        }
    }

    Ok(())
}

fn print_descriptor(descriptor: &ConnectionDescriptor) {
    println!("url             : {}", descriptor.url().unwrap_or("-"));
    if let Some(dsn) = &descriptor.dsn {
        println!("scheme          : {} -> {}", dsn.scheme, dsn.driver_id);
    }
    println!("table_name      : {}", descriptor.table_name);
    println!("polling_interval: {}ms", descriptor.polling_interval_ms);
    println!("lazy            : {}", descriptor.lazy);
}

fn print_table(reports: &[bootstrap::TransportReport]) {
    println!("{:<12} {:<10} {:<36} EXTENSIONS", "TRANSPORT", "SLOT", "URL");
    for report in reports {
        println!(
            "{:<12} {:<10} {:<36} {}",
            report.name,
            report.outcome,
            report.connection.url().unwrap_or("-"),
            report
                .extensions
                .as_ref()
                .map(describe_slot)
                .unwrap_or_else(|| "-".into())
        );
    }
}

fn describe_slot(slot: &SlotValue) -> String {
    match slot {
        SlotValue::Sequential(items) => items
            .iter()
            .map(|item| item.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        SlotValue::Keyed(entries) => entries
            .iter()
            .map(|(key, item)| format!("{key}={item}"))
            .collect::<Vec<_>>()
            .join(", "),
    }
}
