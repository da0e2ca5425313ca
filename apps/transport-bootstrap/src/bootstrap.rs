use std::path::Path;

use anyhow::{Context, Result, bail};
use gsm_dbal::{ConnectionDescriptor, ConnectionInput, normalize};
use gsm_extensions::{
    BuildConsumptionExtensions, BuildOutcome, InMemorySlotStore, ProviderPool,
    ProviderRegistration, SlotStore, SlotValue,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Bootstrap file: transports in declaration order with their connection config,
/// plus the provider pool.
#[derive(Debug, Default, Deserialize)]
pub struct BootstrapFile {
    #[serde(default)]
    pub transports: IndexMap<String, TransportSpec>,
    #[serde(default)]
    pub extensions: Vec<ProviderRegistration>,
}

#[derive(Debug, Deserialize)]
pub struct TransportSpec {
    /// DSN string, option map, or null.
    #[serde(default)]
    pub connection: Value,
    /// Initial slot value; `null` leaves the transport without a slot.
    #[serde(default = "empty_slot")]
    pub extensions: Option<SlotValue>,
}

fn empty_slot() -> Option<SlotValue> {
    Some(SlotValue::default())
}

#[derive(Debug, Serialize)]
pub struct TransportReport {
    pub name: String,
    pub connection: ConnectionDescriptor,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<SlotValue>,
}

pub fn load(path: &Path) -> Result<BootstrapFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read bootstrap file {}", path.display()))?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("json") => serde_json::from_str(&raw)
            .with_context(|| format!("parse bootstrap file {}", path.display())),
        Some("yaml") | Some("yml") => serde_yaml_bw::from_str(&raw)
            .with_context(|| format!("parse bootstrap file {}", path.display())),
        _ => bail!(
            "unsupported bootstrap file {}; expected .json, .yaml or .yml",
            path.display()
        ),
    }
}

/// Normalizes every transport's connection and assembles every transport's extension slot.
pub fn run(file: BootstrapFile) -> Result<Vec<TransportReport>> {
    let pool = ProviderPool::from_registrations(file.extensions)
        .context("register extension providers")?;
    let store = InMemorySlotStore::new();

    let mut connections = Vec::with_capacity(file.transports.len());
    for (name, spec) in file.transports {
        let input = ConnectionInput::try_from(spec.connection)
            .with_context(|| format!("transport `{name}` connection"))?;
        let descriptor =
            normalize(input).with_context(|| format!("transport `{name}` connection"))?;
        if let Some(initial) = spec.extensions {
            store.define(&name, initial);
        }
        connections.push((name, descriptor));
    }

    let mut reports = Vec::with_capacity(connections.len());
    for (name, descriptor) in connections {
        let pass = BuildConsumptionExtensions::new(name.as_str())
            .with_context(|| format!("transport `{name}`"))?;
        let outcome = pass
            .process(&pool, &store)
            .with_context(|| format!("build extensions for transport `{name}`"))?;
        reports.push(TransportReport {
            extensions: store.get(&pass.slot_id()),
            outcome: outcome_label(outcome),
            connection: descriptor,
            name,
        });
    }

    info!(transports = reports.len(), "transport bootstrap complete");
    Ok(reports)
}

fn outcome_label(outcome: BuildOutcome) -> &'static str {
    match outcome {
        BuildOutcome::NotRegistered => "no-slot",
        BuildOutcome::Skipped => "finalized",
        BuildOutcome::Built { .. } => "built",
    }
}
