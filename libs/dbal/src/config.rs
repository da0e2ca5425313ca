//! Connection config normalization.
//!
//! Accepts a DSN string, a structured option map, or nothing, and produces a
//! [`ConnectionDescriptor`] with defaults applied:
//!
//! ```text
//! connection       = {}
//! table_name       = "enqueue"
//! polling_interval = 1000   (milliseconds)
//! lazy             = true
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::dsn::{DEFAULT_DSN, ParsedDsn, parse_dsn};
use crate::errors::DbalError;

pub const DEFAULT_TABLE_NAME: &str = "enqueue";
pub const DEFAULT_POLLING_INTERVAL_MS: u64 = 1000;

const DSN_KEY: &str = "dsn";
const CONNECTION_KEY: &str = "connection";
const URL_KEY: &str = "url";

/// Alternate spellings accepted for the canonical option keys.
const KEY_ALIASES: &[(&str, &str)] = &[
    ("tableName", "table_name"),
    ("polling_interval_ms", "polling_interval"),
    ("pollingIntervalMs", "polling_interval"),
];

/// Raw connection config as handed over by wiring code.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ConnectionInput {
    /// No config at all; resolves to a local mysql connection.
    #[default]
    Empty,
    Dsn(String),
    Options(Map<String, Value>),
}

impl From<&str> for ConnectionInput {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<String> for ConnectionInput {
    fn from(value: String) -> Self {
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Dsn(value)
        }
    }
}

impl From<Map<String, Value>> for ConnectionInput {
    fn from(value: Map<String, Value>) -> Self {
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Options(value)
        }
    }
}

impl TryFrom<Value> for ConnectionInput {
    type Error = DbalError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(Self::Empty),
            Value::String(dsn) => Ok(Self::from(dsn)),
            Value::Object(map) => Ok(Self::from(map)),
            Value::Array(items) if items.is_empty() => Ok(Self::Empty),
            other => Err(DbalError::invalid_argument(format!(
                "the config must be either a map of options, a DSN string or null, got {}",
                kind_of(&other)
            ))),
        }
    }
}

/// Scheme information recorded when the descriptor was derived from a DSN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DsnInfo {
    pub scheme: String,
    pub driver_id: &'static str,
}

impl From<&ParsedDsn> for DsnInfo {
    fn from(parsed: &ParsedDsn) -> Self {
        Self {
            scheme: parsed.scheme.clone(),
            driver_id: parsed.driver_id,
        }
    }
}

/// Canonical, driver-ready connection config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionDescriptor {
    /// Options handed to the driver, usually just `url`.
    #[serde(default)]
    pub connection: Map<String, Value>,
    pub table_name: String,
    #[serde(rename = "polling_interval")]
    pub polling_interval_ms: u64,
    pub lazy: bool,
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub dsn: Option<DsnInfo>,
    /// Keys the normalizer does not interpret, kept for the transport.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConnectionDescriptor {
    pub fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.polling_interval_ms)
    }

    /// The driver url, when the connection options carry one.
    pub fn url(&self) -> Option<&str> {
        self.connection.get(URL_KEY).and_then(Value::as_str)
    }
}

impl Default for ConnectionDescriptor {
    fn default() -> Self {
        Self {
            connection: Map::new(),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            polling_interval_ms: DEFAULT_POLLING_INTERVAL_MS,
            lazy: true,
            dsn: None,
            extra: Map::new(),
        }
    }
}

/// Normalizes raw connection config into a [`ConnectionDescriptor`].
#[instrument(name = "dbal.normalize", skip_all)]
pub fn normalize(input: ConnectionInput) -> Result<ConnectionDescriptor, DbalError> {
    let (overrides, parsed) = match input {
        ConnectionInput::Empty => dsn_overrides(DEFAULT_DSN)?,
        ConnectionInput::Dsn(dsn) => dsn_overrides(&dsn)?,
        ConnectionInput::Options(map) if map.is_empty() => dsn_overrides(DEFAULT_DSN)?,
        ConnectionInput::Options(map) => option_overrides(map)?,
    };

    let mut config = defaults();
    deep_merge(&mut config, overrides);

    let mut descriptor: ConnectionDescriptor = serde_json::from_value(Value::Object(config))
        .map_err(|err| DbalError::invalid_argument(err.to_string()))?;
    descriptor.dsn = parsed.as_ref().map(DsnInfo::from);

    debug!(
        driver = descriptor.dsn.as_ref().map(|dsn| dsn.driver_id).unwrap_or("custom"),
        table_name = %descriptor.table_name,
        polling_interval_ms = descriptor.polling_interval_ms,
        lazy = descriptor.lazy,
        "normalized connection config"
    );
    Ok(descriptor)
}

fn dsn_overrides(dsn: &str) -> Result<(Map<String, Value>, Option<ParsedDsn>), DbalError> {
    let parsed = parse_dsn(dsn)?;
    Ok((parsed.to_config(), Some(parsed)))
}

fn option_overrides(
    mut options: Map<String, Value>,
) -> Result<(Map<String, Value>, Option<ParsedDsn>), DbalError> {
    canonicalize_keys(&mut options);

    let dsn = match options.remove(DSN_KEY) {
        None | Some(Value::Null) => return Ok((options, None)),
        Some(Value::String(dsn)) => dsn,
        Some(other) => {
            return Err(DbalError::invalid_argument(format!(
                "the dsn option must be a string, got {}",
                kind_of(&other)
            )));
        }
    };

    let parsed = parse_dsn(&dsn)?;
    let mut merged = parsed.to_config();
    deep_merge(&mut merged, options);

    // Explicit options win, except for the url the DSN describes.
    let url = Value::String(parsed.url.clone());
    match merged.get_mut(CONNECTION_KEY) {
        Some(Value::Object(connection)) => {
            connection.insert(URL_KEY.into(), url);
        }
        _ => {
            let mut connection = Map::new();
            connection.insert(URL_KEY.into(), url);
            merged.insert(CONNECTION_KEY.into(), Value::Object(connection));
        }
    }

    Ok((merged, Some(parsed)))
}

fn defaults() -> Map<String, Value> {
    let mut config = Map::new();
    config.insert(CONNECTION_KEY.into(), Value::Object(Map::new()));
    config.insert("table_name".into(), Value::from(DEFAULT_TABLE_NAME));
    config.insert(
        "polling_interval".into(),
        Value::from(DEFAULT_POLLING_INTERVAL_MS),
    );
    config.insert("lazy".into(), Value::Bool(true));
    config
}

fn canonicalize_keys(options: &mut Map<String, Value>) {
    for (alias, canonical) in KEY_ALIASES {
        if let Some(value) = options.remove(*alias) {
            if !options.contains_key(*canonical) {
                options.insert((*canonical).to_string(), value);
            }
        }
    }
}

/// Recursively overlays `overlay` onto `base`. Nested maps merge key by key;
/// every other value in `overlay` replaces the one in `base`.
pub fn deep_merge(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "map",
    }
}
