use serde_json::{Map, Value};
use tracing::warn;

use crate::config::ConnectionInput;

pub const DSN_ENV: &str = "ENQUEUE_DSN";
pub const TABLE_NAME_ENV: &str = "ENQUEUE_TABLE_NAME";
pub const POLLING_INTERVAL_ENV: &str = "ENQUEUE_POLLING_INTERVAL";
pub const LAZY_ENV: &str = "ENQUEUE_LAZY";

/// Connection config derived from the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbalEnvConfig {
    pub dsn: Option<String>,
    pub table_name: Option<String>,
    pub polling_interval_ms: Option<u64>,
    pub lazy: Option<bool>,
}

impl DbalEnvConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup. Blank values and
    /// values that fail to parse are ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            dsn: read(DSN_ENV),
            table_name: read(TABLE_NAME_ENV),
            polling_interval_ms: read(POLLING_INTERVAL_ENV).and_then(|value| {
                let parsed = value.trim().parse::<u64>().ok();
                if parsed.is_none() {
                    warn!(var = POLLING_INTERVAL_ENV, %value, "ignoring non-numeric value");
                }
                parsed
            }),
            lazy: read(LAZY_ENV).and_then(|value| {
                let parsed = parse_flag(&value);
                if parsed.is_none() {
                    warn!(var = LAZY_ENV, %value, "ignoring unrecognized flag value");
                }
                parsed
            }),
        }
    }

    pub fn into_input(self) -> ConnectionInput {
        if self.table_name.is_none() && self.polling_interval_ms.is_none() && self.lazy.is_none()
        {
            return self.dsn.map(ConnectionInput::from).unwrap_or_default();
        }

        let mut options = Map::new();
        if let Some(dsn) = self.dsn {
            options.insert("dsn".into(), Value::String(dsn));
        }
        if let Some(table_name) = self.table_name {
            options.insert("table_name".into(), Value::String(table_name));
        }
        if let Some(interval) = self.polling_interval_ms {
            options.insert("polling_interval".into(), Value::from(interval));
        }
        if let Some(lazy) = self.lazy {
            options.insert("lazy".into(), Value::Bool(lazy));
        }
        ConnectionInput::Options(options)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
