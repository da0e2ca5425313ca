//! Connection-string parsing and scheme-to-driver mapping.
//!
//! A DSN has the shape `<scheme>://[user[:pass]@]host[:port]/[db][?options]`. The bare
//! form `<scheme>:` is shorthand for a local connection as `root`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value, json};
use url::{ParseError, Url};

use crate::errors::DbalError;

/// DSN used when no connection config is supplied at all.
pub const DEFAULT_DSN: &str = "mysql:";

static SCHEME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9+.\-]*$").expect("scheme pattern compiles"));

/// Supported DSN schemes and the driver id each one maps to, in listing order.
const SUPPORTED_SCHEMES: &[(&str, &str)] = &[
    ("db2", "db2"),
    ("ibm-db2", "ibm-db2"),
    ("mssql", "mssql"),
    ("sqlsrv+pdo", "pdo_sqlsrv"),
    ("mysql", "mysql"),
    ("mysql2", "mysql2"),
    ("mysql+pdo", "pdo_mysql"),
    ("pgsql", "pgsql"),
    ("postgres", "postgres"),
    ("pgsql+pdo", "pdo_pgsql"),
    ("sqlite", "sqlite"),
    ("sqlite3", "sqlite3"),
    ("sqlite+pdo", "pdo_sqlite"),
];

/// Returns the supported scheme names in listing order.
pub fn supported_schemes() -> Vec<&'static str> {
    SUPPORTED_SCHEMES.iter().map(|(scheme, _)| *scheme).collect()
}

/// Looks up the driver id for an already lower-cased scheme.
pub fn driver_for_scheme(scheme: &str) -> Option<&'static str> {
    SUPPORTED_SCHEMES
        .iter()
        .find(|(candidate, _)| *candidate == scheme)
        .map(|(_, driver)| *driver)
}

/// Result of parsing a DSN string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedDsn {
    /// Lower-cased scheme as written in the DSN.
    pub scheme: String,
    /// Driver id the scheme maps to.
    pub driver_id: &'static str,
    /// Driver-ready url with the scheme rewritten to the driver id.
    pub url: String,
}

impl ParsedDsn {
    /// Config fragment contributed by a DSN: `{lazy: true, connection: {url}}`.
    pub fn to_config(&self) -> Map<String, Value> {
        let mut config = Map::new();
        config.insert("lazy".into(), Value::Bool(true));
        config.insert("connection".into(), json!({ "url": self.url }));
        config
    }
}

/// Parses and validates a DSN, mapping its scheme onto a driver id.
pub fn parse_dsn(dsn: &str) -> Result<ParsedDsn, DbalError> {
    let Some((raw_scheme, rest)) = dsn.split_once(':') else {
        return Err(DbalError::invalid_format(
            "it does not have scheme separator \":\"",
        ));
    };

    // A scheme the url crate rejects (leading digit, `_`) still goes through the
    // charset check and the table lookup below.
    match Url::parse(dsn) {
        Ok(_) | Err(ParseError::RelativeUrlWithoutBase) => {}
        Err(err) => {
            return Err(DbalError::invalid_format(format!(
                "failed to parse DSN \"{dsn}\": {err}"
            )));
        }
    }

    let scheme = raw_scheme.to_lowercase();
    if !SCHEME_PATTERN.is_match(&scheme) {
        return Err(DbalError::invalid_format("scheme contains illegal symbols"));
    }

    let Some(driver_id) = driver_for_scheme(&scheme) else {
        return Err(DbalError::UnsupportedScheme {
            scheme,
            supported: supported_schemes(),
        });
    };

    let url = if rest.is_empty() {
        format!("{driver_id}://root@localhost")
    } else {
        format!("{driver_id}:{rest}")
    };

    Ok(ParsedDsn {
        scheme,
        driver_id,
        url,
    })
}
