use crate::AdapterError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// The description of a data source.
///
/// Two equal parameter sets describe the same data source, which lets the connection pool reuse
/// adapters. The adapter type is matched case-insensitively.
///
/// ```
/// use rdf_federation_adapters::ConnectionParams;
///
/// let params = ConnectionParams::new("SPARQL")
///     .with_option("host", "dbpedia.org")
///     .with_option("port", "80");
/// assert_eq!(params.adapter_type(), "sparql");
/// assert_eq!(params.option("host"), Some("dbpedia.org"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionParams {
    #[serde(rename = "type", deserialize_with = "deserialize_adapter_type")]
    adapter_type: String,
    #[serde(default)]
    options: BTreeMap<String, String>,
    /// Fresh connections bypass the adapter cache of the pool.
    #[serde(default)]
    fresh: bool,
}

impl ConnectionParams {
    pub fn new(adapter_type: impl AsRef<str>) -> Self {
        Self {
            adapter_type: normalize_adapter_type(adapter_type.as_ref()),
            options: BTreeMap::new(),
            fresh: false,
        }
    }

    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Marks the parameters as a request for a dedicated connection.
    #[must_use]
    pub fn fresh(mut self) -> Self {
        self.fresh = true;
        self
    }

    pub fn adapter_type(&self) -> &str {
        &self.adapter_type
    }

    pub fn options(&self) -> &BTreeMap<String, String> {
        &self.options
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    /// Returns the value of a required option.
    pub fn required(
        &self,
        adapter_type: &'static str,
        option: &'static str,
    ) -> Result<&str, AdapterError> {
        self.option(option)
            .filter(|value| !value.trim().is_empty())
            .ok_or(AdapterError::MissingOption {
                adapter_type,
                option,
            })
    }

    /// Parses an optional option with [FromStr].
    pub fn parse_optional<T>(&self, option: &str) -> Result<Option<T>, AdapterError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.option(option)
            .map(|value| {
                value
                    .trim()
                    .parse::<T>()
                    .map_err(|err| AdapterError::InvalidOption {
                        option: option.to_owned(),
                        value: value.to_owned(),
                        reason: err.to_string(),
                    })
            })
            .transpose()
    }

    /// Fails on the first option that is not in `known`.
    pub fn ensure_known_options(
        &self,
        adapter_type: &'static str,
        known: &[&str],
    ) -> Result<(), AdapterError> {
        match self.options.keys().find(|key| !known.contains(&key.as_str())) {
            Some(key) => Err(AdapterError::UnknownOption {
                adapter_type,
                option: key.clone(),
            }),
            None => Ok(()),
        }
    }
}

fn normalize_adapter_type(adapter_type: &str) -> String {
    adapter_type.trim().to_ascii_lowercase()
}

fn deserialize_adapter_type<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(normalize_adapter_type(&value))
}
