//! Flat, string-keyed solver configuration.
//!
//! Every heuristic component in this crate reads its tuning knobs from a
//! [`DataProperties`] instance rather than from dedicated constructor
//! arguments, mirroring how the original system threads one property bag
//! through every component. Unlike the teacher's `SolverConfig` (a typed,
//! nested `serde` struct with one sub-config per phase/acceptor), a
//! `DataProperties` is a flat `key -> value` map: components look up only
//! the keys they recognize and fall back to documented defaults for
//! everything else, which keeps adding a new heuristic from requiring a
//! schema change.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// Error loading or parsing a [`DataProperties`] source.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error reading configuration: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "config-toml")]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("property {key:?} could not be parsed as {expected}: {value:?}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
}

/// A flat bag of string properties, with typed accessors and per-key
/// defaults.
///
/// Recognized keys (spec §6), with their defaults:
///
/// | Key | Type | Default |
/// |---|---|---|
/// | `Termination.StopTime` | seconds (f64) | unset (no time limit) |
/// | `Termination.MaxIter` | u64 | unset (no iteration limit) |
/// | `Termination.TimeBetweenUpdates` | seconds (f64) | `1.0` |
/// | `Construction.Class` | string | unset (construction phase skipped) |
/// | `Construction.UntilComplete` | bool | `false` |
/// | `Search.GreatDeluge` | bool | `true` (great deluge used instead of annealing) |
/// | `Search.CountSteps` | bool | `false` (plain hill climber, not step-counting) |
/// | `HillClimber.MaxIdleIters` | u64 | `10000` |
/// | `SimulatedAnnealing.InitialTemperature` | f64 | `1.5` |
/// | `SimulatedAnnealing.CoolingRate` | f64 | `0.95` |
/// | `SimulatedAnnealing.TemperatureLength` | u64 | `2500` |
/// | `SimulatedAnnealing.ReheatLengthCoef` | f64 | `5.0` |
/// | `SimulatedAnnealing.ReheatRate` | f64 | `1.35` |
/// | `SimulatedAnnealing.RestoreBestLengthCoef` | f64 | `5.0` |
/// | `GreatDeluge.CoolRate` | f64 | `0.99999995` |
/// | `GreatDeluge.UpperBoundRate` | f64 | `1.05` |
/// | `GreatDeluge.LowerBoundRate` | f64 | `0.95` |
/// | `Neighbour.RandomWalkProbability` | f64 | `0.0` |
/// | `Neighbour.TabuSize` | u64 | `0` |
/// | `Neighbour.BranchAndBoundTimeout` | milliseconds (f64) | `10000.0` |
/// | `Neighbour.BranchAndBoundMinimizePenalty` | bool | `false` |
/// | `Neighbour.BranchAndBoundOrder` | bool | `true` (order candidate values) |
/// | `Value.WeightDeviation` | f64 | `0.0` |
#[derive(Debug, Clone, Default)]
pub struct DataProperties {
    values: HashMap<String, String>,
}

impl DataProperties {
    /// An empty property bag; every accessor will return its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a property bag directly from key/value pairs.
    pub fn from_pairs<I, K, Vv>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Vv)>,
        K: Into<String>,
        Vv: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Sets a property, overwriting any previous value for `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Raw string value for `key`, if present.
    pub fn get_property(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// String value for `key`, or `default` if absent.
    pub fn get_property_string<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get_property(key).unwrap_or(default)
    }

    /// Integer value for `key`, or `default` if absent.
    ///
    /// Logs and falls back to `default` if the stored value fails to parse,
    /// rather than failing the whole solve over a malformed property.
    pub fn get_property_int(&self, key: &str, default: i64) -> i64 {
        match self.get_property(key) {
            None => default,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(key, raw, "could not parse property as integer, using default");
                default
            }),
        }
    }

    /// Floating-point value for `key`, or `default` if absent.
    pub fn get_property_double(&self, key: &str, default: f64) -> f64 {
        match self.get_property(key) {
            None => default,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(key, raw, "could not parse property as double, using default");
                default
            }),
        }
    }

    /// Boolean value for `key`, or `default` if absent. Accepts `true`/`false`
    /// case-insensitively.
    pub fn get_property_boolean(&self, key: &str, default: bool) -> bool {
        match self.get_property(key) {
            None => default,
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "true" => true,
                "false" => false,
                _ => {
                    tracing::warn!(key, raw, "could not parse property as boolean, using default");
                    default
                }
            },
        }
    }

    /// Optional integer value: `None` if the key is absent, `Some(default)`
    /// substituted on parse failure.
    pub fn get_property_int_opt(&self, key: &str) -> Option<i64> {
        self.get_property(key).and_then(|raw| raw.parse().ok())
    }

    /// Optional floating-point value: `None` if the key is absent.
    pub fn get_property_double_opt(&self, key: &str) -> Option<f64> {
        self.get_property(key).and_then(|raw| raw.parse().ok())
    }

    /// Number of properties currently set.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if no properties are set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for DataProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.values.keys().collect();
        keys.sort();
        for key in keys {
            writeln!(f, "{key}={}", self.values[key])?;
        }
        Ok(())
    }
}

#[cfg(feature = "config-toml")]
impl DataProperties {
    /// Parses a TOML document whose top-level table is a flat string map
    /// (scalars are stringified; nested tables are rejected) into a
    /// `DataProperties`.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(source)?;
        let mut values = HashMap::with_capacity(table.len());
        for (key, value) in table {
            let as_string = match value {
                toml::Value::String(s) => s,
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                other => {
                    return Err(ConfigError::InvalidValue {
                        key,
                        value: other.to_string(),
                        expected: "scalar (string, integer, float or boolean)",
                    })
                }
            };
            values.insert(key, as_string);
        }
        Ok(Self { values })
    }

    /// Reads and parses a TOML file from `path`.
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_accessors_fall_back_to_defaults() {
        let props = DataProperties::new();
        assert_eq!(props.get_property_int("Termination.MaxIter", 100), 100);
        assert_eq!(
            props.get_property_double("SimulatedAnnealing.CoolingRate", 0.95),
            0.95
        );
        assert!(!props.get_property_boolean("SimulatedAnnealing.RestoreBestAtReheat", false));
    }

    #[test]
    fn typed_accessors_read_set_values() {
        let mut props = DataProperties::new();
        props
            .set("HillClimber.MaxIdleIters", "500")
            .set("SimulatedAnnealing.CoolingRate", "0.9")
            .set("Search.GreatDeluge", "TRUE");
        assert_eq!(props.get_property_int("HillClimber.MaxIdleIters", 250), 500);
        assert_eq!(
            props.get_property_double("SimulatedAnnealing.CoolingRate", 0.95),
            0.9
        );
        assert!(props.get_property_boolean("Search.GreatDeluge", false));
    }

    #[test]
    fn malformed_value_falls_back_to_default() {
        let mut props = DataProperties::new();
        props.set("Termination.MaxIter", "not-a-number");
        assert_eq!(props.get_property_int("Termination.MaxIter", 42), 42);
    }

    #[cfg(feature = "config-toml")]
    #[test]
    fn loads_flat_toml_table() {
        let props = DataProperties::from_toml_str(
            r#"
            "Termination.StopTime" = 30.0
            "HillClimber.MaxIdleIters" = 500
            "Search.GreatDeluge" = true
            "#,
        )
        .unwrap();
        assert_eq!(props.get_property_double("Termination.StopTime", 0.0), 30.0);
        assert_eq!(props.get_property_int("HillClimber.MaxIdleIters", 0), 500);
        assert!(props.get_property_boolean("Search.GreatDeluge", false));
    }
}
