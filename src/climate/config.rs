//! Run configuration.
//!
//! Settings are layered, later layers winning:
//!
//! 1. Built-in defaults
//! 2. A YAML file ([`ClimateConfig::from_yaml_file`])
//! 3. Environment variables ([`ClimateConfig::with_env_overrides`])
//! 4. Command-line flags, applied through [`ClimateConfigBuilder`]
//!
//! # Environment Variables
//!
//! - `CLIMATE_TEMPERATURE`: temperature anomaly CSV path
//! - `CLIMATE_SEA_LEVEL`: sea level CSV path
//! - `CLIMATE_CO2`: CO2 concentration CSV path
//! - `CLIMATE_OUTPUT`: report output path
//! - `CLIMATE_REGION`: entity whose rows are ingested
//! - `CLIMATE_STRICT`: `true`/`false` (also `1`/`0`)
//!
//! Empty or whitespace-only values are ignored.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{ConfigurationError, SeriesKind};

const DEFAULT_REGION: &str = "World";

/// Settings for one extremes run.
///
/// # Examples
///
/// ```rust
/// use climate_extremes::climate::ClimateConfig;
///
/// let config = ClimateConfig::from_yaml_str("region: Europe\nstrict: true\n").unwrap();
/// assert_eq!(config.region, "Europe");
/// assert!(config.strict);
/// assert_eq!(config.co2.to_str(), Some("co2.csv"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClimateConfig {
    /// Temperature anomaly CSV.
    pub temperature: PathBuf,
    /// Sea level CSV.
    pub sea_level: PathBuf,
    /// CO2 concentration CSV.
    pub co2: PathBuf,
    /// File the text report is written to.
    pub output: PathBuf,
    /// Entity whose rows are ingested.
    pub region: String,
    /// Abort on the first malformed region row instead of skipping it.
    pub strict: bool,
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            temperature: PathBuf::from("temperature_anomaly.csv"),
            sea_level: PathBuf::from("sea_level.csv"),
            co2: PathBuf::from("co2.csv"),
            output: PathBuf::from("WorldDataChange.txt"),
            region: DEFAULT_REGION.to_string(),
            strict: false,
        }
    }
}

impl ClimateConfig {
    /// Creates a new configuration builder starting from the defaults.
    pub fn builder() -> ClimateConfigBuilder {
        ClimateConfigBuilder::default()
    }

    /// Parses a YAML document. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::Malformed` for invalid YAML or unknown
    /// keys, and any validation error of the parsed settings.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigurationError> {
        let config: Self =
            serde_yaml::from_str(text).map_err(|error| ConfigurationError::Malformed(error.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a YAML configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::Unreadable` if the file cannot be read,
    /// and otherwise whatever [`from_yaml_str`](Self::from_yaml_str) reports.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigurationError> {
        let text = fs::read_to_string(path).map_err(|error| ConfigurationError::Unreadable {
            path: path.display().to_string(),
            message: error.to_string(),
        })?;
        Self::from_yaml_str(&text)
    }

    /// Applies the `CLIMATE_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidBoolean` for an unparseable
    /// `CLIMATE_STRICT`, and any validation error of the result.
    pub fn with_env_overrides(self) -> Result<Self, ConfigurationError> {
        self.with_overrides_from(|name| env::var(name).ok())
    }

    /// Applies overrides read through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// See [`with_env_overrides`](Self::with_env_overrides).
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(path) = read("CLIMATE_TEMPERATURE") {
            self.temperature = PathBuf::from(path);
        }
        if let Some(path) = read("CLIMATE_SEA_LEVEL") {
            self.sea_level = PathBuf::from(path);
        }
        if let Some(path) = read("CLIMATE_CO2") {
            self.co2 = PathBuf::from(path);
        }
        if let Some(path) = read("CLIMATE_OUTPUT") {
            self.output = PathBuf::from(path);
        }
        if let Some(region) = read("CLIMATE_REGION") {
            self.region = region;
        }
        if let Some(value) = read("CLIMATE_STRICT") {
            self.strict = parse_bool("CLIMATE_STRICT", &value)?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Returns the input path for `kind`.
    #[must_use]
    pub fn path_for(&self, kind: SeriesKind) -> &Path {
        match kind {
            SeriesKind::Temperature => &self.temperature,
            SeriesKind::SeaLevel => &self.sea_level,
            SeriesKind::Co2 => &self.co2,
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the region or any path is empty.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.region.trim().is_empty() {
            return Err(ConfigurationError::EmptyRegion);
        }
        for kind in SeriesKind::ALL {
            if self.path_for(kind).as_os_str().is_empty() {
                return Err(ConfigurationError::EmptyPath(kind.name()));
            }
        }
        if self.output.as_os_str().is_empty() {
            return Err(ConfigurationError::EmptyPath("output"));
        }
        Ok(())
    }
}

fn parse_bool(variable: &'static str, value: &str) -> Result<bool, ConfigurationError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigurationError::InvalidBoolean {
            variable,
            value: value.to_string(),
        }),
    }
}

/// Builder for `ClimateConfig`.
///
/// # Example
///
/// ```rust
/// use climate_extremes::climate::ClimateConfig;
///
/// let config = ClimateConfig::builder()
///     .region("Asia")
///     .output("asia.txt")
///     .strict(true)
///     .build()
///     .unwrap();
/// assert_eq!(config.region, "Asia");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClimateConfigBuilder {
    config: ClimateConfig,
}

impl From<ClimateConfig> for ClimateConfigBuilder {
    fn from(config: ClimateConfig) -> Self {
        Self { config }
    }
}

impl ClimateConfigBuilder {
    /// Sets the temperature anomaly CSV path.
    #[must_use]
    pub fn temperature(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.temperature = path.into();
        self
    }

    /// Sets the sea level CSV path.
    #[must_use]
    pub fn sea_level(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.sea_level = path.into();
        self
    }

    /// Sets the CO2 concentration CSV path.
    #[must_use]
    pub fn co2(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.co2 = path.into();
        self
    }

    /// Sets the report output path.
    #[must_use]
    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output = path.into();
        self
    }

    /// Sets the region filter.
    #[must_use]
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.config.region = region.into();
        self
    }

    /// Sets strict mode.
    #[must_use]
    pub const fn strict(mut self, strict: bool) -> Self {
        self.config.strict = strict;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the configuration is invalid.
    pub fn build(self) -> Result<ClimateConfig, ConfigurationError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
