//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the crew pay
//! configuration from YAML files.

use chrono::NaiveDate;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::Position;

use super::types::{
    AirlineMetadata, CrewConfig, DutyCodeTable, DutyCodesConfig, RateConfig, RateEntry, RateTable,
};

/// Loads and provides access to the crew pay configuration.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/crew/
/// ├── airline.yaml        # Airline metadata and home base
/// ├── duty_codes.yaml     # Non-flight duty codes
/// └── rates/
///     └── 2023-01-01.yaml # Rates effective from this date
/// ```
///
/// # Example
///
/// ```no_run
/// use crew_pay_engine::config::ConfigLoader;
/// use crew_pay_engine::models::Position;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/crew").unwrap();
/// println!("Home base: {}", loader.config().home_base());
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// let rate = loader.get_rate(Position::Ccm, date).unwrap();
/// println!("Hourly flight rate: {}", rate.hourly_flight_rate);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: CrewConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if any required file is missing, contains invalid
    /// YAML, or the combined configuration is inconsistent.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let airline = Self::load_yaml::<AirlineMetadata>(&path.join("airline.yaml"))?;
        let duty_codes = Self::load_yaml::<DutyCodesConfig>(&path.join("duty_codes.yaml"))?;
        let rates = Self::load_rates(&path.join("rates"))?;

        let config = CrewConfig::new(
            airline,
            DutyCodeTable::new(duty_codes.codes)?,
            RateTable::new(rates)?,
        )?;

        debug!(
            path = %path.display(),
            airline = %config.airline().code,
            rate_versions = config.rates().versions().len(),
            "Loaded crew pay configuration"
        );

        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads all rate files from the rates directory.
    fn load_rates(rates_dir: &Path) -> EngineResult<Vec<RateConfig>> {
        let rates_dir_str = rates_dir.display().to_string();

        let entries = fs::read_dir(rates_dir).map_err(|_| EngineError::ConfigNotFound {
            path: rates_dir_str.clone(),
        })?;

        let mut rates = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: rates_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml" || ext == "yml") {
                rates.push(Self::load_yaml::<RateConfig>(&path)?);
            }
        }

        if rates.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no rate files found)", rates_dir_str),
            });
        }

        Ok(rates)
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &CrewConfig {
        &self.config
    }

    /// Gets the rate entry for a position on a given date.
    pub fn get_rate(&self, position: Position, date: NaiveDate) -> EngineResult<&RateEntry> {
        self.config.rates().lookup(position, date)
    }
}
