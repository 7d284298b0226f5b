//! Configuration loading and management for the crew pay engine.
//!
//! This module provides functionality to load the pay configuration from
//! YAML files: airline metadata, the non-flight duty-code table, and the
//! versioned rate table.
//!
//! # Example
//!
//! ```no_run
//! use crew_pay_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/crew").unwrap();
//! println!("Loaded airline: {}", config.config().airline().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AirlineMetadata, CrewConfig, DutyCode, DutyCodeEntry, DutyCodeTable, DutyCodesConfig,
    RateConfig, RateEntry, RateTable, tokenize,
};
