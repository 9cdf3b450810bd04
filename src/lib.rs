//! Scrapes Billboard chart pages into structured weekly snapshots and
//! discovers the set of published charts.

pub mod config;
pub mod domain;
pub mod error;
pub mod scrapers;
pub mod services;

pub use config::ChartConfig;
pub use domain::{ChartEntry, ChartListing, ChartSnapshot, PositionHistory, WeekRef};
pub use error::{ChartError, Result};
pub use services::charts::{ChartService, DEFAULT_CHART};
