mod catalog;
mod chart;

pub use catalog::ChartListing;
pub use chart::{ChartEntry, ChartSnapshot, PositionHistory, WeekRef};
