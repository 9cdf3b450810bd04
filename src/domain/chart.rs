use serde::{Deserialize, Serialize};

/// One chart for one week, as extracted from the rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSnapshot {
    /// ISO date of the week the chart covers.
    pub week: String,
    pub previous_week: WeekRef,
    pub next_week: WeekRef,
    /// Rank-ascending; document order on the page is the rank order.
    pub entries: Vec<ChartEntry>,
}

/// Link to a neighboring week of the same chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekRef {
    pub date: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartEntry {
    pub rank: u32,
    /// Absent on artist-ranking charts, where the ranked label is the
    /// performer itself and lands in `artist`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub artist: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    pub position: PositionHistory,
}

/// Historical position metrics. Zero means the page did not carry the block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionHistory {
    pub position_last_week: u32,
    pub peak_position: u32,
    pub weeks_on_chart: u32,
}
