use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::config::ChartConfig;
use crate::domain::{ChartListing, ChartSnapshot};
use crate::error::{ChartError, Result};
use crate::scrapers::catalog::{
    dedup_by_url, extract_category_ids, extract_fragment_charts, extract_index_charts,
};
use crate::scrapers::chart::extract_snapshot;

/// Chart requested when the caller does not name one.
pub const DEFAULT_CHART: &str = "hot-100";

/// Envelope wrapping each category's AJAX response; the fragment markup
/// sits in the `html` field.
#[derive(Debug, Deserialize)]
struct CategoryEnvelope {
    html: String,
}

pub struct ChartService {
    config: ChartConfig,
    client: Client,
}

impl ChartService {
    pub fn new() -> Result<Self> {
        Self::with_config(ChartConfig::default())
    }

    pub fn with_config(config: ChartConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()?;
        Ok(Self { config, client })
    }

    /// Snapshot of one chart. `week` is an ISO date; `None` means the
    /// current week.
    pub async fn get_chart(&self, chart: &str, week: Option<&str>) -> Result<ChartSnapshot> {
        let chart = if chart.is_empty() { DEFAULT_CHART } else { chart };
        let url = self.config.chart_url(chart, week.unwrap_or(""));

        info!("Fetching chart {} from {}", chart, url);
        let markup = self.fetch_text(&url).await?;

        extract_snapshot(&markup, chart, &self.config)
    }

    /// Catalog of every published chart, deduplicated by URL.
    ///
    /// Discovery first reads the category navigation off the index page and
    /// expands each category's AJAX fragment concurrently. When the index
    /// carries no category navigation, the chart links on the page itself
    /// are the catalog.
    pub async fn list_charts(&self) -> Result<Vec<ChartListing>> {
        let index_url = self.config.charts_url();
        info!("Fetching chart index from {}", index_url);
        let markup = self.fetch_text(&index_url).await?;

        let category_ids = extract_category_ids(&markup)?;
        if category_ids.is_empty() {
            let listings = dedup_by_url(extract_index_charts(&markup, &self.config)?);
            if listings.is_empty() {
                return Err(ChartError::NoChartsFound);
            }
            info!("Found {} charts directly on the index page", listings.len());
            return Ok(listings);
        }

        info!("Expanding {} chart categories", category_ids.len());
        let mut tasks = JoinSet::new();
        for category_id in category_ids {
            let url = self.config.category_url(&category_id);
            let client = self.client.clone();
            let config = self.config.clone();
            tasks.spawn(async move {
                match fetch_category_charts(&client, &url, &config).await {
                    Ok(listings) => listings,
                    // A single broken category must not sink the catalog.
                    Err(err) => {
                        warn!("Skipping category {}: {}", url, err);
                        Vec::new()
                    }
                }
            });
        }

        let mut listings = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            if let Ok(category_listings) = joined {
                listings.extend(category_listings);
            }
        }

        let catalog = dedup_by_url(listings);
        if catalog.is_empty() {
            return Err(ChartError::NoChartsFound);
        }
        Ok(catalog)
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

async fn fetch_category_charts(
    client: &Client,
    url: &str,
    config: &ChartConfig,
) -> Result<Vec<ChartListing>> {
    let body = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    let envelope: CategoryEnvelope = serde_json::from_str(&body)?;
    extract_fragment_charts(&envelope.html, config)
}
