use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;

/// Escape set matching JavaScript's `encodeURIComponent`: everything but
/// ASCII alphanumerics and `-_.!~*'()`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const DEFAULT_BASE_URL: &str = "http://www.billboard.com";
const DEFAULT_CHARTS_PATH: &str = "/charts/";
const DEFAULT_CATEGORY_URL_PREFIX: &str =
    "http://www.billboard.com/pmc-ajax/charts-fetch-all-chart/selected_category-";
const DEFAULT_CATEGORY_URL_SUFFIX: &str = "/chart_type-weekly/";

/// Labels that share the artist's markup class but carry chart metadata.
/// Any candidate containing one of these is rejected during artist detection.
const DEFAULT_ARTIST_EXCLUDE_KEYWORDS: [&str; 11] = [
    "LW",
    "PEAK",
    "WEEKS",
    "Debut",
    "Peak",
    "Share",
    "Credits",
    "Songwriter",
    "Producer",
    "Imprint",
    "Label",
];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub base_url: String,
    pub charts_path: String,
    pub category_url_prefix: String,
    pub category_url_suffix: String,
    pub artist_exclude_keywords: Vec<String>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            charts_path: DEFAULT_CHARTS_PATH.to_string(),
            category_url_prefix: DEFAULT_CATEGORY_URL_PREFIX.to_string(),
            category_url_suffix: DEFAULT_CATEGORY_URL_SUFFIX.to_string(),
            artist_exclude_keywords: DEFAULT_ARTIST_EXCLUDE_KEYWORDS
                .iter()
                .map(|keyword| keyword.to_string())
                .collect(),
        }
    }
}

impl ChartConfig {
    /// Index page listing every chart, e.g. `http://www.billboard.com/charts/`.
    pub fn charts_url(&self) -> String {
        format!("{}{}", self.base_url, self.charts_path)
    }

    /// Page for one chart and week. An empty `week` requests the current week.
    pub fn chart_url(&self, chart: &str, week: &str) -> String {
        format!("{}{}/{}", self.charts_url(), chart, week)
    }

    /// AJAX endpoint returning the chart list fragment for one category.
    pub fn category_url(&self, category_id: &str) -> String {
        let encoded = utf8_percent_encode(category_id, URI_COMPONENT);
        format!(
            "{}{}{}",
            self.category_url_prefix, encoded, self.category_url_suffix
        )
    }

    pub fn absolute_url(&self, href: &str) -> String {
        format!("{}{}", self.base_url, href)
    }
}
