use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

use super::{element_text, Selectors};
use crate::config::ChartConfig;
use crate::domain::ChartListing;
use crate::error::Result;

static BRAND_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^Billboard\s+").unwrap());
static TRADEMARK_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*™$").unwrap());
static BARE_CHART_LABEL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^Charts?$").unwrap());

/// Category identifiers from the index page's chart navigation: nav items
/// carrying the category marker class, with the identifier in the anchor's
/// `rel` attribute. An empty result means the index layout changed and the
/// caller should fall back to scanning the page for chart links directly.
pub fn extract_category_ids(markup: &str) -> Result<Vec<String>> {
    let selectors = Selectors::new()?;
    let document = Html::parse_document(markup);

    let mut ids = Vec::new();
    for item in document.select(&selectors.category_item) {
        let link = match item.select(&selectors.category_link).next() {
            Some(link) => link,
            None => continue,
        };
        match link.value().attr("rel") {
            Some(rel) if !rel.is_empty() => ids.push(rel.to_string()),
            _ => {}
        }
    }
    Ok(ids)
}

/// Chart links found directly on the index page. Display names come from the
/// anchor's own text, else are derived from the URL.
pub fn extract_index_charts(markup: &str, config: &ChartConfig) -> Result<Vec<ChartListing>> {
    let selectors = Selectors::new()?;
    let document = Html::parse_document(markup);
    Ok(collect_chart_links(&document, &selectors, config, false))
}

/// Chart links inside one category's AJAX fragment. Display names prefer a
/// nested title/label node, else are derived from the URL.
pub fn extract_fragment_charts(fragment: &str, config: &ChartConfig) -> Result<Vec<ChartListing>> {
    let selectors = Selectors::new()?;
    let document = Html::parse_fragment(fragment);
    Ok(collect_chart_links(&document, &selectors, config, true))
}

/// Drops listings whose URL was already seen, keeping first-insertion order.
pub fn dedup_by_url(listings: Vec<ChartListing>) -> Vec<ChartListing> {
    let mut seen = HashSet::new();
    listings
        .into_iter()
        .filter(|listing| seen.insert(listing.url.clone()))
        .collect()
}

fn collect_chart_links(
    document: &Html,
    selectors: &Selectors,
    config: &ChartConfig,
    prefer_nested_label: bool,
) -> Vec<ChartListing> {
    let mut listings = Vec::new();

    for link in document.select(&selectors.anchor) {
        let href = match link.value().attr("href") {
            Some(href) => href,
            None => continue,
        };
        if !href.starts_with(config.charts_path.as_str()) {
            continue;
        }

        let raw_name = if prefer_nested_label {
            link.select(&selectors.link_name)
                .next()
                .map(element_text)
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| name_from_url(href))
        } else {
            let text = element_text(link);
            if text.is_empty() {
                name_from_url(href)
            } else {
                text
            }
        };

        let name = normalize_name(&raw_name);
        if name.is_empty() {
            continue;
        }

        listings.push(ChartListing {
            name,
            url: config.absolute_url(href),
        });
    }

    listings
}

/// Last path segment with dashes as spaces and each word capitalized,
/// e.g. `/charts/artist-100` becomes "Artist 100".
fn name_from_url(href: &str) -> String {
    href.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("")
        .split('-')
        .filter(|part| !part.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Strips the brand prefix and trademark glyph; a bare "Chart(s)" label is
/// boilerplate, not a name.
fn normalize_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_prefix = BRAND_PREFIX_RE.replace(trimmed, "");
    let without_suffix = TRADEMARK_SUFFIX_RE.replace(&without_prefix, "");
    if BARE_CHART_LABEL_RE.is_match(&without_suffix) {
        return String::new();
    }
    without_suffix.trim().to_string()
}
