use chrono::{Duration, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};
use tracing::debug;

use super::{direct_text, element_text, Selectors};
use crate::config::ChartConfig;
use crate::domain::{ChartEntry, ChartSnapshot, PositionHistory, WeekRef};
use crate::error::{ChartError, Result};

static WEEK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Week of (.+)").unwrap());

/// Date form used in the week heading, e.g. "November 19, 2016".
const WEEK_HEADING_FORMAT: &str = "%B %d, %Y";
const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Extracts the chart snapshot for one week out of the rendered chart page.
///
/// Rows missing a rank or a title are layout artifacts and are skipped
/// silently; a page yielding fewer than two entries is a failure.
pub fn extract_snapshot(
    markup: &str,
    chart: &str,
    config: &ChartConfig,
) -> Result<ChartSnapshot> {
    let selectors = Selectors::new()?;
    let document = Html::parse_document(markup);

    let week = resolve_week(&document, &selectors);
    let previous_week = week - Duration::days(7);
    let next_week = week + Duration::days(7);

    let mut entries = Vec::new();
    for (index, row) in document.select(&selectors.row).enumerate() {
        match extract_row(row, &selectors, config) {
            Some(entry) => entries.push(entry),
            None => debug!("Skipping row {} without rank or title", index),
        }
    }

    if entries.len() < 2 {
        return Err(ChartError::NoEntriesFound);
    }

    Ok(ChartSnapshot {
        week: week.format(ISO_DATE_FORMAT).to_string(),
        previous_week: week_ref(previous_week, chart, config),
        next_week: week_ref(next_week, chart, config),
        entries,
    })
}

/// First heading containing the "Week of " marker wins. A page without one
/// (or with an unparsable date) falls back to today rather than failing the
/// whole snapshot.
fn resolve_week(document: &Html, selectors: &Selectors) -> NaiveDate {
    document
        .select(&selectors.week_heading)
        .map(element_text)
        .find(|text| text.contains("Week of "))
        .and_then(|text| {
            let captures = WEEK_RE.captures(&text)?;
            NaiveDate::parse_from_str(captures[1].trim(), WEEK_HEADING_FORMAT).ok()
        })
        .unwrap_or_else(|| Local::now().date_naive())
}

fn week_ref(date: NaiveDate, chart: &str, config: &ChartConfig) -> WeekRef {
    let date = date.format(ISO_DATE_FORMAT).to_string();
    let url = config.chart_url(chart, &date);
    WeekRef { date, url }
}

fn extract_row(
    row: ElementRef<'_>,
    selectors: &Selectors,
    config: &ChartConfig,
) -> Option<ChartEntry> {
    let rank_text = row.select(&selectors.rank).next().map(element_text)?;
    let rank: u32 = rank_text.parse().ok()?;

    let title = direct_text(row.select(&selectors.title).next()?);

    let artist = row
        .select(&selectors.label)
        .map(element_text)
        .find(|text| is_artist_candidate(text, rank, &config.artist_exclude_keywords));

    let cover = row
        .select(&selectors.cover)
        .next()
        .and_then(|image| image.value().attr("data-lazy-src"))
        .map(str::to_string);

    let position = PositionHistory {
        position_last_week: metric_value(row, "LW", selectors),
        peak_position: metric_value(row, "PEAK", selectors),
        weeks_on_chart: metric_value(row, "WEEKS", selectors),
    };

    let entry = match artist {
        Some(artist) => ChartEntry {
            rank,
            title: Some(title),
            artist,
            cover,
            position,
        },
        // No freestanding artist label: this is an artist-ranking chart and
        // the title slot holds the performer.
        None => ChartEntry {
            rank,
            title: None,
            artist: title,
            cover,
            position,
        },
    };
    Some(entry)
}

/// The artist label shares its markup class with the rank and the chart
/// metadata labels; text content is the only discriminator.
fn is_artist_candidate(text: &str, rank: u32, exclude_keywords: &[String]) -> bool {
    if text.is_empty() || text == rank.to_string() {
        return false;
    }
    !exclude_keywords
        .iter()
        .any(|keyword| text.contains(keyword.as_str()))
}

/// Reads one labeled position block ("LW", "PEAK", "WEEKS"): the span
/// carrying the label, its next sibling element, the nested value label.
/// Each metric resolves independently and defaults to zero.
fn metric_value(row: ElementRef<'_>, label: &str, selectors: &Selectors) -> u32 {
    row.select(&selectors.span)
        .find(|span| element_text(*span).contains(label))
        .and_then(next_element)
        .and_then(|sibling| sibling.select(&selectors.metric_value).next())
        .map(element_text)
        .and_then(|text| text.parse().ok())
        .unwrap_or(0)
}

fn next_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.next_siblings().find_map(ElementRef::wrap)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ChartConfig {
        ChartConfig::default()
    }

    fn metric_block(label: &str, value: u32) -> String {
        format!(
            r#"<span class="c-label">{label}</span><div><span class="c-label">{value}</span></div>"#
        )
    }

    fn song_row(rank: u32, title: &str, artist: &str, lw: u32, peak: u32, weeks: u32) -> String {
        format!(
            r#"<div class="o-chart-results-list-row-container"><ul>
                <li><span class="c-label">{rank}</span></li>
                <li>
                    <h3 class="c-title">{title}</h3>
                    <span class="c-label">{artist}</span>
                    <img data-lazy-src="https://charts-static.example.com/{rank}.jpg"/>
                    {lw_block}
                    {peak_block}
                    {weeks_block}
                </li>
            </ul></div>"#,
            lw_block = metric_block("LW", lw),
            peak_block = metric_block("PEAK", peak),
            weeks_block = metric_block("WEEKS", weeks),
        )
    }

    fn page(heading: &str, rows: &str) -> String {
        format!("<html><body>{heading}<div>{rows}</div></body></html>")
    }

    const HEADING: &str = r#"<h2 class="c-heading">Week of November 19, 2016</h2>"#;

    #[test]
    fn parses_week_and_neighbor_links() {
        let rows = format!(
            "{}{}",
            song_row(1, "Closer", "The Chainsmokers", 1, 1, 14),
            song_row(2, "Starboy", "The Weeknd", 3, 2, 8),
        );
        let snapshot = extract_snapshot(&page(HEADING, &rows), "hot-100", &config()).unwrap();

        assert_eq!(snapshot.week, "2016-11-19");
        assert_eq!(snapshot.previous_week.date, "2016-11-12");
        assert_eq!(
            snapshot.previous_week.url,
            "http://www.billboard.com/charts/hot-100/2016-11-12"
        );
        assert_eq!(snapshot.next_week.date, "2016-11-26");
        assert_eq!(
            snapshot.next_week.url,
            "http://www.billboard.com/charts/hot-100/2016-11-26"
        );
    }

    #[test]
    fn missing_heading_falls_back_to_today() {
        let rows = format!(
            "{}{}",
            song_row(1, "Closer", "The Chainsmokers", 1, 1, 14),
            song_row(2, "Starboy", "The Weeknd", 3, 2, 8),
        );
        let snapshot = extract_snapshot(&page("", &rows), "hot-100", &config()).unwrap();
        let today = Local::now().date_naive().format(ISO_DATE_FORMAT).to_string();
        assert_eq!(snapshot.week, today);
    }

    #[test]
    fn extracts_row_fields() {
        let rows = format!(
            "{}{}",
            song_row(1, "Closer", "The Chainsmokers Featuring Halsey", 1, 1, 14),
            song_row(2, "Starboy", "The Weeknd", 3, 2, 8),
        );
        let snapshot = extract_snapshot(&page(HEADING, &rows), "hot-100", &config()).unwrap();

        let first = &snapshot.entries[0];
        assert_eq!(first.rank, 1);
        assert_eq!(first.title.as_deref(), Some("Closer"));
        assert_eq!(first.artist, "The Chainsmokers Featuring Halsey");
        assert_eq!(
            first.cover.as_deref(),
            Some("https://charts-static.example.com/1.jpg")
        );
        assert_eq!(
            first.position,
            PositionHistory {
                position_last_week: 1,
                peak_position: 1,
                weeks_on_chart: 14
            }
        );
    }

    #[test]
    fn title_keeps_only_direct_text() {
        let row = r#"<div class="o-chart-results-list-row-container"><ul>
            <li><span class="c-label">1</span></li>
            <li>
                <h3 class="c-title">Closer <span class="c-badge">NEW</span></h3>
                <span class="c-label">The Chainsmokers</span>
            </li>
        </ul></div>"#;
        let rows = format!("{}{}", row, song_row(2, "Starboy", "The Weeknd", 3, 2, 8));
        let snapshot = extract_snapshot(&page(HEADING, &rows), "hot-100", &config()).unwrap();
        assert_eq!(snapshot.entries[0].title.as_deref(), Some("Closer"));
    }

    #[test]
    fn row_without_numeric_rank_is_skipped() {
        let ad_row = r#"<div class="o-chart-results-list-row-container"><ul>
            <li><span class="c-label">Sponsored</span></li>
            <li><h3 class="c-title">Not a song</h3></li>
        </ul></div>"#;
        let rows = format!(
            "{}{}{}",
            song_row(1, "Closer", "The Chainsmokers", 1, 1, 14),
            ad_row,
            song_row(2, "Starboy", "The Weeknd", 3, 2, 8),
        );
        let snapshot = extract_snapshot(&page(HEADING, &rows), "hot-100", &config()).unwrap();
        assert_eq!(snapshot.entries.len(), 2);
        assert_eq!(snapshot.entries[1].rank, 2);
    }

    #[test]
    fn row_without_title_is_skipped() {
        let bare_row = r#"<div class="o-chart-results-list-row-container"><ul>
            <li><span class="c-label">3</span></li>
        </ul></div>"#;
        let rows = format!(
            "{}{}{}",
            song_row(1, "Closer", "The Chainsmokers", 1, 1, 14),
            song_row(2, "Starboy", "The Weeknd", 3, 2, 8),
            bare_row,
        );
        let snapshot = extract_snapshot(&page(HEADING, &rows), "hot-100", &config()).unwrap();
        assert_eq!(snapshot.entries.len(), 2);
    }

    #[test]
    fn metadata_labels_are_not_artists() {
        // Rank, empty and metadata labels all precede the real artist.
        let row = r#"<div class="o-chart-results-list-row-container"><ul>
            <li><span class="c-label">1</span></li>
            <li>
                <h3 class="c-title">Closer</h3>
                <span class="c-label"></span>
                <span class="c-label">Debut</span>
                <span class="c-label">Imprint/Promotion Label</span>
                <span class="c-label">The Chainsmokers</span>
            </li>
        </ul></div>"#;
        let rows = format!("{}{}", row, song_row(2, "Starboy", "The Weeknd", 3, 2, 8));
        let snapshot = extract_snapshot(&page(HEADING, &rows), "hot-100", &config()).unwrap();
        assert_eq!(snapshot.entries[0].artist, "The Chainsmokers");
    }

    #[test]
    fn artist_chart_row_moves_title_into_artist() {
        let artist_row = r#"<div class="o-chart-results-list-row-container"><ul>
            <li><span class="c-label">1</span></li>
            <li><h3 class="c-title">Taylor Swift</h3></li>
        </ul></div>"#;
        let rows = format!(
            "{}{}",
            artist_row,
            song_row(2, "Starboy", "The Weeknd", 3, 2, 8),
        );
        let snapshot = extract_snapshot(&page(HEADING, &rows), "artist-100", &config()).unwrap();
        assert_eq!(snapshot.entries[0].title, None);
        assert_eq!(snapshot.entries[0].artist, "Taylor Swift");
    }

    #[test]
    fn missing_cover_is_tolerated() {
        let row = r#"<div class="o-chart-results-list-row-container"><ul>
            <li><span class="c-label">1</span></li>
            <li>
                <h3 class="c-title">Closer</h3>
                <span class="c-label">The Chainsmokers</span>
            </li>
        </ul></div>"#;
        let rows = format!("{}{}", row, song_row(2, "Starboy", "The Weeknd", 3, 2, 8));
        let snapshot = extract_snapshot(&page(HEADING, &rows), "hot-100", &config()).unwrap();
        assert_eq!(snapshot.entries[0].cover, None);
    }

    #[test]
    fn each_metric_defaults_independently() {
        // LW and PEAK present, WEEKS block absent.
        let row = format!(
            r#"<div class="o-chart-results-list-row-container"><ul>
                <li><span class="c-label">1</span></li>
                <li>
                    <h3 class="c-title">Closer</h3>
                    <span class="c-label">The Chainsmokers</span>
                    {}{}
                </li>
            </ul></div>"#,
            metric_block("LW", 4),
            metric_block("PEAK", 2),
        );
        let rows = format!("{}{}", row, song_row(2, "Starboy", "The Weeknd", 3, 2, 8));
        let snapshot = extract_snapshot(&page(HEADING, &rows), "hot-100", &config()).unwrap();
        assert_eq!(
            snapshot.entries[0].position,
            PositionHistory {
                position_last_week: 4,
                peak_position: 2,
                weeks_on_chart: 0
            }
        );
    }

    #[test]
    fn single_row_page_is_a_failure() {
        let rows = song_row(1, "Closer", "The Chainsmokers", 1, 1, 14);
        let result = extract_snapshot(&page(HEADING, &rows), "hot-100", &config());
        assert!(matches!(result, Err(ChartError::NoEntriesFound)));
    }

    #[test]
    fn empty_page_is_a_failure() {
        let result = extract_snapshot(&page(HEADING, ""), "hot-100", &config());
        assert!(matches!(result, Err(ChartError::NoEntriesFound)));
    }
}
