use scraper::{ElementRef, Selector};

use crate::error::{ChartError, Result};

pub mod catalog;
pub mod chart;

/// Every structural rule the extractors rely on, parsed up front.
pub struct Selectors {
    /// Week heading candidates, most specific first.
    pub week_heading: Selector,
    pub row: Selector,
    pub rank: Selector,
    pub title: Selector,
    pub label: Selector,
    pub cover: Selector,
    pub span: Selector,
    pub metric_value: Selector,
    pub category_item: Selector,
    pub category_link: Selector,
    pub anchor: Selector,
    pub link_name: Selector,
}

impl Selectors {
    pub fn new() -> Result<Self> {
        Ok(Self {
            week_heading: parse(".c-heading, h1, h2")?,
            row: parse(".o-chart-results-list-row-container")?,
            rank: parse("li:first-child .c-label")?,
            title: parse("h3.c-title")?,
            label: parse("span.c-label")?,
            cover: parse("img[data-lazy-src]")?,
            span: parse("span")?,
            metric_value: parse(".c-label")?,
            category_item: parse(".o-nav__list-item.lrv-u-color-grey-medium-dark")?,
            category_link: parse(r##"a[href="#"]"##)?,
            anchor: parse("a[href]")?,
            link_name: parse(".c-title, h3, h4, .c-label")?,
        })
    }
}

fn parse(rule: &str) -> Result<Selector> {
    Selector::parse(rule).map_err(|e| ChartError::Selector(e.to_string()))
}

/// Text of the element's whole subtree, trimmed.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Text of the element's immediate text children only. Nested elements may
/// carry unrelated decoration (badges, icons) that must not leak in.
pub(crate) fn direct_text(element: ElementRef<'_>) -> String {
    let text: String = element
        .children()
        .filter_map(|child| child.value().as_text().map(|text| &**text))
        .collect();
    text.trim().to_string()
}
