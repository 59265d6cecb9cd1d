use chrono::{DateTime, NaiveDate, NaiveDateTime};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::parser::normalize_text;
use super::price_table::parse_selector;
use super::NewsSourceConfig;
use crate::error::ExtractionError;
use crate::models::news::NewNewsItem;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y.%m.%d %H:%M",
    "%Y.%m.%d. %H:%M",
    "%Y/%m/%d %H:%M",
    "%b %d, %Y %I:%M %p",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y.%m.%d", "%Y.%m.%d.", "%Y/%m/%d", "%b %d, %Y"];

struct NewsSelectors {
    item: Selector,
    title: Selector,
    link: Option<Selector>,
    any_link: Selector,
    description: Option<Selector>,
    time: Option<Selector>,
}

impl NewsSelectors {
    fn from_config(source: &NewsSourceConfig) -> Result<Self, ExtractionError> {
        let optional = |s: &Option<String>| s.as_deref().map(parse_selector).transpose();

        Ok(Self {
            item: parse_selector(&source.item_selector)?,
            title: parse_selector(&source.title_selector)?,
            link: optional(&source.link_selector)?,
            any_link: parse_selector("a[href]")?,
            description: optional(&source.description_selector)?,
            time: optional(&source.time_selector)?,
        })
    }
}

/// Extract the stories listed on one news page.
///
/// Stories without a title or link are skipped; a page with no matching
/// items yields an empty list. `scraped_at` is used when a story carries no
/// parseable publish time.
pub fn extract_news(
    html: &str,
    source: &NewsSourceConfig,
    scraped_at: NaiveDateTime,
) -> Result<Vec<NewNewsItem>, ExtractionError> {
    let selectors = NewsSelectors::from_config(source)?;
    let base = Url::parse(&source.url).ok();
    let document = Html::parse_document(html);

    let mut items = Vec::new();

    for element in document.select(&selectors.item) {
        let Some(title) = element
            .select(&selectors.title)
            .next()
            .map(|t| normalize_text(&t.text().collect::<String>()))
            .filter(|t| !t.is_empty())
        else {
            tracing::debug!(source = %source.name, "Skipping news item without title");
            continue;
        };

        let Some(url) = find_link(element, &selectors).and_then(|href| resolve_link(base.as_ref(), href))
        else {
            tracing::debug!(source = %source.name, title = %title, "Skipping news item without link");
            continue;
        };

        let description = selectors
            .description
            .as_ref()
            .and_then(|s| element.select(s).next())
            .map(|d| normalize_text(&d.text().collect::<String>()))
            .filter(|d| !d.is_empty());

        let published_at = selectors
            .time
            .as_ref()
            .and_then(|s| element.select(s).next())
            .and_then(|t| {
                t.value()
                    .attr("datetime")
                    .and_then(parse_published_at)
                    .or_else(|| parse_published_at(&t.text().collect::<String>()))
            })
            .unwrap_or(scraped_at);

        items.push(NewNewsItem {
            title,
            description,
            url,
            source: source.name.clone(),
            published_at,
            category: source.category.clone(),
        });
    }

    Ok(items)
}

fn find_link<'a>(element: ElementRef<'a>, selectors: &NewsSelectors) -> Option<&'a str> {
    if let Some(link) = &selectors.link {
        return element.select(link).next().and_then(|a| a.value().attr("href"));
    }

    if element.value().name() == "a" {
        if let Some(href) = element.value().attr("href") {
            return Some(href);
        }
    }

    element
        .select(&selectors.any_link)
        .next()
        .and_then(|a| a.value().attr("href"))
}

/// Absolute form of `href`, resolved against the listing page.
fn resolve_link(base: Option<&Url>, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }

    match Url::parse(href) {
        Ok(absolute) => Some(absolute.to_string()),
        Err(_) => base.and_then(|b| b.join(href).ok()).map(|u| u.to_string()),
    }
}

/// Accepts RFC 3339 / RFC 2822 and the common listing formats. Timezone
/// offsets are converted to UTC; naive values are taken as-is.
pub fn parse_published_at(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.naive_utc());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
