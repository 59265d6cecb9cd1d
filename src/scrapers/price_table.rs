//! Extraction of the daily silver price from the upstream price table.
//!
//! The page has no semantic markup: the most recent day is the second `tr`
//! of `table.tb-style3` (the first row is the header) and its first four
//! `td` cells are, in order, date, KRW price, USD figure and price per
//! ounce. Upstream layout changes surface as `ExtractionError`s, never as
//! wrong data, so a run of extraction failures in the logs is the signal
//! that this contract needs a new version.

use scraper::{ElementRef, Html, Selector};

use super::parser::parse_grouped_integer;
use crate::error::{ExtractionError, ValidationError};
use crate::models::silver_price::NewPriceObservation;

pub const PRICE_TABLE_SELECTOR: &str = "table.tb-style3";
/// Row 0 is the header
pub const DATA_ROW_INDEX: usize = 1;
pub const REQUIRED_CELLS: usize = 4;

/// Cell texts of the data row, trimmed but otherwise untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPriceRow {
    pub date: String,
    pub price_krw: String,
    pub price_usd: String,
    pub price_ounce: String,
}

/// Turns a fetched page into the raw cells of one price row.
pub trait PriceExtractor: Send + Sync {
    /// Identifies the parsing contract in logs
    fn version(&self) -> &'static str;
    fn extract(&self, html: &str) -> Result<RawPriceRow, ExtractionError>;
}

/// Version 1 of the layout: second row, first four cells.
pub struct TablePositionExtractor {
    table: Selector,
    row: Selector,
    cell: Selector,
    selector_text: String,
}

impl TablePositionExtractor {
    pub fn new() -> Result<Self, ExtractionError> {
        Self::with_table_selector(PRICE_TABLE_SELECTOR)
    }

    pub fn with_table_selector(selector: &str) -> Result<Self, ExtractionError> {
        Ok(Self {
            table: parse_selector(selector)?,
            row: parse_selector("tr")?,
            cell: parse_selector("td")?,
            selector_text: selector.to_string(),
        })
    }
}

impl PriceExtractor for TablePositionExtractor {
    fn version(&self) -> &'static str {
        "table-position-v1"
    }

    fn extract(&self, html: &str) -> Result<RawPriceRow, ExtractionError> {
        let document = Html::parse_document(html);

        let table = document
            .select(&self.table)
            .next()
            .ok_or_else(|| ExtractionError::TableNotFound {
                selector: self.selector_text.clone(),
            })?;

        let rows: Vec<ElementRef> = table.select(&self.row).collect();
        let data_row = rows
            .get(DATA_ROW_INDEX)
            .ok_or(ExtractionError::MissingDataRow { rows: rows.len() })?;

        let cells: Vec<String> = data_row
            .select(&self.cell)
            .take(REQUIRED_CELLS)
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .collect();

        if cells.len() < REQUIRED_CELLS {
            return Err(ExtractionError::IncompleteRow {
                cells: cells.len(),
                expected: REQUIRED_CELLS,
            });
        }

        let mut cells = cells.into_iter();
        Ok(RawPriceRow {
            date: cells.next().unwrap_or_default(),
            price_krw: cells.next().unwrap_or_default(),
            price_usd: cells.next().unwrap_or_default(),
            price_ounce: cells.next().unwrap_or_default(),
        })
    }
}

/// Convert raw cells into an observation. All three prices must parse or
/// nothing is returned; the date is kept verbatim as the storage key.
pub fn normalize_price_row(row: &RawPriceRow) -> Result<NewPriceObservation, ValidationError> {
    if row.date.is_empty() {
        return Err(ValidationError::EmptyField { field: "date" });
    }

    Ok(NewPriceObservation {
        date: row.date.clone(),
        price_krw: parse_grouped_integer("price_krw", &row.price_krw)?,
        price_usd: parse_grouped_integer("price_usd", &row.price_usd)?,
        price_ounce: parse_grouped_integer("price_ounce", &row.price_ounce)?,
    })
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector, ExtractionError> {
    Selector::parse(selector)
        .map_err(|e| ExtractionError::InvalidSelector(format!("`{}`: {:?}", selector, e)))
}
