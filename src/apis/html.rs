//! Selector and cell-text helpers shared by the result-page spiders.

use crate::error::{Result, SpecError};
use scraper::{ElementRef, Html, Selector};

/// Parses a selector literal. Selectors are compile-time constants in every caller,
/// so a bad one is reported as a page error rather than a panic.
pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| SpecError::Page {
        url: String::new(),
        message: format!("invalid selector '{css}': {e:?}"),
    })
}

/// Visible text of a cell: tags and `<br>` dropped, newlines turned into spaces, trimmed.
pub fn cell_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .replace('\n', " ")
        .trim()
        .to_string()
}

/// Text nodes directly under the element, skipping nested markup.
pub fn own_text(element: ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|node| node.value().as_text().map(|t| &**t))
        .collect::<String>()
        .replace('\n', " ")
        .trim()
        .to_string()
}

pub fn first_text(document: &Html, css: &str) -> Result<Option<String>> {
    let sel = selector(css)?;
    Ok(document.select(&sel).next().map(cell_text))
}

pub fn all_texts(document: &Html, css: &str) -> Result<Vec<String>> {
    let sel = selector(css)?;
    Ok(document.select(&sel).map(cell_text).collect())
}

/// A "label link, value cell" row: the key is the first link's text without a
/// trailing colon, the value is the last cell that holds no link.
pub fn keyed_row(row: ElementRef<'_>, link: &Selector, cell: &Selector) -> Option<(String, String)> {
    let key = cell_text(row.select(link).next()?);
    let key = key.trim_end_matches(':').trim().to_string();
    if key.is_empty() {
        return None;
    }
    let value = row
        .select(cell)
        .filter(|td| td.select(link).next().is_none())
        .last()
        .map(cell_text)?;
    Some((key, value))
}

/// Detail page URL: the index URL with its last path segment replaced by `suffix`.
pub fn detail_url(page_url: &str, suffix: &str) -> String {
    match page_url.rsplit_once('/') {
        Some((base, _)) => format!("{}/{}", base, suffix),
        None => suffix.to_string(),
    }
}

/// Key-value pairs from alternating cells ("Key", "Value", "Key", "Value", ...).
pub fn pair_cells(cells: Vec<String>) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(cells.len() / 2);
    let mut iter = cells.into_iter();
    while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
        pairs.push((key, value));
    }
    pairs
}

pub fn page_error(url: &str, message: impl Into<String>) -> SpecError {
    SpecError::Page {
        url: url.to_string(),
        message: message.into(),
    }
}
