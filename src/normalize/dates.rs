//! Date parsers for the three layouts found on result pages.
//!
//! Each family's pages use a known layout, so callers pick the parser; nothing here
//! sniffs the format. Output is always `YYYY-M-D` without zero-padding.

use crate::error::{Result, SpecError};
use chrono::{Datelike, NaiveDate};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Submitters once typed "Spe" for September; corrected here and nowhere else.
const MONTH_TYPO: (&str, &str) = ("Spe", "Sep");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// "Mon-YYYY", "YYYY.M", "Mon YYYY", "YYYY"
    MonthYear,
    /// "Mon D, YYYY", "YYYY/MM/DD", "DD.MM.YYYY"
    FullDate,
    /// "Www Mon D HH:MM:SS TZ YYYY"
    Timestamp,
}

impl DateFormat {
    fn label(&self) -> &'static str {
        match self {
            DateFormat::MonthYear => "month-year",
            DateFormat::FullDate => "full-date",
            DateFormat::Timestamp => "timestamp",
        }
    }

    pub fn parse(&self, raw: &str) -> Result<NaiveDate> {
        let parsed = match self {
            DateFormat::MonthYear => parse_month_year(raw.trim()),
            DateFormat::FullDate => parse_full_date(raw.trim()),
            DateFormat::Timestamp => parse_timestamp(raw.trim()),
        };
        parsed.ok_or_else(|| SpecError::UnrecognizedDate {
            format: self.label(),
            value: raw.to_string(),
        })
    }

    /// Parses and renders in the canonical unpadded form.
    pub fn clean(&self, raw: &str) -> Result<String> {
        self.parse(raw).map(|date| format_date(&date))
    }
}

pub fn format_date(date: &NaiveDate) -> String {
    format!("{}-{}-{}", date.year(), date.month(), date.day())
}

pub fn clean_date_1(raw: &str) -> Result<String> {
    DateFormat::MonthYear.clean(raw)
}

pub fn clean_date_2(raw: &str) -> Result<String> {
    DateFormat::FullDate.clean(raw)
}

pub fn clean_date_3(raw: &str) -> Result<String> {
    DateFormat::Timestamp.clean(raw)
}

/// Month number from an English month name or abbreviation.
fn month_from_name(name: &str) -> Option<u32> {
    let prefix = name.get(..3)?;
    MONTHS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(prefix))
        .map(|i| i as u32 + 1)
}

fn month_name(number: u32) -> Option<&'static str> {
    MONTHS.get(number.checked_sub(1)? as usize).copied()
}

/// Month number checked against the name table.
fn month_from_number(raw: &str) -> Option<u32> {
    let number: u32 = raw.trim().parse().ok()?;
    month_from_name(month_name(number)?)
}

/// Four-digit year, with two-digit years read as 20YY.
fn normalize_year(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    if !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    match raw.len() {
        2 => format!("20{raw}").parse().ok(),
        4 => raw.parse().ok(),
        _ => None,
    }
}

fn parse_month_year(raw: &str) -> Option<NaiveDate> {
    let (year, month) = if let Some((mon, year)) = raw.split_once('-') {
        (normalize_year(year)?, month_from_name(mon.trim())?)
    } else if let Some((year, month)) = raw.split_once('.') {
        (normalize_year(year)?, month_from_number(month)?)
    } else if let Some((mon, year)) = raw.split_once(char::is_whitespace) {
        (normalize_year(year)?, month_from_name(mon.trim())?)
    } else {
        (normalize_year(raw)?, 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn parse_full_date(raw: &str) -> Option<NaiveDate> {
    let corrected;
    let raw = match raw.strip_prefix(MONTH_TYPO.0) {
        Some(rest) => {
            corrected = format!("{}{}", MONTH_TYPO.1, rest);
            corrected.as_str()
        }
        None => raw,
    };

    let (year, month, day) = if raw.contains('/') {
        let parts: Vec<&str> = raw.split('/').collect();
        if parts.len() != 3 {
            return None;
        }
        (normalize_year(parts[0])?, month_from_number(parts[1])?, parts[2].trim().parse().ok()?)
    } else if raw.contains('.') {
        let parts: Vec<&str> = raw.split('.').collect();
        if parts.len() != 3 {
            return None;
        }
        (normalize_year(parts[2])?, month_from_number(parts[1])?, parts[0].trim().parse().ok()?)
    } else {
        let cleaned = raw.replace(',', " ");
        let parts: Vec<&str> = cleaned.split_whitespace().collect();
        if parts.len() != 3 {
            return None;
        }
        (normalize_year(parts[2])?, month_from_name(parts[0])?, parts[1].parse().ok()?)
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_timestamp(raw: &str) -> Option<NaiveDate> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    if tokens.len() < 6 {
        return None;
    }
    let month = month_from_name(tokens[1])?;
    let day: u32 = tokens[2].parse().ok()?;
    let year = normalize_year(tokens[5])?;
    NaiveDate::from_ymd_opt(year, month, day)
}
