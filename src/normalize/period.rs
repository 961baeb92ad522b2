//! Submission period encoded in result URL suffixes ("res2018q1/cpu2017-...").

use crate::error::{Result, SpecError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionPeriod {
    pub year: u32,
    pub quarter: u32,
}

/// Positional read of `resYYYYqQ`. Anything else is a structural error.
pub fn parse_submission_period(url_suffix: &str) -> Result<SubmissionPeriod> {
    let malformed = || SpecError::MalformedUrlSuffix(url_suffix.to_string());

    let segment = url_suffix.split('/').next().unwrap_or_default();
    if !segment.starts_with("res") || segment.len() < 8 || !segment.is_ascii() {
        return Err(malformed());
    }

    let year = segment[3..7].parse::<u32>().map_err(|_| malformed())?;
    let quarter = segment[segment.len() - 1..]
        .parse::<u32>()
        .map_err(|_| malformed())?;

    Ok(SubmissionPeriod { year, quarter })
}

pub fn get_submit_year(url_suffix: &str) -> Result<u32> {
    parse_submission_period(url_suffix).map(|p| p.year)
}

pub fn get_submit_quarter(url_suffix: &str) -> Result<u32> {
    parse_submission_period(url_suffix).map(|p| p.quarter)
}

/// Absolute result URL for a suffix relative to a family's results directory.
pub fn get_full_url(results_base: &str, url_suffix: &str) -> String {
    format!(
        "{}/{}",
        results_base.trim_end_matches('/'),
        url_suffix.trim_start_matches('/')
    )
}
