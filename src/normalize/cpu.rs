//! CPU vendor classification and clock-speed parsing.

use super::round2;
use crate::error::{Result, SpecError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static GHZ_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*GHz").expect("GHz pattern"));
static MHZ_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*MHz").expect("MHz pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuVendor {
    Intel,
    Amd,
    Huawei,
    Other,
}

impl CpuVendor {
    pub fn as_str(&self) -> &'static str {
        match self {
            CpuVendor::Intel => "Intel",
            CpuVendor::Amd => "AMD",
            CpuVendor::Huawei => "Huawei",
            CpuVendor::Other => "Other",
        }
    }
}

impl fmt::Display for CpuVendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a CPU model string by its first whitespace-delimited token.
pub fn get_cpu_vendor(cpu_name: &str) -> CpuVendor {
    match cpu_name.split_whitespace().next() {
        Some("Intel") => CpuVendor::Intel,
        Some("AMD") => CpuVendor::Amd,
        Some("Huawei") => CpuVendor::Huawei,
        _ => CpuVendor::Other,
    }
}

pub fn mhz_to_ghz(mhz: f64) -> f64 {
    round2(mhz / 1000.0)
}

/// Converts a plain MHz column value such as "2100" or "2100.0" to GHz.
pub fn parse_mhz_to_ghz(raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map(mhz_to_ghz)
        .map_err(|_| SpecError::parse("CPU MHz", raw))
}

/// Parses a frequency that is either "2.93 GHz" or a bare MHz figure.
pub fn parse_frequency(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    match trimmed.strip_suffix("GHz") {
        Some(ghz) => ghz
            .trim()
            .parse::<f64>()
            .map(round2)
            .map_err(|_| SpecError::parse("CPU frequency", raw)),
        None => trimmed
            .parse::<f64>()
            .map(mhz_to_ghz)
            .map_err(|_| SpecError::parse("CPU frequency", raw)),
    }
}

/// Pulls a clock speed in GHz out of free text, GHz figures first, then MHz.
/// Returns `0.0` when the text carries no clock at all.
pub fn parse_cpu_char(text: &str) -> f64 {
    if let Some(caps) = GHZ_VALUE.captures(text) {
        if let Ok(ghz) = caps[1].parse::<f64>() {
            return round2(ghz);
        }
    }
    if let Some(caps) = MHZ_VALUE.captures(text) {
        if let Ok(mhz) = caps[1].parse::<f64>() {
            return mhz_to_ghz(mhz);
        }
    }
    0.0
}

/// Replaces a missing or sub-nominal max clock with the nominal clock.
pub fn apply_clock_fallback(max_ghz: f64, nominal_ghz: f64) -> f64 {
    if max_ghz == 0.0 || max_ghz < nominal_ghz {
        nominal_ghz
    } else {
        max_ghz
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Intel Xeon Gold 6252", CpuVendor::Intel)]
    #[case("AMD EPYC 7742", CpuVendor::Amd)]
    #[case("Huawei Kunpeng 920", CpuVendor::Huawei)]
    #[case("IBM POWER9", CpuVendor::Other)]
    #[case("  Intel  Xeon", CpuVendor::Intel)]
    #[case("", CpuVendor::Other)]
    fn test_cpu_vendor(#[case] name: &str, #[case] expected: CpuVendor) {
        assert_eq!(get_cpu_vendor(name), expected);
    }

    #[test]
    fn test_mhz_to_ghz_rounds_to_two_places() {
        for mhz in [2100.0, 2933.0, 3466.67, 1000.0, 0.0, 2666.5] {
            assert_eq!(mhz_to_ghz(mhz), (mhz / 1000.0 * 100.0_f64).round() / 100.0);
        }
        assert_eq!(mhz_to_ghz(2933.0), 2.93);
    }

    #[test]
    fn test_frequency_accepts_ghz_and_mhz() {
        assert_eq!(parse_frequency("2.93 GHz").unwrap(), 2.93);
        assert_eq!(parse_frequency("3GHz").unwrap(), 3.0);
        assert_eq!(parse_frequency("2667").unwrap(), 2.67);
        assert!(parse_frequency("fast").is_err());
    }

    #[test]
    fn test_characteristics_clock() {
        assert_eq!(parse_cpu_char("Intel Turbo Boost Technology up to 3.90 GHz"), 3.9);
        assert_eq!(parse_cpu_char("Max Boost Clock up to 3400 MHz"), 3.4);
        assert_eq!(parse_cpu_char("Quad-Core, 1333MHz system bus"), 1.33);
        assert_eq!(parse_cpu_char("Turbo Boost Technology disabled"), 0.0);
    }

    #[test]
    fn test_fallback_never_goes_below_nominal() {
        assert_eq!(apply_clock_fallback(0.0, 2.1), 2.1);
        assert_eq!(apply_clock_fallback(1.6, 2.1), 2.1);
        assert_eq!(apply_clock_fallback(3.7, 2.1), 3.7);
    }
}
