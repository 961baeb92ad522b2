//! Memory size and module-count parsing.

use super::round2;
use crate::error::{Result, SpecError};
use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_AMOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*([A-Za-z]*)").expect("amount pattern"));
static GB_AMOUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?) ?GB").expect("GB pattern"));
static MB_AMOUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?) ?MB").expect("MB pattern"));
static MODULE_MULTIPLIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*[x*]").expect("multiplier pattern"));

/// Total memory in GB from "768 GB (24 x 32 GB ...)", "1.5 TB ..." or a bare "768".
pub fn get_total_memory_amount(raw: &str) -> Result<f64> {
    let caps = LEADING_AMOUNT
        .captures(raw)
        .ok_or_else(|| SpecError::parse("Memory Amount", raw))?;
    let value: f64 = caps[1]
        .parse()
        .map_err(|_| SpecError::parse("Memory Amount", raw))?;
    if caps[2].contains('T') {
        Ok(value * 1024.0)
    } else {
        Ok(value)
    }
}

/// Memory in GB from a free-text size where the unit may be GB or MB. A bare
/// number is read as MB.
pub fn parse_described_memory(raw: &str) -> Result<f64> {
    let parse = |s: &str| s.parse::<f64>().map_err(|_| SpecError::parse("Memory Size", raw));

    if let Some(caps) = GB_AMOUNT.captures(raw) {
        return Ok(round2(parse(&caps[1])?));
    }
    if let Some(caps) = MB_AMOUNT.captures(raw) {
        return Ok(round2(parse(&caps[1])? / 1024.0));
    }
    Ok(round2(parse(raw.trim())? / 1024.0))
}

/// Number of memory modules: the sum of every "N x" / "N *" multiplier, 1 when the
/// description names a single unmultiplied module.
pub fn get_memory_number(raw: &str) -> u32 {
    MODULE_MULTIPLIER
        .captures_iter(raw)
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .fold(0u32, u32::saturating_add)
        .max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_amount_units() {
        assert_eq!(get_total_memory_amount("768 GB (24 x 32 GB 2Rx4 PC4-2933Y-R)").unwrap(), 768.0);
        assert_eq!(get_total_memory_amount("2 TB (32 x 64 GB 2Rx4 PC4-3200AA-R)").unwrap(), 2048.0);
        assert_eq!(get_total_memory_amount("1.5 TB (24 x 64 GB)").unwrap(), 1536.0);
        assert_eq!(get_total_memory_amount("64GB").unwrap(), 64.0);
        assert!(get_total_memory_amount("unknown").is_err());
    }

    #[test]
    fn test_total_amount_is_idempotent() {
        let once = get_total_memory_amount("512 GB (16 x 32 GB)").unwrap();
        let twice = get_total_memory_amount(&format!("{}", once as u64)).unwrap();
        assert_eq!(once, twice);
        assert_eq!(get_total_memory_amount("96").unwrap(), 96.0);
    }

    #[test]
    fn test_described_memory() {
        assert_eq!(parse_described_memory("4 GB").unwrap(), 4.0);
        assert_eq!(parse_described_memory("3.5GB").unwrap(), 3.5);
        assert_eq!(parse_described_memory("512 MB").unwrap(), 0.5);
        assert_eq!(parse_described_memory("3072").unwrap(), 3.0);
        assert!(parse_described_memory("lots").is_err());
    }

    #[test]
    fn test_module_count() {
        assert_eq!(get_memory_number("768 GB (24 x 32 GB 2Rx4 PC4-2933Y-R)"), 24);
        assert_eq!(get_memory_number("2 x 8 GB + 2 x 16 GB"), 4);
        assert_eq!(get_memory_number("8*4GB DDR3"), 8);
        assert_eq!(get_memory_number("One 16 GB DIMM"), 1);
    }

    #[test]
    fn test_module_count_saturates() {
        assert_eq!(get_memory_number("4294967295 x 1 GB + 2 x 8 GB"), u32::MAX);
    }
}
