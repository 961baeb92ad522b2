//! System-series extraction from submitted model strings.
//!
//! Best-effort heuristic: "ProLiant DL380 Gen10 (2.10 GHz, Intel Xeon Gold 6252)"
//! becomes "ProLiant DL380 Gen10". Inputs that are nothing but descriptors come out
//! empty, which callers treat as an unknown series.

use once_cell::sync::Lazy;
use regex::Regex;

/// The one vendor name that submitters routinely repeat at the front of the model.
pub const DUPLICATED_VENDOR_PREFIX: &str = "ASUS ";

static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)").expect("parenthetical pattern"));
static CPU_DESCRIPTOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+(AMD|Intel)\b.*$").expect("cpu descriptor pattern"));
static CLOCK_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(\.\d+)?\s*GHz").expect("clock token pattern"));
static LEADING_REMNANT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\S*(GHz|Core)\s+").expect("leading remnant pattern"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

pub fn parse_system_name(raw: &str) -> String {
    let without_asides = PARENTHETICAL.replace_all(raw, "");
    let head = without_asides.split(',').next().unwrap_or_default();
    let head = CPU_DESCRIPTOR.replace(head.trim(), "");
    let head = CLOCK_TOKEN.replace_all(&head, "");
    let collapsed = WHITESPACE.replace_all(head.trim(), " ");
    let series = collapsed
        .strip_prefix(DUPLICATED_VENDOR_PREFIX)
        .unwrap_or(&*collapsed);
    LEADING_REMNANT.replace(series, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ProLiant DL380 Gen10 (2.10 GHz, Intel Xeon Gold 6252)", "ProLiant DL380 Gen10")]
    #[case("PowerEdge R740 (Intel Xeon Gold 6248, 2.50 GHz)", "PowerEdge R740")]
    #[case("ThinkSystem SR650, Intel Xeon Platinum 8280", "ThinkSystem SR650")]
    #[case("Sun Fire X4170 Intel Xeon X5570", "Sun Fire X4170")]
    #[case("ASUS RS720-E9(Z11PP-D24) Server System", "RS720-E9 Server System")]
    #[case("ProLiant BL460c 3.33GHz", "ProLiant BL460c")]
    #[case("Dual-Core Opteron Server", "Opteron Server")]
    fn test_system_series(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(parse_system_name(raw), expected);
    }

    #[test]
    fn test_descriptor_only_name_is_empty() {
        assert_eq!(parse_system_name("(Intel Xeon E5-2699 v4, 2.20 GHz)"), "");
        assert_eq!(parse_system_name("3.0GHz"), "");
    }
}
