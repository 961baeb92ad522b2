//! Hardware vendor canonicalization.
//!
//! Submitters spell their company names many ways ("Hewlett-Packard Company",
//! "Hewlett Packard Enterprise", "Super Micro Computer, Inc."). The canonical form is
//! a short brand name so results can be grouped by vendor.

use once_cell::sync::Lazy;
use regex::Regex;

/// Removal patterns applied in order before rule matching.
static STRIP_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\([^)]*\)",
        r"(?i),?\s*\bLtd\b\.?",
        r"(?i),?\s*\bInc\b\.?",
        r"(?i)\bCorporation\b",
        r"(?i)\bInternational\b",
        r"(?i)\bComputers?\b",
        r"(?i)\bTechnology\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("vendor strip pattern"))
    .collect()
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

enum Match {
    Contains(&'static str),
    StartsWith(&'static str),
}

impl Match {
    fn test(&self, lower: &str) -> bool {
        match self {
            Match::Contains(needle) => lower.contains(needle),
            Match::StartsWith(prefix) => lower.starts_with(prefix),
        }
    }
}

/// Checked against the unstripped text, so "Compaq (Hewlett-Packard)" still counts.
const HPE_NEEDLES: &[&str] = &["hewlett-packard", "hewelett-packard", "hewlett packard"];

/// Ordered rules, first match wins. Needles are lowercase.
const VENDOR_RULES: &[(&[Match], &str)] = &[
    (
        &[Match::Contains("advanced micro devices"), Match::StartsWith("amd")],
        "AMD",
    ),
    (
        &[Match::Contains("supermicro"), Match::Contains("super micro")],
        "Supermicro",
    ),
    (&[Match::StartsWith("dell")], "Dell"),
    (&[Match::Contains("lenovo")], "Lenovo"),
    (&[Match::Contains("fujitsu")], "Fujitsu"),
    (&[Match::Contains("huawei")], "Huawei"),
    (&[Match::Contains("inspur")], "Inspur"),
    (&[Match::Contains("cisco")], "Cisco"),
    (&[Match::StartsWith("ibm")], "IBM"),
    (
        &[Match::Contains("sun microsystems"), Match::StartsWith("oracle")],
        "Oracle",
    ),
    (&[Match::StartsWith("asus")], "ASUS"),
];

/// Strips asides and legal-entity suffixes, collapsing leftover whitespace.
pub fn strip_vendor_suffixes(raw: &str) -> String {
    let mut out = raw.to_string();
    for pattern in STRIP_PATTERNS.iter() {
        out = pattern.replace_all(&out, "").into_owned();
    }
    let out = WHITESPACE.replace_all(out.trim(), " ");
    out.trim_end_matches([',', '.', ' ']).to_string()
}

/// Canonical short vendor name. Unmatched vendors pass through in stripped form.
pub fn clean_vendor(raw: &str) -> String {
    let raw_lower = raw.to_lowercase();
    if HPE_NEEDLES.iter().any(|needle| raw_lower.contains(needle)) {
        return "HPE".to_string();
    }

    let stripped = strip_vendor_suffixes(raw);
    let lower = stripped.to_lowercase();

    VENDOR_RULES
        .iter()
        .find(|(matchers, _)| matchers.iter().any(|m| m.test(&lower)))
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(stripped)
}
