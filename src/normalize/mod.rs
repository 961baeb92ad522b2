//! Field normalizers: pure text-to-value conversions with no cross-record state.

pub mod cpu;
pub mod dates;
pub mod memory;
pub mod period;
pub mod storage;
pub mod system;
pub mod topology;
pub mod vendor;

use once_cell::sync::Lazy;
use regex::Regex;

pub use cpu::{apply_clock_fallback, get_cpu_vendor, mhz_to_ghz, parse_cpu_char, CpuVendor};
pub use dates::{clean_date_1, clean_date_2, clean_date_3, DateFormat};
pub use memory::{get_memory_number, get_total_memory_amount, parse_described_memory};
pub use period::{get_full_url, get_submit_quarter, get_submit_year, parse_submission_period};
pub use storage::{parse_storage, StorageType, UnknownStoragePolicy};
pub use system::parse_system_name;
pub use topology::{parse_topology, Topology};
pub use vendor::clean_vendor;

static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(.*?\)").expect("parenthetical pattern"));

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Removes every "(...)" aside, e.g. from "Intel Xeon E5-2697 v2 (2.70 GHz)".
pub fn strip_parentheticals(raw: &str) -> String {
    PARENTHETICAL.replace_all(raw, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(2.666), 2.67);
        assert_eq!(round2(3.0), 3.0);
    }

    #[test]
    fn test_strip_parentheticals() {
        assert_eq!(strip_parentheticals("Intel Xeon X5570 (2.93 GHz)"), "Intel Xeon X5570");
        assert_eq!(strip_parentheticals("AMD Opteron"), "AMD Opteron");
    }
}
