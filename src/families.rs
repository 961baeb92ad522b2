//! Declarative description of each benchmark family: where its raw data comes
//! from, which raw columns it keeps and what they are renamed to, the ordered
//! normalization steps, and the output column order.

use crate::error::{Result, SpecError};
use crate::normalize::DateFormat;
use crate::types::Column;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Cpu2017,
    Cpu2006,
    Jbb2015,
    Jvm2008,
    Ssj2008,
}

impl Family {
    pub const ALL: [Family; 5] = [
        Family::Cpu2017,
        Family::Cpu2006,
        Family::Jbb2015,
        Family::Jvm2008,
        Family::Ssj2008,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Family::Cpu2017 => "cpu2017",
            Family::Cpu2006 => "cpu2006",
            Family::Jbb2015 => "jbb2015",
            Family::Jvm2008 => "jvm2008",
            Family::Ssj2008 => "ssj2008",
        }
    }

    /// Output sub-directory grouping related families.
    pub fn group(&self) -> &'static str {
        match self {
            Family::Cpu2017 | Family::Cpu2006 => "cpu",
            Family::Jbb2015 | Family::Jvm2008 => "java",
            Family::Ssj2008 => "power",
        }
    }

    pub fn spec(&self) -> &'static FamilySpec {
        match self {
            Family::Cpu2017 => &CPU2017,
            Family::Cpu2006 => &CPU2006,
            Family::Jbb2015 => &JBB2015,
            Family::Jvm2008 => &JVM2008,
            Family::Ssj2008 => &SSJ2008,
        }
    }

    /// Parses a comma-separated list; `None` selects every family.
    pub fn parse_list(list: Option<&str>) -> Result<Vec<Family>> {
        match list {
            None => Ok(Family::ALL.to_vec()),
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(Family::from_str)
                .collect(),
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Family {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self> {
        Family::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SpecError::Config(format!("Unknown benchmark family: {s}")))
    }
}

/// One index page and the raw dataset file it produces.
#[derive(Debug, Clone, Copy)]
pub struct Source {
    pub stem: &'static str,
    pub index_url: &'static str,
}

/// Normalization steps. Each reads renamed raw columns and fills derived fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    CleanVendor,
    SystemSeries,
    CpuVendor,
    /// `CPU MHz` column holds plain MHz.
    CpuGhzFromMhz,
    /// `CPU MHz` column holds either "N GHz" or plain MHz.
    CpuGhzFromFrequency,
    /// `Max MHz` column, then the clock fallback.
    MaxGhzFromMaxMhz,
    /// Clock extracted from free text in `source`, then the clock fallback.
    MaxGhzFromCharacteristics { source: &'static str },
    /// `CPU Enabled` with threads per core as its third segment.
    TopologyWithThreads,
    /// `CPU Enabled` with cores per chip as its third segment.
    TopologyWithCoresPerChip,
    /// Threads per core from "N / core" in `Hardware Threads`.
    HardwareThreads,
    /// Chips, cores and threads stated in their own columns. `keep_stated` prefers a
    /// stated cores-per-chip value over `Total Cores / Chips`.
    StatedTopology { nodes: bool, keep_stated: bool },
    LowercaseFileSystem,
    MemoryTotalAmount { source: &'static str },
    /// `Memory Size` with GB/MB units.
    MemoryDescribedAmount,
    MemoryNumber { source: &'static str },
    StorageType,
    SubmissionPeriod,
    FullUrl,
    JoinOs { name: &'static str, version: &'static str, separator: &'static str },
    JoinJvm { name: &'static str, version: &'static str, separator: &'static str },
    StripCpuNameAsides,
    TestDate(DateFormat),
    HwAvail(DateFormat),
}

#[derive(Debug)]
pub struct FamilySpec {
    pub family: Family,
    pub results_base: &'static str,
    /// Concatenated in this order when cleaning.
    pub sources: &'static [Source],
    /// Raw columns kept; an empty value in any of them drops the row.
    pub used_columns: &'static [&'static str],
    pub renames: &'static [(&'static str, &'static str)],
    pub steps: &'static [Step],
    pub output: &'static [Column],
    /// Drop records whose system series comes out empty.
    pub require_series: bool,
    /// Test-date values that mark a row as unusable.
    pub test_date_sentinels: &'static [&'static str],
}

impl FamilySpec {
    /// Internal name for a raw column.
    pub fn rename<'a>(&self, raw: &'a str) -> &'a str {
        self.renames
            .iter()
            .find(|(from, _)| *from == raw)
            .map(|(_, to)| *to)
            .unwrap_or(raw)
    }

    pub fn clean_file_name(&self) -> String {
        format!("{}.csv", self.family.name())
    }
}

const CPU_OUTPUT: &[Column] = &[
    Column::Suite,
    Column::HwVendor,
    Column::SystemSeries,
    Column::Result,
    Column::CpuVendor,
    Column::CpuName,
    Column::CpuGhz,
    Column::MaxGhz,
    Column::ThreadsPerCore,
    Column::CoresPerChip,
    Column::Chips,
    Column::TotalCores,
    Column::L1Cache,
    Column::L2Cache,
    Column::L3Cache,
    Column::Memory,
    Column::MemoryNumber,
    Column::MemoryAmount,
    Column::StorageType,
    Column::Storage,
    Column::Os,
    Column::FileSystem,
    Column::UrlSuffix,
    Column::TestDate,
    Column::HwAvail,
    Column::SubmitQuarter,
    Column::SubmitYear,
    Column::FullUrl,
];

// CPU2006 datasets have always listed the memory amount before the count.
const CPU2006_OUTPUT: &[Column] = &[
    Column::Suite,
    Column::HwVendor,
    Column::SystemSeries,
    Column::Result,
    Column::CpuVendor,
    Column::CpuName,
    Column::CpuGhz,
    Column::MaxGhz,
    Column::ThreadsPerCore,
    Column::CoresPerChip,
    Column::Chips,
    Column::TotalCores,
    Column::L1Cache,
    Column::L2Cache,
    Column::L3Cache,
    Column::Memory,
    Column::MemoryAmount,
    Column::MemoryNumber,
    Column::StorageType,
    Column::Storage,
    Column::Os,
    Column::FileSystem,
    Column::UrlSuffix,
    Column::TestDate,
    Column::HwAvail,
    Column::SubmitQuarter,
    Column::SubmitYear,
    Column::FullUrl,
];

const CPU2017_STEPS: &[Step] = &[
    Step::CleanVendor,
    Step::SystemSeries,
    Step::CpuVendor,
    Step::CpuGhzFromMhz,
    Step::MaxGhzFromMaxMhz,
    Step::TopologyWithThreads,
    Step::LowercaseFileSystem,
    Step::MemoryTotalAmount { source: "Memory" },
    Step::MemoryNumber { source: "Memory" },
    Step::StorageType,
    Step::SubmissionPeriod,
    Step::FullUrl,
    Step::TestDate(DateFormat::MonthYear),
    Step::HwAvail(DateFormat::MonthYear),
];

const CPU2006_STEPS: &[Step] = &[
    Step::CleanVendor,
    Step::SystemSeries,
    Step::CpuVendor,
    Step::CpuGhzFromMhz,
    Step::MaxGhzFromCharacteristics { source: "CPU Characteristics" },
    Step::TopologyWithThreads,
    Step::LowercaseFileSystem,
    Step::MemoryTotalAmount { source: "Memory" },
    Step::MemoryNumber { source: "Memory" },
    Step::StorageType,
    Step::SubmissionPeriod,
    Step::FullUrl,
    Step::TestDate(DateFormat::MonthYear),
    Step::HwAvail(DateFormat::MonthYear),
];

pub static CPU2017: FamilySpec = FamilySpec {
    family: Family::Cpu2017,
    results_base: "https://spec.org/cpu2017/results",
    sources: &[
        Source { stem: "CFP2017_rate", index_url: "https://spec.org/cpu2017/results/rfp2017.html" },
        Source { stem: "CFP2017_speed", index_url: "https://spec.org/cpu2017/results/cfp2017.html" },
        Source { stem: "CINT2017_rate", index_url: "https://spec.org/cpu2017/results/rint2017.html" },
        Source { stem: "CINT2017_speed", index_url: "https://spec.org/cpu2017/results/cint2017.html" },
    ],
    used_columns: &[
        "Suite",
        "Hardware Vendor",
        "System Name",
        "Baseline",
        "Test Date",
        "HW Avail",
        "CPU Name",
        "Max MHz",
        "Nominal",
        "Enabled",
        "Orderable",
        "L1",
        "L2",
        "L3",
        "Memory",
        "Storage",
        "OS",
        "File System",
        "URL Suffix",
    ],
    renames: &[
        ("Baseline", "Result"),
        ("Hardware Vendor", "HW Vendor"),
        ("Nominal", "CPU MHz"),
        ("Enabled", "CPU Enabled"),
        ("Orderable", "CPU Orderable"),
        ("L1", "L1 Cache"),
        ("L2", "L2 Cache"),
        ("L3", "L3 Cache"),
    ],
    steps: CPU2017_STEPS,
    output: CPU_OUTPUT,
    require_series: false,
    test_date_sentinels: &[],
};

pub static CPU2006: FamilySpec = FamilySpec {
    family: Family::Cpu2006,
    results_base: "https://spec.org/cpu2006/results",
    sources: &[
        Source { stem: "SPECfp_rate", index_url: "https://spec.org/cpu2006/results/rfp2006.html" },
        Source { stem: "SPECfp", index_url: "https://spec.org/cpu2006/results/cfp2006.html" },
        Source { stem: "SPECint_rate", index_url: "https://spec.org/cpu2006/results/rint2006.html" },
        Source { stem: "SPECint", index_url: "https://spec.org/cpu2006/results/cint2006.html" },
    ],
    used_columns: &[
        "Suite",
        "Hardware Vendor",
        "System Name",
        "Baseline",
        "Test Date",
        "HW Avail",
        "CPU Name",
        "CPU Characteristics",
        "CPU MHz",
        "CPU(s) enabled",
        "CPU(s) orderable",
        "Primary Cache",
        "Secondary Cache",
        "L3 Cache",
        "Memory",
        "Disk Subsystem",
        "OS",
        "File System",
        "URL Suffix",
    ],
    renames: &[
        ("Baseline", "Result"),
        ("Hardware Vendor", "HW Vendor"),
        ("CPU(s) enabled", "CPU Enabled"),
        ("CPU(s) orderable", "CPU Orderable"),
        ("Primary Cache", "L1 Cache"),
        ("Secondary Cache", "L2 Cache"),
        ("Disk Subsystem", "Storage"),
    ],
    steps: CPU2006_STEPS,
    output: CPU2006_OUTPUT,
    require_series: true,
    test_date_sentinels: &[],
};

pub static JBB2015: FamilySpec = FamilySpec {
    family: Family::Jbb2015,
    results_base: "https://spec.org/jbb2015/results",
    sources: &[
        Source { stem: "SPECjbb2015-Composite", index_url: "https://spec.org/jbb2015/results/jbb2015composite.html" },
        Source { stem: "SPECjbb2015-Distributed", index_url: "https://spec.org/jbb2015/results/jbb2015distributed.html" },
        Source { stem: "SPECjbb2015-MultiJVM", index_url: "https://spec.org/jbb2015/results/jbb2015multijvm.html" },
    ],
    used_columns: &[
        "Suite",
        "Vendor",
        "System Name",
        "critical_jOPS",
        "Test date",
        "Hardware Availability",
        "Nodes Per System",
        "CPU Name",
        "CPU Characteristics",
        "Number of Systems",
        "Chips Per System",
        "Cores Per System",
        "Cores Per Chip",
        "Threads Per Core",
        "CPU Frequency (MHz)",
        "Primary Cache",
        "Secondary Cache",
        "Tertiary Cache",
        "Disk",
        "File System",
        "Memory Amount (GB)",
        "# and size of DIMM(s)",
        "Memory Details",
        "OS Name",
        "OS Vendor",
        "OS Version",
        "JVM Name",
        "JVM Vendor",
        "JVM Version",
        "URL Suffix",
    ],
    renames: &[
        ("critical_jOPS", "Result"),
        ("Vendor", "HW Vendor"),
        ("Test date", "Test Date"),
        ("Hardware Availability", "HW Avail"),
        ("CPU Frequency (MHz)", "CPU MHz"),
        ("Primary Cache", "L1 Cache"),
        ("Secondary Cache", "L2 Cache"),
        ("Tertiary Cache", "L3 Cache"),
        ("Disk", "Storage"),
        ("Memory Amount (GB)", "Memory Amount"),
        ("Memory Details", "Memory"),
        ("Nodes Per System", "Nodes"),
        ("Chips Per System", "Chips"),
        ("Cores Per System", "Total Cores"),
    ],
    steps: &[
        Step::CleanVendor,
        Step::SystemSeries,
        Step::CpuVendor,
        Step::CpuGhzFromMhz,
        Step::MaxGhzFromCharacteristics { source: "CPU Characteristics" },
        Step::StatedTopology { nodes: true, keep_stated: true },
        Step::LowercaseFileSystem,
        Step::MemoryTotalAmount { source: "Memory Amount" },
        Step::MemoryNumber { source: "# and size of DIMM(s)" },
        Step::StorageType,
        Step::SubmissionPeriod,
        Step::FullUrl,
        Step::JoinOs { name: "OS Name", version: "OS Version", separator: "; " },
        Step::JoinJvm { name: "JVM Name", version: "JVM Version", separator: "; " },
        Step::TestDate(DateFormat::FullDate),
        Step::HwAvail(DateFormat::MonthYear),
    ],
    output: &[
        Column::Suite,
        Column::HwVendor,
        Column::SystemSeries,
        Column::Result,
        Column::CpuVendor,
        Column::CpuName,
        Column::CpuGhz,
        Column::MaxGhz,
        Column::ThreadsPerCore,
        Column::CoresPerChip,
        Column::Chips,
        Column::Nodes,
        Column::TotalCores,
        Column::L1Cache,
        Column::L2Cache,
        Column::L3Cache,
        Column::Memory,
        Column::MemoryNumber,
        Column::MemoryAmount,
        Column::StorageType,
        Column::Storage,
        Column::Os,
        Column::FileSystem,
        Column::Jvm,
        Column::UrlSuffix,
        Column::TestDate,
        Column::HwAvail,
        Column::SubmitQuarter,
        Column::SubmitYear,
        Column::FullUrl,
    ],
    require_series: false,
    test_date_sentinels: &[],
};

pub static JVM2008: FamilySpec = FamilySpec {
    family: Family::Jvm2008,
    results_base: "https://spec.org/jvm2008/results",
    sources: &[Source { stem: "jvm2008", index_url: "https://spec.org/jvm2008/results/jvm2008.html" }],
    used_columns: &[
        "Suite",
        "HW vendor",
        "HW model",
        "Result",
        "Test date:",
        "HW available",
        "CPU name",
        "CPU frequency",
        "# of logical cpus",
        "# of chips",
        "# of cores",
        "Cores per chip",
        "Threads per core",
        "Primary cache",
        "Secondary cache",
        "Memory size",
        "Memory details",
        "OS name",
        "Filesystem",
        "JVM name",
        "JVM version",
        "URL Suffix",
    ],
    renames: &[
        ("HW vendor", "HW Vendor"),
        ("HW model", "System Name"),
        ("Test date:", "Test Date"),
        ("HW available", "HW Avail"),
        ("CPU name", "CPU Name"),
        ("CPU frequency", "CPU MHz"),
        ("Cores per chip", "Cores Per Chip"),
        ("Threads per core", "Threads Per Core"),
        ("Primary cache", "L1 Cache"),
        ("Secondary cache", "L2 Cache"),
        ("Memory size", "Memory Size"),
        ("Memory details", "Memory"),
        ("OS name", "OS"),
        ("Filesystem", "File System"),
        ("JVM name", "JVM Name"),
        ("JVM version", "JVM Version"),
        ("# of chips", "Chips"),
        ("# of cores", "Total Cores"),
    ],
    steps: &[
        Step::CleanVendor,
        Step::SystemSeries,
        Step::CpuVendor,
        Step::CpuGhzFromFrequency,
        Step::MaxGhzFromCharacteristics { source: "CPU Name" },
        Step::StatedTopology { nodes: false, keep_stated: false },
        Step::LowercaseFileSystem,
        Step::MemoryDescribedAmount,
        Step::MemoryNumber { source: "Memory" },
        Step::SubmissionPeriod,
        Step::FullUrl,
        Step::JoinJvm { name: "JVM Name", version: "JVM Version", separator: " " },
        Step::StripCpuNameAsides,
        Step::TestDate(DateFormat::Timestamp),
        Step::HwAvail(DateFormat::MonthYear),
    ],
    output: &[
        Column::Suite,
        Column::HwVendor,
        Column::SystemSeries,
        Column::Result,
        Column::CpuVendor,
        Column::CpuName,
        Column::CpuGhz,
        Column::MaxGhz,
        Column::ThreadsPerCore,
        Column::CoresPerChip,
        Column::Chips,
        Column::TotalCores,
        Column::L1Cache,
        Column::L2Cache,
        Column::Memory,
        Column::MemoryNumber,
        Column::MemoryAmount,
        Column::Os,
        Column::FileSystem,
        Column::Jvm,
        Column::UrlSuffix,
        Column::TestDate,
        Column::HwAvail,
        Column::SubmitQuarter,
        Column::SubmitYear,
        Column::FullUrl,
    ],
    require_series: false,
    test_date_sentinels: &[],
};

pub static SSJ2008: FamilySpec = FamilySpec {
    family: Family::Ssj2008,
    results_base: "https://spec.org/power_ssj2008/results",
    sources: &[Source { stem: "ssj2008", index_url: "https://spec.org/power_ssj2008/results/power_ssj2008.html" }],
    used_columns: &[
        "Suite",
        "Hardware Vendor",
        "Model",
        "Test Date",
        "Hardware Availability",
        "Benchmark",
        "CPU Name",
        "CPU Characteristics",
        "CPU Frequency (MHz)",
        "CPU(s) Enabled",
        "CPU(s) Orderable",
        "Hardware Threads",
        "Primary Cache",
        "Secondary Cache",
        "Tertiary Cache",
        "Memory Amount (GB)",
        "# and size of DIMM",
        "Memory Details",
        "Disk Drive",
        "Operating System (OS)",
        "OS Version",
        "Filesystem",
        "JVM Vendor",
        "JVM Version",
        "URL Suffix",
    ],
    renames: &[
        ("Hardware Vendor", "HW Vendor"),
        ("Model", "System Name"),
        ("Hardware Availability", "HW Avail"),
        ("Benchmark", "Result"),
        ("CPU Frequency (MHz)", "CPU MHz"),
        ("CPU(s) Enabled", "CPU Enabled"),
        ("CPU(s) Orderable", "CPU Orderable"),
        ("Primary Cache", "L1 Cache"),
        ("Secondary Cache", "L2 Cache"),
        ("Tertiary Cache", "L3 Cache"),
        ("Memory Amount (GB)", "Memory Amount"),
        ("Memory Details", "Memory"),
        ("Disk Drive", "Storage"),
        ("Operating System (OS)", "OS"),
        ("Filesystem", "File System"),
    ],
    steps: &[
        Step::CleanVendor,
        Step::SystemSeries,
        Step::CpuVendor,
        Step::CpuGhzFromMhz,
        Step::MaxGhzFromCharacteristics { source: "CPU Characteristics" },
        Step::TopologyWithCoresPerChip,
        Step::HardwareThreads,
        Step::LowercaseFileSystem,
        Step::MemoryTotalAmount { source: "Memory Amount" },
        Step::MemoryNumber { source: "# and size of DIMM" },
        Step::StorageType,
        Step::SubmissionPeriod,
        Step::FullUrl,
        Step::JoinOs { name: "OS", version: "OS Version", separator: "; " },
        Step::JoinJvm { name: "JVM Vendor", version: "JVM Version", separator: "; " },
        Step::TestDate(DateFormat::FullDate),
        Step::HwAvail(DateFormat::MonthYear),
    ],
    output: &[
        Column::Suite,
        Column::HwVendor,
        Column::SystemSeries,
        Column::Result,
        Column::CpuVendor,
        Column::CpuName,
        Column::CpuGhz,
        Column::MaxGhz,
        Column::ThreadsPerCore,
        Column::CoresPerChip,
        Column::Chips,
        Column::TotalCores,
        Column::L1Cache,
        Column::L2Cache,
        Column::L3Cache,
        Column::Memory,
        Column::MemoryNumber,
        Column::MemoryAmount,
        Column::StorageType,
        Column::Storage,
        Column::Os,
        Column::FileSystem,
        Column::Jvm,
        Column::UrlSuffix,
        Column::TestDate,
        Column::HwAvail,
        Column::SubmitQuarter,
        Column::SubmitYear,
        Column::FullUrl,
    ],
    require_series: false,
    test_date_sentinels: &["Various"],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_family_list() {
        assert_eq!(Family::parse_list(None).unwrap().len(), 5);
        assert_eq!(
            Family::parse_list(Some("cpu2017, JVM2008")).unwrap(),
            vec![Family::Cpu2017, Family::Jvm2008]
        );
        assert!(Family::parse_list(Some("cpu2000")).is_err());
    }

    #[test]
    fn test_specs_are_self_consistent() {
        for family in Family::ALL {
            let spec = family.spec();
            assert_eq!(spec.family, family);
            assert!(!spec.sources.is_empty());
            for (from, _) in spec.renames {
                assert!(spec.used_columns.contains(from), "{family}: rename of unused column {from}");
            }
            assert_eq!(spec.output.first(), Some(&Column::Suite));
            assert!(spec.used_columns.contains(&"URL Suffix"));
        }
    }

    #[test]
    fn test_rename_falls_back_to_raw_name() {
        assert_eq!(CPU2017.rename("Baseline"), "Result");
        assert_eq!(CPU2017.rename("CPU Name"), "CPU Name");
    }
}
