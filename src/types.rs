use crate::apis::{parse_index, Fetcher, IndexEntry};
use crate::error::Result;
use crate::families::{Family, Source};
use crate::normalize::{CpuVendor, StorageType};
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// A spider walks one family's index pages and turns result pages into raw records.
#[async_trait]
pub trait BenchmarkSpider: Send + Sync {
    fn family(&self) -> Family;

    fn fetcher(&self) -> &Fetcher;

    /// Fetches and parses the result page(s) behind one index row. `None` skips the row.
    async fn fetch_record(&self, entry: &IndexEntry) -> Result<Option<RawRecord>>;

    /// Walks one index page. A failing result page is logged and skipped; a failing
    /// index page is returned as an error.
    async fn crawl_source(&self, source: &Source) -> Result<Vec<RawRecord>> {
        let body = self.fetcher().get_text(source.index_url).await?;
        let entries = parse_index(&body, source.index_url)?;
        let limit = self.fetcher().max_results().unwrap_or(usize::MAX);
        info!(
            family = %self.family(),
            source = source.stem,
            "Found {} result links",
            entries.len()
        );

        let mut records = Vec::new();
        for entry in entries.iter().take(limit) {
            match self.fetch_record(entry).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => debug!(url = %entry.detail_url, "Skipped result page"),
                Err(e) => warn!(url = %entry.detail_url, "Failed to harvest result page: {}", e),
            }
        }
        Ok(records)
    }
}

/// Field-to-text mapping scraped from one result page, in first-seen field order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: Vec<(String, String)>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing the value in place when the key already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn extend(&mut self, other: RawRecord) {
        for (k, v) in other.fields {
            self.insert(k, v);
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = RawRecord::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

/// Fully typed, cleaned record. Family-specific columns are optional.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    pub suite: String,
    pub hw_vendor: String,
    pub system_series: String,
    pub result: f64,
    pub cpu_vendor: CpuVendor,
    pub cpu_name: String,
    pub cpu_ghz: f64,
    pub max_ghz: f64,
    pub threads_per_core: u32,
    pub cores_per_chip: u32,
    pub chips: u32,
    pub nodes: Option<u32>,
    pub total_cores: u32,
    pub l1_cache: String,
    pub l2_cache: String,
    pub l3_cache: Option<String>,
    pub memory: String,
    pub memory_number: u32,
    pub memory_amount: f64,
    pub storage_type: Option<StorageType>,
    pub storage: Option<String>,
    pub os: String,
    pub file_system: String,
    pub jvm: Option<String>,
    pub url_suffix: String,
    pub test_date: String,
    pub hw_avail: String,
    pub submit_quarter: u32,
    pub submit_year: u32,
    pub full_url: String,
}

/// Output columns; each family picks an ordered subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Suite,
    HwVendor,
    SystemSeries,
    Result,
    CpuVendor,
    CpuName,
    CpuGhz,
    MaxGhz,
    ThreadsPerCore,
    CoresPerChip,
    Chips,
    Nodes,
    TotalCores,
    L1Cache,
    L2Cache,
    L3Cache,
    Memory,
    MemoryNumber,
    MemoryAmount,
    StorageType,
    Storage,
    Os,
    FileSystem,
    Jvm,
    UrlSuffix,
    TestDate,
    HwAvail,
    SubmitQuarter,
    SubmitYear,
    FullUrl,
}

impl Column {
    pub fn header(&self) -> &'static str {
        match self {
            Column::Suite => "Suite",
            Column::HwVendor => "HW Vendor",
            Column::SystemSeries => "System Series",
            Column::Result => "Result",
            Column::CpuVendor => "CPU Vendor",
            Column::CpuName => "CPU Name",
            Column::CpuGhz => "CPU GHz",
            Column::MaxGhz => "Max GHz",
            Column::ThreadsPerCore => "Threads Per Core",
            Column::CoresPerChip => "Cores Per Chip",
            Column::Chips => "Chips",
            Column::Nodes => "Nodes",
            Column::TotalCores => "Total Cores",
            Column::L1Cache => "L1 Cache",
            Column::L2Cache => "L2 Cache",
            Column::L3Cache => "L3 Cache",
            Column::Memory => "Memory",
            Column::MemoryNumber => "Memory Number",
            Column::MemoryAmount => "Memory Amount",
            Column::StorageType => "Storage Type",
            Column::Storage => "Storage",
            Column::Os => "OS",
            Column::FileSystem => "File System",
            Column::Jvm => "JVM",
            Column::UrlSuffix => "URL Suffix",
            Column::TestDate => "Test Date",
            Column::HwAvail => "HW Avail",
            Column::SubmitQuarter => "Submit Quarter",
            Column::SubmitYear => "Submit Year",
            Column::FullUrl => "Full URL",
        }
    }

    /// Cell text for a record. Absent optional values render empty.
    pub fn render(&self, r: &CanonicalRecord) -> String {
        fn opt<T: ToString>(v: &Option<T>) -> String {
            v.as_ref().map(ToString::to_string).unwrap_or_default()
        }
        // Floats keep their decimal point: 245.0, not 245.
        fn float(v: f64) -> String {
            format!("{v:?}")
        }

        match self {
            Column::Suite => r.suite.clone(),
            Column::HwVendor => r.hw_vendor.clone(),
            Column::SystemSeries => r.system_series.clone(),
            Column::Result => float(r.result),
            Column::CpuVendor => r.cpu_vendor.to_string(),
            Column::CpuName => r.cpu_name.clone(),
            Column::CpuGhz => float(r.cpu_ghz),
            Column::MaxGhz => float(r.max_ghz),
            Column::ThreadsPerCore => r.threads_per_core.to_string(),
            Column::CoresPerChip => r.cores_per_chip.to_string(),
            Column::Chips => r.chips.to_string(),
            Column::Nodes => opt(&r.nodes),
            Column::TotalCores => r.total_cores.to_string(),
            Column::L1Cache => r.l1_cache.clone(),
            Column::L2Cache => r.l2_cache.clone(),
            Column::L3Cache => opt(&r.l3_cache),
            Column::Memory => r.memory.clone(),
            Column::MemoryNumber => r.memory_number.to_string(),
            Column::MemoryAmount => float(r.memory_amount),
            Column::StorageType => opt(&r.storage_type),
            Column::Storage => opt(&r.storage),
            Column::Os => r.os.clone(),
            Column::FileSystem => r.file_system.clone(),
            Column::Jvm => opt(&r.jvm),
            Column::UrlSuffix => r.url_suffix.clone(),
            Column::TestDate => r.test_date.clone(),
            Column::HwAvail => r.hw_avail.clone(),
            Column::SubmitQuarter => r.submit_quarter.to_string(),
            Column::SubmitYear => r.submit_year.to_string(),
            Column::FullUrl => r.full_url.clone(),
        }
    }
}
