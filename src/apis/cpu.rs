//! CPU2017 and CPU2006 result pages. Both share one page layout with small
//! differences in selectors and table rows.

use super::html::{all_texts, first_text, own_text, page_error, selector};
use super::{Fetcher, IndexEntry};
use crate::error::Result;
use crate::families::Family;
use crate::types::{BenchmarkSpider, RawRecord};
use async_trait::async_trait;
use scraper::Html;
use std::sync::Arc;
use tracing::instrument;

/// Where a CPU result page keeps each piece of information.
#[derive(Debug)]
pub struct CpuLayout {
    pub system_bar: &'static str,
    pub metric: &'static str,
    pub baseline: &'static str,
    pub hardware_keys: &'static [&'static str],
    pub software_keys: &'static [&'static str],
    /// Selector and column for the base copy count on rate suites.
    pub rate_copies: Option<(&'static str, &'static str)>,
    /// Selector and column for the base thread count on speed suites.
    pub speed_threads: Option<(&'static str, &'static str)>,
}

pub static CPU2017_LAYOUT: CpuLayout = CpuLayout {
    system_bar: "td.systembar p",
    metric: "td.metricbar.base a",
    baseline: "td.metricbar.base span.value",
    hardware_keys: &[
        "CPU Name",
        "Max MHz",
        "Nominal",
        "Enabled",
        "Orderable",
        "L1",
        "L2",
        "L3",
        "Other Cache",
        "Memory",
        "Storage",
        "Other HW",
    ],
    software_keys: &[
        "OS",
        "Compiler",
        "Parallel",
        "Firmware",
        "File System",
        "System State",
        "Base Pointers",
        "Peak Pointers",
        "Other SW",
    ],
    rate_copies: Some(("td.basecol.copies", "Base Copies")),
    speed_threads: Some(("td.basecol.threads", "Base Threads")),
};

pub static CPU2006_LAYOUT: CpuLayout = CpuLayout {
    system_bar: ".systembar p",
    metric: ".metricbar#base a",
    baseline: ".metricbar#base span.value",
    hardware_keys: &[
        "CPU Name",
        "CPU Characteristics",
        "CPU MHz",
        "FPU",
        "CPU(s) enabled",
        "CPU(s) orderable",
        "Primary Cache",
        "Secondary Cache",
        "L3 Cache",
        "Other Cache",
        "Memory",
        "Disk Subsystem",
        "Other Hardware",
    ],
    software_keys: &[
        "OS",
        "Compiler",
        "Parallel",
        "File System",
        "System State",
        "Base Pointers",
        "Peak Pointers",
        "Other Software",
    ],
    rate_copies: Some(("td.basecol.bm", "Base Copies")),
    speed_threads: None,
};

const INFO_FIELDS: &[(&str, &str)] = &[
    ("License", "#license_num_val"),
    ("Test Sponsor", "#test_sponsor_val"),
    ("Tested By", "#tester_val"),
    ("Test Date", "#test_date_val"),
    ("HW Avail", "#hw_avail_val"),
    ("SW Avail", "#sw_avail_val"),
];

fn insert_zipped(record: &mut RawRecord, keys: &[&str], values: Vec<String>) {
    for (key, value) in keys.iter().zip(values) {
        record.insert(*key, value);
    }
}

/// Builds the raw record for one CPU result page.
pub fn parse_detail(
    layout: &CpuLayout,
    body: &str,
    suite: &str,
    url_suffix: &str,
    url: &str,
) -> Result<RawRecord> {
    let document = Html::parse_document(body);

    let system_bar = all_texts(&document, layout.system_bar)?;
    let (vendor, system_name) = match system_bar.as_slice() {
        [vendor, system_name, ..] => (vendor.clone(), system_name.clone()),
        _ => return Err(page_error(url, "system bar is missing vendor or system name")),
    };

    let mut record = RawRecord::new();
    record.insert("Suite", suite);
    record.insert("Hardware Vendor", vendor);
    record.insert("System Name", system_name);
    record.insert("Metric", first_text(&document, layout.metric)?.unwrap_or_default());
    record.insert("Baseline", first_text(&document, layout.baseline)?.unwrap_or_default());
    for (key, css) in INFO_FIELDS {
        record.insert(*key, first_text(&document, css)?.unwrap_or_default());
    }

    insert_zipped(&mut record, layout.hardware_keys, all_texts(&document, "#Hardware tbody td")?);
    insert_zipped(&mut record, layout.software_keys, all_texts(&document, "#Software tbody td")?);

    let benchmarks = all_texts(&document, ".resultstable tbody td.bm a")?;
    let ratios = all_texts(&document, "td.basecol.ratio.selected span.selected")?;
    for (name, ratio) in benchmarks.into_iter().zip(ratios) {
        record.insert(name, ratio);
    }

    let extra = if suite.ends_with("rate") {
        layout.rate_copies
    } else {
        layout.speed_threads
    };
    if let Some((css, column)) = extra {
        let sel = selector(css)?;
        let value = document.select(&sel).next().map(own_text).unwrap_or_default();
        record.insert(column, value);
    }

    record.insert("URL Suffix", url_suffix);
    Ok(record)
}

pub struct CpuSpider {
    family: Family,
    layout: &'static CpuLayout,
    fetcher: Arc<Fetcher>,
}

impl CpuSpider {
    pub fn cpu2017(fetcher: Arc<Fetcher>) -> Self {
        Self {
            family: Family::Cpu2017,
            layout: &CPU2017_LAYOUT,
            fetcher,
        }
    }

    pub fn cpu2006(fetcher: Arc<Fetcher>) -> Self {
        Self {
            family: Family::Cpu2006,
            layout: &CPU2006_LAYOUT,
            fetcher,
        }
    }
}

#[async_trait]
impl BenchmarkSpider for CpuSpider {
    fn family(&self) -> Family {
        self.family
    }

    fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    #[instrument(skip(self, entry), fields(family = %self.family, url = %entry.detail_url))]
    async fn fetch_record(&self, entry: &IndexEntry) -> Result<Option<RawRecord>> {
        let suite = entry
            .suite
            .as_deref()
            .ok_or_else(|| page_error(&entry.detail_url, "index page has no suite name"))?;
        let body = self.fetcher.get_text(&entry.detail_url).await?;
        parse_detail(self.layout, &body, suite, &entry.url_suffix, &entry.detail_url).map(Some)
    }
}
