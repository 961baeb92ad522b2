use crate::assembler::Assembler;
use crate::error::{Result, SpecError};
use crate::families::Family;
use crate::normalize::UnknownStoragePolicy;
use crate::storage::Storage;
use crate::types::{BenchmarkSpider, RawRecord};
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Records harvested per source file.
#[derive(Debug, Serialize)]
pub struct HarvestResult {
    pub family: String,
    pub sources: Vec<(String, usize)>,
}

impl HarvestResult {
    pub fn total(&self) -> usize {
        self.sources.iter().map(|(_, n)| n).sum()
    }
}

/// Counts from cleaning one family.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub family: String,
    pub read: usize,
    pub dropped: usize,
    pub written: usize,
}

#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    pub generated_at: DateTime<Utc>,
    pub families: &'a [PipelineResult],
}

pub struct Pipeline {
    storage: Arc<dyn Storage>,
    storage_policy: UnknownStoragePolicy,
}

impl Pipeline {
    pub fn new(storage: Arc<dyn Storage>, storage_policy: UnknownStoragePolicy) -> Self {
        Self {
            storage,
            storage_policy,
        }
    }

    /// Crawls every source of the spider's family and stores one raw dataset per source.
    #[instrument(skip(self, spider), fields(family = %spider.family()))]
    pub async fn harvest(&self, spider: &dyn BenchmarkSpider) -> Result<HarvestResult> {
        let family = spider.family();
        info!("📡 Harvesting {}", family);
        let started = Instant::now();

        let mut sources = Vec::new();
        for source in family.spec().sources {
            let records = spider.crawl_source(source).await?;
            self.storage.write_raw(family, source.stem, &records)?;
            counter!("spec_records_harvested_total", "family" => family.name()).increment(records.len() as u64);
            sources.push((source.stem.to_string(), records.len()));
        }

        histogram!("spec_harvest_duration_seconds", "family" => family.name())
            .record(started.elapsed().as_secs_f64());
        let result = HarvestResult {
            family: family.name().to_string(),
            sources,
        };
        info!("✅ Harvested {} records for {}", result.total(), family);
        Ok(result)
    }

    /// Concatenates the family's raw sources in order. Missing sources are skipped.
    fn load_raw(&self, family: Family) -> Result<Vec<RawRecord>> {
        let mut records = Vec::new();
        let mut found = false;
        for source in family.spec().sources {
            match self.storage.read_raw(family, source.stem)? {
                Some(batch) => {
                    found = true;
                    records.extend(batch);
                }
                None => warn!(source = source.stem, "Raw dataset missing, skipping"),
            }
        }
        if !found {
            return Err(SpecError::NoRawData(family.name().to_string()));
        }
        Ok(records)
    }

    /// Normalizes the family's raw records and writes its clean dataset.
    #[instrument(skip(self))]
    pub fn clean(&self, family: Family) -> Result<PipelineResult> {
        info!("🔧 Cleaning {}", family);
        let started = Instant::now();

        let raws = self.load_raw(family)?;
        let assembler = Assembler::new(family.spec(), self.storage_policy);
        let batch = assembler.assemble_all(raws)?;
        self.storage.write_clean(family.spec(), &batch.records)?;

        histogram!("spec_clean_duration_seconds", "family" => family.name())
            .record(started.elapsed().as_secs_f64());
        info!(
            "✅ {}: read {}, dropped {}, wrote {}",
            family,
            batch.read,
            batch.dropped,
            batch.records.len()
        );

        Ok(PipelineResult {
            family: family.name().to_string(),
            read: batch.read,
            dropped: batch.dropped,
            written: batch.records.len(),
        })
    }

    pub fn write_summary(&self, results: &[PipelineResult]) -> Result<()> {
        let summary = RunSummary {
            generated_at: Utc::now(),
            families: results,
        };
        let json = serde_json::to_string_pretty(&summary)?;
        self.storage.write_summary(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;

    fn jvm_raw(result: &str) -> RawRecord {
        [
            ("Suite", "SPECjvm2008"),
            ("HW vendor", "Oracle Corporation"),
            ("HW model", "Sun Fire X4170"),
            ("Result", result),
            ("Test date:", "Thu Aug 20 04:16:03 GMT-05:00 2015"),
            ("HW available", "Jul-2015"),
            ("CPU name", "Intel Xeon E5-2699 v3"),
            ("CPU frequency", "2.3 GHz"),
            ("# of logical cpus", "72"),
            ("# of chips", "2"),
            ("# of cores", "36"),
            ("Cores per chip", "18"),
            ("Threads per core", "2"),
            ("Primary cache", "32 KB I + 32 KB D"),
            ("Secondary cache", "256 KB"),
            ("Memory size", "256 GB"),
            ("Memory details", "16 x 16 GB"),
            ("OS name", "Oracle Linux 7"),
            ("Filesystem", "ext4"),
            ("JVM name", "Java HotSpot(TM) 64-Bit Server VM"),
            ("JVM version", "1.8.0_60"),
            ("URL Suffix", "res2015q3/jvm2008-20150820-00045.html"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_clean_writes_rows_and_summary() {
        let storage = Arc::new(InMemoryStorage::new());
        storage
            .write_raw(Family::Jvm2008, "jvm2008", &[jvm_raw("512.4"), jvm_raw("NC")])
            .unwrap();

        let pipeline = Pipeline::new(storage.clone(), UnknownStoragePolicy::default());
        let result = pipeline.clean(Family::Jvm2008).unwrap();
        assert_eq!((result.read, result.dropped, result.written), (2, 1, 1));

        let table = storage.clean_table(Family::Jvm2008).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table[0][0], "Suite");
        assert!(!table[0].iter().any(|h| h == "L3 Cache"));
        assert!(table[1].iter().any(|cell| cell == "2015-8-20"));

        pipeline.write_summary(&[result]).unwrap();
        let summary: serde_json::Value = serde_json::from_str(&storage.summary().unwrap()).unwrap();
        assert_eq!(summary["families"][0]["family"], "jvm2008");
        assert_eq!(summary["families"][0]["written"], 1);
    }

    #[test]
    fn test_clean_without_raw_data_fails() {
        let pipeline = Pipeline::new(Arc::new(InMemoryStorage::new()), UnknownStoragePolicy::default());
        assert!(matches!(pipeline.clean(Family::Cpu2017), Err(SpecError::NoRawData(_))));
    }
}
