use crate::config::PathsConfig;
use crate::error::Result;
use crate::families::{Family, FamilySpec};
use crate::types::{CanonicalRecord, RawRecord};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

/// Where harvested and cleaned datasets live.
pub trait Storage: Send + Sync {
    fn write_raw(&self, family: Family, stem: &str, records: &[RawRecord]) -> Result<()>;

    /// `None` when the source has never been harvested.
    fn read_raw(&self, family: Family, stem: &str) -> Result<Option<Vec<RawRecord>>>;

    fn write_clean(&self, spec: &FamilySpec, records: &[CanonicalRecord]) -> Result<()>;

    fn write_summary(&self, json: &str) -> Result<()>;
}

/// Union of field names across records, in first-seen order.
pub fn raw_header(records: &[RawRecord]) -> Vec<String> {
    let mut header: Vec<String> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !header.iter().any(|h| h == key) {
                header.push(key.to_string());
            }
        }
    }
    header
}

/// Header and cell rows for a family's clean dataset.
pub fn clean_rows(spec: &FamilySpec, records: &[CanonicalRecord]) -> (Vec<&'static str>, Vec<Vec<String>>) {
    let header = spec.output.iter().map(|c| c.header()).collect();
    let rows = records
        .iter()
        .map(|r| spec.output.iter().map(|c| c.render(r)).collect())
        .collect();
    (header, rows)
}

/// CSV files under the configured raw and clean directories.
pub struct CsvStorage {
    raw_dir: PathBuf,
    clean_dir: PathBuf,
}

impl CsvStorage {
    pub fn new(paths: &PathsConfig) -> Self {
        Self {
            raw_dir: paths.raw_dir.clone(),
            clean_dir: paths.clean_dir.clone(),
        }
    }

    pub fn raw_path(&self, family: Family, stem: &str) -> PathBuf {
        self.raw_dir.join(family.name()).join(format!("{stem}.csv"))
    }

    pub fn clean_path(&self, spec: &FamilySpec) -> PathBuf {
        self.clean_dir.join(spec.family.group()).join(spec.clean_file_name())
    }

    pub fn summary_path(&self) -> PathBuf {
        self.clean_dir.join("summary.json")
    }

    fn ensure_parent(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl Storage for CsvStorage {
    fn write_raw(&self, family: Family, stem: &str, records: &[RawRecord]) -> Result<()> {
        let path = self.raw_path(family, stem);
        Self::ensure_parent(&path)?;

        let header = raw_header(records);
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(&header)?;
        for record in records {
            writer.write_record(header.iter().map(|key| record.get(key).unwrap_or_default()))?;
        }
        writer.flush()?;

        info!("💾 Wrote {} raw records to {}", records.len(), path.display());
        Ok(())
    }

    fn read_raw(&self, family: Family, stem: &str) -> Result<Option<Vec<RawRecord>>> {
        let path = self.raw_path(family, stem);
        if !path.exists() {
            debug!("No raw dataset at {}", path.display());
            return Ok(None);
        }

        let mut reader = csv::Reader::from_path(&path)?;
        let header = reader.headers()?.clone();
        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            records.push(header.iter().zip(row.iter()).collect::<RawRecord>());
        }
        Ok(Some(records))
    }

    fn write_clean(&self, spec: &FamilySpec, records: &[CanonicalRecord]) -> Result<()> {
        let path = self.clean_path(spec);
        Self::ensure_parent(&path)?;

        let (header, rows) = clean_rows(spec, records);
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(&header)?;
        for row in rows {
            writer.write_record(&row)?;
        }
        writer.flush()?;

        info!("💾 Wrote {} clean records to {}", records.len(), path.display());
        Ok(())
    }

    fn write_summary(&self, json: &str) -> Result<()> {
        let path = self.summary_path();
        Self::ensure_parent(&path)?;
        fs::write(&path, json)?;
        Ok(())
    }
}

/// Keeps everything in memory. Clean datasets are stored as rendered rows.
#[derive(Default)]
pub struct InMemoryStorage {
    raw: Mutex<HashMap<(Family, String), Vec<RawRecord>>>,
    clean: Mutex<HashMap<Family, Vec<Vec<String>>>>,
    summary: Mutex<Option<String>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Header row followed by data rows.
    pub fn clean_table(&self, family: Family) -> Option<Vec<Vec<String>>> {
        self.clean.lock().ok()?.get(&family).cloned()
    }

    pub fn summary(&self) -> Option<String> {
        self.summary.lock().ok()?.clone()
    }
}

impl Storage for InMemoryStorage {
    fn write_raw(&self, family: Family, stem: &str, records: &[RawRecord]) -> Result<()> {
        let mut raw = self.raw.lock().unwrap_or_else(|e| e.into_inner());
        raw.insert((family, stem.to_string()), records.to_vec());
        Ok(())
    }

    fn read_raw(&self, family: Family, stem: &str) -> Result<Option<Vec<RawRecord>>> {
        let raw = self.raw.lock().unwrap_or_else(|e| e.into_inner());
        Ok(raw.get(&(family, stem.to_string())).cloned())
    }

    fn write_clean(&self, spec: &FamilySpec, records: &[CanonicalRecord]) -> Result<()> {
        let (header, rows) = clean_rows(spec, records);
        let mut table = vec![header.into_iter().map(str::to_string).collect::<Vec<_>>()];
        table.extend(rows);
        let mut clean = self.clean.lock().unwrap_or_else(|e| e.into_inner());
        clean.insert(spec.family, table);
        Ok(())
    }

    fn write_summary(&self, json: &str) -> Result<()> {
        let mut summary = self.summary.lock().unwrap_or_else(|e| e.into_inner());
        *summary = Some(json.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::families::JVM2008;
    use tempfile::TempDir;

    fn storage(dir: &TempDir) -> CsvStorage {
        CsvStorage::new(&PathsConfig {
            raw_dir: dir.path().join("raw"),
            clean_dir: dir.path().join("clean"),
        })
    }

    #[test]
    fn test_raw_header_is_union_in_first_seen_order() {
        let a: RawRecord = [("Suite", "x"), ("CPU Name", "y")].into_iter().collect();
        let b: RawRecord = [("Suite", "x"), ("Peak", "1"), ("CPU Name", "z")].into_iter().collect();
        assert_eq!(raw_header(&[a, b]), vec!["Suite", "CPU Name", "Peak"]);
    }

    #[test]
    fn test_raw_round_trip_fills_missing_cells() {
        let dir = TempDir::new().unwrap();
        let store = storage(&dir);
        let a: RawRecord = [("Suite", "CINT2017_rate"), ("Memory", "384 GB (12 x 32 GB)")].into_iter().collect();
        let b: RawRecord = [("Suite", "CINT2017_speed"), ("Base Threads", "64")].into_iter().collect();

        store.write_raw(Family::Cpu2017, "CINT2017_rate", &[a, b]).unwrap();
        assert!(dir.path().join("raw/cpu2017/CINT2017_rate.csv").exists());

        let back = store.read_raw(Family::Cpu2017, "CINT2017_rate").unwrap().unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[0].get("Memory"), Some("384 GB (12 x 32 GB)"));
        assert_eq!(back[0].get("Base Threads"), Some(""));
        assert_eq!(back[1].get("Base Threads"), Some("64"));
    }

    #[test]
    fn test_missing_raw_source_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(storage(&dir).read_raw(Family::Ssj2008, "ssj2008").unwrap().is_none());
    }

    #[test]
    fn test_clean_path_uses_family_group() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            storage(&dir).clean_path(&JVM2008),
            dir.path().join("clean").join("java").join("jvm2008.csv")
        );
    }
}
