//! Turns raw records into canonical records by applying a family's step table.

use crate::error::{Result, SpecError};
use crate::families::{FamilySpec, Step};
use crate::normalize::cpu::{parse_frequency, parse_mhz_to_ghz};
use crate::normalize::topology::{check_core_count, derive_cores_per_chip, parse_count, parse_hardware_threads};
use crate::normalize::{
    apply_clock_fallback, clean_vendor, get_cpu_vendor, get_full_url, get_memory_number,
    get_total_memory_amount, parse_cpu_char, parse_described_memory, parse_submission_period,
    parse_system_name, parse_topology, strip_parentheticals, CpuVendor, StorageType,
    UnknownStoragePolicy,
};
use crate::types::{CanonicalRecord, RawRecord};
use metrics::counter;
use tracing::{debug, instrument, warn};

const NOT_COMPLIANT: &str = "NC";

/// Why a raw record produced no canonical record.
#[derive(Debug, Clone, PartialEq)]
pub enum DropReason {
    MissingValue(String),
    NotCompliant,
    NonNumericResult(String),
    NonPositiveResult,
    SentinelTestDate(String),
    Unparsed { field: &'static str, value: String },
    EmptySeries,
}

impl DropReason {
    pub fn label(&self) -> &'static str {
        match self {
            DropReason::MissingValue(_) => "missing_value",
            DropReason::NotCompliant => "not_compliant",
            DropReason::NonNumericResult(_) => "non_numeric_result",
            DropReason::NonPositiveResult => "non_positive_result",
            DropReason::SentinelTestDate(_) => "sentinel_test_date",
            DropReason::Unparsed { .. } => "unparsed",
            DropReason::EmptySeries => "empty_series",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Kept(Box<CanonicalRecord>),
    Dropped(DropReason),
}

/// Records kept from one family batch, in input order.
#[derive(Debug, Default)]
pub struct AssembledBatch {
    pub records: Vec<CanonicalRecord>,
    pub read: usize,
    pub dropped: usize,
}

pub struct Assembler {
    spec: &'static FamilySpec,
    storage_policy: UnknownStoragePolicy,
}

/// Derived values filled in by steps; `finish` turns it into a record.
#[derive(Debug, Default)]
struct Draft {
    result: Option<f64>,
    hw_vendor: Option<String>,
    system_series: Option<String>,
    cpu_vendor: Option<CpuVendor>,
    cpu_name: Option<String>,
    cpu_ghz: Option<f64>,
    max_ghz: Option<f64>,
    threads_per_core: Option<u32>,
    cores_per_chip: Option<u32>,
    chips: Option<u32>,
    nodes: Option<u32>,
    total_cores: Option<u32>,
    memory_number: Option<u32>,
    memory_amount: Option<f64>,
    storage_type: Option<StorageType>,
    os: Option<String>,
    file_system: Option<String>,
    jvm: Option<String>,
    test_date: Option<String>,
    hw_avail: Option<String>,
    submit_quarter: Option<u32>,
    submit_year: Option<u32>,
    full_url: Option<String>,
}

/// Step failures: either the row is dropped or the batch aborts.
enum StepError {
    Drop(DropReason),
    Fatal(SpecError),
}

impl From<SpecError> for StepError {
    fn from(err: SpecError) -> Self {
        StepError::Fatal(err)
    }
}

type StepResult<T> = std::result::Result<T, StepError>;

/// Value-level parse failures drop the row instead of aborting.
fn droppable<T>(res: Result<T>) -> StepResult<T> {
    res.map_err(|err| match err {
        SpecError::Parse { field, value } => StepError::Drop(DropReason::Unparsed { field, value }),
        other => StepError::Fatal(other),
    })
}

fn required<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| SpecError::MissingField(field.to_string()))
}

impl Assembler {
    pub fn new(spec: &'static FamilySpec, storage_policy: UnknownStoragePolicy) -> Self {
        Self {
            spec,
            storage_policy,
        }
    }

    pub fn spec(&self) -> &'static FamilySpec {
        self.spec
    }

    /// Assembles every record, stopping at the first structural error.
    #[instrument(skip(self, raws), fields(family = %self.spec.family))]
    pub fn assemble_all<I>(&self, raws: I) -> Result<AssembledBatch>
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let family = self.spec.family.name();
        let mut batch = AssembledBatch::default();

        for raw in raws {
            batch.read += 1;
            match self.assemble(&raw)? {
                Outcome::Kept(record) => batch.records.push(*record),
                Outcome::Dropped(reason) => {
                    debug!(reason = reason.label(), "Dropped record: {:?}", reason);
                    counter!("spec_rows_dropped_total", "family" => family, "reason" => reason.label())
                        .increment(1);
                    batch.dropped += 1;
                }
            }
        }

        counter!("spec_rows_read_total", "family" => family).increment(batch.read as u64);
        counter!("spec_rows_written_total", "family" => family).increment(batch.records.len() as u64);
        Ok(batch)
    }

    /// Assembles one record. `Err` means the whole family batch must abort.
    pub fn assemble(&self, raw: &RawRecord) -> Result<Outcome> {
        let row = match self.project(raw) {
            Ok(row) => row,
            Err(reason) => return Ok(Outcome::Dropped(reason)),
        };

        let mut draft = Draft::default();
        if let Err(reason) = self.check_sentinels(&row, &mut draft) {
            return Ok(Outcome::Dropped(reason));
        }

        for step in self.spec.steps {
            match self.apply(*step, &row, &mut draft) {
                Ok(()) => {}
                Err(StepError::Drop(reason)) => return Ok(Outcome::Dropped(reason)),
                Err(StepError::Fatal(err)) => return Err(err),
            }
        }

        if self.spec.require_series && draft.system_series.as_deref().unwrap_or_default().is_empty() {
            return Ok(Outcome::Dropped(DropReason::EmptySeries));
        }

        self.finish(&row, draft).map(|record| Outcome::Kept(Box::new(record)))
    }

    /// Keeps the family's columns under their internal names. Any empty value drops the row.
    fn project(&self, raw: &RawRecord) -> std::result::Result<RawRecord, DropReason> {
        let mut row = RawRecord::new();
        for column in self.spec.used_columns {
            let value = raw.get(column).map(str::trim).unwrap_or_default();
            if value.is_empty() {
                return Err(DropReason::MissingValue(column.to_string()));
            }
            row.insert(self.spec.rename(column), value);
        }
        Ok(row)
    }

    fn check_sentinels(&self, row: &RawRecord, draft: &mut Draft) -> std::result::Result<(), DropReason> {
        let result = row.get("Result").unwrap_or_default();
        if result == NOT_COMPLIANT {
            return Err(DropReason::NotCompliant);
        }
        let score: f64 = result
            .replace(',', "")
            .parse()
            .map_err(|_| DropReason::NonNumericResult(result.to_string()))?;
        if !(score > 0.0) {
            return Err(DropReason::NonPositiveResult);
        }
        draft.result = Some(score);

        let test_date = row.get("Test Date").unwrap_or_default();
        if self.spec.test_date_sentinels.contains(&test_date) {
            return Err(DropReason::SentinelTestDate(test_date.to_string()));
        }
        Ok(())
    }

    fn text<'r>(&self, row: &'r RawRecord, field: &str) -> Result<&'r str> {
        row.get(field)
            .ok_or_else(|| SpecError::MissingField(format!("{} in {}", field, self.spec.family)))
    }

    fn apply(&self, step: Step, row: &RawRecord, draft: &mut Draft) -> StepResult<()> {
        match step {
            Step::CleanVendor => draft.hw_vendor = Some(clean_vendor(self.text(row, "HW Vendor")?)),
            Step::SystemSeries => draft.system_series = Some(parse_system_name(self.text(row, "System Name")?)),
            Step::CpuVendor => draft.cpu_vendor = Some(get_cpu_vendor(self.text(row, "CPU Name")?)),
            Step::CpuGhzFromMhz => {
                draft.cpu_ghz = Some(droppable(parse_mhz_to_ghz(self.text(row, "CPU MHz")?))?);
            }
            Step::CpuGhzFromFrequency => {
                draft.cpu_ghz = Some(droppable(parse_frequency(self.text(row, "CPU MHz")?))?);
            }
            Step::MaxGhzFromMaxMhz => {
                let max = droppable(parse_mhz_to_ghz(self.text(row, "Max MHz")?))?;
                let nominal = required(draft.cpu_ghz, "CPU GHz")?;
                draft.max_ghz = Some(apply_clock_fallback(max, nominal));
            }
            Step::MaxGhzFromCharacteristics { source } => {
                let max = parse_cpu_char(self.text(row, source)?);
                let nominal = required(draft.cpu_ghz, "CPU GHz")?;
                draft.max_ghz = Some(apply_clock_fallback(max, nominal));
            }
            Step::TopologyWithThreads => {
                let topology = parse_topology(self.text(row, "CPU Enabled")?)?;
                draft.total_cores = Some(topology.total_cores);
                draft.chips = Some(topology.chips);
                draft.threads_per_core = Some(topology.threads_per_core());
                draft.cores_per_chip = Some(topology.cores_per_chip());
            }
            Step::TopologyWithCoresPerChip => {
                let topology = parse_topology(self.text(row, "CPU Enabled")?)?;
                draft.total_cores = Some(topology.total_cores);
                draft.chips = Some(topology.chips);
                draft.cores_per_chip = Some(self.reconcile_cores_per_chip(
                    topology.trailing,
                    topology.total_cores,
                    topology.chips,
                    true,
                ));
                draft.threads_per_core.get_or_insert(1);
            }
            Step::HardwareThreads => {
                draft.threads_per_core =
                    Some(parse_hardware_threads(self.text(row, "Hardware Threads")?).unwrap_or(1));
            }
            Step::StatedTopology { nodes, keep_stated } => {
                let chips = parse_count("Chips", self.text(row, "Chips")?)?;
                if chips == 0 {
                    return Err(SpecError::parse("Chips", "0").into());
                }
                let total_cores = parse_count("Total Cores", self.text(row, "Total Cores")?)?;
                check_core_count(total_cores, chips)?;
                let stated = parse_count("Cores Per Chip", self.text(row, "Cores Per Chip")?).ok();
                draft.chips = Some(chips);
                draft.total_cores = Some(total_cores);
                draft.cores_per_chip =
                    Some(self.reconcile_cores_per_chip(stated, total_cores, chips, keep_stated));
                draft.threads_per_core = Some(
                    parse_count("Threads Per Core", self.text(row, "Threads Per Core")?).unwrap_or(1),
                );
                if nodes {
                    draft.nodes = Some(parse_count("Nodes", self.text(row, "Nodes")?).unwrap_or(1));
                }
            }
            Step::LowercaseFileSystem => {
                draft.file_system = Some(self.text(row, "File System")?.to_lowercase());
            }
            Step::MemoryTotalAmount { source } => {
                draft.memory_amount = Some(droppable(get_total_memory_amount(self.text(row, source)?))?);
            }
            Step::MemoryDescribedAmount => {
                draft.memory_amount = Some(droppable(parse_described_memory(self.text(row, "Memory Size")?))?);
            }
            Step::MemoryNumber { source } => {
                draft.memory_number = Some(get_memory_number(self.text(row, source)?));
            }
            Step::StorageType => {
                draft.storage_type = Some(self.storage_policy.classify(self.text(row, "Storage")?));
            }
            Step::SubmissionPeriod => {
                let period = parse_submission_period(self.text(row, "URL Suffix")?)?;
                draft.submit_year = Some(period.year);
                draft.submit_quarter = Some(period.quarter);
            }
            Step::FullUrl => {
                draft.full_url = Some(get_full_url(self.spec.results_base, self.text(row, "URL Suffix")?));
            }
            Step::JoinOs { name, version, separator } => {
                draft.os = Some(format!("{}{}{}", self.text(row, name)?, separator, self.text(row, version)?));
            }
            Step::JoinJvm { name, version, separator } => {
                draft.jvm = Some(format!("{}{}{}", self.text(row, name)?, separator, self.text(row, version)?));
            }
            Step::StripCpuNameAsides => {
                draft.cpu_name = Some(strip_parentheticals(self.text(row, "CPU Name")?));
            }
            Step::TestDate(format) => draft.test_date = Some(format.clean(self.text(row, "Test Date")?)?),
            Step::HwAvail(format) => draft.hw_avail = Some(format.clean(self.text(row, "HW Avail")?)?),
        }
        Ok(())
    }

    /// Flags a stated cores-per-chip value that disagrees with the topology. The stated
    /// value wins only when `keep_stated` is set.
    fn reconcile_cores_per_chip(&self, stated: Option<u32>, total_cores: u32, chips: u32, keep_stated: bool) -> u32 {
        let derived = derive_cores_per_chip(total_cores, chips);
        match stated {
            Some(stated) if stated != derived => {
                warn!(
                    family = %self.spec.family,
                    stated,
                    derived,
                    "Stated cores per chip disagrees with {} cores on {} chips",
                    total_cores,
                    chips
                );
                counter!("spec_cores_per_chip_mismatch_total", "family" => self.spec.family.name())
                    .increment(1);
                if keep_stated {
                    stated
                } else {
                    derived
                }
            }
            Some(stated) => stated,
            None => derived,
        }
    }

    fn finish(&self, row: &RawRecord, draft: Draft) -> Result<CanonicalRecord> {
        let owned = |field: &str| self.text(row, field).map(str::to_string);
        let optional = |field: &str| row.get(field).map(str::to_string);

        let cpu_name = match draft.cpu_name {
            Some(name) => name,
            None => owned("CPU Name")?,
        };
        let os = match draft.os {
            Some(os) => os,
            None => owned("OS")?,
        };
        let storage = match draft.storage_type {
            Some(_) => optional("Storage"),
            None => None,
        };

        Ok(CanonicalRecord {
            suite: owned("Suite")?,
            hw_vendor: required(draft.hw_vendor, "HW Vendor")?,
            system_series: required(draft.system_series, "System Series")?,
            result: required(draft.result, "Result")?,
            cpu_vendor: required(draft.cpu_vendor, "CPU Vendor")?,
            cpu_name,
            cpu_ghz: required(draft.cpu_ghz, "CPU GHz")?,
            max_ghz: required(draft.max_ghz, "Max GHz")?,
            threads_per_core: required(draft.threads_per_core, "Threads Per Core")?,
            cores_per_chip: required(draft.cores_per_chip, "Cores Per Chip")?,
            chips: required(draft.chips, "Chips")?,
            nodes: draft.nodes,
            total_cores: required(draft.total_cores, "Total Cores")?,
            l1_cache: owned("L1 Cache")?,
            l2_cache: owned("L2 Cache")?,
            l3_cache: optional("L3 Cache"),
            memory: owned("Memory")?,
            memory_number: required(draft.memory_number, "Memory Number")?,
            memory_amount: required(draft.memory_amount, "Memory Amount")?,
            storage_type: draft.storage_type,
            storage,
            os,
            file_system: required(draft.file_system, "File System")?,
            jvm: draft.jvm,
            url_suffix: owned("URL Suffix")?,
            test_date: required(draft.test_date, "Test Date")?,
            hw_avail: required(draft.hw_avail, "HW Avail")?,
            submit_quarter: required(draft.submit_quarter, "Submit Quarter")?,
            submit_year: required(draft.submit_year, "Submit Year")?,
            full_url: required(draft.full_url, "Full URL")?,
        })
    }
}
