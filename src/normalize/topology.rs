//! Enabled-CPU topology strings such as "64 cores, 2 chips, 2 threads/core".
//!
//! Parsing is positional: each comma-separated segment contributes the integer in
//! its first whitespace token. The meaning of the third segment differs between
//! families (threads per core on CPU pages, cores per chip on power pages), so it
//! is kept as-is and interpreted by the caller.

use crate::error::{Result, SpecError};
use once_cell::sync::Lazy;
use regex::Regex;

static THREADS_PER_CORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*/\s*core").expect("threads pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    pub total_cores: u32,
    pub chips: u32,
    pub trailing: Option<u32>,
}

impl Topology {
    /// Third segment read as threads per core, 1 when the segment is absent.
    pub fn threads_per_core(&self) -> u32 {
        self.trailing.unwrap_or(1)
    }

    pub fn cores_per_chip(&self) -> u32 {
        derive_cores_per_chip(self.total_cores, self.chips)
    }
}

/// Floor division; `chips` is validated non-zero by every parser that produces it.
pub fn derive_cores_per_chip(total_cores: u32, chips: u32) -> u32 {
    total_cores / chips.max(1)
}

/// Every chip carries at least one core.
pub fn check_core_count(total_cores: u32, chips: u32) -> Result<()> {
    if total_cores < chips {
        return Err(SpecError::parse("total cores", format!("{total_cores} cores on {chips} chips")));
    }
    Ok(())
}

fn leading_integer(field: &'static str, segment: &str) -> Result<u32> {
    let token = segment
        .split_whitespace()
        .next()
        .ok_or_else(|| SpecError::parse(field, segment))?;
    token.parse::<u32>().map_err(|_| SpecError::parse(field, segment))
}

pub fn parse_topology(raw: &str) -> Result<Topology> {
    let segments: Vec<&str> = raw.split(',').collect();
    if segments.len() < 2 {
        return Err(SpecError::parse("CPU Enabled", raw));
    }

    let total_cores = leading_integer("total cores", segments[0])?;
    let chips = leading_integer("chips", segments[1])?;
    if chips == 0 {
        return Err(SpecError::parse("chips", raw));
    }
    check_core_count(total_cores, chips).map_err(|_| SpecError::parse("total cores", raw))?;
    let trailing = match segments.get(2) {
        Some(segment) => Some(leading_integer("CPU Enabled", segment)?),
        None => None,
    };

    Ok(Topology {
        total_cores,
        chips,
        trailing,
    })
}

/// Reads "N / core" out of a hardware-threads description like "96 (2 / core)".
pub fn parse_hardware_threads(raw: &str) -> Option<u32> {
    THREADS_PER_CORE
        .captures(raw)
        .and_then(|caps| caps[1].parse::<u32>().ok())
}

/// A stated count column ("2", "2 chips", "4.0").
pub fn parse_count(field: &'static str, raw: &str) -> Result<u32> {
    let token = raw
        .split_whitespace()
        .next()
        .ok_or_else(|| SpecError::parse(field, raw))?;
    if let Ok(n) = token.parse::<u32>() {
        return Ok(n);
    }
    match token.parse::<f64>() {
        Ok(v) if v >= 0.0 && v.fract() == 0.0 => Ok(v as u32),
        _ => Err(SpecError::parse(field, raw)),
    }
}
