use super::html::{cell_text, first_text, keyed_row, page_error, pair_cells, selector};
use super::{Fetcher, IndexEntry};
use crate::error::Result;
use crate::families::Family;
use crate::types::{BenchmarkSpider, RawRecord};
use async_trait::async_trait;
use scraper::{ElementRef, Html};
use std::sync::Arc;
use tracing::instrument;

const HEADER_SKIPPED: &[&str] = &[
    "Test Location",
    "System Source",
    "System Designation",
    "Power Provisioning",
];
const HARDWARE_SKIPPED: &[&str] = &["Keyboard", "Mouse", "Monitor", "Optical Drives"];
const SOFTWARE_SKIPPED: &[&str] = &["JVM Command-line Options", "JVM Affinity"];

const LOAD_LEVELS: usize = 10;
const HARDWARE_MIN_ROWS: usize = 25;
const SOFTWARE_MIN_ROWS: usize = 15;

fn row_cells(row: ElementRef<'_>, cell: &scraper::Selector) -> Vec<String> {
    row.select(cell).map(cell_text).collect()
}

fn parse_load_levels(document: &Html, url: &str, record: &mut RawRecord) -> Result<()> {
    let row_sel = selector(".resultsTable tbody tr")?;
    let cell_sel = selector("td")?;
    let rows: Vec<ElementRef> = document.select(&row_sel).collect();
    if rows.len() < LOAD_LEVELS + 2 {
        return Err(page_error(url, format!("results table has only {} rows", rows.len())));
    }

    for row in &rows[..LOAD_LEVELS] {
        let cells = row_cells(*row, &cell_sel);
        if let [load, _, ops, watts, ratio, ..] = cells.as_slice() {
            record.insert(format!("ssj_ops @ {load} of target load"), ops.as_str());
            record.insert(format!("Average watts @ {load} of target load"), watts.as_str());
            record.insert(format!("Performance/power @ {load} of target load"), ratio.as_str());
        }
    }

    let idle = row_cells(rows[LOAD_LEVELS], &cell_sel);
    record.insert("Average watts @ active idle", idle.get(1).cloned().unwrap_or_default());
    let overall = row_cells(rows[LOAD_LEVELS + 1], &cell_sel);
    record.insert("Benchmark", overall.last().cloned().unwrap_or_default());
    Ok(())
}

/// Builds the raw record for one result page. Non-compliant results yield `None`.
pub fn parse_detail(body: &str, url_suffix: &str, url: &str) -> Result<Option<RawRecord>> {
    let document = Html::parse_document(body);
    if document.select(&selector(".noncompliant")?).next().is_some() {
        return Ok(None);
    }

    let suite = first_text(&document, ".benchmarkName")?
        .ok_or_else(|| page_error(url, "no benchmark name"))?;

    let mut record = RawRecord::new();
    record.insert("Suite", suite);

    let header_sel = selector(".resultHeader tbody td")?;
    let header_cells = document
        .select(&header_sel)
        .skip(2)
        .map(|td| cell_text(td).replace(':', ""))
        .collect();
    for (key, value) in pair_cells(header_cells) {
        if !HEADER_SKIPPED.contains(&key.as_str()) {
            record.insert(key, value);
        }
    }

    parse_load_levels(&document, url, &mut record)?;

    let section_sel = selector(".configSection tbody")?;
    let row_sel = selector("tr")?;
    let link_sel = selector("a")?;
    let cell_sel = selector("td")?;
    for section in document.select(&section_sel) {
        let pairs: Vec<(String, String)> = section
            .select(&row_sel)
            .filter_map(|tr| keyed_row(tr, &link_sel, &cell_sel))
            .collect();
        let first_key = pairs.first().map(|(k, _)| k.as_str()).unwrap_or_default();

        let skipped = if pairs.len() > HARDWARE_MIN_ROWS && first_key.contains("Hardware Vendor") {
            HARDWARE_SKIPPED
        } else if pairs.len() > SOFTWARE_MIN_ROWS && first_key.contains("Power Management") {
            SOFTWARE_SKIPPED
        } else {
            continue;
        };
        for (key, value) in pairs.iter().filter(|(k, _)| !skipped.contains(&k.as_str())) {
            record.insert(key.as_str(), value.as_str());
        }
    }

    record.insert("URL Suffix", url_suffix);
    Ok(Some(record))
}

pub struct Ssj2008Spider {
    fetcher: Arc<Fetcher>,
}

impl Ssj2008Spider {
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl BenchmarkSpider for Ssj2008Spider {
    fn family(&self) -> Family {
        Family::Ssj2008
    }

    fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    #[instrument(skip(self, entry), fields(url = %entry.detail_url))]
    async fn fetch_record(&self, entry: &IndexEntry) -> Result<Option<RawRecord>> {
        let body = self.fetcher.get_text(&entry.detail_url).await?;
        parse_detail(&body, &entry.url_suffix, &entry.detail_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_section(first: &str, count: usize, extra: &[(&str, &str)]) -> String {
        let mut rows = format!(r##"<tr><td><a href="#k">{first}:</a></td><td>value</td></tr>"##);
        for (key, value) in extra {
            rows.push_str(&format!(r##"<tr><td><a href="#k">{key}:</a></td><td>{value}</td></tr>"##));
        }
        for i in 0..count {
            rows.push_str(&format!(r##"<tr><td><a href="#k">Field {i}:</a></td><td>v{i}</td></tr>"##));
        }
        format!(r#"<div class="configSection"><table><tbody>{rows}</tbody></table></div>"#)
    }

    fn page() -> String {
        let mut load_rows = String::new();
        for pct in (10..=100).rev().step_by(10) {
            load_rows.push_str(&format!(
                "<tr><td>{pct}%</td><td>0.99</td><td>{}</td><td>200</td><td>1,000</td></tr>",
                pct * 100
            ));
        }
        load_rows.push_str("<tr><td>Active Idle</td><td>45.2</td></tr>");
        load_rows.push_str("<tr><td>&sum;ssj_ops / &sum;power =</td><td>12,345</td></tr>");

        format!(
            r#"<html><body>
            <div class="benchmarkName">SPECpower_ssj2008</div>
            <table class="resultHeader"><tbody>
              <tr><td>Fujitsu</td><td>PRIMERGY</td></tr>
              <tr><td>Test Date:</td><td>Sep 12, 2017</td></tr>
              <tr><td>Test Location:</td><td>Paderborn</td></tr>
              <tr><td>Hardware Availability:</td><td>Jul-2017</td></tr>
            </tbody></table>
            <table class="resultsTable"><tbody>{load_rows}</tbody></table>
            {hw}
            {sw}
            </body></html>"#,
            hw = config_section("Hardware Vendor", 26, &[("Model", "PRIMERGY RX2540 M4"), ("Keyboard", "USB")]),
            sw = config_section("Power Management", 16, &[("JVM Vendor", "Oracle Corporation"), ("JVM Affinity", "none")]),
        )
    }

    #[test]
    fn test_parse_ssj2008_detail() {
        let record = parse_detail(&page(), "res2017q3/power_ssj2008-20170829-00780.html", "u")
            .unwrap()
            .unwrap();

        assert_eq!(record.get("Suite"), Some("SPECpower_ssj2008"));
        assert_eq!(record.get("Test Date"), Some("Sep 12, 2017"));
        assert_eq!(record.get("Hardware Availability"), Some("Jul-2017"));
        assert_eq!(record.get("Test Location"), None);
        assert_eq!(record.get("ssj_ops @ 100% of target load"), Some("10000"));
        assert_eq!(record.get("Average watts @ active idle"), Some("45.2"));
        assert_eq!(record.get("Benchmark"), Some("12,345"));
        assert_eq!(record.get("Model"), Some("PRIMERGY RX2540 M4"));
        assert_eq!(record.get("Hardware Vendor"), Some("value"));
        assert_eq!(record.get("Keyboard"), None);
        assert_eq!(record.get("JVM Vendor"), Some("Oracle Corporation"));
        assert_eq!(record.get("JVM Affinity"), None);
    }

    #[test]
    fn test_non_compliant_page_is_skipped() {
        let body = r#"<html><body><div class="noncompliant">Non-Compliant</div></body></html>"#;
        assert_eq!(parse_detail(body, "res2010q1/x.html", "u").unwrap(), None);
    }

    #[test]
    fn test_short_sections_are_ignored() {
        let body = page().replace("Hardware Vendor", "Set Identifier");
        let record = parse_detail(&body, "res2017q3/x.html", "u").unwrap().unwrap();
        assert_eq!(record.get("Model"), None);
    }
}
