//! JVM2008 results take two hops: the summary page links to a "details" page
//! holding the configuration tables.

use super::html::{cell_text, detail_url, own_text, page_error, pair_cells, selector};
use super::{Fetcher, IndexEntry};
use crate::error::Result;
use crate::families::Family;
use crate::types::{BenchmarkSpider, RawRecord};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use tracing::{debug, instrument};

const INFO_SKIPPED: &[&str] = &["Submitter URL", "Tester", "Location"];
const HARDWARE_SKIPPED: &[&str] = &["HW vendor's URL", "CPU vendor's URL"];
const SOFTWARE_SKIPPED: &[&str] = &[
    "OS address bits",
    "OS tuning",
    "Other s/w name",
    "Other s/w tuning",
    "Other s/w available",
];
const JVM_SKIPPED: &[&str] = &[
    "Vendor URL",
    "Java Specification",
    "JVM address bits",
    "JVM initial heap memory",
    "JVM maximum heap memory",
    "JVM command line",
    "JVM command line startup",
    "JVM launcher startup",
    "Additional JVM tuning",
    "JVM class path",
    "JVM boot class path",
];

/// Score and details link from a summary page.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryLink {
    pub result: String,
    pub details_url: String,
}

fn row_link(row: ElementRef<'_>, link: &Selector) -> Option<String> {
    row.select(link)
        .find_map(|a| a.value().attr("href"))
        .map(str::to_string)
}

fn row_value(row: ElementRef<'_>, cell: &Selector) -> Option<String> {
    row.select(cell).map(own_text).filter(|t| !t.is_empty()).last()
}

/// The details link sits in the second-to-last row with the score two rows above
/// it; pages without a footer row shift both down by one.
pub fn parse_summary(body: &str, page_url: &str) -> Result<SummaryLink> {
    let document = Html::parse_document(body);
    let row_sel = selector("tbody tr")?;
    let link_sel = selector("a[href]")?;
    let cell_sel = selector("td")?;

    let rows: Vec<ElementRef> = document.select(&row_sel).collect();
    let n = rows.len();
    if n < 4 {
        return Err(page_error(page_url, format!("summary table has only {n} rows")));
    }

    let (score_row, href) = match row_link(rows[n - 2], &link_sel) {
        Some(href) => (rows[n - 4], href),
        None => {
            let href = row_link(rows[n - 1], &link_sel)
                .ok_or_else(|| page_error(page_url, "no details link"))?;
            (rows[n - 3], href)
        }
    };
    let score = row_value(score_row, &cell_sel).ok_or_else(|| page_error(page_url, "no score"))?;
    let result = score.split_whitespace().next().unwrap_or_default().to_string();

    Ok(SummaryLink {
        result,
        details_url: detail_url(page_url, href.trim_start_matches("./")),
    })
}

fn table_pairs(table: ElementRef<'_>, cell: &Selector, skipped: &[&str]) -> Vec<(String, String)> {
    pair_cells(table.select(cell).map(cell_text).collect())
        .into_iter()
        .filter(|(key, _)| !skipped.contains(&key.as_str()))
        .collect()
}

/// Builds the raw record from a details page.
pub fn parse_details(body: &str, suite: &str, result: &str, url_suffix: &str, url: &str) -> Result<RawRecord> {
    let document = Html::parse_document(body);
    let table_sel = selector("table tbody table")?;
    let cell_sel = selector("tbody tr td")?;

    let tables: Vec<ElementRef> = document.select(&table_sel).collect();
    let [info, software, jvm, hardware] = match tables.as_slice() {
        [info, software, jvm, hardware, ..] => [*info, *software, *jvm, *hardware],
        _ => return Err(page_error(url, format!("expected 4 detail tables, found {}", tables.len()))),
    };

    let mut record = RawRecord::new();
    record.insert("Suite", suite);
    record.insert("Result", result);
    record.extend(table_pairs(info, &cell_sel, INFO_SKIPPED).into_iter().collect());
    record.extend(table_pairs(hardware, &cell_sel, HARDWARE_SKIPPED).into_iter().collect());
    record.extend(table_pairs(software, &cell_sel, SOFTWARE_SKIPPED).into_iter().collect());
    for (key, value) in table_pairs(jvm, &cell_sel, JVM_SKIPPED) {
        let key = if key == "Vendor" { "JVM Vendor".to_string() } else { key };
        record.insert(key, value);
    }
    record.insert("URL Suffix", url_suffix);
    Ok(record)
}

pub struct Jvm2008Spider {
    fetcher: Arc<Fetcher>,
}

impl Jvm2008Spider {
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl BenchmarkSpider for Jvm2008Spider {
    fn family(&self) -> Family {
        Family::Jvm2008
    }

    fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    #[instrument(skip(self, entry), fields(url = %entry.detail_url))]
    async fn fetch_record(&self, entry: &IndexEntry) -> Result<Option<RawRecord>> {
        let suite = entry
            .suite
            .as_deref()
            .ok_or_else(|| page_error(&entry.detail_url, "index page has no suite name"))?;

        let summary_body = self.fetcher.get_text(&entry.detail_url).await?;
        let summary = parse_summary(&summary_body, &entry.detail_url)?;
        debug!(details = %summary.details_url, "Following details link");

        let details_body = self.fetcher.get_text(&summary.details_url).await?;
        parse_details(
            &details_body,
            suite,
            &summary.result,
            &entry.url_suffix,
            &summary.details_url,
        )
        .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUMMARY: &str = r#"
        <html><body><table><tbody>
          <tr><td>compiler</td><td>401.23</td></tr>
          <tr><td>Noncompliant</td><td>-</td></tr>
          <tr><td>SPECjvm2008 Peak</td><td>189.38 ops/m</td></tr>
          <tr><td>Footnotes</td><td>none</td></tr>
          <tr><td><a href="./jvm2008-20090302-00012.details.html">Details</a></td></tr>
          <tr><td>Copyright</td></tr>
        </tbody></table></body></html>"#;

    const DETAILS: &str = r#"
        <html><body><table><tbody><tr><td>
          <table><tbody>
            <tr><td>Test date:</td><td>Mon Mar 02 11:00:00 EST 2009</td></tr>
            <tr><td>Tester</td><td>Sun</td></tr>
          </tbody></table>
          <table><tbody>
            <tr><td>OS name</td><td>Solaris 10</td></tr>
            <tr><td>OS tuning</td><td>none</td></tr>
          </tbody></table>
          <table><tbody>
            <tr><td>Vendor</td><td>Sun Microsystems Inc.</td></tr>
            <tr><td>JVM name</td><td>Java HotSpot(TM) 64-Bit Server VM</td></tr>
          </tbody></table>
          <table><tbody>
            <tr><td>HW vendor</td><td>Sun Microsystems Inc.</td></tr>
            <tr><td>CPU name</td><td>Intel Xeon X7460 (2.66 GHz)</td></tr>
          </tbody></table>
        </td></tr></tbody></table></body></html>"#;

    #[test]
    fn test_parse_summary_follows_details_link() {
        let summary = parse_summary(SUMMARY, "https://spec.org/jvm2008/results/res2009q1/jvm2008-20090302-00012.html").unwrap();
        assert_eq!(summary.result, "189.38");
        assert_eq!(
            summary.details_url,
            "https://spec.org/jvm2008/results/res2009q1/jvm2008-20090302-00012.details.html"
        );
    }

    #[test]
    fn test_parse_details_tables() {
        let record = parse_details(DETAILS, "SPECjvm2008", "189.38", "res2009q1/x.html", "u").unwrap();

        assert_eq!(record.get("Result"), Some("189.38"));
        assert_eq!(record.get("Test date:"), Some("Mon Mar 02 11:00:00 EST 2009"));
        assert_eq!(record.get("Tester"), None);
        assert_eq!(record.get("OS tuning"), None);
        assert_eq!(record.get("JVM Vendor"), Some("Sun Microsystems Inc."));
        assert_eq!(record.get("CPU name"), Some("Intel Xeon X7460 (2.66 GHz)"));

        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(keys.first(), Some(&"Suite"));
        assert_eq!(keys.last(), Some(&"URL Suffix"));
    }
}
