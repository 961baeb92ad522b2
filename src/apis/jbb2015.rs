use super::html::{keyed_row, page_error, selector};
use super::{Fetcher, IndexEntry};
use crate::error::Result;
use crate::families::Family;
use crate::types::{BenchmarkSpider, RawRecord};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use tracing::instrument;

// Positions of the `table.alternate` sections on a result page.
const OVERALL_TABLE: usize = 1;
const HARDWARE_TABLE: usize = 2;
const SOFTWARE_TABLE: usize = 3;

fn rows<'a>(
    table: ElementRef<'a>,
    row: &'a Selector,
    link: &'a Selector,
    cell: &'a Selector,
) -> impl Iterator<Item = (String, String)> + 'a {
    table.select(row).filter_map(move |tr| keyed_row(tr, link, cell))
}

/// Builds the raw record for one result page. The two scores come from the index row.
pub fn parse_detail(body: &str, entry: &IndexEntry) -> Result<RawRecord> {
    let document = Html::parse_document(body);
    let row_sel = selector("tr")?;
    let link_sel = selector("a")?;
    let cell_sel = selector("td")?;
    let top_sel = selector(".section.mainDesc tr")?;
    let table_sel = selector("table.alternate")?;

    let suite = entry
        .suite
        .as_deref()
        .ok_or_else(|| page_error(&entry.detail_url, "index page has no suite name"))?;
    let (max_jops, critical_jops) = match entry.cells.as_slice() {
        [.., max, critical] => (max.clone(), critical.clone()),
        _ => return Err(page_error(&entry.detail_url, "index row has no jOPS cells")),
    };

    let tables: Vec<ElementRef> = document.select(&table_sel).collect();
    if tables.len() <= SOFTWARE_TABLE {
        return Err(page_error(
            &entry.detail_url,
            format!("expected {} configuration tables, found {}", SOFTWARE_TABLE + 1, tables.len()),
        ));
    }

    let mut record = RawRecord::new();
    record.insert("Suite", suite);
    record.insert("max_jOPS", max_jops);
    record.insert("critical_jOPS", critical_jops);

    for (key, value) in document
        .select(&top_sel)
        .skip(1)
        .filter_map(|tr| keyed_row(tr, &link_sel, &cell_sel))
    {
        record.insert(key, value);
    }

    for (key, value) in rows(tables[OVERALL_TABLE], &row_sel, &link_sel, &cell_sel) {
        record.insert(key, value);
    }

    for (key, value) in rows(tables[HARDWARE_TABLE], &row_sel, &link_sel, &cell_sel) {
        let key = if key == "Name" { "System Name".to_string() } else { key };
        record.insert(key, value);
    }

    // The software table lists the OS block first, then the JVM block, both
    // as Name / Vendor / Version rows.
    let mut block = "OS";
    for (key, value) in rows(tables[SOFTWARE_TABLE], &row_sel, &link_sel, &cell_sel) {
        match key.as_str() {
            "Name" | "Vendor" | "Version" => {
                if key == "Name" && record.get("OS Name").is_some() {
                    block = "JVM";
                }
                record.insert(format!("{} {}", block, key), value);
            }
            _ => record.insert(key, value),
        }
    }

    record.insert("URL Suffix", entry.url_suffix.as_str());
    Ok(record)
}

pub struct Jbb2015Spider {
    fetcher: Arc<Fetcher>,
}

impl Jbb2015Spider {
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl BenchmarkSpider for Jbb2015Spider {
    fn family(&self) -> Family {
        Family::Jbb2015
    }

    fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    #[instrument(skip(self, entry), fields(url = %entry.detail_url))]
    async fn fetch_record(&self, entry: &IndexEntry) -> Result<Option<RawRecord>> {
        let body = self.fetcher.get_text(&entry.detail_url).await?;
        parse_detail(&body, entry).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL: &str = r##"
        <html><body>
        <div class="section mainDesc"><table>
          <tr><th>Result</th><th></th></tr>
          <tr><td><a href="#test_date">Test date:</a></td><td>Dec 24, 2017</td></tr>
        </table></div>
        <table class="alternate"><tr><td><a href="#b">Benchmark</a></td><td>SPECjbb2015</td></tr></table>
        <table class="alternate">
          <tr><td><a href="#v">Vendor</a></td><td>Huawei</td></tr>
          <tr><td><a href="#n">Nodes Per System</a></td><td>1</td></tr>
          <tr><td><a href="#c">Chips Per System</a></td><td>2</td></tr>
        </table>
        <table class="alternate">
          <tr><td><a href="#hn">Name</a></td><td>FusionServer 2288H V5</td></tr>
          <tr><td><a href="#cpu">CPU Name</a></td><td>Intel Xeon Platinum 8180</td></tr>
        </table>
        <table class="alternate">
          <tr><td><a href="#osn">Name</a></td><td>Red Hat Enterprise Linux Server</td></tr>
          <tr><td><a href="#osv">Vendor</a></td><td>Red Hat</td></tr>
          <tr><td><a href="#osver">Version</a></td><td>7.4</td></tr>
          <tr><td><a href="#fs">File System</a></td><td>ext4</td></tr>
          <tr><td><a href="#jn">Name</a></td><td>Java HotSpot 64-Bit Server VM</td></tr>
          <tr><td><a href="#jv">Vendor</a></td><td>Oracle Corporation</td></tr>
          <tr><td><a href="#jver">Version</a></td><td>1.8.0_152</td></tr>
        </table>
        </body></html>"##;

    fn entry() -> IndexEntry {
        IndexEntry {
            suite: Some("SPECjbb2015-Composite".to_string()),
            url_suffix: "res2018q1/jbb2015-20180105-00205.html".to_string(),
            detail_url: "https://spec.org/jbb2015/results/res2018q1/jbb2015-20180105-00205.html".to_string(),
            cells: vec!["Huawei".to_string(), "FusionServer".to_string(), "108,327".to_string(), "72,215".to_string()],
        }
    }

    #[test]
    fn test_parse_jbb2015_detail() {
        let record = parse_detail(DETAIL, &entry()).unwrap();

        assert_eq!(record.get("max_jOPS"), Some("108,327"));
        assert_eq!(record.get("critical_jOPS"), Some("72,215"));
        assert_eq!(record.get("Test date"), Some("Dec 24, 2017"));
        assert_eq!(record.get("Vendor"), Some("Huawei"));
        assert_eq!(record.get("Chips Per System"), Some("2"));
        assert_eq!(record.get("System Name"), Some("FusionServer 2288H V5"));
        assert_eq!(record.get("OS Name"), Some("Red Hat Enterprise Linux Server"));
        assert_eq!(record.get("OS Version"), Some("7.4"));
        assert_eq!(record.get("JVM Name"), Some("Java HotSpot 64-Bit Server VM"));
        assert_eq!(record.get("JVM Vendor"), Some("Oracle Corporation"));
        assert_eq!(record.get("File System"), Some("ext4"));
        assert_eq!(record.get("Benchmark"), None);
    }

    #[test]
    fn test_missing_tables_is_a_page_error() {
        assert!(parse_detail("<html><body></body></html>", &entry()).is_err());
    }
}
