//! Result-page spiders, one per benchmark family.

pub mod cpu;
pub mod html;
pub mod jbb2015;
pub mod jvm2008;
pub mod ssj2008;

use crate::config::HttpConfig;
use crate::error::Result;
use crate::families::Family;
use crate::types::BenchmarkSpider;
use html::{cell_text, detail_url, selector};
use scraper::Html;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Shared HTTP client. Requests are issued one at a time.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    max_results: Option<usize>,
}

impl Fetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            max_results: config.max_results,
        })
    }

    pub fn max_results(&self) -> Option<usize> {
        self.max_results
    }

    #[instrument(skip(self))]
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        debug!("Fetched {} bytes", body.len());
        Ok(body)
    }
}

/// One linked row of an index page.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub suite: Option<String>,
    pub url_suffix: String,
    pub detail_url: String,
    /// Text of every cell in the row.
    pub cells: Vec<String>,
}

/// Reads the suite name and result links out of an index page.
pub fn parse_index(body: &str, page_url: &str) -> Result<Vec<IndexEntry>> {
    let document = Html::parse_document(body);
    let suite_sel = selector(".idx_table h2 a[name]")?;
    let row_sel = selector("tbody tr")?;
    let link_sel = selector("a[href]")?;
    let cell_sel = selector("td")?;

    let suite = document
        .select(&suite_sel)
        .next()
        .and_then(|a| a.value().attr("name"))
        .map(str::to_string);

    let entries = document
        .select(&row_sel)
        .filter_map(|row| {
            let href = row.select(&link_sel).next()?.value().attr("href")?.trim();
            if href.is_empty() {
                return None;
            }
            Some(IndexEntry {
                suite: suite.clone(),
                url_suffix: href.to_string(),
                detail_url: detail_url(page_url, href),
                cells: row.select(&cell_sel).map(cell_text).collect(),
            })
        })
        .collect();

    Ok(entries)
}

pub fn spider_for(family: Family, fetcher: Arc<Fetcher>) -> Box<dyn BenchmarkSpider> {
    match family {
        Family::Cpu2017 => Box::new(cpu::CpuSpider::cpu2017(fetcher)),
        Family::Cpu2006 => Box::new(cpu::CpuSpider::cpu2006(fetcher)),
        Family::Jbb2015 => Box::new(jbb2015::Jbb2015Spider::new(fetcher)),
        Family::Jvm2008 => Box::new(jvm2008::Jvm2008Spider::new(fetcher)),
        Family::Ssj2008 => Box::new(ssj2008::Ssj2008Spider::new(fetcher)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = r#"
        <html><body>
        <div class="idx_table">
          <h2><a name="CINT2017_rate">SPECrate 2017 Integer</a></h2>
          <table>
            <thead><tr><th>Sponsor</th><th>System</th><th>Result</th></tr></thead>
            <tbody>
              <tr><td>Dell Inc.</td><td><a href="res2019q2/cpu2017-20190513-14021.html">PowerEdge R740</a></td><td>245</td></tr>
              <tr><td>Withdrawn</td><td>n/a</td><td>0</td></tr>
              <tr><td>HPE</td><td><a href="">ProLiant</a></td><td>1</td></tr>
              <tr><td>Lenovo</td><td><a href="res2019q3/cpu2017-20190708-16000.html">ThinkSystem SR650</a></td><td>260</td></tr>
            </tbody>
          </table>
        </div>
        </body></html>"#;

    #[test]
    fn test_parse_index_skips_rows_without_links() {
        let entries = parse_index(INDEX, "https://spec.org/cpu2017/results/rint2017.html").unwrap();
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.suite.as_deref(), Some("CINT2017_rate"));
        assert_eq!(first.url_suffix, "res2019q2/cpu2017-20190513-14021.html");
        assert_eq!(
            first.detail_url,
            "https://spec.org/cpu2017/results/res2019q2/cpu2017-20190513-14021.html"
        );
        assert_eq!(first.cells, vec!["Dell Inc.", "PowerEdge R740", "245"]);
        assert_eq!(entries[1].url_suffix, "res2019q3/cpu2017-20190708-16000.html");
    }
}
