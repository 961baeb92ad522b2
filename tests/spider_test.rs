use spec_scraper::apis::cpu::{parse_detail, CPU2017_LAYOUT};
use spec_scraper::apis::parse_index;
use spec_scraper::assembler::{Assembler, Outcome};
use spec_scraper::families::CPU2017;
use spec_scraper::normalize::{CpuVendor, UnknownStoragePolicy};

const INDEX_URL: &str = "https://spec.org/cpu2017/results/rint2017.html";

const INDEX: &str = r#"
<html><body>
<div class="idx_table">
  <h2><a name="CINT2017_rate">SPECrate2017 Integer Results</a></h2>
  <table><tbody>
    <tr>
      <td>Lenovo Global Technology</td>
      <td><a href="res2019q3/cpu2017-20190708-15974.html">ThinkSystem SR650</a></td>
      <td>287</td>
    </tr>
  </tbody></table>
</div>
</body></html>"#;

fn detail_page() -> String {
    let hardware = [
        "Intel Xeon Platinum 8280",
        "4000",
        "2700",
        "56 cores, 2 chips, 2 threads/core",
        "1, 2 chips",
        "32 KB I + 32 KB D on chip per core",
        "1 MB I+D on chip per core",
        "38.5 MB I+D on chip per chip",
        "None",
        "768 GB (24 x 32 GB 2Rx4 PC4-2933Y-R)",
        "1 x 800 GB SATA SSD",
        "None",
    ];
    let software = [
        "Red Hat Enterprise Linux Server release 7.6 (Maipo)",
        "C/C++: Version 19.0.4.227 of Intel C/C++",
        "No",
        "Lenovo BIOS Version IVE141E 2.30 released Mar-2019",
        "xfs",
        "Run level 3 (multi-user)",
        "64-bit",
        "32/64-bit",
        "jemalloc memory allocator V5.0.1",
    ];
    let rows = |values: &[&str]| {
        values
            .iter()
            .map(|v| format!("<tr><th>Field:</th><td>{v}</td></tr>"))
            .collect::<String>()
    };

    format!(
        r##"<html><body>
        <table><tr>
          <td class="systembar"><p>Lenovo Global Technology</p><p>ThinkSystem SR650 (2.70 GHz, Intel Xeon Platinum 8280)</p></td>
          <td class="metricbar base"><a href="#b">SPECrate2017_int_base</a><span class="value">287</span></td>
        </tr></table>
        <span id="test_date_val">Jun-2019</span>
        <span id="hw_avail_val">Apr-2019</span>
        <div id="Hardware"><table><tbody>{}</tbody></table></div>
        <div id="Software"><table><tbody>{}</tbody></table></div>
        </body></html>"##,
        rows(&hardware),
        rows(&software)
    )
}

#[test]
fn test_index_to_canonical_record() {
    let entries = parse_index(INDEX, INDEX_URL).unwrap();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];

    let raw = parse_detail(
        &CPU2017_LAYOUT,
        &detail_page(),
        entry.suite.as_deref().unwrap(),
        &entry.url_suffix,
        &entry.detail_url,
    )
    .unwrap();
    assert_eq!(raw.get("File System"), Some("xfs"));

    let assembler = Assembler::new(&CPU2017, UnknownStoragePolicy::default());
    let record = match assembler.assemble(&raw).unwrap() {
        Outcome::Kept(record) => *record,
        Outcome::Dropped(reason) => panic!("dropped: {reason:?}"),
    };

    assert_eq!(record.suite, "CINT2017_rate");
    assert_eq!(record.hw_vendor, "Lenovo");
    assert_eq!(record.system_series, "ThinkSystem SR650");
    assert_eq!(record.result, 287.0);
    assert_eq!(record.cpu_vendor, CpuVendor::Intel);
    assert_eq!((record.cpu_ghz, record.max_ghz), (2.7, 4.0));
    assert_eq!((record.total_cores, record.chips, record.cores_per_chip), (56, 2, 28));
    assert_eq!((record.memory_amount, record.memory_number), (768.0, 24));
    assert_eq!(record.test_date, "2019-6-1");
    assert_eq!(
        record.full_url,
        "https://spec.org/cpu2017/results/res2019q3/cpu2017-20190708-15974.html"
    );
}
