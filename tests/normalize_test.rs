use rstest::rstest;
use spec_scraper::normalize::*;

#[rstest]
#[case(2100.0, 2.1)]
#[case(2933.0, 2.93)]
#[case(3466.7, 3.47)]
#[case(0.0, 0.0)]
fn test_mhz_to_ghz_rounds_to_two_places(#[case] mhz: f64, #[case] ghz: f64) {
    assert_eq!(mhz_to_ghz(mhz), ghz);
    assert_eq!(mhz_to_ghz(mhz), round2(mhz / 1000.0));
}

#[rstest]
#[case("Hewlett-Packard Company")]
#[case("hewlett-packard")]
#[case("HEWLETT-PACKARD DEVELOPMENT COMPANY, L.P.")]
#[case("Compaq (Hewlett-Packard)")]
fn test_hewlett_packard_is_hpe(#[case] raw: &str) {
    assert_eq!(clean_vendor(raw), "HPE");
}

#[test]
fn test_two_segment_topology() {
    let topology = parse_topology("12 cores, 2 chips").unwrap();
    assert_eq!(topology.total_cores, 12);
    assert_eq!(topology.chips, 2);
    assert_eq!(topology.threads_per_core(), 1);
    assert_eq!(topology.cores_per_chip(), 6);
}

#[test]
fn test_date_layouts() {
    assert_eq!(clean_date_2("May 1, 2018").unwrap(), "2018-5-1");
    assert_eq!(clean_date_1("May-2017").unwrap(), "2017-5-1");
    assert_eq!(clean_date_1("2014.3").unwrap(), "2014-3-1");
    assert_eq!(clean_date_3("Thu Aug 20 04:16:03 GMT-05:00 2015").unwrap(), "2015-8-20");
}

#[test]
fn test_storage_classification() {
    assert_eq!(parse_storage("256GB SSD"), StorageType::Ssd);
    assert_eq!(parse_storage("zfs on HDD"), StorageType::Hdd);
    assert_eq!(parse_storage("tmpfs"), StorageType::Tmpfs);
}

#[test]
fn test_submission_period() {
    let suffix = "res2022q1/cpu2017-20220110-30571.html";
    assert_eq!(get_submit_year(suffix).unwrap(), 2022);
    assert_eq!(get_submit_quarter(suffix).unwrap(), 1);
}

#[test]
fn test_memory_amount_is_idempotent() {
    let once = get_total_memory_amount("1.5 TB (24 x 64 GB 2Rx4 PC4-2933Y-R)").unwrap();
    assert_eq!(once, 1536.0);
    assert_eq!(get_total_memory_amount(&once.to_string()).unwrap(), once);
    assert_eq!(get_total_memory_amount("768").unwrap(), 768.0);
}

#[rstest]
#[case(0.0, 2.93, 2.93)]
#[case(2.0, 2.93, 2.93)]
#[case(3.6, 2.93, 3.6)]
fn test_clock_fallback_never_below_nominal(#[case] max: f64, #[case] nominal: f64, #[case] expected: f64) {
    let resolved = apply_clock_fallback(max, nominal);
    assert_eq!(resolved, expected);
    assert!(resolved >= nominal);
}

#[test]
fn test_characteristics_clock() {
    assert_eq!(parse_cpu_char("Intel Turbo Boost Technology up to 3.90 GHz"), 3.9);
    assert_eq!(parse_cpu_char("Max 3200 MHz"), 3.2);
    assert_eq!(parse_cpu_char("none"), 0.0);
}
