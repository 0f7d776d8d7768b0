//! Integration tests for MBOX-backed mailboxes and the per-day count.

use std::path::Path;

use chrono::NaiveDate;

use bouncescan::error::BounceError;
use bouncescan::mailbox::mbox::MboxMailbox;
use bouncescan::mailbox::{parse_date_arg, Mailbox, SearchQuery};
use bouncescan::report::count::{count_per_day, date_range, write_counts};

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_open_fixture() {
    let mut mbox = MboxMailbox::open(fixture("bounces.mbox")).unwrap();
    assert_eq!(mbox.len(), 6);
    assert_eq!(mbox.search(&SearchQuery::All).unwrap(), vec![1, 2, 3, 4, 5, 6]);

    let first = mbox.fetch(1).unwrap();
    assert!(first.starts_with(b"From MAILER-DAEMON"));
    let last = mbox.fetch(6).unwrap();
    assert!(String::from_utf8_lossy(&last).contains("unrelated timeout"));
}

#[test]
fn test_open_missing_file() {
    assert!(matches!(
        MboxMailbox::open(fixture("does-not-exist.mbox")),
        Err(BounceError::FileNotFound(_))
    ));
}

#[test]
fn test_empty_mbox() {
    let mut mbox = MboxMailbox::open(fixture("empty.mbox")).unwrap();
    assert!(mbox.is_empty());
    assert!(mbox.search(&SearchQuery::All).unwrap().is_empty());
}

#[test]
fn test_search_on_day_uses_utc() {
    // Message 3 is dated 13:00 +0200, still the 16th in UTC
    let mut mbox = MboxMailbox::open(fixture("bounces.mbox")).unwrap();
    assert_eq!(
        mbox.search(&SearchQuery::On(ymd(2022, 8, 16))).unwrap(),
        vec![1, 2, 3, 4, 5]
    );
    assert_eq!(mbox.search(&SearchQuery::On(ymd(2022, 8, 17))).unwrap(), vec![6]);
}

#[test]
fn test_count_fixture_range() {
    let mut mbox = MboxMailbox::open(fixture("bounces.mbox")).unwrap();
    let days = date_range(ymd(2022, 8, 15), ymd(2022, 8, 17)).unwrap();
    let counts = count_per_day(&mut mbox, &days).unwrap();

    let mut out = Vec::new();
    write_counts(&mut out, &counts).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "date,count\n15-Aug-2022,0\n16-Aug-2022,5\n17-Aug-2022,1\n"
    );
}

#[test]
fn test_count_keeps_requested_order() {
    let mut mbox = MboxMailbox::open(fixture("bounces.mbox")).unwrap();
    let days = vec![
        parse_date_arg("17-Aug-2022").unwrap(),
        parse_date_arg("2022-08-16").unwrap(),
    ];
    let counts = count_per_day(&mut mbox, &days).unwrap();
    assert_eq!(counts[0].date, ymd(2022, 8, 17));
    assert_eq!(counts[0].count, 1);
    assert_eq!(counts[1].count, 5);
}

#[test]
fn test_cli_date_argument_errors() {
    assert!(matches!(
        parse_date_arg("16/08/2022"),
        Err(BounceError::InvalidDate(_))
    ));
}
