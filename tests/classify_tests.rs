//! Integration tests for bounce classification and the CSV report.

use std::path::Path;

use bouncescan::classify::{classify_raw, diagnostic_headers};
use bouncescan::mailbox::mbox::MboxMailbox;
use bouncescan::mailbox::SearchQuery;
use bouncescan::model::bounce::FailureReason;
use bouncescan::model::message::Message;
use bouncescan::report::csv::ReportWriter;
use bouncescan::scan::scan_mailbox;
use predicates::prelude::*;

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn report_for(name: &str) -> (String, String) {
    let mut mbox = MboxMailbox::open(fixture(name)).unwrap();
    let mut out = Vec::new();
    let mut diag = Vec::new();
    let mut report = ReportWriter::new(&mut out, Some(&mut diag));
    report.write_header().unwrap();
    scan_mailbox(&mut mbox, &SearchQuery::All, &mut report, None).unwrap();
    report.finish().unwrap();
    (String::from_utf8(out).unwrap(), String::from_utf8(diag).unwrap())
}

// ─── Sender gate ────────────────────────────────────────────────────

#[test]
fn test_non_bounce_sender_is_ignored_whatever_the_body() {
    let raw = b"From: Alice <alice@example.com>\n\n<bob@example.com>:\nUser unknown\n";
    assert!(classify_raw(raw).is_none());
}

#[test]
fn test_missing_from_header_is_not_a_bounce() {
    assert!(classify_raw(b"Subject: hi\n\n<bob@example.com>:\nUser unknown\n").is_none());
}

#[test]
fn test_encoded_from_is_decoded_before_the_gate() {
    let raw = b"From: =?UTF-8?B?TWFpbCBEZWxpdmVyeQ==?= <MAILER-DAEMON@mx.example>\n\n\
<bob@example.com>:\nover quota\n";
    let record = classify_raw(raw).unwrap();
    assert_eq!(record.reason, FailureReason::MailboxOverQuota);
}

// ─── Address recovery ───────────────────────────────────────────────

#[test]
fn test_gmail_and_outlook_addresses() {
    let gmail = classify_raw(b"From: mailer-daemon@googlemail.com\n\n<a@b.com>:\nUser unknown\n")
        .unwrap();
    assert_eq!(gmail.address.as_deref(), Some("a@b.com"));

    let outlook = classify_raw(
        b"From: postmaster@outlook.com\n\nc@d.org<mailto:c@d.org>\nmailbox is disabled\n",
    )
    .unwrap();
    assert_eq!(outlook.address.as_deref(), Some("c@d.org"));
    assert_eq!(outlook.reason, FailureReason::MailboxDisabled);
}

#[test]
fn test_ambiguous_address_is_absent_but_reason_survives() {
    let raw = b"From: MAILER-DAEMON@host\n\n<a@b.com>:\n<c@d.com>:\nUser unknown\n";
    let record = classify_raw(raw).unwrap();
    assert_eq!(record.address, None);
    assert_eq!(record.reason, FailureReason::MailboxNotFound);
}

// ─── Reason precedence ──────────────────────────────────────────────

#[test]
fn test_first_rule_in_table_order_wins() {
    let raw = b"From: postmaster@host\n\n<a@b.com>:\nmailbox is disabled, User unknown\n";
    assert_eq!(
        classify_raw(raw).unwrap().reason,
        FailureReason::MailboxNotFound
    );
}

#[test]
fn test_html_only_bounce_is_unknown() {
    let raw = b"From: postmaster@host\nContent-Type: text/html\n\n<p>User unknown</p>\n";
    let record = classify_raw(raw).unwrap();
    assert_eq!(record.reason, FailureReason::Unknown);
    assert_eq!(record.diagnostics.unwrap().body, "");
}

// ─── Diagnostics ────────────────────────────────────────────────────

#[test]
fn test_diagnostic_header_block_layout() {
    let msg = Message::parse(
        &b"From: MAILER-DAEMON@host\nTo: me@host\nSubject: =?UTF-8?Q?Caf=C3=A9?=\n\nbody\n"[..],
    );
    assert_eq!(
        diagnostic_headers(&msg),
        "SUBJECT : Caf\u{e9}\nTO      : me@host\nFROM    : MAILER-DAEMON@host\nDATE    : \n"
    );
}

// ─── Full mailbox scan ──────────────────────────────────────────────

#[test]
fn test_fixture_report_rows() {
    let (csv, _) = report_for("bounces.mbox");
    let rows: Vec<&str> = csv.split("\r\n").collect();

    assert_eq!(
        rows[0],
        "Email,Failure Reason,Headers (for debugging),Body (for debugging)"
    );
    assert_eq!(rows[1], "nobody@example.com,Mailbox not found");
    assert_eq!(
        rows[2],
        "carol@example.org,Mailbox unavailable (generic error)"
    );
    assert_eq!(rows[3], "dupont@laposte.example,Mailbox over quota");
    assert_eq!(
        rows[4],
        "ghost@yahoo.example,Mailbox unavailable (generic error)"
    );
    assert!(rows[5].starts_with(",Unknown,\"SUBJECT : Delivery Status Notification (Delay)\n"));
    assert!(csv.contains("421 4.4.1 unrelated timeout"));
    assert!(!csv.contains("alice@example.com"));
    assert!(csv.ends_with("\r\n"));
}

#[test]
fn test_attached_original_message_is_part_of_the_body() {
    use bouncescan::mailbox::Mailbox;

    let mut mbox = MboxMailbox::open(fixture("bounces.mbox")).unwrap();
    let body = Message::parse(mbox.fetch(1).unwrap()).body_text();
    assert!(body.contains("User unknown"));
    assert!(body.contains("would you answer a quick survey?"));
    assert!(!body.contains("Reporting-MTA"));
}

#[test]
fn test_latin1_bounce_body_is_decoded() {
    use bouncescan::mailbox::Mailbox;

    let mut mbox = MboxMailbox::open(fixture("bounces.mbox")).unwrap();
    let msg = Message::parse(mbox.fetch(3).unwrap());
    assert!(msg.body_text().contains("pas pu \u{ea}tre remis"));
    assert_eq!(
        msg.decoded_header("from").as_deref(),
        Some("Syst\u{e8}me de messagerie <MAILER-DAEMON@laposte.example>")
    );
}

#[test]
fn test_fixture_unknown_details_on_diagnostic_stream() {
    let (_, diag) = report_for("bounces.mbox");
    assert_eq!(diag.matches("=== UNKNOWN ERROR, DETAILS: ===").count(), 1);
    assert!(diag.contains("FROM    : Mail Delivery Subsystem <mailer-daemon@googlemail.com>"));
    assert!(diag.contains("DATE    : Wed, 17 Aug 2022 09:00:00 +0000"));
}

#[test]
fn test_fixture_summary() {
    let mut mbox = MboxMailbox::open(fixture("bounces.mbox")).unwrap();
    assert_eq!(mbox.len(), 6);

    let mut out = Vec::new();
    let mut report: ReportWriter<_, Vec<u8>> = ReportWriter::new(&mut out, None);
    let summary = scan_mailbox(&mut mbox, &SearchQuery::All, &mut report, None).unwrap();

    assert_eq!(summary.total, 5);
    assert_eq!(summary.count(FailureReason::MailboxNotFound), 1);
    assert_eq!(summary.count(FailureReason::MailboxOverQuota), 1);
    assert_eq!(summary.count(FailureReason::MailboxUnavailableGeneric), 2);
    assert_eq!(summary.count(FailureReason::Unknown), 1);
    assert_eq!(summary.count(FailureReason::MailboxDisabled), 0);
    assert_eq!(summary.without_address, 1);
}

#[test]
fn test_progress_reaches_total() {
    use std::cell::Cell;

    let mut mbox = MboxMailbox::open(fixture("bounces.mbox")).unwrap();
    let mut out = Vec::new();
    let mut report: ReportWriter<_, Vec<u8>> = ReportWriter::new(&mut out, None);
    let last = Cell::new((0, 0));
    let cb = |current: usize, total: usize| last.set((current, total));
    scan_mailbox(&mut mbox, &SearchQuery::All, &mut report, Some(&cb)).unwrap();
    assert_eq!(last.get(), (6, 6));
}

#[test]
fn test_empty_mailbox_yields_header_only() {
    let (csv, diag) = report_for("empty.mbox");
    assert_eq!(
        csv,
        "Email,Failure Reason,Headers (for debugging),Body (for debugging)\r\n"
    );
    assert!(diag.is_empty());
}

// ─── Local .eml files ───────────────────────────────────────────────

#[test]
fn test_report_file_from_eml_bounces() {
    use assert_fs::prelude::*;

    let dir = assert_fs::TempDir::new().unwrap();
    let eml = dir.child("bounce.eml");
    eml.write_str("From: MAILER-DAEMON@mx.example\r\nSubject: failure\r\n\r\n<eve@example.net>:\r\nHost or domain name not found\r\n")
        .unwrap();

    let msg = bouncescan::parser::eml::read_eml(eml.path()).unwrap();
    let record = bouncescan::classify::classify_message(&msg).unwrap();

    let report = dir.child("report.csv");
    let file = std::fs::File::create(report.path()).unwrap();
    let mut writer: ReportWriter<_, Vec<u8>> = ReportWriter::new(file, None);
    writer.write_header().unwrap();
    writer.write_record(&record).unwrap();
    writer.finish().unwrap();

    report.assert(predicate::str::contains("eve@example.net,Domain doesn't exist\r\n"));
    report.assert(predicate::str::starts_with("Email,Failure Reason"));
}
