use criterion::{criterion_group, criterion_main, Criterion};
use std::path::Path;

use bouncescan::mailbox::mbox::MboxMailbox;
use bouncescan::mailbox::{Mailbox, SearchQuery};

fn fixture_path() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("bounces.mbox")
}

fn bench_classify_fixture(c: &mut Criterion) {
    let mut mbox = MboxMailbox::open(fixture_path()).unwrap();
    let raws: Vec<Vec<u8>> = mbox
        .search(&SearchQuery::All)
        .unwrap()
        .into_iter()
        .map(|id| mbox.fetch(id).unwrap())
        .collect();

    c.bench_function("classify_bounces_mbox", |b| {
        b.iter(|| {
            raws.iter()
                .filter_map(|raw| bouncescan::classify::classify_raw(raw))
                .count()
        })
    });
}

fn bench_reason_rules(c: &mut Criterion) {
    let body = "Delivery incomplete\n\nThere was a temporary problem delivering your message.\n\
421 4.4.1 unrelated timeout\n"
        .repeat(50);

    c.bench_function("classify_reason_no_match", |b| {
        b.iter(|| bouncescan::classify::reason::classify_reason(&body))
    });
}

criterion_group!(benches, bench_classify_fixture, bench_reason_rules);
criterion_main!(benches);
