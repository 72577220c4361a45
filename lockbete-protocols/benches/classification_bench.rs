#[macro_use]
extern crate criterion;

use criterion::{black_box, Criterion, Throughput};

use lockbete_protocols::{synthesize_reply, SnmpClassifier};

// v2c GetNextRequest for 1.3.6.1.2.1 with community "public", as sent by
// most snmpwalk-style scanners.
const SNMP_V2C_GETNEXT: &[u8] = &[
    0x30, 0x26, // SEQUENCE
    0x02, 0x01, 0x01, // version: 1 (v2c)
    0x04, 0x06, 0x70, 0x75, 0x62, 0x6c, 0x69, 0x63, // "public"
    0xA1, 0x19, // GetNextRequest PDU
    0x02, 0x04, 0x1d, 0x2f, 0x3b, 0x4c, // request-id
    0x02, 0x01, 0x00, // error-status
    0x02, 0x01, 0x00, // error-index
    0x30, 0x0b, 0x30, 0x09, // varbinds
    0x06, 0x05, 0x2b, 0x06, 0x01, 0x02, 0x01, // 1.3.6.1.2.1
    0x05, 0x00, // NULL
];

fn benchmark_snmp_classification(c: &mut Criterion) {
    let classifier = SnmpClassifier::new();

    c.bench_function("snmp_classification", |b| {
        b.iter(|| black_box(classifier.classify(black_box(SNMP_V2C_GETNEXT))))
    });
}

fn benchmark_worst_case_datagram(c: &mut Criterion) {
    let classifier = SnmpClassifier::new();
    // No markers at all forces every scan across the full payload.
    let mut payload = vec![0x41u8; 65_507];
    payload[0] = 0x30;

    let mut group = c.benchmark_group("snmp_max_datagram");
    group.throughput(Throughput::Bytes(payload.len() as u64));
    group.bench_function("classify_65507", |b| {
        b.iter(|| black_box(classifier.classify(black_box(&payload))))
    });
    group.finish();
}

fn benchmark_reply_synthesis(c: &mut Criterion) {
    c.bench_function("snmp_reply", |b| {
        b.iter(|| black_box(synthesize_reply(black_box(SNMP_V2C_GETNEXT))))
    });
}

criterion_group!(
    benches,
    benchmark_snmp_classification,
    benchmark_worst_case_datagram,
    benchmark_reply_synthesis
);
criterion_main!(benches);
