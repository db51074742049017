//! Export path throughput benchmark.
//!
//! Measures snapshot export and JSON encoding for a record populated the
//! way a busy request would populate it.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;

use requestlens_core::{DatabaseQueryDetails, DiagnosticRecord};

fn populated_record() -> DiagnosticRecord {
    let mut record = DiagnosticRecord::new();
    record.method = Some("GET".to_string());
    record.url = Some("http://localhost/reports".to_string());
    record.response_time = record.time.map(|t| t + 0.182);
    record.response_status = Some(200);

    for i in 0..100 {
        record.add_database_query(
            format!("SELECT * FROM reports WHERE id = {}", i),
            json!([i]),
            Some(1.5),
            DatabaseQueryDetails {
                connection: Some("mysql".to_string()),
                ..Default::default()
            },
        );
    }
    for i in 0..50 {
        record.add_cache_query(
            "hit",
            format!("report:{}", i),
            json!({"rows": i}),
            Some(0.1),
            Default::default(),
        );
    }
    for i in 0..25 {
        record.add_event("report.viewed", json!({"id": i}), None, Default::default());
        record.add_log_entry(json!({"level": "info", "message": format!("report {}", i)}));
    }
    record
}

fn bench_export(c: &mut Criterion) {
    let record = populated_record();

    c.bench_function("export", |b| b.iter(|| black_box(record.export())));
    c.bench_function("to_json", |b| b.iter(|| black_box(record.to_json())));
}

criterion_group!(benches, bench_export);
criterion_main!(benches);
