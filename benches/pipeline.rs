//! Benchmarks for the view pipeline
//!
//! Run: cargo bench
//! Run specific: cargo bench -- sort
//! Compare: cargo bench -- --save-baseline v1 && cargo bench -- --baseline v1

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Value};

use knowledge_lens::fetch::records_from_envelope;
use knowledge_lens::model::RawDocumentRecord;
use knowledge_lens::{format_byte_size, format_date, Normalizer, SortKey, ViewQuery};

fn payload(count: usize) -> Value {
    let owners = ["Sarah Chen", "Mike Johnson", "Émile Zola", "alex kim"];
    let sources = ["application/pdf", "text/markdown", "image/png", "text/plain"];
    let records: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "id": i.to_string(),
                "title": format!("Document {} roadmap {}", i, i % 17),
                "source": sources[i % sources.len()],
                "fileSize": (i * 7919) % 5_000_000,
                "createdAt": format!("2024-{:02}-{:02}T10:00:00Z", i % 12 + 1, i % 28 + 1),
                "profile": { "name": owners[i % owners.len()] }
            })
        })
        .collect();
    json!({ "data": records })
}

// ============================================================================
// Formatters
// ============================================================================

fn benchmark_formatters(c: &mut Criterion) {
    c.bench_function("format_byte_size_5", |b| {
        b.iter(|| {
            for bytes in [0.0, 512.0, 1024.0, 2_450_000.0, 8e9] {
                black_box(format_byte_size(Some(black_box(bytes))));
            }
        })
    });

    c.bench_function("format_date", |b| {
        b.iter(|| black_box(format_date(Some(black_box("2024-11-15T09:30:00Z")))))
    });
}

// ============================================================================
// Decode + Normalize
// ============================================================================

fn benchmark_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_normalize");

    for count in [100, 1_000, 10_000].iter() {
        let value = payload(*count);
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| {
                let raw: Vec<RawDocumentRecord> = records_from_envelope(value.clone()).unwrap();
                black_box(Normalizer::default().documents(&raw))
            })
        });
    }

    group.finish();
}

// ============================================================================
// Filter + Sort
// ============================================================================

fn benchmark_filter_sort(c: &mut Criterion) {
    let raw: Vec<RawDocumentRecord> = records_from_envelope(payload(10_000)).unwrap();
    let docs = Normalizer::default().documents(&raw);

    let mut group = c.benchmark_group("filter_sort_10k");
    for sort in [SortKey::Recent, SortKey::Title, SortKey::Owner, SortKey::Size] {
        group.bench_with_input(BenchmarkId::new("sort", sort.as_str()), &sort, |b, sort| {
            let query = ViewQuery::new("", *sort);
            b.iter(|| black_box(query.apply(&docs)))
        });
    }
    group.bench_function("filter_roadmap_3", |b| {
        let query = ViewQuery::new("roadmap 3", SortKey::Title);
        b.iter(|| black_box(query.apply(&docs)))
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_formatters,
    benchmark_normalize,
    benchmark_filter_sort
);
criterion_main!(benches);
