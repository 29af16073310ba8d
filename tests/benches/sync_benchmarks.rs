//! # Merge Path Benchmarks
//!
//! | Path | Target |
//! |------|--------|
//! | Fingerprint of a 50-item transaction | < 50µs |
//! | Classification of a changed transaction | < 100µs |
//! | Batch status calculation | < 1µs |

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use li_02_batch_lifecycle::{calculate_batch_status, BatchStatisticsView};
use li_03_transaction_sync::{classify, Sha256Fingerprinter, VersionFingerprinter};
use rust_decimal::Decimal;
use shared_types::{Transaction, TransactionItem, TransactionType};

fn transaction(items: usize, amount: i64) -> Transaction {
    let entry_date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap_or_default();
    let items = (0..items)
        .map(|i| {
            TransactionItem::new(format!("item-{i}"), Decimal::from(amount), Decimal::from(amount))
                .with_accounts("6000", "4000")
        })
        .collect();
    Transaction::new("tx-1", "org-1", "INV-1", entry_date, TransactionType::VendorBill, "b1")
        .with_items(items)
}

fn bench_fingerprint(c: &mut Criterion) {
    let mut group = c.benchmark_group("li-03-fingerprint");
    let fingerprinter = Sha256Fingerprinter::new();

    for items in [1usize, 10, 50] {
        let tx = transaction(items, 10);
        group.bench_with_input(BenchmarkId::new("items", items), &tx, |b, tx| {
            b.iter(|| fingerprinter.compute(black_box(tx)))
        });
    }
    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    let fingerprinter = Sha256Fingerprinter::new();
    let stored = transaction(50, 10).approved_for_dispatch();
    let incoming = transaction(50, 11);

    c.bench_function("li-03-classify-conflict", |b| {
        b.iter(|| classify(Some(black_box(&stored)), black_box(&incoming), &fingerprinter))
    });
}

fn bench_status(c: &mut Criterion) {
    let view = BatchStatisticsView {
        validated: 1_000,
        dispatched: 400,
        completed: 300,
        finalized: 300,
        ..BatchStatisticsView::new("b1")
    };

    c.bench_function("li-02-batch-status", |b| {
        b.iter(|| calculate_batch_status(black_box(&view)))
    });
}

criterion_group!(benches, bench_fingerprint, bench_classify, bench_status);
criterion_main!(benches);
