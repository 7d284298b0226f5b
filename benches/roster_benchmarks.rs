//! Performance benchmarks for the crew pay engine.
//!
//! Covers the in-process roster pipeline at several roster sizes and the
//! full HTTP path of `POST /roster/process`.
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use chrono::{Duration, NaiveDate};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use crew_pay_engine::api::{AppState, RosterRequest, create_router};
use crew_pay_engine::calculation::{RosterContext, process_roster};
use crew_pay_engine::config::ConfigLoader;
use crew_pay_engine::models::{Position, RawRosterRow};

use axum::{body::Body, http::Request};
use tower::ServiceExt;

fn load_config() -> ConfigLoader {
    ConfigLoader::load("./config/crew").expect("Failed to load config")
}

/// Builds a roster cycling through a turnaround, a layover pair, a standby
/// and a day off, starting on 1 March 2024.
fn create_roster(row_count: usize) -> Vec<RawRosterRow> {
    let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    (0..row_count)
        .map(|i| {
            let date = start + Duration::days((i % 28) as i64);
            match i % 5 {
                0 => RawRosterRow::new(date, "EK0855/EK0856", "DXB-KWI-DXB")
                    .with_times("06:00", "14:30"),
                1 => RawRosterRow::new(date, "EK0129", "DXB-ZAG").with_times("06:00", "14:00"),
                2 => RawRosterRow::new(date, "EK0130", "ZAG-DXB").with_times("13:30", "19:45"),
                3 => RawRosterRow::new(date, "ASBY", "").with_times("05:00", "11:00"),
                _ => RawRosterRow::new(date, "OFF", ""),
            }
        })
        .collect()
}

/// Benchmark: pipeline without the HTTP layer.
fn bench_pipeline_scaling(c: &mut Criterion) {
    let loader = load_config();
    let ctx = RosterContext::new("crew_bench", Position::Ccm);

    let mut group = c.benchmark_group("pipeline");
    for row_count in [1, 10, 31, 100].iter() {
        let rows = create_roster(*row_count);
        group.throughput(Throughput::Elements(*row_count as u64));
        group.bench_with_input(BenchmarkId::new("rows", row_count), &rows, |b, rows| {
            b.iter(|| black_box(process_roster(rows, &ctx, loader.config())))
        });
    }
    group.finish();
}

/// Benchmark: a month's roster through `POST /roster/process`.
fn bench_http_month(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let router = create_router(AppState::in_memory(load_config()));
    let request = RosterRequest {
        user_id: "crew_bench".to_string(),
        position: Position::Ccm,
        bucket_override: None,
        rows: create_roster(31),
    };
    let body = serde_json::to_string(&request).unwrap();

    c.bench_function("http_roster_month", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/roster/process")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body.clone()))
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

criterion_group!(benches, bench_pipeline_scaling, bench_http_month);
criterion_main!(benches);
