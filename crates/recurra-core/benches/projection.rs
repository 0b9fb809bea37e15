//! Projection & Reconciliation Benchmarks

use chrono::{Duration, NaiveDate, Weekday};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use recurra_core::{
    period_bounds, project, reconcile, DateRange, FrequencyRule, PeriodKind, Plan, Product, ProductCostHistory,
    ReportConfig, Subscription, SubscriptionItem, SubscriptionStatus, TeamSnapshot,
};
use rust_decimal::Decimal;
use uuid::Uuid;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()
}

fn rule(i: u128) -> FrequencyRule {
    match i % 3 {
        0 => FrequencyRule::Weekly { days: vec![Weekday::Mon, Weekday::Wed, Weekday::Fri] },
        1 => FrequencyRule::Biweekly { day: Weekday::Tue },
        _ => FrequencyRule::Monthly { day_of_month: (i % 28) as u32 + 1 },
    }
}

fn snapshot(subscriptions: u128) -> TeamSnapshot {
    let products: Vec<Product> = (0..20)
        .map(|p| Product {
            id: Uuid::from_u128(p),
            team_id: Uuid::nil(),
            name: format!("Product {}", p),
            price: Decimal::new(450, 2),
            cost_per_unit: Decimal::new(120, 2),
            unit: None,
        })
        .collect();

    let subscriptions = (0..subscriptions)
        .map(|i| Subscription {
            id: Uuid::from_u128(10_000 + i),
            customer_id: Uuid::from_u128(20_000 + i),
            team_id: Uuid::nil(),
            customer_name: None,
            delivery_area_id: None,
            start_date: Some(start() + Duration::days((i % 14) as i64)),
            status: SubscriptionStatus::Active,
            items: (0..3)
                .map(|j| SubscriptionItem {
                    id: Uuid::from_u128(30_000 + i * 3 + j),
                    product_id: Uuid::from_u128((i + j) % 20),
                    rule: rule(i + j),
                    quantity_per_delivery: Decimal::from(1 + j as i64),
                    unit_price: Decimal::new(450, 2),
                })
                .collect(),
        })
        .collect();

    let cost_history = (0..20)
        .flat_map(|p| {
            (1..=6).map(move |m| ProductCostHistory {
                product_id: Uuid::from_u128(p),
                cost_per_unit: Decimal::new(100 + m as i64 * 5, 2),
                effective_date: NaiveDate::from_ymd_opt(2024, m, 1).unwrap(),
            })
        })
        .collect();

    TeamSnapshot {
        team_id: Uuid::nil(),
        plan: Some(Plan { id: "pro".into(), name: "Pro".into(), price: Decimal::from(300) }),
        subscriptions,
        products,
        cost_history,
        expenses: vec![],
        platform_history: vec![],
    }
}

fn bench_project_month(c: &mut Criterion) {
    let mut group = c.benchmark_group("project_month");
    let range = period_bounds(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(), PeriodKind::Monthly).range();

    for size in [10_u128, 100, 1000].iter() {
        let team = snapshot(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &team, |b, team| {
            b.iter(|| black_box(project(black_box(&team.subscriptions), range)))
        });
    }

    group.finish();
}

fn bench_project_year(c: &mut Criterion) {
    let team = snapshot(100);
    let range = DateRange::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
    );

    c.bench_function("project_year_100_subscriptions", |b| {
        b.iter(|| black_box(project(black_box(&team.subscriptions), range)))
    });
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");
    let team = snapshot(500);
    let config = ReportConfig::default();
    let reference = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();

    for kind in [PeriodKind::Weekly, PeriodKind::Monthly, PeriodKind::Quarterly] {
        group.bench_function(kind.as_str(), |b| {
            b.iter(|| black_box(reconcile(black_box(&team), reference, kind, &config)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_project_month, bench_project_year, bench_reconcile);
criterion_main!(benches);
