//! Financial Reconciliation Engine
//!
//! Combines projected deliveries with historical costs and platform plan
//! prices to produce a profit-and-loss view of one team for one period.
//!
//! ```text
//! revenue        = Σ quantity × unit price
//! product cost   = Σ quantity × cost-as-of(delivery date)
//! platform cost  = Σ over days of plan-price-as-of(day) / days-in-month(day)
//! gross profit   = revenue − product cost
//! net profit     = gross profit − operational expenses − platform cost
//! ```
//!
//! Divisions by zero (margins without revenue, per-customer figures without
//! active subscriptions) yield zero.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;

use crate::calendar::{days_in_month, period_bounds, DateRange, PeriodBounds, PeriodKind};
use crate::config::{ReportConfig, SegmentationMode};
use crate::history::{CostHistoryIndex, PlanHistoryIndex};
use crate::models::{DeliveryEvent, Expense, Product, TeamSnapshot};
use crate::projection::DeliveryProjector;

/// Profit-and-loss report for one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialReport {
    pub team_id: Uuid,
    pub period: PeriodBounds,
    pub segmentation: SegmentationMode,
    pub active_subscriptions: usize,
    pub delivery_count: usize,
    pub total_revenue: Decimal,
    pub total_product_cost: Decimal,
    pub operational_expenses: Decimal,
    pub platform_costs: Decimal,
    pub total_costs: Decimal,
    pub gross_profit: Decimal,
    pub net_profit: Decimal,
    /// Percent of revenue
    pub gross_margin: Decimal,
    /// Percent of revenue
    pub net_margin: Decimal,
    /// Revenue needed for zero net profit
    pub break_even_point: Decimal,
    pub profit_per_customer: Decimal,
    pub products: Vec<ProductBreakdown>,
    pub customers: Vec<CustomerBreakdown>,
    pub segments: Vec<SubscriptionSegment>,
    pub expenses_by_category: Vec<ExpenseCategoryTotal>,
}

/// Revenue and cost of one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductBreakdown {
    pub product_id: Uuid,
    pub name: String,
    pub deliveries: usize,
    pub quantity: Decimal,
    pub revenue: Decimal,
    pub cost: Decimal,
    pub gross_profit: Decimal,
}

/// Revenue from one customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerBreakdown {
    pub customer_id: Uuid,
    pub customer_name: Option<String>,
    pub deliveries: usize,
    pub revenue: Decimal,
}

/// Revenue attributed to one active subscription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionSegment {
    pub subscription_id: Uuid,
    pub customer_id: Uuid,
    pub period_value: Decimal,
}

/// Expenses of one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseCategoryTotal {
    pub category: String,
    pub count: usize,
    pub amount: Decimal,
}

/// Reconcile the `kind` period containing `reference`
pub fn reconcile(
    snapshot: &TeamSnapshot,
    reference: NaiveDate,
    kind: PeriodKind,
    config: &ReportConfig,
) -> FinancialReport {
    reconcile_period(snapshot, period_bounds(reference, kind), config)
}

/// Reconcile an already computed period
pub fn reconcile_period(snapshot: &TeamSnapshot, period: PeriodBounds, config: &ReportConfig) -> FinancialReport {
    let range = period.range();
    let projector = DeliveryProjector::new(&snapshot.subscriptions);
    let events = projector.project(range);
    let active_count = projector.active_count();

    let products: HashMap<Uuid, &Product> = snapshot.products.iter().map(|p| (p.id, p)).collect();
    let costs = CostHistoryIndex::new(&snapshot.cost_history);
    let plans = PlanHistoryIndex::new(snapshot.team_id, &snapshot.platform_history);

    let mut total_revenue = Decimal::ZERO;
    let mut total_product_cost = Decimal::ZERO;
    let mut by_product: BTreeMap<Uuid, ProductBreakdown> = BTreeMap::new();
    let mut unknown_products: HashSet<Uuid> = HashSet::new();

    for event in &events {
        let revenue = event.amount();
        let live_cost = match products.get(&event.product_id) {
            Some(product) => product.cost_per_unit,
            None => {
                unknown_products.insert(event.product_id);
                Decimal::ZERO
            }
        };
        let cost = event.quantity * costs.cost_as_of(event.product_id, event.date, live_cost);

        total_revenue += revenue;
        total_product_cost += cost;

        let line = by_product.entry(event.product_id).or_insert_with(|| ProductBreakdown {
            product_id: event.product_id,
            name: products
                .get(&event.product_id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| event.product_id.to_string()),
            deliveries: 0,
            quantity: Decimal::ZERO,
            revenue: Decimal::ZERO,
            cost: Decimal::ZERO,
            gross_profit: Decimal::ZERO,
        });
        line.deliveries += 1;
        line.quantity += event.quantity;
        line.revenue += revenue;
        line.cost += cost;
        line.gross_profit = line.revenue - line.cost;
    }

    if !unknown_products.is_empty() {
        tracing::debug!(count = unknown_products.len(), "deliveries reference products missing from catalog");
    }

    let (operational_expenses, expenses_by_category) = expenses_in(&snapshot.expenses, range);
    let platform_costs = prorated_platform_cost(range, &plans, snapshot.current_plan_price());

    let total_costs = total_product_cost + operational_expenses + platform_costs;
    let gross_profit = total_revenue - total_product_cost;
    let net_profit = gross_profit - operational_expenses - platform_costs;

    let segments = segment(&projector, &events, total_revenue, config.segmentation);

    let report = FinancialReport {
        team_id: snapshot.team_id,
        period,
        segmentation: config.segmentation,
        active_subscriptions: active_count,
        delivery_count: events.len(),
        total_revenue,
        total_product_cost,
        operational_expenses,
        platform_costs,
        total_costs,
        gross_profit,
        net_profit,
        gross_margin: percent_of(gross_profit, total_revenue),
        net_margin: percent_of(net_profit, total_revenue),
        break_even_point: total_costs,
        profit_per_customer: per_unit(net_profit, active_count),
        products: by_product.into_values().collect(),
        customers: customers(&projector, &events),
        segments,
        expenses_by_category,
    };

    tracing::info!(
        team_id = %report.team_id,
        period = %period.kind,
        from = %range.start,
        to = %range.end,
        deliveries = report.delivery_count,
        revenue = %report.total_revenue,
        net_profit = %report.net_profit,
        "reconciled period"
    );

    report
}

/// Monthly plan price spread over the days of `range`.
///
/// Days are grouped by (month, price) so a full month at a flat price sums
/// to exactly that price.
pub fn prorated_platform_cost(range: DateRange, plans: &PlanHistoryIndex, current_plan_price: Decimal) -> Decimal {
    let mut groups: BTreeMap<(i32, u32, Decimal), (u32, u32)> = BTreeMap::new();
    for day in range.days() {
        let price = plans.price_as_of(day, current_plan_price);
        let group = groups
            .entry((day.year(), day.month(), price))
            .or_insert((0, days_in_month(day)));
        group.0 += 1;
    }
    groups
        .into_iter()
        .map(|((_, _, price), (days, month_len))| price * Decimal::from(days) / Decimal::from(month_len))
        .sum()
}

fn expenses_in(expenses: &[Expense], range: DateRange) -> (Decimal, Vec<ExpenseCategoryTotal>) {
    let mut total = Decimal::ZERO;
    let mut by_category: BTreeMap<&str, (usize, Decimal)> = BTreeMap::new();
    for expense in expenses.iter().filter(|e| range.contains(e.date)) {
        total += expense.amount;
        let entry = by_category.entry(expense.category.as_str()).or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 += expense.amount;
    }
    let categories = by_category
        .into_iter()
        .map(|(category, (count, amount))| ExpenseCategoryTotal { category: category.to_owned(), count, amount })
        .collect();
    (total, categories)
}

fn segment(
    projector: &DeliveryProjector<'_>,
    events: &[DeliveryEvent],
    total_revenue: Decimal,
    mode: SegmentationMode,
) -> Vec<SubscriptionSegment> {
    let projected: HashMap<Uuid, Decimal> = match mode {
        SegmentationMode::EqualSplit => HashMap::new(),
        SegmentationMode::Projected => {
            let mut sums = HashMap::new();
            for event in events {
                *sums.entry(event.subscription_id).or_insert(Decimal::ZERO) += event.amount();
            }
            sums
        }
    };
    let equal_share = per_unit(total_revenue, projector.active_count());

    projector
        .active()
        .map(|sub| SubscriptionSegment {
            subscription_id: sub.id,
            customer_id: sub.customer_id,
            period_value: match mode {
                SegmentationMode::EqualSplit => equal_share,
                SegmentationMode::Projected => projected.get(&sub.id).copied().unwrap_or(Decimal::ZERO),
            },
        })
        .collect()
}

fn customers(projector: &DeliveryProjector<'_>, events: &[DeliveryEvent]) -> Vec<CustomerBreakdown> {
    let names: HashMap<Uuid, &str> = projector
        .active()
        .filter_map(|sub| sub.customer_name.as_deref().map(|name| (sub.customer_id, name)))
        .collect();

    let mut by_customer: BTreeMap<Uuid, (usize, Decimal)> = BTreeMap::new();
    for event in events {
        let entry = by_customer.entry(event.customer_id).or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 += event.amount();
    }
    by_customer
        .into_iter()
        .map(|(customer_id, (deliveries, revenue))| CustomerBreakdown {
            customer_id,
            customer_name: names.get(&customer_id).map(|n| (*n).to_owned()),
            deliveries,
            revenue,
        })
        .collect()
}

fn percent_of(value: Decimal, base: Decimal) -> Decimal {
    if base.is_zero() {
        Decimal::ZERO
    } else {
        value / base * Decimal::ONE_HUNDRED
    }
}

fn per_unit(value: Decimal, count: usize) -> Decimal {
    if count == 0 {
        Decimal::ZERO
    } else {
        value / Decimal::from(count)
    }
}
