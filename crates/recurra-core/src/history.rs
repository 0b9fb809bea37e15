//! Historical Price Resolver
//!
//! Picks the product cost or platform plan price in effect on a given date
//! from time-stamped history, falling back to the live value when no record
//! applies. The free functions scan the full history; the indexes sort once
//! per entity and are what reconciliation uses.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::{ProductCostHistory, TeamSubscriptionHistory};

/// Cost of `product_id` in effect on `date`.
///
/// The applicable entry is the one with the latest `effective_date` not after
/// `date`. Entries sharing a date resolve to the one listed first.
pub fn cost_as_of(
    product_id: Uuid,
    date: NaiveDate,
    history: &[ProductCostHistory],
    current_cost: Decimal,
) -> Decimal {
    let mut best: Option<&ProductCostHistory> = None;
    for entry in history.iter().filter(|e| e.product_id == product_id && e.effective_date <= date) {
        match best {
            Some(b) if b.effective_date >= entry.effective_date => {}
            _ => best = Some(entry),
        }
    }
    best.map(|e| e.cost_per_unit).unwrap_or(current_cost)
}

/// Plan price for `team_id` in effect on `date`.
///
/// The applicable entry is the interval containing `date`; overlapping
/// intervals resolve to the latest `start_date`, then to the one listed first.
pub fn plan_price_as_of(
    team_id: Uuid,
    date: NaiveDate,
    history: &[TeamSubscriptionHistory],
    current_plan_price: Decimal,
) -> Decimal {
    let mut best: Option<&TeamSubscriptionHistory> = None;
    for entry in history.iter().filter(|e| e.team_id == team_id && e.covers(date)) {
        match best {
            Some(b) if b.start_date >= entry.start_date => {}
            _ => best = Some(entry),
        }
    }
    best.map(|e| e.plan_price).unwrap_or(current_plan_price)
}

/// Product cost history grouped by product, newest first
#[derive(Debug, Clone, Default)]
pub struct CostHistoryIndex {
    by_product: HashMap<Uuid, Vec<(NaiveDate, Decimal)>>,
}

impl CostHistoryIndex {
    /// Build index
    pub fn new(history: &[ProductCostHistory]) -> Self {
        let mut by_product: HashMap<Uuid, Vec<(NaiveDate, Decimal)>> = HashMap::new();
        for entry in history {
            by_product
                .entry(entry.product_id)
                .or_default()
                .push((entry.effective_date, entry.cost_per_unit));
        }
        // Stable sort keeps input order among equal dates
        for entries in by_product.values_mut() {
            entries.sort_by(|a, b| b.0.cmp(&a.0));
        }
        Self { by_product }
    }

    /// Same contract as [`cost_as_of`]
    pub fn cost_as_of(&self, product_id: Uuid, date: NaiveDate, current_cost: Decimal) -> Decimal {
        self.by_product
            .get(&product_id)
            .and_then(|entries| entries.iter().find(|(effective, _)| *effective <= date))
            .map(|(_, cost)| *cost)
            .unwrap_or(current_cost)
    }

    /// Products with at least one history entry
    pub fn len(&self) -> usize {
        self.by_product.len()
    }

    /// No history at all
    pub fn is_empty(&self) -> bool {
        self.by_product.is_empty()
    }
}

/// Platform plan intervals of one team, latest start first
#[derive(Debug, Clone, Default)]
pub struct PlanHistoryIndex {
    intervals: Vec<TeamSubscriptionHistory>,
}

impl PlanHistoryIndex {
    /// Build index for `team_id`
    pub fn new(team_id: Uuid, history: &[TeamSubscriptionHistory]) -> Self {
        let mut intervals: Vec<_> = history.iter().filter(|e| e.team_id == team_id).cloned().collect();
        intervals.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Self { intervals }
    }

    /// Same contract as [`plan_price_as_of`]
    pub fn price_as_of(&self, date: NaiveDate, current_plan_price: Decimal) -> Decimal {
        self.intervals
            .iter()
            .find(|e| e.covers(date))
            .map(|e| e.plan_price)
            .unwrap_or(current_plan_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn cost(product: u128, date: NaiveDate, value: Decimal) -> ProductCostHistory {
        ProductCostHistory { product_id: Uuid::from_u128(product), cost_per_unit: value, effective_date: date }
    }

    fn interval(team: u128, price: Decimal, start: NaiveDate, end: Option<NaiveDate>) -> TeamSubscriptionHistory {
        TeamSubscriptionHistory { team_id: Uuid::from_u128(team), plan_price: price, start_date: start, end_date: end }
    }

    #[test]
    fn test_cost_fallback_on_empty_history() {
        let product = Uuid::from_u128(1);
        for date in [d(1999, 1, 1), d(2024, 2, 1), d(2100, 12, 31)] {
            assert_eq!(cost_as_of(product, date, &[], dec!(10.0)), dec!(10.0));
            assert_eq!(CostHistoryIndex::new(&[]).cost_as_of(product, date, dec!(10.0)), dec!(10.0));
        }
    }

    #[test]
    fn test_cost_latest_not_after_date() {
        let history = vec![cost(1, d(2024, 3, 1), dec!(7)), cost(1, d(2024, 1, 1), dec!(5)), cost(2, d(2024, 1, 15), dec!(99))];
        let index = CostHistoryIndex::new(&history);
        let product = Uuid::from_u128(1);

        assert_eq!(cost_as_of(product, d(2024, 2, 1), &history, dec!(10)), dec!(5));
        assert_eq!(cost_as_of(product, d(2024, 6, 1), &history, dec!(10)), dec!(7));
        assert_eq!(cost_as_of(product, d(2024, 3, 1), &history, dec!(10)), dec!(7));
        assert_eq!(cost_as_of(product, d(2023, 12, 31), &history, dec!(10)), dec!(10));

        assert_eq!(index.cost_as_of(product, d(2024, 2, 1), dec!(10)), dec!(5));
        assert_eq!(index.cost_as_of(product, d(2024, 6, 1), dec!(10)), dec!(7));
        assert_eq!(index.cost_as_of(product, d(2023, 12, 31), dec!(10)), dec!(10));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_cost_duplicate_dates_resolve_to_first_listed() {
        let history = vec![cost(1, d(2024, 1, 1), dec!(4)), cost(1, d(2024, 1, 1), dec!(6))];
        let product = Uuid::from_u128(1);
        assert_eq!(cost_as_of(product, d(2024, 5, 1), &history, dec!(0)), dec!(4));
        assert_eq!(CostHistoryIndex::new(&history).cost_as_of(product, d(2024, 5, 1), dec!(0)), dec!(4));
    }

    #[test]
    fn test_plan_price_interval_lookup() {
        let history = vec![
            interval(1, dec!(200), d(2024, 1, 1), Some(d(2024, 1, 31))),
            interval(1, dec!(300), d(2024, 2, 1), None),
            interval(2, dec!(999), d(2020, 1, 1), None),
        ];
        let team = Uuid::from_u128(1);
        let index = PlanHistoryIndex::new(team, &history);

        assert_eq!(plan_price_as_of(team, d(2024, 1, 15), &history, dec!(50)), dec!(200));
        assert_eq!(plan_price_as_of(team, d(2024, 9, 1), &history, dec!(50)), dec!(300));
        assert_eq!(plan_price_as_of(team, d(2023, 6, 1), &history, dec!(50)), dec!(50));

        assert_eq!(index.price_as_of(d(2024, 1, 31), dec!(50)), dec!(200));
        assert_eq!(index.price_as_of(d(2024, 2, 1), dec!(50)), dec!(300));
        assert_eq!(index.price_as_of(d(2023, 6, 1), dec!(50)), dec!(50));
    }

    #[test]
    fn test_plan_overlap_prefers_latest_start() {
        let history = vec![
            interval(1, dec!(100), d(2024, 1, 1), None),
            interval(1, dec!(150), d(2024, 3, 1), Some(d(2024, 3, 31))),
        ];
        let team = Uuid::from_u128(1);
        assert_eq!(plan_price_as_of(team, d(2024, 3, 10), &history, dec!(0)), dec!(150));
        assert_eq!(plan_price_as_of(team, d(2024, 4, 10), &history, dec!(0)), dec!(100));
        assert_eq!(PlanHistoryIndex::new(team, &history).price_as_of(d(2024, 3, 10), dec!(0)), dec!(150));
    }
}
