//! Production & Shipping Summaries
//!
//! Kitchen view (how much of each product to make per day) and driver view
//! (which customers receive what per day and delivery area), both derived
//! from projected delivery events.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;

use crate::models::{DeliveryEvent, Product};

/// Quantity of one product to prepare on one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionLine {
    pub date: NaiveDate,
    pub product_id: Uuid,
    pub product_name: String,
    pub unit: Option<String>,
    pub deliveries: usize,
    pub quantity: Decimal,
}

/// Everything one customer receives on one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingStop {
    pub date: NaiveDate,
    pub delivery_area_id: Option<Uuid>,
    pub customer_id: Uuid,
    pub lines: Vec<ShippingLine>,
}

/// One product on a shipping stop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: Decimal,
}

/// Header totals for a delivery dashboard
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeliveryStats {
    pub deliveries: usize,
    pub customers: usize,
    pub subscriptions: usize,
    pub total_quantity: Decimal,
    pub total_value: Decimal,
}

impl DeliveryStats {
    /// Totals over `events`
    pub fn from_events(events: &[DeliveryEvent]) -> Self {
        let customers: HashSet<Uuid> = events.iter().map(|e| e.customer_id).collect();
        let subscriptions: HashSet<Uuid> = events.iter().map(|e| e.subscription_id).collect();
        Self {
            deliveries: events.len(),
            customers: customers.len(),
            subscriptions: subscriptions.len(),
            total_quantity: events.iter().map(|e| e.quantity).sum(),
            total_value: events.iter().map(DeliveryEvent::amount).sum(),
        }
    }
}

fn product_name(catalog: &HashMap<Uuid, &Product>, id: Uuid) -> String {
    catalog.get(&id).map(|p| p.name.clone()).unwrap_or_else(|| id.to_string())
}

/// Per-day, per-product quantities, sorted by date then product name
pub fn production_summary(events: &[DeliveryEvent], products: &[Product]) -> Vec<ProductionLine> {
    let catalog: HashMap<Uuid, &Product> = products.iter().map(|p| (p.id, p)).collect();
    let mut grouped: BTreeMap<(NaiveDate, Uuid), (usize, Decimal)> = BTreeMap::new();
    for event in events {
        let entry = grouped.entry((event.date, event.product_id)).or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 += event.quantity;
    }

    let mut lines: Vec<ProductionLine> = grouped
        .into_iter()
        .map(|((date, product_id), (deliveries, quantity))| ProductionLine {
            date,
            product_id,
            product_name: product_name(&catalog, product_id),
            unit: catalog.get(&product_id).and_then(|p| p.unit.clone()),
            deliveries,
            quantity,
        })
        .collect();
    lines.sort_by(|a, b| {
        (a.date, &a.product_name, a.product_id).cmp(&(b.date, &b.product_name, b.product_id))
    });
    lines
}

/// Per-day stops, grouped by delivery area (unassigned last) then customer
pub fn shipping_manifest(events: &[DeliveryEvent], products: &[Product]) -> Vec<ShippingStop> {
    let catalog: HashMap<Uuid, &Product> = products.iter().map(|p| (p.id, p)).collect();
    let mut stops: BTreeMap<(NaiveDate, bool, Uuid, Uuid), BTreeMap<Uuid, Decimal>> = BTreeMap::new();
    for event in events {
        let area = event.delivery_area_id;
        let key = (event.date, area.is_none(), area.unwrap_or_default(), event.customer_id);
        *stops
            .entry(key)
            .or_default()
            .entry(event.product_id)
            .or_insert(Decimal::ZERO) += event.quantity;
    }

    stops
        .into_iter()
        .map(|((date, unassigned, area, customer_id), quantities)| {
            let mut lines: Vec<ShippingLine> = quantities
                .into_iter()
                .map(|(product_id, quantity)| ShippingLine {
                    product_id,
                    product_name: product_name(&catalog, product_id),
                    quantity,
                })
                .collect();
            lines.sort_by(|a, b| a.product_name.cmp(&b.product_name));
            ShippingStop {
                date,
                delivery_area_id: if unassigned { None } else { Some(area) },
                customer_id,
                lines,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn event(sub: u128, customer: u128, product: u128, area: Option<u128>, day: u32, qty: Decimal) -> DeliveryEvent {
        DeliveryEvent {
            subscription_id: Uuid::from_u128(sub),
            item_id: Uuid::from_u128(sub * 10 + product),
            product_id: Uuid::from_u128(product),
            customer_id: Uuid::from_u128(customer),
            team_id: Uuid::nil(),
            delivery_area_id: area.map(Uuid::from_u128),
            date: d(day),
            quantity: qty,
            unit_price: dec!(2),
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            Product { id: Uuid::from_u128(1), team_id: Uuid::nil(), name: "Rye".into(), price: dec!(3), cost_per_unit: dec!(1), unit: Some("loaf".into()) },
            Product { id: Uuid::from_u128(2), team_id: Uuid::nil(), name: "Baguette".into(), price: dec!(2), cost_per_unit: dec!(1), unit: None },
        ]
    }

    #[test]
    fn test_production_groups_by_day_and_product() {
        let events = vec![
            event(1, 11, 1, Some(7), 4, dec!(2)),
            event(2, 12, 1, Some(7), 4, dec!(3)),
            event(2, 12, 2, Some(7), 4, dec!(1)),
            event(1, 11, 1, Some(7), 5, dec!(2)),
        ];
        let lines = production_summary(&events, &catalog());
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].product_name, "Baguette");
        assert_eq!(lines[1].product_name, "Rye");
        assert_eq!(lines[1].quantity, dec!(5));
        assert_eq!(lines[1].deliveries, 2);
        assert_eq!(lines[1].unit.as_deref(), Some("loaf"));
        assert_eq!(lines[2].date, d(5));
    }

    #[test]
    fn test_manifest_orders_unassigned_area_last() {
        let events = vec![
            event(1, 11, 1, None, 4, dec!(1)),
            event(2, 12, 1, Some(7), 4, dec!(2)),
            event(2, 12, 2, Some(7), 4, dec!(1)),
            event(2, 12, 1, Some(7), 4, dec!(1)),
        ];
        let stops = shipping_manifest(&events, &catalog());
        assert_eq!(stops.len(), 2);
        assert_eq!(stops[0].delivery_area_id, Some(Uuid::from_u128(7)));
        assert_eq!(stops[0].lines.len(), 2);
        assert_eq!(stops[0].lines[1].product_name, "Rye");
        assert_eq!(stops[0].lines[1].quantity, dec!(3));
        assert_eq!(stops[1].delivery_area_id, None);
    }

    #[test]
    fn test_delivery_stats() {
        let events = vec![event(1, 11, 1, None, 4, dec!(2)), event(2, 11, 2, None, 4, dec!(3))];
        let stats = DeliveryStats::from_events(&events);
        assert_eq!(stats.deliveries, 2);
        assert_eq!(stats.customers, 1);
        assert_eq!(stats.subscriptions, 2);
        assert_eq!(stats.total_quantity, dec!(5));
        assert_eq!(stats.total_value, dec!(10));
        assert_eq!(DeliveryStats::from_events(&[]), DeliveryStats::default());
    }
}
