//! Delivery Projector
//!
//! Expands active subscriptions over a date range into concrete delivery
//! events. Output order is stable: subscription input order, then item
//! order, then date ascending.

use chrono::NaiveDate;

use crate::calendar::DateRange;
use crate::models::{DeliveryEvent, Subscription, SubscriptionItem};
use crate::recurrence::is_delivery_day;

/// Projector over the active subset of a subscription list
pub struct DeliveryProjector<'a> {
    active: Vec<(&'a Subscription, NaiveDate)>,
}

impl<'a> DeliveryProjector<'a> {
    /// Keep subscriptions that are active and have a start date
    pub fn new(subscriptions: &'a [Subscription]) -> Self {
        let active = subscriptions
            .iter()
            .filter_map(|sub| match (sub.is_active(), sub.start_date) {
                (true, Some(start)) => Some((sub, start)),
                _ => {
                    tracing::debug!(
                        subscription_id = %sub.id,
                        status = ?sub.status,
                        "subscription excluded from projection"
                    );
                    None
                }
            })
            .collect();
        Self { active }
    }

    /// Subscriptions taking part in projection
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Active subscriptions in input order
    pub fn active(&self) -> impl Iterator<Item = &'a Subscription> + '_ {
        self.active.iter().map(|(sub, _)| *sub)
    }

    /// Delivery events inside `range`
    pub fn project(&self, range: DateRange) -> Vec<DeliveryEvent> {
        let mut events = Vec::new();
        for (sub, start) in &self.active {
            for item in &sub.items {
                if !item.rule.is_scheduled() {
                    continue;
                }
                events.extend(
                    range
                        .days()
                        .filter(|day| is_delivery_day(&item.rule, *start, *day))
                        .map(|day| event_for(sub, item, day)),
                );
            }
        }
        tracing::debug!(
            subscriptions = self.active.len(),
            events = events.len(),
            from = %range.start,
            to = %range.end,
            "projected deliveries"
        );
        events
    }
}

fn event_for(sub: &Subscription, item: &SubscriptionItem, date: NaiveDate) -> DeliveryEvent {
    DeliveryEvent {
        subscription_id: sub.id,
        item_id: item.id,
        product_id: item.product_id,
        customer_id: sub.customer_id,
        team_id: sub.team_id,
        delivery_area_id: sub.delivery_area_id,
        date,
        quantity: item.quantity_per_delivery,
        unit_price: item.unit_price,
    }
}

/// Delivery events for every active subscription inside `range`
pub fn project(subscriptions: &[Subscription], range: DateRange) -> Vec<DeliveryEvent> {
    DeliveryProjector::new(subscriptions).project(range)
}
