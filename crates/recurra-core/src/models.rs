//! Domain records
//!
//! Shapes of the records read from the store, plus the tagged-union
//! frequency rule that subscription items are normalised into.

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::Result;

/// Recurrence rule of a subscription item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrequencyRule {
    /// Every week on each listed weekday
    Weekly { days: Vec<Weekday> },
    /// Every other week, counted from the subscription start week
    Biweekly { day: Weekday },
    /// Once a month on the given day (never clamped to short months)
    Monthly { day_of_month: u32 },
    /// Malformed or unknown rule; never produces a delivery
    Unscheduled { frequency: String, defect: RuleDefect },
}

/// Why a rule could not be scheduled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleDefect {
    UnknownFrequency,
    MissingDeliveryDays,
    MissingBiweeklyDay,
    MissingMonthDay,
    InvalidWeekday(String),
    InvalidMonthDay(u32),
}

impl fmt::Display for RuleDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownFrequency => write!(f, "unknown frequency"),
            Self::MissingDeliveryDays => write!(f, "weekly rule without delivery days"),
            Self::MissingBiweeklyDay => write!(f, "bi-weekly rule without delivery day"),
            Self::MissingMonthDay => write!(f, "monthly rule without day of month"),
            Self::InvalidWeekday(name) => write!(f, "invalid weekday '{}'", name),
            Self::InvalidMonthDay(day) => write!(f, "month day {} outside 1..=31", day),
        }
    }
}

impl FrequencyRule {
    /// Build a rule from the flat record fields
    pub fn from_parts(
        frequency: &str,
        delivery_days: &[String],
        biweekly_delivery_day: Option<&str>,
        monthly_delivery_day: Option<u32>,
    ) -> Self {
        let unscheduled = |defect| Self::Unscheduled { frequency: frequency.to_owned(), defect };

        match frequency.trim().to_lowercase().as_str() {
            "weekly" => {
                if delivery_days.is_empty() {
                    return unscheduled(RuleDefect::MissingDeliveryDays);
                }
                let mut days = Vec::with_capacity(delivery_days.len());
                for name in delivery_days {
                    match name.trim().parse::<Weekday>() {
                        Ok(day) if !days.contains(&day) => days.push(day),
                        Ok(_) => {}
                        Err(_) => return unscheduled(RuleDefect::InvalidWeekday(name.clone())),
                    }
                }
                Self::Weekly { days }
            }
            "bi-weekly" | "biweekly" => match biweekly_delivery_day {
                None => unscheduled(RuleDefect::MissingBiweeklyDay),
                Some(name) => match name.trim().parse::<Weekday>() {
                    Ok(day) => Self::Biweekly { day },
                    Err(_) => unscheduled(RuleDefect::InvalidWeekday(name.to_owned())),
                },
            },
            "monthly" => match monthly_delivery_day {
                None => unscheduled(RuleDefect::MissingMonthDay),
                Some(day) if (1..=31).contains(&day) => Self::Monthly { day_of_month: day },
                Some(day) => unscheduled(RuleDefect::InvalidMonthDay(day)),
            },
            _ => unscheduled(RuleDefect::UnknownFrequency),
        }
    }

    /// Frequency label as stored
    pub fn frequency(&self) -> &str {
        match self {
            Self::Weekly { .. } => "weekly",
            Self::Biweekly { .. } => "bi-weekly",
            Self::Monthly { .. } => "monthly",
            Self::Unscheduled { frequency, .. } => frequency,
        }
    }

    /// Whether the rule can ever produce a delivery
    pub fn is_scheduled(&self) -> bool {
        !matches!(self, Self::Unscheduled { .. })
    }
}

/// Lowercase English weekday name, matching the stored form
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Subscription item as stored (flat frequency fields)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionItemRecord {
    pub id: Uuid,
    pub product_id: Uuid,
    pub frequency: String,
    #[serde(default)]
    pub delivery_days: Option<Vec<String>>,
    #[serde(default)]
    pub biweekly_delivery_day: Option<String>,
    #[serde(default)]
    pub monthly_delivery_day: Option<u32>,
    pub quantity_per_delivery: Decimal,
    pub unit_price: Decimal,
}

/// Subscription item with a normalised rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SubscriptionItemRecord", into = "SubscriptionItemRecord")]
pub struct SubscriptionItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub rule: FrequencyRule,
    pub quantity_per_delivery: Decimal,
    pub unit_price: Decimal,
}

impl From<SubscriptionItemRecord> for SubscriptionItem {
    fn from(record: SubscriptionItemRecord) -> Self {
        let rule = FrequencyRule::from_parts(
            &record.frequency,
            record.delivery_days.as_deref().unwrap_or_default(),
            record.biweekly_delivery_day.as_deref(),
            record.monthly_delivery_day,
        );
        if let FrequencyRule::Unscheduled { ref defect, .. } = rule {
            tracing::warn!(
                item_id = %record.id,
                frequency = %record.frequency,
                "subscription item will not be scheduled: {}", defect
            );
        }
        Self {
            id: record.id,
            product_id: record.product_id,
            rule,
            quantity_per_delivery: record.quantity_per_delivery,
            unit_price: record.unit_price,
        }
    }
}

impl From<SubscriptionItem> for SubscriptionItemRecord {
    fn from(item: SubscriptionItem) -> Self {
        let mut record = SubscriptionItemRecord {
            id: item.id,
            product_id: item.product_id,
            frequency: item.rule.frequency().to_owned(),
            delivery_days: None,
            biweekly_delivery_day: None,
            monthly_delivery_day: None,
            quantity_per_delivery: item.quantity_per_delivery,
            unit_price: item.unit_price,
        };
        match item.rule {
            FrequencyRule::Weekly { days } => {
                record.delivery_days = Some(days.into_iter().map(|d| weekday_name(d).to_owned()).collect());
            }
            FrequencyRule::Biweekly { day } => {
                record.biweekly_delivery_day = Some(weekday_name(day).to_owned());
            }
            FrequencyRule::Monthly { day_of_month } => {
                record.monthly_delivery_day = Some(day_of_month);
            }
            FrequencyRule::Unscheduled { .. } => {}
        }
        record
    }
}

/// Subscription status
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubscriptionStatus {
    Active,
    Paused,
    Cancelled,
    PendingPayment,
    /// Any status this crate does not know about
    Other(String),
}

impl From<String> for SubscriptionStatus {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "active" => Self::Active,
            "paused" => Self::Paused,
            "cancelled" | "canceled" => Self::Cancelled,
            "pending_payment" => Self::PendingPayment,
            _ => Self::Other(value),
        }
    }
}

impl From<SubscriptionStatus> for String {
    fn from(status: SubscriptionStatus) -> Self {
        match status {
            SubscriptionStatus::Active => "active".into(),
            SubscriptionStatus::Paused => "paused".into(),
            SubscriptionStatus::Cancelled => "cancelled".into(),
            SubscriptionStatus::PendingPayment => "pending_payment".into(),
            SubscriptionStatus::Other(value) => value,
        }
    }
}

/// Customer subscription against a team's catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub team_id: Uuid,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub delivery_area_id: Option<Uuid>,
    /// Anchors bi-weekly parity
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub items: Vec<SubscriptionItem>,
}

impl Subscription {
    /// Participates in projection
    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active && self.start_date.is_some()
    }
}

/// Catalog product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub team_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub price: Decimal,
    /// Live cost, used when no history entry predates a query
    #[serde(default)]
    pub cost_per_unit: Decimal,
    #[serde(default)]
    pub unit: Option<String>,
}

/// Time-stamped product cost
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCostHistory {
    pub product_id: Uuid,
    pub cost_per_unit: Decimal,
    pub effective_date: NaiveDate,
}

/// Platform plan interval for a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSubscriptionHistory {
    pub team_id: Uuid,
    pub plan_price: Decimal,
    pub start_date: NaiveDate,
    /// `None` while still current
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl TeamSubscriptionHistory {
    /// Whether `date` lies in `[start_date, end_date or ∞]`
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.start_date && self.end_date.map(|end| date <= end).unwrap_or(true)
    }
}

/// Team's live platform plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub name: String,
    /// Monthly price
    pub price: Decimal,
}

/// Recorded operational expense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub amount: Decimal,
    pub category: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
}

/// One concrete delivery of a subscription item on a day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryEvent {
    pub subscription_id: Uuid,
    pub item_id: Uuid,
    pub product_id: Uuid,
    pub customer_id: Uuid,
    pub team_id: Uuid,
    pub delivery_area_id: Option<Uuid>,
    pub date: NaiveDate,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

impl DeliveryEvent {
    /// quantity × unit price
    pub fn amount(&self) -> Decimal {
        self.quantity * self.unit_price
    }

    /// Day of week
    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }
}

/// Every record of one team, as fetched by the caller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamSnapshot {
    pub team_id: Uuid,
    #[serde(default)]
    pub plan: Option<Plan>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub cost_history: Vec<ProductCostHistory>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub platform_history: Vec<TeamSubscriptionHistory>,
}

impl TeamSnapshot {
    /// Decode from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Live plan price, zero without a plan
    pub fn current_plan_price(&self) -> Decimal {
        self.plan.as_ref().map(|p| p.price).unwrap_or(Decimal::ZERO)
    }
}
