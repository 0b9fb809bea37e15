//! Recurra Core
//!
//! Recurring-delivery projection and financial reconciliation for
//! subscription commerce teams (bakeries, restaurants, markets, pharmacies).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        RECONCILIATION ENGINE                            │
//! │   Revenue | Cost of Goods | Opex | Platform Pro-ration | Margins        │
//! │                                                                         │
//! │  ┌──────────────────────┐        ┌──────────────────────────────────┐  │
//! │  │  DELIVERY PROJECTOR  │        │    HISTORICAL PRICE RESOLVER     │  │
//! │  │  subscriptions ─►    │        │  cost-as-of | plan-price-as-of   │  │
//! │  │  delivery events     │        └──────────────────────────────────┘  │
//! │  └──────────┬───────────┘                                              │
//! │             │                                                           │
//! │  ┌──────────▼───────────┐        ┌──────────────────────────────────┐  │
//! │  │ RECURRENCE EVALUATOR │        │  PRODUCTION / SHIPPING SUMMARIES │  │
//! │  │ weekly | bi-weekly | │        │  CSV EXPORT (UTF-8 BOM)          │  │
//! │  │ monthly              │        └──────────────────────────────────┘  │
//! │  └──────────┬───────────┘                                              │
//! │  ┌──────────▼──────────────────────────────────────────────────────┐   │
//! │  │                 CALENDAR / PERIOD UTILITY                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is a pure function of its inputs. Callers fetch records
//! from the store, bundle them into a [`TeamSnapshot`], and hand it over.

#![warn(missing_docs)]

pub mod calendar;
pub mod config;
pub mod error;
pub mod export;
pub mod history;
pub mod models;
pub mod production;
pub mod projection;
pub mod reconciliation;
pub mod recurrence;

pub use calendar::{
    days_in_month, enumerate_days, period_bounds, week_start, weeks_between, DateRange, PeriodBounds, PeriodKind,
};
pub use config::{CsvOptions, CurrencyFormat, ReportConfig, SegmentationMode};
pub use error::{RecurraError, Result};
pub use export::{deliveries_to_csv, production_to_csv, report_to_csv};
pub use history::{cost_as_of, plan_price_as_of, CostHistoryIndex, PlanHistoryIndex};
pub use models::{
    DeliveryEvent, Expense, FrequencyRule, Plan, RuleDefect, Product, ProductCostHistory, Subscription,
    SubscriptionItem, SubscriptionStatus, TeamSnapshot, TeamSubscriptionHistory,
};
pub use production::{production_summary, shipping_manifest, DeliveryStats, ProductionLine, ShippingLine, ShippingStop};
pub use projection::{project, DeliveryProjector};
pub use reconciliation::{
    prorated_platform_cost, reconcile, reconcile_period, CustomerBreakdown, ExpenseCategoryTotal, FinancialReport,
    ProductBreakdown, SubscriptionSegment,
};
pub use recurrence::{is_delivery_day, next_delivery_on_or_after};
