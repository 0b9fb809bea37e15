//! Deliveries command

use super::parse_range;
use crate::output::{heading, OutputFormat};
use crate::{Context, RangeArgs};
use recurra_core::{models::weekday_name, DeliveryEvent, DeliveryStats, Product, ReportConfig};
use serde::Serialize;
use std::collections::HashMap;
use tabled::Tabled;
use uuid::Uuid;

#[derive(Tabled)]
struct DeliveryRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Day")]
    weekday: &'static str,
    #[tabled(rename = "Customer")]
    customer: String,
    #[tabled(rename = "Product")]
    product: String,
    #[tabled(rename = "Qty")]
    quantity: String,
    #[tabled(rename = "Total")]
    total: String,
}

#[derive(Serialize)]
struct DeliveriesOutput<'a> {
    stats: DeliveryStats,
    deliveries: &'a [DeliveryEvent],
}

pub async fn handle(args: &RangeArgs, ctx: &Context) -> Result<(), String> {
    let range = parse_range(&args.from, &args.to)?;
    let snapshot = ctx.source.load().await?;
    let events = recurra_core::project(&snapshot.subscriptions, range);
    let stats = DeliveryStats::from_events(&events);

    let rows = if ctx.format == OutputFormat::Table {
        heading(&format!(
            "{} deliveries to {} customers, {} {} .. {}",
            stats.deliveries,
            stats.customers,
            ctx.report_config.currency.format(stats.total_value),
            range.start,
            range.end
        ));
        delivery_rows(&events, &snapshot.products, &snapshot.subscriptions, &ctx.report_config)
    } else {
        Vec::new()
    };

    ctx.format.print(&DeliveriesOutput { stats, deliveries: &events }, rows);
    Ok(())
}

fn delivery_rows(
    events: &[DeliveryEvent],
    products: &[Product],
    subscriptions: &[recurra_core::Subscription],
    config: &ReportConfig,
) -> Vec<DeliveryRow> {
    let names: HashMap<Uuid, &str> = products.iter().map(|p| (p.id, p.name.as_str())).collect();
    let customers: HashMap<Uuid, &str> = subscriptions
        .iter()
        .filter_map(|s| s.customer_name.as_deref().map(|n| (s.customer_id, n)))
        .collect();

    events
        .iter()
        .map(|e| DeliveryRow {
            date: e.date.to_string(),
            weekday: weekday_name(e.weekday()),
            customer: customers
                .get(&e.customer_id)
                .map(|n| (*n).to_owned())
                .unwrap_or_else(|| e.customer_id.to_string()),
            product: names
                .get(&e.product_id)
                .map(|n| (*n).to_owned())
                .unwrap_or_else(|| e.product_id.to_string()),
            quantity: e.quantity.normalize().to_string(),
            total: config.currency.format(e.amount()),
        })
        .collect()
}
