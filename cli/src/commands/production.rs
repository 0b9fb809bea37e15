//! Production command

use super::parse_range;
use crate::output::OutputFormat;
use crate::{Context, RangeArgs};
use recurra_core::{production_summary, project, shipping_manifest, ProductionLine, ShippingStop};
use std::collections::HashMap;
use tabled::Tabled;
use uuid::Uuid;

#[derive(Tabled)]
struct ProductionRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Product")]
    product: String,
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Deliveries")]
    deliveries: usize,
    #[tabled(rename = "Quantity")]
    quantity: String,
}

#[derive(Tabled)]
struct StopRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Area")]
    area: String,
    #[tabled(rename = "Customer")]
    customer: String,
    #[tabled(rename = "Items")]
    items: String,
}

pub async fn handle(args: &RangeArgs, shipping: bool, ctx: &Context) -> Result<(), String> {
    let range = parse_range(&args.from, &args.to)?;
    let snapshot = ctx.source.load().await?;
    let events = project(&snapshot.subscriptions, range);

    if shipping {
        let stops = shipping_manifest(&events, &snapshot.products);
        let names: HashMap<Uuid, &str> = snapshot
            .subscriptions
            .iter()
            .filter_map(|s| s.customer_name.as_deref().map(|n| (s.customer_id, n)))
            .collect();
        let rows = if ctx.format == OutputFormat::Table { stop_rows(&stops, &names) } else { Vec::new() };
        ctx.format.print(&stops, rows);
    } else {
        let lines = production_summary(&events, &snapshot.products);
        let rows = if ctx.format == OutputFormat::Table { production_rows(&lines) } else { Vec::new() };
        ctx.format.print(&lines, rows);
    }
    Ok(())
}

fn production_rows(lines: &[ProductionLine]) -> Vec<ProductionRow> {
    lines
        .iter()
        .map(|l| ProductionRow {
            date: l.date.to_string(),
            product: l.product_name.clone(),
            unit: l.unit.clone().unwrap_or_default(),
            deliveries: l.deliveries,
            quantity: l.quantity.normalize().to_string(),
        })
        .collect()
}

fn stop_rows(stops: &[ShippingStop], customers: &HashMap<Uuid, &str>) -> Vec<StopRow> {
    stops
        .iter()
        .map(|s| StopRow {
            date: s.date.to_string(),
            area: s.delivery_area_id.map(|a| a.to_string()).unwrap_or_else(|| "-".into()),
            customer: customers
                .get(&s.customer_id)
                .map(|n| (*n).to_owned())
                .unwrap_or_else(|| s.customer_id.to_string()),
            items: s
                .lines
                .iter()
                .map(|l| format!("{} x{}", l.product_name, l.quantity.normalize()))
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect()
}
