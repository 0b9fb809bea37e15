//! Report command

use super::parse_date;
use crate::output::{heading, percent, signed, OutputFormat};
use crate::{Context, PeriodArgs};
use chrono::NaiveDate;
use recurra_core::{reconcile, FinancialReport, ReportConfig};
use tabled::Tabled;

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "Product")]
    name: String,
    #[tabled(rename = "Deliveries")]
    deliveries: usize,
    #[tabled(rename = "Quantity")]
    quantity: String,
    #[tabled(rename = "Revenue")]
    revenue: String,
    #[tabled(rename = "Cost")]
    cost: String,
    #[tabled(rename = "Gross profit")]
    gross_profit: String,
}

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Entries")]
    count: usize,
    #[tabled(rename = "Amount")]
    amount: String,
}

/// Reference date and effective config for a period command
pub fn resolve(args: &PeriodArgs, config: &ReportConfig) -> Result<(NaiveDate, ReportConfig), String> {
    let reference = match &args.date {
        Some(date) => parse_date(date)?,
        None => chrono::Local::now().date_naive(),
    };
    let mut config = config.clone();
    if let Some(mode) = args.segmentation {
        config.segmentation = mode;
    }
    Ok((reference, config))
}

pub async fn handle(args: &PeriodArgs, ctx: &Context) -> Result<(), String> {
    let (reference, config) = resolve(args, &ctx.report_config)?;
    let snapshot = ctx.source.load().await?;
    let report = reconcile(&snapshot, reference, args.period, &config);

    if ctx.format != OutputFormat::Table {
        ctx.format.print(&report, Vec::<MetricRow>::new());
        return Ok(());
    }

    heading(&format!(
        "{} report {} .. {}",
        report.period.kind,
        report.period.start_date(),
        report.period.end_date()
    ));
    ctx.format.print(&report, summary_rows(&report, &config));

    if !report.products.is_empty() {
        heading("Products");
        let money = |v| config.currency.format(v);
        let rows: Vec<ProductRow> = report
            .products
            .iter()
            .map(|p| ProductRow {
                name: p.name.clone(),
                deliveries: p.deliveries,
                quantity: p.quantity.normalize().to_string(),
                revenue: money(p.revenue),
                cost: money(p.cost),
                gross_profit: signed(money(p.gross_profit), p.gross_profit),
            })
            .collect();
        ctx.format.print(&report.products, rows);
    }

    if !report.expenses_by_category.is_empty() {
        heading("Expenses");
        let rows: Vec<ExpenseRow> = report
            .expenses_by_category
            .iter()
            .map(|e| ExpenseRow {
                category: e.category.clone(),
                count: e.count,
                amount: config.currency.format(e.amount),
            })
            .collect();
        ctx.format.print(&report.expenses_by_category, rows);
    }

    Ok(())
}

fn summary_rows(report: &FinancialReport, config: &ReportConfig) -> Vec<MetricRow> {
    let money = |v| config.currency.format(v);
    vec![
        MetricRow { metric: "Active subscriptions", value: report.active_subscriptions.to_string() },
        MetricRow { metric: "Deliveries", value: report.delivery_count.to_string() },
        MetricRow { metric: "Total revenue", value: money(report.total_revenue) },
        MetricRow { metric: "Product cost", value: money(report.total_product_cost) },
        MetricRow { metric: "Operational expenses", value: money(report.operational_expenses) },
        MetricRow { metric: "Platform costs", value: money(report.platform_costs) },
        MetricRow { metric: "Total costs", value: money(report.total_costs) },
        MetricRow { metric: "Gross profit", value: signed(money(report.gross_profit), report.gross_profit) },
        MetricRow { metric: "Net profit", value: signed(money(report.net_profit), report.net_profit) },
        MetricRow { metric: "Gross margin", value: percent(report.gross_margin) },
        MetricRow { metric: "Net margin", value: percent(report.net_margin) },
        MetricRow { metric: "Break-even point", value: money(report.break_even_point) },
        MetricRow {
            metric: "Profit per customer",
            value: signed(money(report.profit_per_customer), report.profit_per_customer),
        },
    ]
}
