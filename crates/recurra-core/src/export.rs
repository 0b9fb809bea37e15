//! CSV Export
//!
//! Spreadsheet-friendly CSV: UTF-8 byte order mark, configurable delimiter,
//! locale-formatted currency, ISO dates.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use crate::config::ReportConfig;
use crate::error::{RecurraError, Result};
use crate::models::{weekday_name, DeliveryEvent, Product};
use crate::production::ProductionLine;
use crate::reconciliation::FinancialReport;

/// UTF-8 byte order mark
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

fn writer(config: &ReportConfig) -> Result<csv::Writer<Vec<u8>>> {
    let delimiter = config.csv.delimiter;
    if !delimiter.is_ascii() {
        return Err(RecurraError::Export(format!("delimiter '{}' is not ASCII", delimiter)));
    }
    let mut buf = Vec::new();
    if config.csv.include_bom {
        buf.extend_from_slice(UTF8_BOM);
    }
    Ok(csv::WriterBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .from_writer(buf))
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    wtr.into_inner().map_err(|e| RecurraError::Export(e.to_string()))
}

fn date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

fn percent(value: Decimal) -> String {
    format!("{:.2}%", value.round_dp(2))
}

fn metric(wtr: &mut csv::Writer<Vec<u8>>, label: &str, value: String) -> Result<()> {
    wtr.write_record([label, value.as_str()])?;
    Ok(())
}

/// Financial report: summary metrics, then product, customer and expense sections
pub fn report_to_csv(report: &FinancialReport, config: &ReportConfig) -> Result<Vec<u8>> {
    let money = |v: Decimal| config.currency.format(v);
    let mut wtr = writer(config)?;

    wtr.write_record(["Metric", "Value"])?;
    metric(&mut wtr, "Period", report.period.kind.as_str().to_owned())?;
    metric(&mut wtr, "Start", date(report.period.start_date()))?;
    metric(&mut wtr, "End", date(report.period.end_date()))?;
    metric(&mut wtr, "Active subscriptions", report.active_subscriptions.to_string())?;
    metric(&mut wtr, "Deliveries", report.delivery_count.to_string())?;
    metric(&mut wtr, "Total revenue", money(report.total_revenue))?;
    metric(&mut wtr, "Product cost", money(report.total_product_cost))?;
    metric(&mut wtr, "Operational expenses", money(report.operational_expenses))?;
    metric(&mut wtr, "Platform costs", money(report.platform_costs))?;
    metric(&mut wtr, "Total costs", money(report.total_costs))?;
    metric(&mut wtr, "Gross profit", money(report.gross_profit))?;
    metric(&mut wtr, "Net profit", money(report.net_profit))?;
    metric(&mut wtr, "Gross margin", percent(report.gross_margin))?;
    metric(&mut wtr, "Net margin", percent(report.net_margin))?;
    metric(&mut wtr, "Break-even point", money(report.break_even_point))?;
    metric(&mut wtr, "Profit per customer", money(report.profit_per_customer))?;

    wtr.write_record([""])?;
    wtr.write_record(["Product", "Deliveries", "Quantity", "Revenue", "Cost", "Gross profit"])?;
    for p in &report.products {
        wtr.write_record([
            p.name.clone(),
            p.deliveries.to_string(),
            p.quantity.normalize().to_string(),
            money(p.revenue),
            money(p.cost),
            money(p.gross_profit),
        ])?;
    }

    wtr.write_record([""])?;
    wtr.write_record(["Customer", "Deliveries", "Revenue"])?;
    for c in &report.customers {
        let name = c.customer_name.clone().unwrap_or_else(|| c.customer_id.to_string());
        wtr.write_record([name, c.deliveries.to_string(), money(c.revenue)])?;
    }

    wtr.write_record([""])?;
    wtr.write_record(["Expense category", "Entries", "Amount"])?;
    for e in &report.expenses_by_category {
        wtr.write_record([e.category.clone(), e.count.to_string(), money(e.amount)])?;
    }

    finish(wtr)
}

/// One row per delivery event
pub fn deliveries_to_csv(events: &[DeliveryEvent], products: &[Product], config: &ReportConfig) -> Result<Vec<u8>> {
    let names: HashMap<Uuid, &str> = products.iter().map(|p| (p.id, p.name.as_str())).collect();
    let mut wtr = writer(config)?;

    wtr.write_record(["Date", "Weekday", "Customer", "Subscription", "Product", "Quantity", "Unit price", "Total"])?;
    for event in events {
        let product = names
            .get(&event.product_id)
            .map(|n| (*n).to_owned())
            .unwrap_or_else(|| event.product_id.to_string());
        wtr.write_record([
            date(event.date),
            weekday_name(event.weekday()).to_owned(),
            event.customer_id.to_string(),
            event.subscription_id.to_string(),
            product,
            event.quantity.normalize().to_string(),
            config.currency.format(event.unit_price),
            config.currency.format(event.amount()),
        ])?;
    }

    finish(wtr)
}

/// One row per production line
pub fn production_to_csv(lines: &[ProductionLine], config: &ReportConfig) -> Result<Vec<u8>> {
    let mut wtr = writer(config)?;
    wtr.write_record(["Date", "Product", "Unit", "Deliveries", "Quantity"])?;
    for line in lines {
        wtr.write_record([
            date(line.date),
            line.product_name.clone(),
            line.unit.clone().unwrap_or_default(),
            line.deliveries.to_string(),
            line.quantity.normalize().to_string(),
        ])?;
    }
    finish(wtr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{period_bounds, PeriodKind};
    use crate::config::{CsvOptions, CurrencyFormat, SegmentationMode};
    use rust_decimal_macros::dec;

    fn event() -> DeliveryEvent {
        DeliveryEvent {
            subscription_id: Uuid::from_u128(1),
            item_id: Uuid::from_u128(2),
            product_id: Uuid::from_u128(3),
            customer_id: Uuid::from_u128(4),
            team_id: Uuid::nil(),
            delivery_area_id: None,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            quantity: dec!(1500),
            unit_price: dec!(1.5),
        }
    }

    fn product() -> Product {
        Product {
            id: Uuid::from_u128(3),
            team_id: Uuid::nil(),
            name: "Pão francês".into(),
            price: dec!(1.5),
            cost_per_unit: dec!(0.4),
            unit: None,
        }
    }

    #[test]
    fn test_deliveries_csv_has_bom_and_quoted_currency() {
        let config = ReportConfig { currency: CurrencyFormat::brl(), ..Default::default() };
        let bytes = deliveries_to_csv(&[event()], &[product()], &config).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Date,Weekday,Customer,Subscription,Product,Quantity,Unit price,Total"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("2024-01-01,monday,"));
        assert!(row.contains("Pão francês,1500,\"R$ 1,50\",\"R$ 2.250,00\""));
    }

    #[test]
    fn test_no_bom_and_semicolon_delimiter() {
        let config = ReportConfig {
            csv: CsvOptions { delimiter: ';', include_bom: false },
            ..Default::default()
        };
        let bytes = production_to_csv(&[], &config).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "Date;Product;Unit;Deliveries;Quantity\n");
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let config = ReportConfig {
            csv: CsvOptions { delimiter: '¦', include_bom: true },
            ..Default::default()
        };
        assert!(matches!(production_to_csv(&[], &config), Err(RecurraError::Export(_))));
    }

    #[test]
    fn test_report_csv_sections() {
        let report = FinancialReport {
            team_id: Uuid::nil(),
            period: period_bounds(NaiveDate::from_ymd_opt(2024, 2, 15).unwrap(), PeriodKind::Monthly),
            segmentation: SegmentationMode::EqualSplit,
            active_subscriptions: 0,
            delivery_count: 0,
            total_revenue: dec!(0),
            total_product_cost: dec!(0),
            operational_expenses: dec!(12.5),
            platform_costs: dec!(300),
            total_costs: dec!(312.5),
            gross_profit: dec!(0),
            net_profit: dec!(-312.5),
            gross_margin: dec!(0),
            net_margin: dec!(0),
            break_even_point: dec!(312.5),
            profit_per_customer: dec!(0),
            products: vec![],
            customers: vec![],
            segments: vec![],
            expenses_by_category: vec![],
        };
        let bytes = report_to_csv(&report, &ReportConfig::default()).unwrap();
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        assert!(text.contains("Start,2024-02-01\n"));
        assert!(text.contains("End,2024-02-29\n"));
        assert!(text.contains("Net profit,\"-$312.50\"\n") || text.contains("Net profit,-$312.50\n"));
        assert!(text.contains("Gross margin,0.00%\n"));
        assert!(text.contains("Product,Deliveries,Quantity,Revenue,Cost,Gross profit\n"));
    }
}
