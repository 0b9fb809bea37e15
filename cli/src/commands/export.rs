//! Export commands

use super::{parse_range, report::resolve};
use crate::{Context, ExportCommands};
use colored::Colorize;
use recurra_core::{
    deliveries_to_csv, production_summary, production_to_csv, project, reconcile, report_to_csv,
};
use std::path::Path;

pub async fn handle(action: ExportCommands, ctx: &Context) -> Result<(), String> {
    let (output, bytes) = match action {
        ExportCommands::Report { period, output } => {
            let (reference, config) = resolve(&period, &ctx.report_config)?;
            let snapshot = ctx.source.load().await?;
            let report = reconcile(&snapshot, reference, period.period, &config);
            (output, report_to_csv(&report, &config).map_err(|e| e.to_string())?)
        }
        ExportCommands::Deliveries { range, output } => {
            let range = parse_range(&range.from, &range.to)?;
            let snapshot = ctx.source.load().await?;
            let events = project(&snapshot.subscriptions, range);
            let bytes = deliveries_to_csv(&events, &snapshot.products, &ctx.report_config).map_err(|e| e.to_string())?;
            (output, bytes)
        }
        ExportCommands::Production { range, output } => {
            let range = parse_range(&range.from, &range.to)?;
            let snapshot = ctx.source.load().await?;
            let events = project(&snapshot.subscriptions, range);
            let lines = production_summary(&events, &snapshot.products);
            (output, production_to_csv(&lines, &ctx.report_config).map_err(|e| e.to_string())?)
        }
    };

    write(&output, &bytes)?;
    println!("{} {} ({} bytes)", "Wrote".green(), output.display(), bytes.len());
    Ok(())
}

fn write(path: &Path, bytes: &[u8]) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| format!("{}: {}", parent.display(), e))?;
    }
    std::fs::write(path, bytes).map_err(|e| format!("{}: {}", path.display(), e))
}
