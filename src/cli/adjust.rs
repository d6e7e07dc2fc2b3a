use std::path::{Path, PathBuf};

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cache::IndexCache;
use crate::cli::{resolve_closing_date, resolve_index_path};
use crate::engine::{adjust, Adjustment};
use crate::error::Result;
use crate::export;
use crate::fmt::{coefficient, money, percent};
use crate::importer::read_transactions;
use crate::settings::{cache_dir, load_settings, shellexpand_path};

pub fn run(
    file: &str,
    index: Option<&str>,
    closing: Option<&str>,
    output: Option<&str>,
    no_export: bool,
) -> Result<()> {
    let settings = load_settings();
    let index_path = resolve_index_path(index, &settings)?;
    let today = chrono::Local::now().date_naive();
    let closing_date = resolve_closing_date(closing, today)?;

    let table = IndexCache::new(cache_dir()).load_path(&index_path)?;
    let input = read_transactions(Path::new(&shellexpand_path(file)))?;
    let adjustment = adjust(&input.transactions, closing_date, &table)?;

    for warning in &adjustment.warnings {
        println!("{}", format!("Warning: {warning}").yellow());
    }
    if !adjustment.warnings.is_empty() {
        println!();
    }

    println!(
        "{}",
        format_results(&adjustment, input.has_description, &settings.currency_symbol)
    );
    println!();
    println!("{}", format_totals(&adjustment, &settings.currency_symbol));

    if !no_export {
        let path = output.map(PathBuf::from).unwrap_or_else(|| {
            PathBuf::from(&settings.export_dir).join(export::default_file_name(closing_date))
        });
        export::write_file(&path, &input, &adjustment.rows)?;
        println!("\nWrote {}", path.display());
    }

    Ok(())
}

pub fn format_results(adjustment: &Adjustment, has_description: bool, symbol: &str) -> String {
    let mut table = Table::new();
    let mut header = vec!["#"];
    if has_description {
        header.push("Description");
    }
    header.extend(["Date", "Origin", "Historical", "Coefficient", "Adjusted", "RECPAM"]);
    table.set_header(header);

    for (i, row) in adjustment.rows.iter().enumerate() {
        let mut cells = vec![Cell::new(i + 1)];
        if has_description {
            cells.push(Cell::new(
                row.transaction.description.as_deref().unwrap_or(""),
            ));
        }
        let coef = if row.is_adjusted() {
            Cell::new(coefficient(row.coefficient))
        } else {
            Cell::new(coefficient(row.coefficient).yellow())
        };
        cells.extend([
            Cell::new(row.transaction.origin_date.format("%d/%m/%Y")),
            Cell::new(
                row.origin_period
                    .map(|p| p.format("%Y-%m").to_string())
                    .unwrap_or_default(),
            ),
            Cell::new(money(row.transaction.historical_amount, symbol)),
            coef,
            Cell::new(money(row.adjusted_amount, symbol)),
            Cell::new(money(row.recpam_adjustment, symbol)),
        ]);
        table.add_row(cells);
    }

    let run = &adjustment.run;
    format!(
        "Results adjusted to {} (index {}: {})\n{table}",
        run.closing_date.format("%d/%m/%Y"),
        run.closing_period.format("%Y-%m"),
        run.closing_index
    )
}

pub fn format_totals(adjustment: &Adjustment, symbol: &str) -> String {
    let summary = adjustment.summary();
    let mut table = Table::new();
    table.set_header(vec!["Totals", "Amount"]);
    table.add_row(vec![
        Cell::new("Historical total"),
        Cell::new(money(summary.total_historical, symbol)),
    ]);
    table.add_row(vec![
        Cell::new("Adjusted total"),
        Cell::new(money(summary.total_adjusted, symbol)),
    ]);
    table.add_row(vec![
        Cell::new("RECPAM total".bold()),
        Cell::new(money(summary.total_recpam, symbol)),
    ]);
    let change = percent(summary.percentage_change);
    let change = if summary.percentage_change >= 0.0 {
        change.green()
    } else {
        change.red()
    };
    table.add_row(vec![Cell::new("Change"), Cell::new(change)]);

    let mut out = table.to_string();
    if summary.unadjusted_rows > 0 {
        out.push_str(&format!(
            "\n{} of {} rows left unadjusted (no origin index)",
            summary.unadjusted_rows, summary.rows
        ));
    }
    out
}
