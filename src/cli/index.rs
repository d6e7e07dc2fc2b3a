use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::resolve_index_path;
use crate::error::Result;
use crate::index_table::IndexTable;
use crate::settings::load_settings;

pub fn run(index: Option<&str>, all: bool) -> Result<()> {
    let settings = load_settings();
    let path = resolve_index_path(index, &settings)?;
    let table = IndexTable::from_csv_path(&path)?;

    println!("Index file: {}", path.display());
    println!("{}", format_summary(&table));
    if all && !table.is_empty() {
        println!("{}", format_entries(&table));
    }
    Ok(())
}

pub fn format_summary(table: &IndexTable) -> String {
    let (Some(first), Some(last)) = (table.first(), table.last()) else {
        return "No periods in index table.".yellow().to_string();
    };

    let mut out = Table::new();
    out.set_header(vec!["", "Period", "Value"]);
    out.add_row(vec![
        Cell::new("First"),
        Cell::new(first.period.format("%Y-%m")),
        Cell::new(first.value),
    ]);
    out.add_row(vec![
        Cell::new("Last"),
        Cell::new(last.period.format("%Y-%m")),
        Cell::new(last.value),
    ]);

    let mut text = format!("Periods: {}\n{out}", table.len());
    let gaps = table.gaps();
    if !gaps.is_empty() {
        let listed: Vec<String> = gaps.iter().map(|p| p.format("%Y-%m").to_string()).collect();
        text.push_str(&format!(
            "\n{}",
            format!("Missing months: {}", listed.join(", ")).yellow()
        ));
    }
    text
}

pub fn format_entries(table: &IndexTable) -> String {
    let mut out = Table::new();
    out.set_header(vec!["Period", "Value"]);
    for entry in table.entries() {
        out.add_row(vec![
            Cell::new(entry.period.format("%Y-%m")),
            Cell::new(entry.value),
        ]);
    }
    out.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_summary() {
        colored::control::set_override(false);
        let table = IndexTable::from_pairs([
            ("2016-12-01", "100.0"),
            ("2017-02-01", "103.5"),
        ])
        .unwrap();
        let out = format_summary(&table);
        assert!(out.starts_with("Periods: 2"));
        assert!(out.contains("2016-12"));
        assert!(out.contains("103.5"));
        assert!(out.contains("Missing months: 2017-01"));
    }

    #[test]
    fn test_format_summary_empty() {
        colored::control::set_override(false);
        assert_eq!(format_summary(&IndexTable::new()), "No periods in index table.");
    }

    #[test]
    fn test_format_entries_lists_every_period() {
        let table = IndexTable::from_pairs([("2016-12-01", "100.0"), ("2017-01-01", "101.6")])
            .unwrap();
        let out = format_entries(&table);
        assert!(out.contains("2016-12"));
        assert!(out.contains("2017-01"));
        assert!(out.contains("101.6"));
    }
}
