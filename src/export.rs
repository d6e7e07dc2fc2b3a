//! Spreadsheet-friendly CSV export of an adjusted batch.
//!
//! The layout matches the defaults of Spanish-locale spreadsheets: `;` between
//! fields, `,` as the decimal mark, UTF-8 with a byte-order mark.

use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;

use crate::error::Result;
use crate::fmt::decimal_comma;
use crate::importer::{AMOUNT_COLUMN, DATE_COLUMN};
use crate::models::{AdjustedTransaction, TransactionFile};

pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
pub const COEFFICIENT_COLUMN: &str = "Coeficiente";
pub const ADJUSTED_COLUMN: &str = "Monto_Ajustado";
pub const RECPAM_COLUMN: &str = "Ajuste_RECPAM";

pub fn default_file_name(closing_date: NaiveDate) -> String {
    format!("ajuste_inflacion_{}.csv", closing_date.format("%Y%m%d"))
}

/// Write `input` back out in its own column order, with the computed columns
/// appended. `Fecha` and `Monto_Historico` are rewritten from the parsed
/// values; every other cell keeps the text it was read with.
pub fn write_csv<W: Write>(
    mut writer: W,
    input: &TransactionFile,
    rows: &[AdjustedTransaction],
) -> Result<()> {
    writer.write_all(UTF8_BOM)?;
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    let idx_date = input.columns.iter().position(|c| c == DATE_COLUMN);
    let idx_amount = input.columns.iter().position(|c| c == AMOUNT_COLUMN);

    let mut header: Vec<&str> = input.columns.iter().map(String::as_str).collect();
    header.extend([COEFFICIENT_COLUMN, ADJUSTED_COLUMN, RECPAM_COLUMN]);
    wtr.write_record(&header)?;

    for (row, cells) in rows.iter().zip(&input.records) {
        let mut record: Vec<String> = Vec::with_capacity(header.len());
        for (i, cell) in cells.iter().enumerate() {
            if Some(i) == idx_date {
                record.push(row.transaction.origin_date.format("%d/%m/%Y").to_string());
            } else if Some(i) == idx_amount {
                record.push(decimal_comma(row.transaction.historical_amount, 2));
            } else {
                record.push(cell.clone());
            }
        }
        record.push(decimal_comma(row.coefficient, 4));
        record.push(decimal_comma(row.adjusted_amount, 2));
        record.push(decimal_comma(row.recpam_adjustment, 2));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn to_bytes(input: &TransactionFile, rows: &[AdjustedTransaction]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(&mut buf, input, rows)?;
    Ok(buf)
}

pub fn write_file(path: &Path, input: &TransactionFile, rows: &[AdjustedTransaction]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let bytes = to_bytes(input, rows)?;
    std::fs::write(path, bytes)?;
    log::info!("wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::adjust;
    use crate::importer::read_transactions_csv;
    use crate::index_table::IndexTable;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn adjusted(content: &str) -> (TransactionFile, Vec<AdjustedTransaction>) {
        let table = IndexTable::from_pairs([
            ("2017-11-01", "121.2482"),
            ("2023-12-01", "3539.1"),
        ])
        .unwrap();
        let input = read_transactions_csv(content.as_bytes()).unwrap();
        let rows = adjust(&input.transactions, d(2023, 12, 31), &table)
            .unwrap()
            .rows;
        (input, rows)
    }

    fn export_text(content: &str) -> String {
        let (input, rows) = adjusted(content);
        let bytes = to_bytes(&input, &rows).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap()
    }

    const SAMPLE: &str = "\
Descripcion;Fecha;Monto_Historico
\"Rodado; usado\";15/12/2017;1000
;1/3/2020;250,5
";

    #[test]
    fn test_default_file_name() {
        assert_eq!(default_file_name(d(2023, 12, 31)), "ajuste_inflacion_20231231.csv");
    }

    #[test]
    fn test_export_layout() {
        let text = export_text(SAMPLE);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Descripcion;Fecha;Monto_Historico;Coeficiente;Monto_Ajustado;Ajuste_RECPAM"
        );
        assert_eq!(
            lines[1],
            "\"Rodado; usado\";15/12/2017;1000,00;29,1889;29188,89;28188,89"
        );
        assert_eq!(lines[2], ";01/03/2020;250,50;1,0000;250,50;0,00");
        assert!(text.ends_with('\n'));
        assert!(!text.contains('\r'));
    }

    #[test]
    fn test_export_without_description() {
        let text = export_text("Fecha;Monto_Historico\n15/12/2017;1000\n");
        let header = text.lines().next().unwrap();
        assert_eq!(header, "Fecha;Monto_Historico;Coeficiente;Monto_Ajustado;Ajuste_RECPAM");
    }

    #[test]
    fn test_export_keeps_extra_columns_in_order() {
        let text = export_text(
            "Cuenta;Fecha;Descripcion;Monto_Historico;Notas\n\
             1.1.01;15/12/2017;Rodado;1.000,00;compra 3,5%\n",
        );
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Cuenta;Fecha;Descripcion;Monto_Historico;Notas;Coeficiente;Monto_Ajustado;Ajuste_RECPAM"
        );
        assert_eq!(
            lines[1],
            "1.1.01;15/12/2017;Rodado;1000,00;compra 3,5%;29,1889;29188,89;28188,89"
        );
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_write_file_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exports").join("out.csv");
        let (input, rows) = adjusted(SAMPLE);
        write_file(&path, &input, &rows).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..3], UTF8_BOM);
    }
}
