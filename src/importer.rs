use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{RecpamError, Result};
use crate::index_table::column_index;
use crate::models::{Transaction, TransactionFile};

pub const DESCRIPTION_COLUMN: &str = "Descripcion";
pub const DATE_COLUMN: &str = "Fecha";
pub const AMOUNT_COLUMN: &str = "Monto_Historico";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse an amount written with a decimal comma (`1.234,56`).
///
/// Dots are thousands separators and must group exactly three digits, so
/// `1.500` is fifteen hundred. With no comma, a single dot that is not
/// followed by exactly three digits is read as a decimal mark (`1234.56`).
/// Mixed US-style input such as `1,234.56` is rejected rather than guessed.
/// Currency symbols are ignored and parentheses mean a negative amount.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw
        .replace("AR$", "")
        .replace(['$', '"', ' ', '\u{a0}'], "");
    let (negative, s) = match s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, s.as_str()),
    };
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (!negative, rest),
        None => (negative, s),
    };

    let (int_part, frac_part) = match s.split_once(',') {
        Some((int, frac)) => (int, frac),
        None => match s.split_once('.') {
            Some((int, frac)) if !frac.contains('.') && frac.len() != 3 => (int, frac),
            _ => (s, ""),
        },
    };
    let int_digits = grouped_digits(int_part)?;
    if !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if int_digits.is_empty() && frac_part.is_empty() {
        return None;
    }

    let value: f64 = format!("0{int_digits}.{frac_part}0").parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(if negative { -value } else { value })
}

/// Digits of an integer part, with `.` thousands separators removed. Groups
/// after the first must be exactly three digits long.
fn grouped_digits(int_part: &str) -> Option<String> {
    let mut groups = int_part.split('.');
    let first = groups.next().unwrap_or_default();
    let is_digits = |g: &str| g.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(first) {
        return None;
    }
    let mut digits = first.to_string();
    let mut grouped = false;
    for group in groups {
        if group.len() != 3 || !is_digits(group) {
            return None;
        }
        digits.push_str(group);
        grouped = true;
    }
    if grouped && !(1..=3).contains(&first.len()) {
        return None;
    }
    Some(digits)
}

/// Day-first date: `DD/MM/YYYY`, `DD-MM-YYYY` or `DD.MM.YYYY`, with ISO
/// `YYYY-MM-DD` as a fallback. A trailing time of day, as spreadsheets write
/// it (`2017-12-15T00:00:00`, `15/12/2017 00:00:00`), is ignored.
pub fn parse_date_dmy(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_only = ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok());
    date_only.or_else(|| {
        [
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S%.f",
            "%d/%m/%Y %H:%M:%S%.f",
            "%d/%m/%Y %H:%M",
        ]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
    })
}

pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(chrono::Duration::days(serial.floor() as i64))
}

// ---------------------------------------------------------------------------
// Sheet model shared by the CSV and XLSX readers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Empty,
}

impl Cell {
    fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    fn display(&self) -> String {
        match self {
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) => n.to_string().replace('.', ","),
            Cell::Date(d) => d.format("%d/%m/%Y").to_string(),
            Cell::Empty => String::new(),
        }
    }
}

static EMPTY_CELL: Cell = Cell::Empty;

struct Sheet {
    headers: csv::StringRecord,
    rows: Vec<Vec<Cell>>,
}

fn transactions_from_sheet(sheet: Sheet) -> Result<TransactionFile> {
    let idx_date = column_index(&sheet.headers, DATE_COLUMN)?;
    let idx_amount = column_index(&sheet.headers, AMOUNT_COLUMN)?;
    let idx_desc = column_index(&sheet.headers, DESCRIPTION_COLUMN).ok();

    let columns: Vec<String> = sheet
        .headers
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut transactions = Vec::with_capacity(sheet.rows.len());
    let mut records = Vec::with_capacity(sheet.rows.len());
    for cells in &sheet.rows {
        let get = |i: usize| cells.get(i).unwrap_or(&EMPTY_CELL);
        let (date_cell, amount_cell) = (get(idx_date), get(idx_amount));
        if date_cell.is_empty() && amount_cell.is_empty() {
            continue;
        }
        let row = transactions.len() + 1;

        let origin_date = match date_cell {
            Cell::Date(d) => Some(*d),
            Cell::Number(n) => excel_serial_to_date(*n),
            Cell::Text(s) => parse_date_dmy(s),
            Cell::Empty => None,
        }
        .ok_or_else(|| RecpamError::InvalidDate {
            row,
            value: date_cell.display(),
        })?;

        let historical_amount = match amount_cell {
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Text(s) => parse_amount(s),
            _ => None,
        }
        .ok_or_else(|| RecpamError::InvalidAmount {
            row,
            value: amount_cell.display(),
        })?;

        let description = idx_desc
            .map(|i| get(i).display())
            .filter(|s| !s.is_empty());

        transactions.push(Transaction {
            description,
            origin_date,
            historical_amount,
        });
        records.push((0..columns.len()).map(|i| get(i).display()).collect());
    }

    log::debug!("read {} transactions", transactions.len());
    Ok(TransactionFile {
        transactions,
        columns,
        records,
        has_description: idx_desc.is_some(),
    })
}

// ---------------------------------------------------------------------------
// CSV: semicolon separated, decimal comma
// ---------------------------------------------------------------------------

pub fn read_transactions_csv<R: Read>(reader: R) -> Result<TransactionFile> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(
            record
                .iter()
                .map(|field| Cell::Text(field.to_string()))
                .collect(),
        );
    }
    transactions_from_sheet(Sheet { headers, rows })
}

// ---------------------------------------------------------------------------
// XLSX: first worksheet, first row is the header
// ---------------------------------------------------------------------------

#[cfg(feature = "xlsx")]
fn read_xlsx_sheet(file_path: &Path) -> Result<Sheet> {
    use calamine::{Data, Reader};

    let mut workbook = calamine::open_workbook_auto(file_path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| RecpamError::Other("Workbook has no worksheets".to_string()))??;

    let mut rows_iter = range.rows();
    let headers: csv::StringRecord = rows_iter
        .next()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .unwrap_or_default();

    let rows = rows_iter
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::Int(i) => Cell::Number(*i as f64),
                    Data::Float(f) => Cell::Number(*f),
                    Data::String(s) => Cell::Text(s.clone()),
                    Data::DateTimeIso(s) => parse_date_dmy(s)
                        .map(Cell::Date)
                        .unwrap_or_else(|| Cell::Text(s.clone())),
                    Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
                        .map(Cell::Date)
                        .unwrap_or(Cell::Empty),
                    Data::Empty => Cell::Empty,
                    other => Cell::Text(other.to_string()),
                })
                .collect()
        })
        .collect();

    Ok(Sheet { headers, rows })
}

pub fn read_transactions(file_path: &Path) -> Result<TransactionFile> {
    let ext = file_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(file_path)?;
            read_transactions_csv(std::io::BufReader::new(file))
        }
        #[cfg(feature = "xlsx")]
        "xlsx" | "xls" | "ods" => transactions_from_sheet(read_xlsx_sheet(file_path)?),
        _ => Err(RecpamError::UnsupportedFormat(file_path.display().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_amount_decimal_comma() {
        assert_eq!(parse_amount("1000"), Some(1000.0));
        assert_eq!(parse_amount("1234,56"), Some(1234.56));
        assert_eq!(parse_amount("1.234,56"), Some(1234.56));
        assert_eq!(parse_amount("  -42,5  "), Some(-42.5));
        assert_eq!(parse_amount("1234.56"), Some(1234.56));
    }

    #[test]
    fn test_parse_amount_dot_groups_thousands() {
        assert_eq!(parse_amount("1.500"), Some(1500.0));
        assert_eq!(parse_amount("12.345.678"), Some(12_345_678.0));
        assert_eq!(parse_amount("-0.250"), Some(-250.0));
        assert_eq!(parse_amount("1.5"), Some(1.5));
    }

    #[test]
    fn test_parse_amount_rejects_ambiguous_separators() {
        assert_eq!(parse_amount("1,234.56"), None);
        assert_eq!(parse_amount("1.23,4.5"), None);
        assert_eq!(parse_amount("1234.567"), None);
        assert_eq!(parse_amount("1.2.3"), None);
        assert_eq!(parse_amount("1,2,3"), None);
    }

    #[test]
    fn test_parse_amount_symbols_and_parentheses() {
        assert_eq!(parse_amount("AR$ 1.500,00"), Some(1500.0));
        assert_eq!(parse_amount("$50"), Some(50.0));
        assert_eq!(parse_amount("(1.234,56)"), Some(-1234.56));
        assert_eq!(parse_amount("\"2,5\""), Some(2.5));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("   "), None);
        assert_eq!(parse_amount("mil pesos"), None);
        assert_eq!(parse_amount("inf"), None);
    }

    #[test]
    fn test_parse_date_dmy() {
        assert_eq!(parse_date_dmy("15/12/2017"), Some(d(2017, 12, 15)));
        assert_eq!(parse_date_dmy("01/02/2020"), Some(d(2020, 2, 1)));
        assert_eq!(parse_date_dmy("1-2-2020"), Some(d(2020, 2, 1)));
        assert_eq!(parse_date_dmy("2020-02-01"), Some(d(2020, 2, 1)));
        assert_eq!(parse_date_dmy("invalid"), None);
    }

    #[test]
    fn test_parse_date_dmy_ignores_time_of_day() {
        assert_eq!(parse_date_dmy("2017-12-15T00:00:00"), Some(d(2017, 12, 15)));
        assert_eq!(parse_date_dmy("2017-12-15T13:45:10.500"), Some(d(2017, 12, 15)));
        assert_eq!(parse_date_dmy("2017-12-15 00:00:00"), Some(d(2017, 12, 15)));
        assert_eq!(parse_date_dmy("15/12/2017 08:30"), Some(d(2017, 12, 15)));
        assert_eq!(parse_date_dmy("2017-12-15Tnoon"), None);
    }

    #[test]
    fn test_parse_date_dmy_rejects_invalid_dates() {
        assert_eq!(parse_date_dmy("32/01/2025"), None);
        assert_eq!(parse_date_dmy("30/02/2025"), None);
        assert_eq!(parse_date_dmy("15/13/2025"), None);
    }

    #[test]
    fn test_excel_serial_to_date() {
        assert_eq!(excel_serial_to_date(45667.0), Some(d(2025, 1, 10)));
        assert_eq!(excel_serial_to_date(45667.75), Some(d(2025, 1, 10)));
        assert_eq!(excel_serial_to_date(f64::NAN), None);
    }

    #[test]
    fn test_read_transactions_csv() {
        let content = "\
Descripcion;Fecha;Monto_Historico
Rodado;15/12/2017;1000
Muebles;03/06/2019;2.500,75
;10/01/2020;-300,5
";
        let file = read_transactions_csv(content.as_bytes()).unwrap();
        assert!(file.has_description);
        assert_eq!(file.transactions.len(), 3);
        assert_eq!(file.transactions[0].description.as_deref(), Some("Rodado"));
        assert_eq!(file.transactions[0].origin_date, d(2017, 12, 15));
        assert_eq!(file.transactions[1].historical_amount, 2500.75);
        assert_eq!(file.transactions[2].description, None);
        assert_eq!(file.transactions[2].historical_amount, -300.5);
    }

    #[test]
    fn test_read_transactions_csv_thousands_dot() {
        let content = "Fecha;Monto_Historico\n15/12/2017;1.500\n16/12/2017;1,234.56\n";
        let err = read_transactions_csv(content.as_bytes()).unwrap_err();
        assert!(matches!(err, RecpamError::InvalidAmount { row: 2, ref value } if value == "1,234.56"));

        let content = "Fecha;Monto_Historico\n15/12/2017;1.500\n";
        let file = read_transactions_csv(content.as_bytes()).unwrap();
        assert_eq!(file.transactions[0].historical_amount, 1500.0);
    }

    #[test]
    fn test_read_transactions_csv_keeps_every_column() {
        let content = "\u{feff}Descripcion;Fecha;Monto_Historico;Cuenta\n\
Rodado;15/12/2017;1000;1.1.01\n\
;;;\n\
Muebles;03/06/2019;2.500,75\n";
        let file = read_transactions_csv(content.as_bytes()).unwrap();
        assert_eq!(
            file.columns,
            ["Descripcion", "Fecha", "Monto_Historico", "Cuenta"]
        );
        assert_eq!(file.records.len(), file.transactions.len());
        assert_eq!(file.records[0], ["Rodado", "15/12/2017", "1000", "1.1.01"]);
        assert_eq!(file.records[1], ["Muebles", "03/06/2019", "2.500,75", ""]);
    }

    #[test]
    fn test_read_transactions_csv_without_description() {
        let content = "\u{feff}Fecha;Monto_Historico\n15/12/2017;1000\n\n";
        let file = read_transactions_csv(content.as_bytes()).unwrap();
        assert!(!file.has_description);
        assert_eq!(file.transactions.len(), 1);
    }

    #[test]
    fn test_read_transactions_csv_missing_column() {
        let content = "Descripcion;Fecha;Monto\nRodado;15/12/2017;1000\n";
        let err = read_transactions_csv(content.as_bytes()).unwrap_err();
        assert!(matches!(err, RecpamError::MissingColumn(ref c) if c == "Monto_Historico"));
    }

    #[test]
    fn test_read_transactions_csv_bad_date_names_row() {
        let content = "Fecha;Monto_Historico\n15/12/2017;1000\n2017/31/12;5\n";
        let err = read_transactions_csv(content.as_bytes()).unwrap_err();
        match err {
            RecpamError::InvalidDate { row, value } => {
                assert_eq!(row, 2);
                assert_eq!(value, "2017/31/12");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_read_transactions_csv_bad_amount() {
        let content = "Fecha;Monto_Historico\n15/12/2017;mucho\n";
        let err = read_transactions_csv(content.as_bytes()).unwrap_err();
        assert!(matches!(err, RecpamError::InvalidAmount { row: 1, .. }));
    }

    #[test]
    fn test_read_transactions_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("datos.txt");
        std::fs::write(&path, "Fecha;Monto_Historico\n").unwrap();
        let err = read_transactions(&path).unwrap_err();
        assert!(matches!(err, RecpamError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_read_transactions_from_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partidas.CSV");
        std::fs::write(&path, "Fecha;Monto_Historico\n15/12/2017;1000,25\n").unwrap();
        let file = read_transactions(&path).unwrap();
        assert_eq!(file.transactions[0].historical_amount, 1000.25);
    }

    #[cfg(feature = "xlsx")]
    #[test]
    fn test_read_transactions_from_xlsx() {
        use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partidas.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        let date_format = Format::new().set_num_format("dd/mm/yyyy");
        for (col, name) in ["Descripcion", "Fecha", "Monto_Historico", "Cuenta"]
            .iter()
            .enumerate()
        {
            sheet.write_string(0, col as u16, *name).unwrap();
        }
        sheet.write_string(1, 0, "Rodado").unwrap();
        let date = ExcelDateTime::from_ymd(2017, 12, 15).unwrap();
        sheet.write_datetime_with_format(1, 1, &date, &date_format).unwrap();
        sheet.write_number(1, 2, 1000.5).unwrap();
        sheet.write_string(1, 3, "1.1.01").unwrap();
        sheet.write_string(2, 0, "Muebles").unwrap();
        sheet.write_string(2, 1, "2019-06-03T00:00:00").unwrap();
        sheet.write_string(2, 2, "2.500,75").unwrap();
        workbook.save(&path).unwrap();

        let file = read_transactions(&path).unwrap();
        assert!(file.has_description);
        assert_eq!(file.transactions.len(), 2);

        let first = &file.transactions[0];
        assert_eq!(first.description.as_deref(), Some("Rodado"));
        assert_eq!(first.origin_date, d(2017, 12, 15));
        assert_eq!(first.historical_amount, 1000.5);

        let second = &file.transactions[1];
        assert_eq!(second.origin_date, d(2019, 6, 3));
        assert_eq!(second.historical_amount, 2500.75);

        assert_eq!(file.columns[3], "Cuenta");
        assert_eq!(file.records[0][3], "1.1.01");
        assert_eq!(file.records[0][2], "1000,5");
    }
}
