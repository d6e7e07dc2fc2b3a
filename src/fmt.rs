/// Format a float as a currency amount with thousands separators: AR$ 1,234.56
pub fn money(val: f64, symbol: &str) -> String {
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
    let negative = val < 0.0 && cents != "0.00";

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    let sign = if negative { "-" } else { "" };
    if symbol.is_empty() {
        format!("{sign}{with_commas}.{dec_part}")
    } else {
        format!("{sign}{symbol} {with_commas}.{dec_part}")
    }
}

pub fn coefficient(val: f64) -> String {
    format!("{val:.4}")
}

pub fn percent(val: f64) -> String {
    let s = format!("{val:.2}");
    if s == "-0.00" {
        "0.00%".to_string()
    } else {
        format!("{s}%")
    }
}

/// Fixed decimals with a comma decimal mark and no grouping: 29188,89
pub fn decimal_comma(val: f64, places: usize) -> String {
    let s = format!("{val:.places$}");
    let s = match s.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
        _ => s,
    };
    s.replace('.', ",")
}
