//! Display formatting shared by text reports and CSV exports.

/// Whole-unit amount with thousands separators, e.g. `-$1,234`.
pub fn currency(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}")
}

pub fn months(months: Option<f64>) -> String {
    match months {
        Some(m) => format!("{m} mo"),
        None => "no payback".to_string(),
    }
}

pub fn percent(value: f64) -> String {
    format!("{value}%")
}
