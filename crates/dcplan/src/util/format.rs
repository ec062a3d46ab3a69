//! Number formatting for terminal reports

fn group_thousands(whole: u64) -> String {
    let digits = whole.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Currency without cents, e.g. `-$1,234,568`
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}${}", group_thousands(value.abs().round() as u64))
}

/// Compact currency, e.g. `$5.6M`, `$450K`, `$50`
pub fn format_compact_currency(value: f64) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }
    let abs_value = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };

    if abs_value >= 1_000_000.0 {
        format!("{sign}${:.1}M", abs_value / 1_000_000.0)
    } else if abs_value >= 1_000.0 {
        format!("{sign}${:.0}K", abs_value / 1_000.0)
    } else {
        format!("{sign}${abs_value:.0}")
    }
}

/// Fraction as a percentage, e.g. `0.1947` -> `19.47%`
pub fn format_percentage(value: f64) -> String {
    if value.is_finite() {
        format!("{:.2}%", value * 100.0)
    } else {
        "n/a".to_string()
    }
}

pub fn format_years(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.2} yr")
    } else {
        "n/a".to_string()
    }
}
