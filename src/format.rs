//! Number formatting shared by the TUI and the text report.

/// Group an integer string with `,` every three digits.
fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// `1234567` -> `1,234,567`
pub fn thousands(value: u64) -> String {
    group_digits(&value.to_string())
}

/// Amount rounded to whole won: `₩1,234,567`.
pub fn won(amount: f64) -> String {
    if !amount.is_finite() {
        return "-".to_string();
    }
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{}₩{}", sign, group_digits(&format!("{:.0}", rounded.abs())))
}

/// Like [`won`], with `-` for a missing value.
pub fn won_opt(amount: Option<f64>) -> String {
    amount.map(won).unwrap_or_else(|| "-".to_string())
}

/// Short amount for chart axes: `₩950`, `₩12.5K`, `₩3.2M`, `₩1.1B`.
pub fn compact_won(amount: f64) -> String {
    if !amount.is_finite() {
        return "-".to_string();
    }
    let sign = if amount < 0.0 { "-" } else { "" };
    let abs = amount.abs();
    let (scaled, suffix) = if abs >= 1e9 {
        (abs / 1e9, "B")
    } else if abs >= 1e6 {
        (abs / 1e6, "M")
    } else if abs >= 1e3 {
        (abs / 1e3, "K")
    } else {
        return format!("{}₩{:.0}", sign, abs);
    };
    format!("{}₩{:.1}{}", sign, scaled, suffix)
}

/// One decimal and a percent sign: `50.0%`.
pub fn percent(value: f64) -> String {
    format!("{:.1}%", value)
}
