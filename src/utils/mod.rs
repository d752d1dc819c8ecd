//! Formatting helpers
//!
//! Brazilian locale conventions for currency and rates: thousands
//! separated by `.`, decimals by `,`.

use rust_decimal::Decimal;

/// Format as Brazilian Real: "R$ 1.234,56"
pub fn format_currency(value: Decimal) -> String {
    format!("R$ {}", format_decimal_br(value))
}

/// Number only, Brazilian locale: "1.234,56"
pub fn format_decimal_br(value: Decimal) -> String {
    let negative = value < Decimal::ZERO;
    let rounded = value.abs().round_dp(2);
    let text = format!("{:.2}", rounded);
    let (int_part, frac_part) = text.split_once('.').unwrap_or((&text, "00"));

    let mut grouped = String::new();
    let digits: Vec<char> = int_part.chars().collect();
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*c);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped},{frac_part}")
}

/// Format a fractional rate as a percentage: 0.175 -> "17,5%"
pub fn format_rate(rate: Decimal) -> String {
    let pct = (rate * Decimal::from(100)).normalize();
    format!("{}%", pct.to_string().replace('.', ","))
}
