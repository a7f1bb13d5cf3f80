//! Fixed-locale formatting for printed documents.
//!
//! Documents always print Guatemalan quetzales in the `es-GT` style:
//! `Q1,234.50`, thousands separated by commas, two decimals.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use ironmonger_core::round_money;

pub const CURRENCY_SYMBOL: &str = "Q";

pub fn format_currency(amount: Decimal) -> String {
    let rounded = round_money(amount);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let digits = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    format!("{sign}{CURRENCY_SYMBOL}{}.{frac_part}", group_thousands(int_part))
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `dd/mm/yyyy HH:MM`, in UTC.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%d/%m/%Y %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn formats_with_symbol_grouping_and_two_decimals() {
        assert_eq!(format_currency(dec!(0)), "Q0.00");
        assert_eq!(format_currency(dec!(5.5)), "Q5.50");
        assert_eq!(format_currency(dec!(999.999)), "Q1,000.00");
        assert_eq!(format_currency(dec!(1234567.891)), "Q1,234,567.89");
        assert_eq!(format_currency(dec!(-12.3)), "-Q12.30");
    }

    #[test]
    fn timestamp_is_day_first() {
        let at = Utc.with_ymd_and_hms(2026, 3, 7, 9, 5, 0).unwrap();
        assert_eq!(format_timestamp(at), "07/03/2026 09:05");
    }
}
