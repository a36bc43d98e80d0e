//! Amount cell parsing.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Largest absolute amount accepted from a cell. Larger values are treated as
/// unparseable so that totals over a full export cannot overflow.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000000);

/// Parses a monetary cell.
///
/// Accepts currency symbols, thousands separators, `(1,234.50)` and
/// `1234.50-` for negatives, and exponent notation as written by spreadsheet
/// exports. Blank or non-numeric cells, and values beyond [`MAX_AMOUNT`],
/// return `None`.
#[must_use]
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, ',' | '"' | '$' | '€' | '£' | '¥' | '\u{a0}') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let (digits, negative) = if let Some(inner) = cleaned
        .strip_prefix('(')
        .and_then(|v| v.strip_suffix(')'))
    {
        (inner, true)
    } else if let Some(inner) = cleaned.strip_suffix('-') {
        (inner, true)
    } else {
        (cleaned.as_str(), false)
    };

    let value = if digits.contains(['e', 'E']) {
        Decimal::from_scientific(digits).ok()?
    } else {
        Decimal::from_str(digits).ok()?
    };
    if value.abs() > MAX_AMOUNT {
        return None;
    }

    Some(if negative { -value } else { value })
}
