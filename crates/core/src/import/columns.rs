//! Column detection and row mapping.
//!
//! Exports from different accounting tools name and order their columns
//! differently. The first row among the leading rows that looks like a header
//! decides the layout. Without one, columns are read positionally as
//! `code, name, debit, credit`.

use rust_decimal::Decimal;

use super::amount::parse_amount;
use crate::trial_balance::TrialBalanceEntry;

/// How many leading rows are searched for a header.
const HEADER_SCAN_ROWS: usize = 20;

/// Column positions for the fields of a trial balance entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    /// Account code column.
    pub code: Option<usize>,
    /// Account name column.
    pub name: Option<usize>,
    /// Account type column.
    pub account_type: Option<usize>,
    /// Debit column.
    pub debit: Option<usize>,
    /// Credit column.
    pub credit: Option<usize>,
    /// Signed balance column, used only when there is no debit or credit column.
    pub balance: Option<usize>,
}

impl ColumnMap {
    /// Layout used when no header row is found.
    #[must_use]
    pub fn positional() -> Self {
        Self {
            code: Some(0),
            name: Some(1),
            account_type: None,
            debit: Some(2),
            credit: Some(3),
            balance: None,
        }
    }

    /// Builds a column map from a candidate header row.
    ///
    /// Returns `None` unless the row names an account column and an amount
    /// column.
    #[must_use]
    pub fn from_header(row: &[String]) -> Option<Self> {
        let mut map = Self::default();
        let mut plain_account = None;

        for (idx, cell) in row.iter().enumerate() {
            let tokens = tokenize(cell);
            let has = |words: &[&str]| tokens.iter().any(|t| words.contains(&t.as_str()));

            if has(&["debit", "debits", "dr"]) {
                map.debit.get_or_insert(idx);
            } else if has(&["credit", "credits", "cr"]) {
                map.credit.get_or_insert(idx);
            } else if has(&["balance", "net", "amount"]) {
                map.balance.get_or_insert(idx);
            } else if has(&["type", "category", "class"]) {
                map.account_type.get_or_insert(idx);
            } else if has(&["code", "number", "no", "num", "id"]) || cell.contains('#') {
                map.code.get_or_insert(idx);
            } else if has(&["name", "description", "title"]) {
                map.name.get_or_insert(idx);
            } else if has(&["account", "acct"]) {
                plain_account.get_or_insert(idx);
            }
        }

        // A bare "Account" column holds the name unless a name column exists,
        // in which case it holds the code.
        match (map.name, map.code, plain_account) {
            (None, _, Some(idx)) => map.name = Some(idx),
            (Some(_), None, Some(idx)) => map.code = Some(idx),
            _ => {}
        }

        if map.debit.is_some() || map.credit.is_some() {
            map.balance = None;
        }

        let has_account = map.code.is_some() || map.name.is_some();
        let has_amount = map.debit.is_some() || map.credit.is_some() || map.balance.is_some();
        (has_account && has_amount).then_some(map)
    }

    /// Maps a data row to an entry, or `None` if the row should be dropped.
    #[must_use]
    pub fn map_row(&self, row: &[String]) -> Option<TrialBalanceEntry> {
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .map_or("", |value| value.trim())
        };

        let code = cell(self.code);
        let name = cell(self.name);
        if code.is_empty() && name.is_empty() {
            return None;
        }
        if code.is_empty() && name.to_lowercase().starts_with("total") {
            return None;
        }

        let (debit, credit) = if self.debit.is_some() || self.credit.is_some() {
            let debit = parse_amount(cell(self.debit));
            let credit = parse_amount(cell(self.credit));
            if debit.is_none() && credit.is_none() {
                return None;
            }
            normalize_sides(
                debit.unwrap_or(Decimal::ZERO),
                credit.unwrap_or(Decimal::ZERO),
            )
        } else {
            let balance = parse_amount(cell(self.balance))?;
            normalize_sides(balance, Decimal::ZERO)
        };

        let account_type = cell(self.account_type);

        Some(TrialBalanceEntry {
            account_code: code.to_string(),
            account_name: if name.is_empty() { code } else { name }.to_string(),
            account_type: (!account_type.is_empty()).then(|| account_type.to_string()),
            debit,
            credit,
        })
    }
}

/// Converts raw rows to entries, dropping rows that do not parse.
#[must_use]
pub fn rows_to_entries(rows: &[Vec<String>]) -> Vec<TrialBalanceEntry> {
    let header = rows
        .iter()
        .take(HEADER_SCAN_ROWS)
        .enumerate()
        .find_map(|(idx, row)| ColumnMap::from_header(row).map(|map| (idx, map)));

    let (map, data) = match header {
        Some((idx, map)) => (map, &rows[idx + 1..]),
        None => (ColumnMap::positional(), rows),
    };

    data.iter().filter_map(|row| map.map_row(row)).collect()
}

/// Moves negative amounts to the opposite side so both stay non-negative.
fn normalize_sides(debit: Decimal, credit: Decimal) -> (Decimal, Decimal) {
    let mut debit_side = Decimal::ZERO;
    let mut credit_side = Decimal::ZERO;

    if debit.is_sign_negative() {
        credit_side += -debit;
    } else {
        debit_side += debit;
    }
    if credit.is_sign_negative() {
        debit_side += -credit;
    } else {
        credit_side += credit;
    }

    (debit_side, credit_side)
}

fn tokenize(cell: &str) -> Vec<String> {
    cell.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
