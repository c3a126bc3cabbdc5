use std::str::FromStr;

use chrono::NaiveDate;
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{DateParseResult, StatementDate};

/// One raw spreadsheet cell. Sources are duck-typed (the same column may
/// deliver text, numbers or real dates row by row), so the variants are
/// matched exhaustively instead of probed at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

/// A sheet as handed over by the caller: rows of cells, possibly ragged.
pub type Grid = Vec<Vec<CellValue>>;

impl CellValue {
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.trim().is_empty(),
            CellValue::Number(_) | CellValue::Date(_) => false,
        }
    }

    /// Textual rendering used for descriptions and header matching.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(text) => text.trim().to_string(),
            CellValue::Number(number) => format!("{number}"),
            CellValue::Date(date) => date.format("%Y-%m-%d").to_string(),
        }
    }

    /// Money reading of the cell, if it has one.
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self {
            CellValue::Empty | CellValue::Date(_) => None,
            CellValue::Number(number) => Decimal::from_f64(*number),
            CellValue::Text(text) => parse_amount(text),
        }
    }

    /// Date reading of the cell. Numbers are treated as spreadsheet
    /// serials; text goes through the permissive statement-date parser.
    pub fn to_date(&self) -> DateParseResult {
        match self {
            CellValue::Empty => DateParseResult::Unparsed(String::new()),
            CellValue::Date(date) => DateParseResult::Parsed(*date),
            CellValue::Number(number) => match StatementDate::from_serial(*number) {
                Some(date) => DateParseResult::Parsed(date),
                None => DateParseResult::Unparsed(format!("{number}")),
            },
            CellValue::Text(text) => StatementDate::from(text.as_str()).parse(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        if value.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value.to_string())
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

/// Parse a money string tolerating thousands separators, currency
/// symbols and parenthesis-negative notation: `(1,234.56)` -> -1234.56.
pub(crate) fn parse_amount(raw: &str) -> Option<Decimal> {
    let mut s = raw.trim();
    if s.is_empty() {
        return None;
    }

    let parenthesized = s.starts_with('(') && s.ends_with(')');
    if parenthesized {
        s = s[1..s.len() - 1].trim();
    }

    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() || cleaned == "-" || cleaned == "." {
        return None;
    }

    let value = Decimal::from_str(&cleaned).ok()?;
    Some(if parenthesized { -value } else { value })
}
