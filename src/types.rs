use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Representa a data de uma linha de extrato, mantida como veio da fonte.
///
/// Normalmente as datas vêm em formatos como:
/// - YYYY-MM-DD
/// - DD/MM/YYYY (também com `-` ou `.` como separador)
/// - número serial de planilha (época 1899-12-30)
/// - YYYYMMDD compacto
///
/// Este wrapper centraliza a lógica de parsing e permite que consumidores
/// decidam o que fazer com datas não reconhecidas (fail open).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementDate(String);

/// Outcome of the permissive date parse. `Unparsed` keeps the original
/// text so callers can include the row anyway and still report it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateParseResult {
    Parsed(NaiveDate),
    Unparsed(String),
}

impl DateParseResult {
    pub fn ok(&self) -> Option<NaiveDate> {
        match self {
            Self::Parsed(date) => Some(*date),
            Self::Unparsed(_) => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed(_))
    }
}

/// Formats tried after the structured attempts fail.
const FALLBACK_FORMATS: &[&str] = &[
    "%Y/%m/%d",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

/// Plausible spreadsheet-serial window (1927..2119). Anything outside is
/// more likely an amount or a bare year than a date.
const SERIAL_MIN: f64 = 10_000.0;
const SERIAL_MAX: f64 = 80_000.0;

impl StatementDate {
    /// Tenta converter a string para `NaiveDate` aceitando os formatos mais
    /// comuns de extratos. Nunca falha com erro: devolve `Unparsed` com o
    /// texto original.
    pub fn parse(&self) -> DateParseResult {
        let s = self.0.trim();
        if s.is_empty() {
            return DateParseResult::Unparsed(self.0.clone());
        }

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return DateParseResult::Parsed(date);
        }

        if let Some(date) = parse_separated(s) {
            return DateParseResult::Parsed(date);
        }

        if let Some(date) = parse_compact(s) {
            return DateParseResult::Parsed(date);
        }

        if let Ok(serial) = s.parse::<f64>() {
            if let Some(date) = Self::from_serial(serial) {
                return DateParseResult::Parsed(date);
            }
        }

        for format in FALLBACK_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(s, format) {
                return DateParseResult::Parsed(date);
            }
        }

        DateParseResult::Unparsed(self.0.clone())
    }

    /// Spreadsheet serial day, epoch 1899-12-30 (day 1 = 1900-01-01 with
    /// the historical leap-year quirk folded in). Fractional part is the
    /// time of day and is discarded.
    pub(crate) fn from_serial(serial: f64) -> Option<NaiveDate> {
        if !(SERIAL_MIN..=SERIAL_MAX).contains(&serial) {
            return None;
        }
        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
        epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Day-first parse of `a/b/yyyy` with `/`, `-` or `.` separators.
/// Default reading is DD/MM; the slots swap only when the month slot
/// cannot be a month while the day slot can (e.g. `12/26/2025`).
fn parse_separated(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split(['/', '-', '.']).map(str::trim).collect();
    if parts.len() != 3 {
        return None;
    }

    if parts[0].len() == 4 {
        let year: i32 = parts[0].parse().ok()?;
        let month: u32 = parts[1].parse().ok()?;
        let day: u32 = parts[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if parts[2].len() != 4 {
        return None;
    }
    let a: u32 = parts[0].parse().ok()?;
    let b: u32 = parts[1].parse().ok()?;
    let year: i32 = parts[2].parse().ok()?;

    let (day, month) = if b > 12 && a <= 12 { (b, a) } else { (a, b) };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Compact `YYYYMMDD` (exactly eight digits).
fn parse_compact(s: &str) -> Option<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = s[0..4].parse().ok()?;
    let month = s[4..6].parse().ok()?;
    let day = s[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

impl From<String> for StatementDate {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for StatementDate {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<NaiveDate> for StatementDate {
    fn from(value: NaiveDate) -> Self {
        Self(value.format("%Y-%m-%d").to_string())
    }
}

/// Whether a record moves money into or out of the account. Always
/// derived from the debit/credit amounts, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Credit,
    Debit,
    None,
}

/// One canonical ledger line, produced fresh on every ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub date: StatementDate,
    pub description: String,
    pub debit: Decimal,
    pub credit: Decimal,
    pub balance: Decimal,
    pub currency: String,
    pub source_file: String,
    /// Row position within the source. `None` for OCR-extracted rows,
    /// which is what lets extraction duplicates collapse in dedupe.
    pub original_index: Option<u32>,
    pub confidence: Option<f64>,
}

impl Transaction {
    pub fn direction(&self) -> Direction {
        if self.credit >= self.debit && self.credit > Decimal::ZERO {
            Direction::Credit
        } else if self.debit > self.credit && self.debit > Decimal::ZERO {
            Direction::Debit
        } else {
            Direction::None
        }
    }

    /// Amount moved in the derived direction (zero when there is none).
    pub fn amount(&self) -> Decimal {
        match self.direction() {
            Direction::Credit => self.credit,
            Direction::Debit => self.debit,
            Direction::None => Decimal::ZERO,
        }
    }
}

/// Per-file or per-period aggregate of a statement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BankStatementSummary {
    pub opening_balance: Decimal,
    pub closing_balance: Decimal,
    pub total_deposits: Decimal,
    pub total_withdrawals: Decimal,
    pub account_holder: String,
    pub account_number: String,
    pub statement_period: String,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceType {
    Sales,
    Purchase,
}

impl InvoiceType {
    /// A sales invoice should appear as money in; a purchase as money out.
    pub fn direction(self) -> Direction {
        match self {
            InvoiceType::Sales => Direction::Credit,
            InvoiceType::Purchase => Direction::Debit,
        }
    }
}

/// An invoice as supplied by the caller, with optional AED-normalized
/// amounts for cross-currency comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub invoice_id: String,
    pub invoice_type: InvoiceType,
    pub vendor_name: String,
    pub customer_name: String,
    pub invoice_date: StatementDate,
    pub currency: String,
    pub total_before_tax: Decimal,
    pub total_tax: Decimal,
    pub zero_rated: Decimal,
    pub total_amount: Decimal,
    pub total_before_tax_aed: Option<Decimal>,
    pub total_tax_aed: Option<Decimal>,
    pub zero_rated_aed: Option<Decimal>,
    pub total_amount_aed: Option<Decimal>,
    pub confidence: Option<f64>,
}

impl Invoice {
    /// AED-normalized total when supplied, else the raw total.
    pub fn matchable_total(&self) -> Decimal {
        self.total_amount_aed.unwrap_or(self.total_amount)
    }

    /// The counterparty whose name may show up in a bank narration.
    pub fn party_name(&self) -> &str {
        match self.invoice_type {
            InvoiceType::Sales => &self.customer_name,
            InvoiceType::Purchase => &self.vendor_name,
        }
    }
}
