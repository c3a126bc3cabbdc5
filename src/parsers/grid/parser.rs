use rust_decimal::Decimal;
use tracing::debug;

use super::cells::{CellValue, Grid};
use super::header::{HeaderScan, detect_header};
use crate::errors::EngineResult;
use crate::parsers::traits::{NormalizedStatement, StatementParser};
use crate::types::{BankStatementSummary, DateParseResult, StatementDate, Transaction};

pub struct GridParser;

impl GridParser {
    /// Convenience for sources with a single tab.
    pub fn normalize_sheet(
        source_file: &str,
        sheet: Grid,
        fallback_currency: &str,
    ) -> NormalizedStatement {
        Self::normalize_sheets(source_file, vec![sheet], fallback_currency)
    }

    /// Normalize every sheet of one source file. A sheet without a
    /// recognizable header contributes zero transactions; row indices
    /// keep increasing across sheets so ordering stays stable.
    pub fn normalize_sheets(
        source_file: &str,
        sheets: Vec<Grid>,
        fallback_currency: &str,
    ) -> NormalizedStatement {
        let mut transactions = Vec::new();
        let mut has_balance_column = false;
        let mut row_offset: u32 = 0;

        for sheet in &sheets {
            match detect_header(sheet) {
                Some(scan) => {
                    has_balance_column |= scan.roles.balance.is_some();
                    parse_rows(
                        sheet,
                        &scan,
                        source_file,
                        fallback_currency,
                        row_offset,
                        &mut transactions,
                    );
                }
                None => {
                    debug!(source_file, "no header row found; sheet treated as non-tabular");
                }
            }
            row_offset += sheet.len() as u32;
        }

        let summary = derive_summary(&transactions, has_balance_column, fallback_currency);
        NormalizedStatement {
            transactions,
            summary,
            currency: fallback_currency.to_string(),
        }
    }
}

impl StatementParser for GridParser {
    type Input = Vec<Grid>;

    fn normalize(
        source_file: &str,
        input: Self::Input,
        fallback_currency: &str,
    ) -> EngineResult<NormalizedStatement> {
        Ok(Self::normalize_sheets(source_file, input, fallback_currency))
    }
}

fn parse_rows(
    sheet: &[Vec<CellValue>],
    scan: &HeaderScan,
    source_file: &str,
    currency: &str,
    row_offset: u32,
    out: &mut Vec<Transaction>,
) {
    let roles = &scan.roles;
    let mut dropped = 0usize;

    for (row_index, row) in sheet.iter().enumerate().skip(scan.row + 1) {
        let cell = |index: Option<usize>| index.and_then(|i| row.get(i));

        // Linha sem data legível é tratada como não-dado (subtotais, rodapés)
        let date = match cell(roles.date).map(CellValue::to_date) {
            Some(DateParseResult::Parsed(date)) => date,
            _ => continue,
        };

        let description = cell(roles.description)
            .map(CellValue::as_text)
            .unwrap_or_default();
        let mut debit = cell(roles.debit)
            .and_then(CellValue::to_decimal)
            .unwrap_or(Decimal::ZERO)
            .abs();
        let mut credit = cell(roles.credit)
            .and_then(CellValue::to_decimal)
            .unwrap_or(Decimal::ZERO)
            .abs();

        // Sem colunas explícitas de débito/crédito (ou ambas zeradas),
        // o sinal da coluna única de valor decide a direção
        if debit.is_zero() && credit.is_zero() {
            if let Some(amount) = cell(roles.amount).and_then(CellValue::to_decimal) {
                if amount >= Decimal::ZERO {
                    credit = amount;
                } else {
                    debit = -amount;
                }
            }
        }

        let balance = cell(roles.balance)
            .and_then(CellValue::to_decimal)
            .unwrap_or(Decimal::ZERO);

        if description.is_empty() && debit.is_zero() && credit.is_zero() {
            dropped += 1;
            continue;
        }

        out.push(Transaction {
            date: StatementDate::from(date),
            description,
            debit,
            credit,
            balance,
            currency: currency.to_string(),
            source_file: source_file.to_string(),
            original_index: Some(row_offset + row_index as u32),
            confidence: None,
        });
    }

    if dropped > 0 {
        debug!(source_file, dropped, "dropped noise rows with no description and zero amounts");
    }
}

/// File-level aggregate. With a balance column the opening balance backs
/// out the first row's movement from its stated balance and the closing
/// balance is the last stated balance; otherwise both derive from the
/// movement totals alone.
pub(crate) fn derive_summary(
    transactions: &[Transaction],
    has_balance_column: bool,
    currency: &str,
) -> BankStatementSummary {
    let total_deposits: Decimal = transactions.iter().map(|t| t.credit).sum();
    let total_withdrawals: Decimal = transactions.iter().map(|t| t.debit).sum();

    let (opening_balance, closing_balance) = match (transactions.first(), transactions.last()) {
        (Some(first), Some(last)) if has_balance_column => {
            (first.balance - first.credit + first.debit, last.balance)
        }
        _ => (Decimal::ZERO, total_deposits - total_withdrawals),
    };

    let statement_period = match (transactions.first(), transactions.last()) {
        (Some(first), Some(last)) => format!("{} to {}", first.date.as_str(), last.date.as_str()),
        _ => String::new(),
    };

    BankStatementSummary {
        opening_balance,
        closing_balance,
        total_deposits,
        total_withdrawals,
        account_holder: String::new(),
        account_number: String::new(),
        statement_period,
        currency: currency.to_string(),
    }
}
