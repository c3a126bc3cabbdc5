use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{EngineError, EngineResult};
use crate::types::{BankStatementSummary, Transaction};

/// Period-filtered ledger with a summary that satisfies
/// `closing == opening + deposits - withdrawals` by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodLedger {
    pub transactions: Vec<Transaction>,
    pub summary: BankStatementSummary,
    /// Rows whose dates failed to parse and were included fail-open.
    pub unparsed_dates: usize,
}

/// Restrict a merged, deduplicated stream to `[period_start, period_end]`
/// (inclusive calendar dates) and reconstruct the balances.
///
/// The running balance starts at the sum of the per-source opening
/// balances. Transactions dated before the window adjust it without
/// appearing in the output; transactions after the window are ignored
/// entirely. Rows whose date cannot be parsed are included in the period
/// rather than dropped: for a tax filing, under-reporting is the worse
/// failure.
pub fn filter_and_summarize(
    transactions: Vec<Transaction>,
    source_summaries: &[BankStatementSummary],
    period_start: NaiveDate,
    period_end: NaiveDate,
    currency: &str,
) -> EngineResult<PeriodLedger> {
    if period_start > period_end {
        return Err(EngineError::InvalidPeriod {
            start: period_start,
            end: period_end,
        });
    }

    let mut entries: Vec<(Option<NaiveDate>, Transaction)> = transactions
        .into_iter()
        .map(|transaction| (transaction.date.parse().ok(), transaction))
        .collect();
    entries.sort_by(|(date_a, txn_a), (date_b, txn_b)| {
        date_a
            .cmp(date_b)
            .then_with(|| txn_a.source_file.cmp(&txn_b.source_file))
            .then_with(|| txn_a.original_index.cmp(&txn_b.original_index))
    });

    let mut running_balance: Decimal = source_summaries
        .iter()
        .map(|summary| summary.opening_balance)
        .sum();
    let mut period_deposits = Decimal::ZERO;
    let mut period_withdrawals = Decimal::ZERO;
    let mut unparsed_dates = 0usize;
    let mut kept: Vec<Transaction> = Vec::new();

    for (date, transaction) in entries {
        match date {
            Some(date) if date < period_start => {
                running_balance += transaction.credit - transaction.debit;
            }
            Some(date) if date > period_end => {}
            _ => {
                if date.is_none() {
                    unparsed_dates += 1;
                    warn!(
                        source_file = transaction.source_file.as_str(),
                        date = transaction.date.as_str(),
                        "unparseable date included in period (fail open)"
                    );
                }
                period_deposits += transaction.credit;
                period_withdrawals += transaction.debit;
                running_balance += transaction.credit - transaction.debit;
                kept.push(transaction);
            }
        }
    }

    let closing_balance = running_balance;
    let opening_balance = closing_balance - period_deposits + period_withdrawals;

    let holder = source_summaries
        .iter()
        .find(|summary| !summary.account_holder.is_empty());

    let summary = BankStatementSummary {
        opening_balance,
        closing_balance,
        total_deposits: period_deposits,
        total_withdrawals: period_withdrawals,
        account_holder: holder.map(|s| s.account_holder.clone()).unwrap_or_default(),
        account_number: holder.map(|s| s.account_number.clone()).unwrap_or_default(),
        statement_period: format!("{period_start} to {period_end}"),
        currency: currency.to_string(),
    };

    Ok(PeriodLedger {
        transactions: kept,
        summary,
        unparsed_dates,
    })
}
