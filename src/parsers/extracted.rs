use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::grid::derive_summary;
use super::traits::{NormalizedStatement, StatementParser};
use crate::errors::EngineResult;
use crate::types::{BankStatementSummary, StatementDate, Transaction};

/// Shape returned by the external OCR/AI extraction collaborator for
/// non-tabular sources (PDF, images). The engine defines this contract
/// but never performs the extraction call itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedStatement {
    pub transactions: Vec<ExtractedRow>,
    #[serde(default)]
    pub summary: Option<BankStatementSummary>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// One row as emitted by the collaborator. Dates stay raw: OCR output is
/// exactly where unparseable dates come from, and they must survive into
/// the ledger (fail open) instead of being dropped here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedRow {
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub debit: Decimal,
    #[serde(default)]
    pub credit: Decimal,
    #[serde(default)]
    pub balance: Decimal,
    #[serde(default)]
    pub confidence: Option<f64>,
}

pub struct ExtractedParser;

impl StatementParser for ExtractedParser {
    type Input = ExtractedStatement;

    fn normalize(
        source_file: &str,
        input: Self::Input,
        fallback_currency: &str,
    ) -> EngineResult<NormalizedStatement> {
        let currency = input
            .currency
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| fallback_currency.to_string());

        let transactions: Vec<Transaction> = input
            .transactions
            .into_iter()
            .map(|row| Transaction {
                date: StatementDate::from(row.date),
                description: row.description.trim().to_string(),
                debit: row.debit.abs(),
                credit: row.credit.abs(),
                balance: row.balance,
                currency: currency.clone(),
                source_file: source_file.to_string(),
                // Sem índice de origem: linhas duplicadas pela extração
                // colapsam na deduplicação
                original_index: None,
                confidence: row.confidence.map(|c| c.clamp(0.0, 100.0)),
            })
            .collect();

        let summary = match input.summary {
            Some(mut summary) => {
                if summary.currency.trim().is_empty() {
                    summary.currency = currency.clone();
                }
                summary
            }
            None => {
                let has_balance = transactions.iter().any(|t| !t.balance.is_zero());
                derive_summary(&transactions, has_balance, &currency)
            }
        };

        Ok(NormalizedStatement {
            transactions,
            summary,
            currency,
        })
    }
}
