use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dedupe::dedupe;
use crate::errors::{EngineError, EngineResult};
use crate::parsers::prelude::*;
use crate::period::{PeriodLedger, filter_and_summarize};
use crate::types::BankStatementSummary;

/// Fallback currency applied when neither the builder nor the source
/// states one.
pub const DEFAULT_CURRENCY: &str = "AED";

/// Raw content of one source file, in whichever shape the caller has it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SourceInput {
    /// Spreadsheet sheets already decoded into cell grids.
    Sheets(Vec<Grid>),
    /// CSV file content.
    Csv(Vec<u8>),
    /// Output of the external OCR/AI extraction collaborator.
    Extracted(ExtractedStatement),
}

#[derive(Debug, Clone)]
struct Source {
    name: String,
    input: SourceInput,
}

/// A source that could not be normalized. Siblings keep going; the
/// failure is reported instead of aborting the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFailure {
    pub source_file: String,
    pub error: String,
}

/// Everything one ingestion run produces: the period ledger plus the
/// per-source statements and failures for review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionOutput {
    pub ledger: PeriodLedger,
    pub statements: Vec<NormalizedStatement>,
    pub failures: Vec<SourceFailure>,
}

/// Front door of the engine: accumulate sources, set the filing period,
/// run the pipeline (normalize each source independently, dedupe per
/// source, merge, filter and reconstruct balances).
#[derive(Default)]
pub struct IngestionBuilder {
    sources: Vec<Source>,
    currency: Option<String>,
    period: Option<(NaiveDate, NaiveDate)>,
}

impl IngestionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a spreadsheet source with one or more sheets.
    pub fn sheets(mut self, name: &str, sheets: Vec<Grid>) -> Self {
        self.sources.push(Source {
            name: name.to_string(),
            input: SourceInput::Sheets(sheets),
        });
        self
    }

    /// Add a single-sheet spreadsheet source.
    pub fn grid(self, name: &str, grid: Grid) -> Self {
        self.sheets(name, vec![grid])
    }

    /// Add a CSV source.
    pub fn csv(mut self, name: &str, content: impl Into<Vec<u8>>) -> Self {
        self.sources.push(Source {
            name: name.to_string(),
            input: SourceInput::Csv(content.into()),
        });
        self
    }

    /// Add a pre-extracted (OCR/AI) source.
    pub fn extracted(mut self, name: &str, statement: ExtractedStatement) -> Self {
        self.sources.push(Source {
            name: name.to_string(),
            input: SourceInput::Extracted(statement),
        });
        self
    }

    pub fn currency(mut self, currency: &str) -> Self {
        self.currency = Some(currency.to_string());
        self
    }

    /// Inclusive filing period.
    pub fn period(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.period = Some((start, end));
        self
    }

    pub fn ingest(self) -> EngineResult<IngestionOutput> {
        let (period_start, period_end) = self.period.ok_or(EngineError::MissingPeriod)?;
        let currency = self
            .currency
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        let mut statements: Vec<NormalizedStatement> = Vec::new();
        let mut failures: Vec<SourceFailure> = Vec::new();

        // Cada fonte é normalizada de forma independente; uma falha não
        // derruba as irmãs
        for source in self.sources {
            let normalized = match source.input {
                SourceInput::Sheets(sheets) => {
                    GridParser::normalize(&source.name, sheets, &currency)
                }
                SourceInput::Csv(content) => CsvParser::normalize(&source.name, content, &currency),
                SourceInput::Extracted(statement) => {
                    ExtractedParser::normalize(&source.name, statement, &currency)
                }
            };

            match normalized {
                Ok(mut statement) => {
                    statement.transactions = dedupe(statement.transactions);
                    statements.push(statement);
                }
                Err(error) => {
                    warn!(source_file = source.name.as_str(), %error, "source failed; continuing with siblings");
                    failures.push(SourceFailure {
                        source_file: source.name,
                        error: error.to_string(),
                    });
                }
            }
        }

        // Barreira de junção: só depois de todas as fontes normalizadas
        let merged: Vec<_> = statements
            .iter()
            .flat_map(|statement| statement.transactions.iter().cloned())
            .collect();
        let summaries: Vec<BankStatementSummary> = statements
            .iter()
            .map(|statement| statement.summary.clone())
            .collect();

        let ledger =
            filter_and_summarize(merged, &summaries, period_start, period_end, &currency)?;

        Ok(IngestionOutput {
            ledger,
            statements,
            failures,
        })
    }
}
