use serde::{Deserialize, Serialize};

use crate::errors::EngineResult;
use crate::types::{BankStatementSummary, Transaction};

/// Per-source normalizer output: canonical transactions plus the
/// statement-level aggregate derived from the same sheet(s).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedStatement {
    pub transactions: Vec<Transaction>,
    pub summary: BankStatementSummary,
    pub currency: String,
}

pub trait StatementParser {
    type Input;

    fn normalize(
        source_file: &str,
        input: Self::Input,
        fallback_currency: &str,
    ) -> EngineResult<NormalizedStatement>;
}
