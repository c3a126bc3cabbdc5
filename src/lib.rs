//! Normalize heterogeneous bank statements into a canonical transaction
//! ledger, reconstruct balances for a filing period, and reconcile the
//! ledger against invoices.
//!
//! ```rust,ignore
//! use statement_recon_rs::IngestionBuilder;
//!
//! let output = IngestionBuilder::new()
//!     .csv("january.csv", csv_content)
//!     .period(period_start, period_end)
//!     .ingest()?;
//! let assignment = statement_recon_rs::match_all(&output.ledger.transactions, &invoices);
//! ```

mod builder;
mod types;

pub mod dedupe;
pub mod errors;
pub mod matcher;
pub mod parsers;
pub mod period;

pub use builder::{
    DEFAULT_CURRENCY, IngestionBuilder, IngestionOutput, SourceFailure, SourceInput,
};
pub use dedupe::dedupe;
pub use matcher::{
    MatchEntry, MatchStatus, REASON_AMOUNT_MISMATCH, REASON_DIRECTION_MISMATCH, REASON_MATCHED,
    REASON_NO_DIRECTION, REASON_NO_INVOICE, ReconciliationAssignment, match_all, reassign,
};
pub use parsers::prelude::*;
pub use period::{PeriodLedger, filter_and_summarize};
pub use types::{
    BankStatementSummary, DateParseResult, Direction, Invoice, InvoiceType, StatementDate,
    Transaction,
};
