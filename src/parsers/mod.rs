pub mod csv;
pub mod extracted;
pub mod grid;
pub mod traits;

pub mod prelude {
    pub use super::csv::CsvParser;
    pub use super::extracted::{ExtractedParser, ExtractedRow, ExtractedStatement};
    pub use super::grid::prelude::*;
    pub use super::traits::{NormalizedStatement, StatementParser};
}
