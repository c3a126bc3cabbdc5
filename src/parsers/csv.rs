use csv::ReaderBuilder;

use super::grid::{CellValue, Grid, GridParser};
use super::traits::{NormalizedStatement, StatementParser};
use crate::errors::{EngineError, EngineResult};

pub struct CsvParser;

impl CsvParser {
    /// Read CSV bytes into a raw grid. No header assumption is made here:
    /// header detection runs on the grid like for any spreadsheet, so
    /// exports with preamble lines before the column row still work.
    fn grid_from_csv(content: &[u8]) -> EngineResult<Grid> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(content);

        let mut grid = Grid::new();
        for record in reader.records() {
            let record = record.map_err(|e| EngineError::CsvReadFailed(e.to_string()))?;
            grid.push(record.iter().map(CellValue::from).collect());
        }
        Ok(grid)
    }
}

impl StatementParser for CsvParser {
    type Input = Vec<u8>;

    fn normalize(
        source_file: &str,
        input: Self::Input,
        fallback_currency: &str,
    ) -> EngineResult<NormalizedStatement> {
        let grid = Self::grid_from_csv(&input)?;
        Ok(GridParser::normalize_sheet(
            source_file,
            grid,
            fallback_currency,
        ))
    }
}
