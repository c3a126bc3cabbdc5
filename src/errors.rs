use chrono::NaiveDate;
use thiserror::Error;

/// Erros possíveis durante a ingestão e reconciliação de extratos bancários
#[derive(Error, Debug)]
pub enum EngineError {
    /// Conteúdo CSV ilegível (fatal apenas para o arquivo em questão)
    #[error("CSV read failed: {0}")]
    CsvReadFailed(String),

    /// Janela de período invertida (início depois do fim)
    #[error("Invalid period: {start} is after {end}")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },

    /// O builder foi chamado sem uma janela de período
    #[error("Period start and end are required")]
    MissingPeriod,

    // ── Erros de reconciliação manual ───────────────────────────────────────────

    /// Índice de transação fora do mapa de reconciliação
    #[error("Unknown transaction index: {0}")]
    UnknownTransaction(usize),

    /// Índice de invoice fora da lista fornecida
    #[error("Unknown invoice index: {0}")]
    UnknownInvoice(usize),

    // Exemplos de erros que você pode adicionar no futuro:
    // #[error("Unsupported sheet encoding: {0}")]
    // UnsupportedEncoding(String),
    //
    // #[error("Duplicate source file: {0}")]
    // DuplicateSource(String),
}

/// Alias conveniente para Result com nosso tipo de erro principal
pub type EngineResult<T> = Result<T, EngineError>;
