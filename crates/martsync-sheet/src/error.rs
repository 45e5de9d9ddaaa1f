use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetError {
    /// The workbook could not be opened or the sheet could not be read.
    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("workbook has no sheets: {path}")]
    EmptyWorkbook { path: String },

    /// The header row (or a mandatory column within it) could not be
    /// resolved. Fatal: the run aborts before any writes, so a misread
    /// schema never reaches the store.
    #[error("header row not found: {reason}")]
    HeaderNotFound { reason: String },
}
