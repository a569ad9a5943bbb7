use thiserror::Error;

/// File-level import failures. Row-level problems are collected instead.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("empty file")]
    Empty,

    #[error("missing columns: the header must name code, name, quantity and price columns")]
    MissingColumns,

    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("csv rendering failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("csv buffer could not be flushed: {0}")]
    Flush(String),

    #[error("csv output is not valid utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("pdf rendering failed: {0}")]
    Pdf(String),

    #[error("xlsx rendering failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}
