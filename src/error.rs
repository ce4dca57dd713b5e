use thiserror::Error;

/// Errors surfaced at the boundary of the fabric: CSV parsing, price-string parsing, and file
/// I/O. No service or listener callback that operates on an already-validated in-memory value
/// returns a `Result` — dispatch between services is total, per the single-threaded model.
#[derive(Error, Debug)]
pub enum FabricError {
    #[error("malformed CSV record: {0}")]
    MalformedRecord(String),

    #[error("malformed bond price string {0:?}")]
    MalformedPrice(String),

    #[error("unknown bond id type {0:?}, expected CUSIP or ISIN")]
    UnknownBondIdType(String),

    #[error("unknown side {0:?}")]
    UnknownSide(String),

    #[error("unknown inquiry state {0:?}")]
    UnknownInquiryState(String),

    #[error("could not open file {path:?}: {source}")]
    FileNotOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("unknown bucketed sector {0:?}")]
    UnknownBucket(String),
}

pub type FabricResult<T> = Result<T, FabricError>;
