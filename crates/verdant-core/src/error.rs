use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerdantError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown quality flag `{0}`")]
    UnknownFlag(String),

    #[error("Unknown label `{label}` for flag `{flag}`")]
    UnknownLabel { flag: String, label: String },

    #[error("Flag `{0}` is not boolean")]
    BooleanFlagExpected(String),

    #[error("Unsupported index `{0}`")]
    UnsupportedIndex(String),

    #[error("Index `{index}` requires band `{band}` not present in the stack")]
    MissingBand { index: String, band: String },

    #[error("Product `{0}` carries no quality flags")]
    MissingQuality(String),

    #[error("Invalid season start month: {0}")]
    InvalidMonth(u32),

    #[error("Unknown season window `{0}`")]
    UnknownSeason(String),

    #[error("Unknown statistic `{0}`")]
    UnknownStatistic(String),

    #[error("Composite index {index} out of range (total: {total})")]
    CompositeIndexOutOfRange { index: usize, total: usize },

    #[error("Year {year} not covered by composites ({first}..={last})")]
    YearNotCovered { year: i32, first: i32, last: i32 },

    #[error("Empty composite selection")]
    EmptySelection,

    #[error("Spatial grids do not match: {left} vs {right}")]
    GridMismatch { left: String, right: String },

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Time axis mismatch: {0}")]
    TimeAxisMismatch(String),

    #[error("Timestamps must be strictly ascending (violated at index {0})")]
    UnorderedTimestamps(usize),

    #[error("Empty raster series")]
    EmptySeries,

    #[error("Raster {width}x{height} px too large for a classic TIFF strip")]
    RasterTooLarge { width: usize, height: usize },

    #[error("Upstream source error: {0}")]
    Upstream(String),
}

pub type Result<T> = std::result::Result<T, VerdantError>;
