use thiserror::Error;

use crate::record::RECORD_SIZE;

pub type SortResult<T> = Result<T, SortError>;

#[derive(Debug, Error)]
pub enum SortError {
    #[error("record buffer holds {actual} bytes but {vertex_count} records need {expected}")]
    RecordLengthMismatch {
        vertex_count: usize,
        expected: usize,
        actual: usize,
    },

    #[error("output buffer holds {actual} floats but {vertex_count} splats need {expected}")]
    OutputLengthMismatch {
        vertex_count: usize,
        expected: usize,
        actual: usize,
    },

    #[error("view-projection entry {index} is not finite ({value})")]
    NonFiniteMatrix { index: usize, value: f32 },

    #[error("depth offset {0} must be finite and positive")]
    InvalidDepthOffset(f32),

    #[error("{0} records exceed the u32 index range")]
    TooManyRecords(usize),

    #[error("depth keys reach {min} (max {max}), outside the positive range of offset {offset}")]
    DepthOutOfRange { min: f32, max: f32, offset: f32 },

    #[error("depth key for record {index} is not finite")]
    NonFiniteDepth { index: u32 },

    #[error("sorter limit of {0} reached")]
    SorterLimit(usize),

    #[error("no sorter with id {0}")]
    UnknownSorter(usize),

    #[error("buffer of {actual} floats does not belong to this pool (expected {expected})")]
    ForeignBuffer { expected: usize, actual: usize },

    #[error("invalid .splat file: {0}")]
    InvalidSplatFile(String),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SortError {
    pub(crate) fn misaligned_splat_file(len: usize) -> Self {
        Self::InvalidSplatFile(format!(
            "size {len} is not a multiple of {RECORD_SIZE} bytes ({} complete records)",
            len / RECORD_SIZE
        ))
    }

    /// Errors raised by boundary validation, before any output is written.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::RecordLengthMismatch { .. }
                | Self::OutputLengthMismatch { .. }
                | Self::NonFiniteMatrix { .. }
                | Self::InvalidDepthOffset(_)
                | Self::TooManyRecords(_)
                | Self::DepthOutOfRange { .. }
                | Self::NonFiniteDepth { .. }
        )
    }
}
