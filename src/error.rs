use thiserror::Error;

/// Rejected at construction time, before any access is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("number of frames must be positive")]
    ZeroFrames,
    #[error("number of pages must be positive")]
    ZeroPages,
}

/// A reference token that could not be turned into a valid page access.
///
/// The access is skipped and the run continues; `index` identifies the
/// offending position in the input sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("reference #{index} ({token:?}): {kind}")]
pub struct ReferenceError {
    pub index: usize,
    pub token: String,
    pub kind: ReferenceErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReferenceErrorKind {
    #[error("not a page number")]
    Unparseable,
    #[error("page {page} outside the virtual address space of {num_pages} pages")]
    OutOfRange { page: i64, num_pages: usize },
}

/// Failure while collecting configuration from the console.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read input: {0}")]
    Read(#[from] std::io::Error),
    #[error("invalid {what}: {value:?}")]
    BadNumber { what: &'static str, value: String },
}
