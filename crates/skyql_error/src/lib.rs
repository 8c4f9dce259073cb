//! Errors shared across the skyql crates.

#[derive(Debug, thiserror::Error)]
pub enum SkyqlError {
    /// Input could not be parsed to completion.
    ///
    /// `offset` is a byte offset into the original input, `remainder` is the
    /// input starting at that offset.
    #[error("Syntax error at offset {offset}: {message} (near '{remainder}')")]
    Syntax {
        offset: usize,
        remainder: String,
        message: String,
    },

    #[error("Unsupported construct: {0}")]
    UnsupportedConstruct(String),

    /// A table targeted for rewriting doesn't appear in the statement.
    #[error("Table '{table}' not found in statement, refusing to emit an unrewritten query")]
    SubstitutionNotFound { table: String },

    #[error("Invalid partitioning scheme: {0}")]
    InvalidScheme(String),

    /// A (chunk, subchunk) row couldn't be read. `line` is 1-based.
    #[error("Invalid row on line {line}: {message}")]
    InvalidRow { line: usize, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SkyqlError {
    /// Create a syntax error pointing at `offset` within `input`.
    ///
    /// Offsets past the end of the input are clamped.
    pub fn syntax(input: &str, offset: usize, message: impl Into<String>) -> Self {
        let offset = offset.min(input.len());
        let remainder = input.get(offset..).unwrap_or_default().to_string();
        SkyqlError::Syntax {
            offset,
            remainder,
            message: message.into(),
        }
    }

    /// Byte offset of a syntax error, if this is one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            SkyqlError::Syntax { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

pub type Result<T, E = SkyqlError> = std::result::Result<T, E>;

/// Create an `UnsupportedConstruct` error using format args.
#[macro_export]
macro_rules! unsupported {
    ($($arg:tt)*) => {
        $crate::SkyqlError::UnsupportedConstruct(std::format!($($arg)*))
    };
}
