use thiserror::Error;

/// Boxed error produced by a caller-supplied step.
pub type StepError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum CsvEachError {
    #[error("missing option: {0}")]
    MissingRequiredOption(&'static str),

    #[error("invalid option {name}: {reason}")]
    InvalidOption { name: &'static str, reason: String },

    #[error("line {line}: empty line")]
    EmptyLine { line: usize },

    #[error("line {line}: empty header column")]
    EmptyHeaderColumn { line: usize },

    #[error("line {line}: missing columns: expected {expected} but found only {found}")]
    MissingColumns {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: extra columns: expected {expected} but found {found}")]
    ExtraColumns {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// Failure returned by the caller's step, displayed verbatim.
    #[error("{0}")]
    StepFailed(StepError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, CsvEachError>;

impl CsvEachError {
    /// Line number carried by line-scoped errors.
    pub fn line_number(&self) -> Option<usize> {
        match self {
            CsvEachError::EmptyLine { line }
            | CsvEachError::EmptyHeaderColumn { line }
            | CsvEachError::MissingColumns { line, .. }
            | CsvEachError::ExtraColumns { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Hands back the step's own error, if this is a step failure.
    pub fn into_step_error(self) -> std::result::Result<StepError, Self> {
        match self {
            CsvEachError::StepFailed(e) => Ok(e),
            other => Err(other),
        }
    }
}
