use crate::domain::{Category, FamilyKind};

/// Errors raised while preparing samples, fitting models, or persisting the
/// regression document.
#[derive(Debug, thiserror::Error)]
pub enum RegressionError {
    /// A source table lacks a column the category plans depend on.
    #[error("table `{table}` is missing required column `{column}`")]
    InputSchema { table: String, column: String },

    #[error("insufficient data: need at least {needed} complete rows, got {actual}")]
    InsufficientData { needed: usize, actual: usize },

    /// Logarithmic fitting needs strictly positive x.
    #[error("log fit undefined: x contains non-positive value {value}")]
    Domain { value: f64 },

    #[error("x and y have different lengths ({x_len} vs {y_len})")]
    LengthMismatch { x_len: usize, y_len: usize },

    #[error("sample contains a non-finite value")]
    NonFinite,

    #[error("least-squares solve failed for the {family} model")]
    Solve { family: FamilyKind },

    #[error("invalid regression document: {0}")]
    InvalidDocument(String),

    #[error("{category}: {source}")]
    Category {
        category: Category,
        #[source]
        source: Box<RegressionError>,
    },

    #[error("failed to read `{path}`: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error on `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RegressionError {
    /// Attach the category a failure belongs to.
    pub fn in_category(self, category: Category) -> Self {
        match self {
            already @ RegressionError::Category { .. } => already,
            other => RegressionError::Category {
                category,
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, skipping category wrappers.
    pub fn root(&self) -> &RegressionError {
        match self {
            RegressionError::Category { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, RegressionError>;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<RegressionError> for AppError {
    fn from(err: RegressionError) -> Self {
        let exit_code = match err.root() {
            RegressionError::InsufficientData { .. } => 3,
            RegressionError::Domain { .. }
            | RegressionError::Solve { .. }
            | RegressionError::LengthMismatch { .. } => 4,
            _ => 2,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
