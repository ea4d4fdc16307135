use thiserror::Error;

/// Shape of an operand, carried inside a [`NervError::ShapeMismatch`] so the
/// caller can see exactly which dimensions disagreed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Vector(usize),
    Matrix(usize, usize),
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shape::Vector(n) => write!(f, "vector[{n}]"),
            Shape::Matrix(r, c) => write!(f, "matrix[{r}x{c}]"),
        }
    }
}

#[derive(Debug, Error)]
pub enum NervError {
    /// Operand dimensions are incompatible for the named operation.
    #[error("{op}: incompatible shapes {lhs} and {rhs}")]
    ShapeMismatch {
        op: &'static str,
        lhs: Shape,
        rhs: Shape,
    },

    /// A model file could not be read or written.
    #[error("model file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A model file header declares shapes its payload cannot satisfy.
    #[error("model file is truncated or malformed")]
    Truncated,

    /// A scanned token could not be parsed as a number.
    #[error("invalid numeric input: {0:?}")]
    InvalidInput(String),

    /// JSON encode/decode of a model failed.
    #[error("model JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NervError>;
