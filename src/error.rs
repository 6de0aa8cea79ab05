use std::fmt;
use std::path::PathBuf;

/// All errors produced by the library.
#[derive(Debug)]
pub enum Error {
    /// Filesystem failure, tagged with the path being read or written.
    Io { path: PathBuf, source: std::io::Error },
    /// Malformed JSON in a config, spec or `model.json`.
    Json(serde_json::Error),
    /// The network description cannot be turned into a network.
    InvalidSpec(String),
    /// Dataset rows or labels do not match the declared shape.
    InvalidDataset(String),
    /// An inference input has the wrong width.
    InvalidInput { expected: usize, actual: usize },
    /// A parameter buffer and its gradient (or a weights file and its
    /// manifest) disagree in length.
    SizeMismatch { expected: usize, actual: usize },
    /// The model artifact uses a layer, activation or dtype we cannot load.
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {}: {source}", path.display()),
            Self::Json(e) => write!(f, "json error: {e}"),
            Self::InvalidSpec(msg) => write!(f, "invalid network spec: {msg}"),
            Self::InvalidDataset(msg) => write!(f, "invalid dataset: {msg}"),
            Self::InvalidInput { expected, actual } => {
                write!(f, "invalid input size: expected {expected}, got {actual}")
            }
            Self::SizeMismatch { expected, actual } => {
                write!(f, "size mismatch: expected {expected} values, got {actual}")
            }
            Self::Unsupported(msg) => write!(f, "unsupported model artifact: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}
