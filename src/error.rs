use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Custom(String),

    #[error("Source directory not found: {0}")]
    SourceNotFound(String),

    #[error("Destination directory not found: {0}")]
    DestinationNotFound(String),

    #[error("{0} does not contain any subdirectories")]
    NoSubdirectories(String),

    #[error("Invalid source path: {0}")]
    InvalidSource(String),

    #[error("Path is not valid UTF-8 and cannot be stored in a zip archive: {0}")]
    NonUtf8Path(String),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Traversal error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl Error {
    pub fn custom<T: Into<String>>(msg: T) -> Self {
        Error::Custom(msg.into())
    }
}
