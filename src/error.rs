use std::string::FromUtf8Error;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("not a git repository (or any parent up to mount point): {0}")]
    NotARepository(String),

    #[error("{0} is not a directory")]
    NotADirectory(String),

    #[error("{0} is not empty")]
    NotEmpty(String),

    #[error("configuration file missing: {0}")]
    MissingConfig(String),

    #[error("unsupported repositoryformatversion: {0}")]
    UnsupportedFormat(String),

    #[error("unknown object kind: {0}")]
    UnknownKind(String),

    #[error("malformed object header: {0}")]
    MalformedHeader(String),

    #[error("object {sha}: declared length {declared} does not match payload length {actual}")]
    LengthMismatch {
        sha: String,
        declared: usize,
        actual: usize,
    },

    #[error("malformed tree: {0}")]
    MalformedTree(String),

    #[error("zlib decompression failed: {0}")]
    DecompressError(String),

    #[error("io error: {0}")]
    IOError(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IOError(err.to_string())
    }
}

impl From<FromUtf8Error> for Error {
    fn from(err: FromUtf8Error) -> Self {
        Error::MalformedHeader(err.to_string())
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Error::MalformedHeader(err.to_string())
    }
}

impl From<std::num::ParseIntError> for Error {
    fn from(err: std::num::ParseIntError) -> Self {
        Error::MalformedHeader(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
