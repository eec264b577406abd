use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The input does not carry the `.duf` extension.
    #[error("file format is not .duf: {}", .0.display())]
    Format(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("bad compressed stream: {0}")]
    Decompression(io::Error),

    #[error("decompressed data is not UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("bad DSON document: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document parsed but contradicts the scene structure we rely on.
    #[error("bad scene data: {0}")]
    Data(String),
}

pub type Result<T> = std::result::Result<T, Error>;
