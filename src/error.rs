use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::bindings::declarations::DeclarationError;
use crate::bindings::types::TypeError;
use crate::parser::ParseError;
use crate::toolchain::ToolError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid module: {0}")]
    Parse(#[from] ParseError),

    #[error("cannot generate declarations: {0}")]
    Type(#[from] TypeError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("declarations can only be generated together with a wrapper")]
    DeclarationsWithoutWrapper,

    #[error("invalid manifest {}: {source}", .path.display())]
    Manifest {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("{}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

impl From<DeclarationError> for Error {
    fn from(err: DeclarationError) -> Self {
        match err {
            DeclarationError::Type(err) => Error::Type(err),
            DeclarationError::Unresolved(err) => Error::Parse(err),
        }
    }
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
