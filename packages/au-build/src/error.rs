//! Build-driver error type.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: error: {message}")]
    Translate {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown input extension for {path}")]
    UnknownExtension { path: PathBuf },

    #[error("toolchain {tool} exited with status {code}")]
    ToolchainFailure { tool: String, code: i32 },

    #[error("toolchain {tool} could not be spawned: {source}")]
    ToolchainSpawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, BuildError>;
