use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("command cannot be empty")]
    EmptyCommand,
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("Command \"{command}\" failed.\n{detail}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        detail: String,
    },
    #[error("no .repo directory above {}", path.display())]
    RepoNotFound { path: PathBuf },
    #[error("path {} is outside your src tree, cannot reinterpret", path.display())]
    OutsideSourceTree { path: PathBuf },
    #[error("USER is not set, cannot locate the chroot home directory")]
    MissingUser,
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Exit status of the failed command, if the error came from one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Error::CommandFailed { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
