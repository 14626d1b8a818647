use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("Failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("A job is already running for input {input:?}")]
    AlreadyRunning { input: PathBuf },

    #[error("Invalid input artifact {path:?}: {reason}")]
    InvalidInput { path: PathBuf, reason: &'static str },

    #[error("The log stream of this job has already been taken")]
    StreamTaken,
}
