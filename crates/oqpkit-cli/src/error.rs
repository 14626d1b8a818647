use oqpkit::core::io::molden::MoldenError;
use oqpkit::core::io::optlog::ExtractError;
use oqpkit::engine::error::JobError;
use oqpkit::engine::job::JobState;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Job(#[from] JobError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Molden(#[from] MoldenError),

    #[error("Job {state} ({})", describe_exit_code(.exit_code))]
    JobUnsuccessful {
        state: JobState,
        exit_code: Option<i32>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn describe_exit_code(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsuccessful_job_message_includes_state_and_code() {
        let err = CliError::JobUnsuccessful {
            state: JobState::Failed,
            exit_code: Some(2),
        };
        assert_eq!(err.to_string(), "Job failed (exit code 2)");

        let err = CliError::JobUnsuccessful {
            state: JobState::Cancelled,
            exit_code: None,
        };
        assert_eq!(err.to_string(), "Job cancelled (no exit code)");
    }
}
