use super::config::Launcher;
use super::error::JobError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// A fully resolved command line for one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub current_dir: PathBuf,
}

impl Invocation {
    /// Resolves the command that runs `input_path` with `working_dir` as the program's root.
    ///
    /// The input artifact is passed by its base file name only; for container launches the
    /// working directory is bind-mounted at the configured mount point and used as the
    /// container's working directory.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::InvalidInput`] if `input_path` has no file name, and
    /// [`JobError::Launch`] if the working directory cannot be made absolute.
    pub fn build(
        launcher: &Launcher,
        input_path: &Path,
        working_dir: &Path,
    ) -> Result<Self, JobError> {
        let file_name = input_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| JobError::InvalidInput {
                path: input_path.to_path_buf(),
                reason: "path has no file name",
            })?;

        let working_dir =
            std::path::absolute(working_dir).map_err(|source| JobError::Launch {
                program: launcher_program(launcher).display().to_string(),
                source,
            })?;

        let invocation = match launcher {
            Launcher::Container(container) => {
                let mut args = vec!["run".to_string()];
                args.extend(container.extra_args.iter().cloned());
                if let Some(name) = &container.container_name {
                    args.push("--name".to_string());
                    args.push(name.clone());
                }
                args.push("-v".to_string());
                args.push(format!(
                    "{}:{}",
                    working_dir.to_string_lossy(),
                    container.mount_point
                ));
                args.push("-w".to_string());
                args.push(container.mount_point.clone());
                args.push(container.image.clone());
                args.push(container.executable.clone());
                args.push(file_name);
                Invocation {
                    program: container.runtime.clone(),
                    args,
                    current_dir: working_dir,
                }
            }
            Launcher::Direct { program, args } => {
                let mut args = args.clone();
                args.push(file_name);
                Invocation {
                    program: program.clone(),
                    args,
                    current_dir: working_dir,
                }
            }
        };
        Ok(invocation)
    }

    /// The command that force-stops the job's container, for launchers that name it.
    pub fn container_kill(launcher: &Launcher) -> Option<Self> {
        match launcher {
            Launcher::Container(container) => {
                container.container_name.as_ref().map(|name| Invocation {
                    program: container.runtime.clone(),
                    args: vec!["kill".to_string(), name.clone()],
                    current_dir: PathBuf::from("."),
                })
            }
            Launcher::Direct { .. } => None,
        }
    }

    /// Builds a Tokio command with stdout and stderr captured and stdin detached.
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .current_dir(&self.current_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }

    /// Like [`Invocation::to_command`], but on Unix the process leads a new process group
    /// so that it can be killed together with everything it spawns.
    pub fn to_job_command(&self) -> Command {
        let mut command = self.to_command();
        #[cfg(unix)]
        command.process_group(0);
        command
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

fn launcher_program(launcher: &Launcher) -> &Path {
    match launcher {
        Launcher::Container(container) => &container.runtime,
        Launcher::Direct { program, .. } => program,
    }
}
