use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONTAINER_RUNTIME: &str = "docker";
pub const DEFAULT_IMAGE: &str = "openqp:fixed";
pub const DEFAULT_EXECUTABLE: &str = "/usr/local/bin/openqp";
pub const DEFAULT_MOUNT_POINT: &str = "/data";
pub const DEFAULT_LOG_EXTENSION: &str = "log";
pub const DEFAULT_DRAIN_INTERVAL: Duration = Duration::from_millis(10);

static CONTAINER_SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Settings for running the program inside a container.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerConfig {
    /// The container runtime binary (e.g., `docker`, `podman`).
    pub runtime: PathBuf,
    pub image: String,
    /// The program to run inside the container.
    pub executable: String,
    /// Where the working directory is bind-mounted inside the container.
    pub mount_point: String,
    /// Fixed flags passed to `<runtime> run` before the mount (e.g., `--rm`).
    pub extra_args: Vec<String>,
    /// Container name passed as `--name`. Jobs started without one get a generated name.
    pub container_name: Option<String>,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            runtime: PathBuf::from(DEFAULT_CONTAINER_RUNTIME),
            image: DEFAULT_IMAGE.to_string(),
            executable: DEFAULT_EXECUTABLE.to_string(),
            mount_point: DEFAULT_MOUNT_POINT.to_string(),
            extra_args: vec!["--rm".to_string()],
            container_name: None,
        }
    }
}

/// How the external program is started.
#[derive(Debug, Clone, PartialEq)]
pub enum Launcher {
    /// `<runtime> run … -v <dir>:<mount> -w <mount> <image> <executable> <input>`.
    Container(ContainerConfig),
    /// `<program> <args…> <input>`, run with the working directory as current directory.
    Direct { program: PathBuf, args: Vec<String> },
}

impl Default for Launcher {
    fn default() -> Self {
        Launcher::Container(ContainerConfig::default())
    }
}

impl Launcher {
    /// The launcher used for one job: an unnamed container is given a name of the form
    /// `oqpkit-<pid>-<n>`, unique within this process, so it can be killed by name.
    pub fn for_job(&self) -> Launcher {
        match self {
            Launcher::Container(container) if container.container_name.is_none() => {
                let n = CONTAINER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
                Launcher::Container(ContainerConfig {
                    container_name: Some(format!("oqpkit-{}-{}", std::process::id(), n)),
                    ..container.clone()
                })
            }
            other => other.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunnerConfig {
    pub launcher: Launcher,
    /// Extension of the log file the program writes next to its input (`<stem>.<ext>`).
    pub log_extension: String,
    /// Cadence at which workflows drain the event stream.
    pub drain_interval: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            launcher: Launcher::default(),
            log_extension: DEFAULT_LOG_EXTENSION.to_string(),
            drain_interval: DEFAULT_DRAIN_INTERVAL,
        }
    }
}

#[derive(Default)]
pub struct RunnerConfigBuilder {
    launcher: Option<Launcher>,
    log_extension: Option<String>,
    drain_interval: Option<Duration>,
}

impl RunnerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn launcher(mut self, launcher: Launcher) -> Self {
        self.launcher = Some(launcher);
        self
    }
    pub fn log_extension(mut self, extension: &str) -> Self {
        self.log_extension = Some(extension.to_string());
        self
    }
    pub fn drain_interval(mut self, interval: Duration) -> Self {
        self.drain_interval = Some(interval);
        self
    }

    pub fn build(self) -> Result<RunnerConfig, ConfigError> {
        let launcher = self
            .launcher
            .ok_or(ConfigError::MissingParameter("launcher"))?;
        validate_launcher(&launcher)?;

        let log_extension = self
            .log_extension
            .unwrap_or_else(|| DEFAULT_LOG_EXTENSION.to_string());
        let log_extension = log_extension.trim_start_matches('.').to_string();
        if log_extension.is_empty() {
            return Err(ConfigError::InvalidParameter {
                name: "log_extension",
                reason: "must not be empty".to_string(),
            });
        }

        let drain_interval = self.drain_interval.unwrap_or(DEFAULT_DRAIN_INTERVAL);
        if drain_interval.is_zero() {
            return Err(ConfigError::InvalidParameter {
                name: "drain_interval",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(RunnerConfig {
            launcher,
            log_extension,
            drain_interval,
        })
    }
}

fn validate_launcher(launcher: &Launcher) -> Result<(), ConfigError> {
    let empty = |name: &'static str| ConfigError::InvalidParameter {
        name,
        reason: "must not be empty".to_string(),
    };
    match launcher {
        Launcher::Container(c) => {
            if c.runtime.as_os_str().is_empty() {
                return Err(empty("runtime"));
            }
            if c.image.trim().is_empty() {
                return Err(empty("image"));
            }
            if c.executable.trim().is_empty() {
                return Err(empty("executable"));
            }
            if !c.mount_point.starts_with('/') {
                return Err(ConfigError::InvalidParameter {
                    name: "mount_point",
                    reason: format!("'{}' is not an absolute container path", c.mount_point),
                });
            }
        }
        Launcher::Direct { program, .. } => {
            if program.as_os_str().is_empty() {
                return Err(empty("program"));
            }
        }
    }
    Ok(())
}
