pub mod defaults;
pub mod file;

use self::defaults::{DefaultsConfig, LauncherMode};
use self::file::{FileOutputConfig, FileRuntimeConfig};
use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use directories::ProjectDirs;
use oqpkit::engine::config::{ContainerConfig, Launcher, RunnerConfig, RunnerConfigBuilder};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const CONFIG_FILE_NAME: &str = "config.toml";

/// Fully resolved settings for one CLI invocation.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub runner: RunnerConfig,
    pub geometry_extension: String,
}

#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PartialAppConfig {
    runtime: Option<FileRuntimeConfig>,
    output: Option<FileOutputConfig>,
}

/// `<user config dir>/oqpkit/config.toml`, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "oqpkit", "oqpkit").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

impl PartialAppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Loads `explicit` if given, else the default config file if it exists, else nothing.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => {
                debug!("No configuration file found; using built-in defaults.");
                Ok(Self::default())
            }
        }
    }

    pub fn apply_run_args(&mut self, args: &RunArgs) {
        let runtime = self.runtime.get_or_insert_with(Default::default);
        if let Some(image) = &args.image {
            runtime.image = Some(image.clone());
        }
        if let Some(name) = &args.container_name {
            runtime.container_name = Some(name.clone());
        }
    }

    pub fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let (key, value) = kv_pair.split_once('=').ok_or_else(|| {
                CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                ))
            })?;
            let value = value.trim().to_string();

            match key.trim() {
                "runtime.mode" => {
                    self.runtime_mut().mode = Some(parse_mode(&value)?);
                }
                "runtime.program" => self.runtime_mut().program = Some(value),
                "runtime.image" => self.runtime_mut().image = Some(value),
                "runtime.executable" => self.runtime_mut().executable = Some(value),
                "runtime.mount-point" => self.runtime_mut().mount_point = Some(value),
                "runtime.container-name" => self.runtime_mut().container_name = Some(value),
                "runtime.extra-args" => {
                    self.runtime_mut().extra_args =
                        Some(value.split_whitespace().map(str::to_string).collect());
                }
                "output.log-extension" => self.output_mut().log_extension = Some(value),
                "output.geometry-extension" => {
                    self.output_mut().geometry_extension = Some(value);
                }
                other => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        other
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn resolve(self) -> Result<AppConfig> {
        let defaults = DefaultsConfig::default();
        let runtime = self.runtime.unwrap_or_default();
        let output = self.output.unwrap_or_default();

        let launcher = match runtime.mode.unwrap_or(defaults.mode) {
            LauncherMode::Container => Launcher::Container(ContainerConfig {
                runtime: PathBuf::from(runtime.program.unwrap_or(defaults.program)),
                image: runtime.image.unwrap_or(defaults.image),
                executable: runtime.executable.unwrap_or(defaults.executable),
                mount_point: runtime.mount_point.unwrap_or(defaults.mount_point),
                extra_args: runtime.extra_args.unwrap_or(defaults.extra_args),
                container_name: runtime.container_name,
            }),
            LauncherMode::Direct => {
                let program = runtime.program.ok_or_else(|| {
                    CliError::Config("`runtime.program` is required in direct mode.".to_string())
                })?;
                if runtime.image.is_some() || runtime.container_name.is_some() {
                    warn!("Container settings are ignored in direct mode.");
                }
                Launcher::Direct {
                    program: PathBuf::from(program),
                    args: runtime.extra_args.unwrap_or_default(),
                }
            }
        };

        let runner = RunnerConfigBuilder::new()
            .launcher(launcher)
            .log_extension(
                output
                    .log_extension
                    .as_deref()
                    .unwrap_or(&defaults.log_extension),
            )
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        let geometry_extension = output
            .geometry_extension
            .unwrap_or(defaults.geometry_extension)
            .trim_start_matches('.')
            .to_string();
        if geometry_extension.is_empty() {
            return Err(CliError::Config(
                "`output.geometry-extension` must not be empty.".to_string(),
            ));
        }

        Ok(AppConfig {
            runner,
            geometry_extension,
        })
    }

    fn runtime_mut(&mut self) -> &mut FileRuntimeConfig {
        self.runtime.get_or_insert_with(Default::default)
    }

    fn output_mut(&mut self) -> &mut FileOutputConfig {
        self.output.get_or_insert_with(Default::default)
    }
}

fn parse_mode(value: &str) -> Result<LauncherMode> {
    match value {
        "container" => Ok(LauncherMode::Container),
        "direct" => Ok(LauncherMode::Direct),
        other => Err(CliError::Config(format!(
            "Invalid value for runtime.mode: '{}'. Expected 'container' or 'direct'.",
            other
        ))),
    }
}

/// Loads the configuration and merges the global `-S` overrides.
pub fn load_app_config(config_path: Option<&Path>, set_values: &[String]) -> Result<PartialAppConfig> {
    let mut partial = PartialAppConfig::load(config_path)?;
    partial.apply_set_values(set_values)?;
    Ok(partial)
}
