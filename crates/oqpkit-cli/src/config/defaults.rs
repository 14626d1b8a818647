use oqpkit::engine::config::{
    DEFAULT_CONTAINER_RUNTIME, DEFAULT_EXECUTABLE, DEFAULT_IMAGE, DEFAULT_LOG_EXTENSION,
    DEFAULT_MOUNT_POINT,
};
use oqpkit::workflows::extract::DEFAULT_GEOMETRY_EXTENSION;
use serde::Deserialize;

pub struct DefaultsConfig {
    pub mode: LauncherMode,
    pub program: String,
    pub image: String,
    pub executable: String,
    pub mount_point: String,
    pub extra_args: Vec<String>,
    pub log_extension: String,
    pub geometry_extension: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LauncherMode {
    /// Run the executable inside a container image.
    Container,
    /// Run `program` directly on the host.
    Direct,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            mode: LauncherMode::Container,
            program: DEFAULT_CONTAINER_RUNTIME.to_string(),
            image: DEFAULT_IMAGE.to_string(),
            executable: DEFAULT_EXECUTABLE.to_string(),
            mount_point: DEFAULT_MOUNT_POINT.to_string(),
            extra_args: vec!["--rm".to_string()],
            log_extension: DEFAULT_LOG_EXTENSION.to_string(),
            geometry_extension: DEFAULT_GEOMETRY_EXTENSION.to_string(),
        }
    }
}
