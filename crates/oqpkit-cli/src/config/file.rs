use super::defaults::LauncherMode;
use serde::Deserialize;

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileRuntimeConfig {
    pub mode: Option<LauncherMode>,
    /// The container runtime in container mode, the OpenQP binary in direct mode.
    pub program: Option<String>,
    pub image: Option<String>,
    pub executable: Option<String>,
    pub mount_point: Option<String>,
    pub extra_args: Option<Vec<String>>,
    pub container_name: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileOutputConfig {
    pub log_extension: Option<String>,
    pub geometry_extension: Option<String>,
}
