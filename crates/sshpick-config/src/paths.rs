use anyhow::Result;
use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub config_file: PathBuf,
    pub home_dir: Option<PathBuf>,
}

impl AppPaths {
    pub fn new() -> Result<Self> {
        let proj = ProjectDirs::from("org", "sshpick", "sshpick")
            .ok_or_else(|| anyhow::anyhow!("project dirs unavailable"))?;
        let config_dir = proj.config_dir().to_path_buf();
        let data_dir = proj.data_dir().to_path_buf();
        let log_dir = data_dir.join("logs");
        let config_file = config_dir.join("config.toml");
        let home_dir = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
        Ok(Self {
            config_dir,
            data_dir,
            log_dir,
            config_file,
            home_dir,
        })
    }
}
