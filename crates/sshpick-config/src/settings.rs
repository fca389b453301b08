use crate::paths::AppPaths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml error in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("toml serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub selector: SelectorConfig,
    pub launcher: LauncherConfig,
    pub clipboard: ClipboardConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct AppConfigLayer {
    pub store: Option<StoreConfigLayer>,
    pub selector: Option<SelectorConfigLayer>,
    pub launcher: Option<LauncherConfigLayer>,
    pub clipboard: Option<ClipboardConfigLayer>,
    pub logging: Option<LoggingConfigLayer>,
}

impl AppConfigLayer {
    pub fn apply_to(self, cfg: &mut AppConfig) {
        if let Some(layer) = self.store {
            cfg.store.apply(layer);
        }
        if let Some(layer) = self.selector {
            cfg.selector.apply(layer);
        }
        if let Some(layer) = self.launcher {
            cfg.launcher.apply(layer);
        }
        if let Some(layer) = self.clipboard {
            cfg.clipboard.apply(layer);
        }
        if let Some(layer) = self.logging {
            cfg.logging.apply(layer);
        }
    }

    /// Layer that only overrides the account tag.
    pub fn with_account(account: impl Into<String>) -> Self {
        Self {
            store: Some(StoreConfigLayer {
                account: Some(account.into()),
            }),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Account tag every stored profile is filed under.
    pub account: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            account: "kitty-ssh".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct StoreConfigLayer {
    pub account: Option<String>,
}

impl StoreConfig {
    fn apply(&mut self, layer: StoreConfigLayer) {
        if let Some(v) = layer.account {
            self.account = v;
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SelectorConfig {
    pub fzf_path: Option<PathBuf>,
    pub search_paths: Vec<PathBuf>,
    pub prompt: String,
    pub header: String,
    pub delete_key: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            fzf_path: None,
            search_paths: vec![
                PathBuf::from("/opt/homebrew/bin"),
                PathBuf::from("/usr/local/bin"),
                PathBuf::from("/opt/homebrew/sbin"),
                PathBuf::from("/usr/local/sbin"),
            ],
            prompt: "Select SSH connection or enter new name (ctrl+D to delete): ".to_string(),
            header: "↵ Connect | ctrl+D Delete | Ctrl+C Cancel".to_string(),
            delete_key: "ctrl-d".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct SelectorConfigLayer {
    pub fzf_path: Option<PathBuf>,
    pub search_paths: Option<Vec<PathBuf>>,
    pub prompt: Option<String>,
    pub header: Option<String>,
    pub delete_key: Option<String>,
}

impl SelectorConfig {
    fn apply(&mut self, layer: SelectorConfigLayer) {
        if layer.fzf_path.is_some() {
            self.fzf_path = layer.fzf_path;
        }
        if let Some(v) = layer.search_paths {
            self.search_paths = v;
        }
        if let Some(v) = layer.prompt {
            self.prompt = v;
        }
        if let Some(v) = layer.header {
            self.header = v;
        }
        if let Some(v) = layer.delete_key {
            self.delete_key = v;
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LauncherConfig {
    /// Command template; `{user}` and `{host}` are substituted.
    pub command: String,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            command: "kitty +kitten ssh -o UserKnownHostsFile=/dev/null -o StrictHostKeyChecking=no {user}@{host}"
                .to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct LauncherConfigLayer {
    pub command: Option<String>,
}

impl LauncherConfig {
    fn apply(&mut self, layer: LauncherConfigLayer) {
        if let Some(v) = layer.command {
            self.command = v;
        }
    }

    pub fn render(&self, user: &str, host: &str) -> String {
        self.command.replace("{user}", user).replace("{host}", host)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClipboardConfig {
    pub enabled: bool,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct ClipboardConfigLayer {
    pub enabled: Option<bool>,
}

impl ClipboardConfig {
    fn apply(&mut self, layer: ClipboardConfigLayer) {
        if let Some(v) = layer.enabled {
            self.enabled = v;
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    pub stderr: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            stderr: false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct LoggingConfigLayer {
    pub level: Option<String>,
    pub json: Option<bool>,
    pub stderr: Option<bool>,
}

impl LoggingConfig {
    fn apply(&mut self, layer: LoggingConfigLayer) {
        if let Some(v) = layer.level {
            self.level = v;
        }
        if let Some(v) = layer.json {
            self.json = v;
        }
        if let Some(v) = layer.stderr {
            self.stderr = v;
        }
    }
}

#[derive(Clone, Debug)]
pub struct ConfigManager {
    pub paths: AppPaths,
}

impl ConfigManager {
    pub fn new(paths: AppPaths) -> Self {
        Self { paths }
    }

    pub fn load(
        &self,
        explicit: Option<&Path>,
        overrides: Option<AppConfigLayer>,
    ) -> Result<AppConfig, ConfigError> {
        let mut cfg = AppConfig::default();

        if self.paths.config_file.exists() {
            let layer = Self::load_layer(&self.paths.config_file)?;
            layer.apply_to(&mut cfg);
        }

        if let Some(path) = explicit {
            let layer = Self::load_layer(path)?;
            layer.apply_to(&mut cfg);
        }

        if let Some(layer) = overrides {
            layer.apply_to(&mut cfg);
        }

        Ok(cfg)
    }

    pub fn load_layer(path: &Path) -> Result<AppConfigLayer, ConfigError> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save_default(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.paths.config_file.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(&AppConfig::default())?;
        fs::write(&self.paths.config_file, content)?;
        tracing::info!(path = %self.paths.config_file.display(), "wrote default config");
        Ok(())
    }
}
