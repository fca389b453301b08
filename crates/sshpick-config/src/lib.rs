pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AppConfig, AppConfigLayer, ClipboardConfig, ConfigError, ConfigManager, LauncherConfig,
    LoggingConfig, SelectorConfig, StoreConfig,
};
