use anyhow::Result;
use clap::Parser;
use sshpick_cli::{Cli, Command};
use sshpick_config::{AppConfig, AppConfigLayer, AppPaths, ConfigManager};
use sshpick_core::{
    display_name, restore_terminal, Clipboard, FzfSelector, PickFlow, SystemClipboard, TtyPrompter,
};
use sshpick_keychain::{KeychainStore, SecretStore};
use tracing_subscriber::prelude::*;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = AppPaths::new()?;
    let config_manager = ConfigManager::new(paths.clone());
    let overrides = cli.account.clone().map(AppConfigLayer::with_account);
    let config = config_manager.load(cli.config.as_deref(), overrides)?;
    let _log_guard = init_logging(&config, &paths)?;

    let store = KeychainStore::new(config.store.account.clone());

    match cli.command {
        Some(Command::Config { init }) => {
            if init {
                config_manager.save_default()?;
                println!("config initialized at {}", paths.config_file.display());
            }
        }
        Some(Command::List) => {
            for key in store.list_keys()? {
                println!("{}", display_name(&key));
            }
        }
        None => {
            install_interrupt_handler()?;
            let selector = FzfSelector::new(config.selector.clone(), paths.home_dir.clone());
            let prompter = TtyPrompter;
            let system_clipboard = SystemClipboard;
            let clipboard = config
                .clipboard
                .enabled
                .then_some(&system_clipboard as &dyn Clipboard);
            let action = PickFlow::new(&store, &selector, &prompter, &config.launcher)
                .with_clipboard(clipboard)
                .run_to_completion();
            if !action.is_empty() {
                println!("{action}");
            }
        }
    }

    Ok(())
}

/// Ctrl+C at a prompt ends the run with no action, like a cancel in fzf.
fn install_interrupt_handler() -> Result<()> {
    ctrlc::set_handler(|| {
        restore_terminal();
        eprintln!();
        std::process::exit(0);
    })?;
    Ok(())
}

fn init_logging(
    config: &AppConfig,
    paths: &AppPaths,
) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    std::fs::create_dir_all(&paths.log_dir)?;
    let file_appender = tracing_appender::rolling::daily(&paths.log_dir, "sshpick.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let file_layer = if config.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed()
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    // stdout carries the action string, so console logs go to stderr.
    if config.logging.stderr {
        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed();
        tracing::subscriber::set_global_default(subscriber.with(stderr_layer))?;
    } else {
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(guard)
}
