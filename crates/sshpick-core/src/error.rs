use sshpick_keychain::SecretError;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PickError {
    #[error("{0}")]
    Store(#[from] SecretError),
    #[error(
        "{tool} command not found: {reason}\nCurrent PATH: {path}\n\nTo install {tool}:\n  brew install {tool}\n\nOr if already installed, ensure it's in your PATH."
    )]
    ToolNotFound {
        tool: String,
        path: String,
        reason: String,
    },
    #[error("error during fzf selection: {0}")]
    Selector(String),
    #[error("invalid SSH connection format for '{0}'")]
    MalformedEntry(String),
    #[error("cannot delete: '{0}' does not exist")]
    UnknownEntry(String),
    #[error("{0}")]
    Validation(String),
    #[error("failed to copy to clipboard: {0}")]
    Clipboard(String),
    #[error("interrupted")]
    Interrupted,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PickError {
    /// Errors the flow raises on purpose; anything else is reported as unexpected.
    pub fn is_expected(&self) -> bool {
        !matches!(self, PickError::Io(_) | PickError::Interrupted)
    }

    pub fn tool_not_found(tool: &str, path: &str, program: &Path, err: &std::io::Error) -> Self {
        PickError::ToolNotFound {
            tool: tool.to_string(),
            path: path.to_string(),
            reason: format!("{}: {}", program.display(), err),
        }
    }

    /// Maps a prompt read failure; end of input counts as the user backing out.
    pub fn from_prompt(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof => PickError::Interrupted,
            _ => PickError::Io(err),
        }
    }
}
