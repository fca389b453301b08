use crate::codec::display_name;
use crate::error::PickError;
use sshpick_config::SelectorConfig;
use std::env;
use std::ffi::{OsStr, OsString};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

pub const DELETE_PREFIX: &str = "DELETE:";

const EXIT_MATCH: i32 = 0;
const EXIT_NO_MATCH: i32 = 1;
const EXIT_CANCELLED: i32 = 130;

const FZF: &str = "fzf";
const WELL_KNOWN_DIRS: [&str; 2] = ["/opt/homebrew/bin", "/usr/local/bin"];

/// What the user asked for in one selection round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    /// Connect with an existing key.
    Connect(String),
    /// Create a profile with the typed friendly name.
    Create(String),
    /// Delete a key, or a raw string when the highlighted line matched no key.
    Delete(String),
    Cancel,
}

impl Intent {
    pub fn kind(&self) -> &'static str {
        match self {
            Intent::Connect(_) => "connect",
            Intent::Create(_) => "create",
            Intent::Delete(_) => "delete",
            Intent::Cancel => "cancel",
        }
    }
}

pub trait Selector {
    fn select(&self, keys: &[String]) -> Result<Intent, PickError>;
}

/// Decodes fzf's combined exit status and output into an [`Intent`].
///
/// `rendered[i]` must be the display string of `keys[i]`. A `None` exit code
/// (killed by a signal) counts as a cancel.
pub fn interpret(
    exit_code: Option<i32>,
    output: &str,
    rendered: &[String],
    keys: &[String],
) -> Intent {
    let output = output.trim();
    let key_for = |display: &str| {
        rendered
            .iter()
            .position(|item| item == display)
            .and_then(|idx| keys.get(idx))
            .cloned()
    };

    if let Some(display) = output.strip_prefix(DELETE_PREFIX) {
        return Intent::Delete(key_for(display).unwrap_or_else(|| display.to_string()));
    }

    let lines: Vec<&str> = output.split('\n').collect();
    match exit_code {
        Some(EXIT_CANCELLED) => Intent::Cancel,
        Some(EXIT_MATCH) => {
            // --print-query puts the query first and the match last.
            let mut selected = lines.last().copied().unwrap_or_default();
            if selected.is_empty() && lines.len() > 1 {
                selected = lines[lines.len() - 2];
            }
            key_for(selected).map_or(Intent::Cancel, Intent::Connect)
        }
        Some(EXIT_NO_MATCH) => {
            let query = lines.first().copied().unwrap_or_default();
            Intent::Create(strip_display_suffix(query))
        }
        _ => Intent::Cancel,
    }
}

/// Turns a query typed in display form, `name (user@host)`, back into `name`.
fn strip_display_suffix(query: &str) -> String {
    if query.contains('(') && query.contains(')') && query.contains('@') {
        if let Some((name, _)) = query.split_once('(') {
            return name.trim().to_string();
        }
    }
    query.to_string()
}

/// Prepends each existing `extra` directory missing from `current`.
pub fn augment_path(
    current: &OsStr,
    extra: &[PathBuf],
    exists: impl Fn(&Path) -> bool,
) -> OsString {
    let mut parts: Vec<PathBuf> = env::split_paths(current)
        .filter(|p| !p.as_os_str().is_empty())
        .collect();
    for dir in extra {
        if exists(dir) && !parts.contains(dir) {
            parts.insert(0, dir.clone());
        }
    }
    env::join_paths(&parts).unwrap_or_else(|_| current.to_os_string())
}

#[derive(Clone, Debug)]
pub struct FzfSelector {
    config: SelectorConfig,
    home_dir: Option<PathBuf>,
}

impl FzfSelector {
    pub fn new(config: SelectorConfig, home_dir: Option<PathBuf>) -> Self {
        Self { config, home_dir }
    }

    pub fn search_path(&self) -> OsString {
        let current = env::var_os("PATH").unwrap_or_default();
        augment_path(&current, &self.config.search_paths, Path::exists)
    }

    /// Resolves the fzf binary: configured path, then the first existing
    /// entry of `candidates`, then the bare name for the OS to resolve.
    pub fn locate(&self, search_path: &OsStr) -> PathBuf {
        if let Some(path) = &self.config.fzf_path {
            return path.clone();
        }
        self.candidates(search_path)
            .into_iter()
            .find(|candidate| candidate.is_file())
            .unwrap_or_else(|| PathBuf::from(FZF))
    }

    /// Where fzf is looked for, in order: `search_path`, the Homebrew
    /// prefixes, then `~/.fzf/bin`.
    fn candidates(&self, search_path: &OsStr) -> Vec<PathBuf> {
        let fallback = self
            .home_dir
            .as_ref()
            .map(|home| home.join(".fzf").join("bin"));
        env::split_paths(search_path)
            .chain(WELL_KNOWN_DIRS.iter().map(PathBuf::from))
            .chain(fallback)
            .map(|dir| dir.join(FZF))
            .collect()
    }

    fn args(&self) -> Vec<String> {
        vec![
            "--print-query".to_string(),
            format!("--prompt={}", self.config.prompt),
            format!(
                "--bind={}:become(echo {}{{}})+accept",
                self.config.delete_key, DELETE_PREFIX
            ),
            format!("--header={}", self.config.header),
        ]
    }
}

/// Stops the selector and reaps it so it releases the terminal.
fn abort(child: &mut Child) {
    if let Err(e) = child.kill() {
        tracing::debug!(error = %e, "selector already exited");
    }
    if let Err(e) = child.wait() {
        tracing::debug!(error = %e, "could not reap selector");
    }
}

impl Selector for FzfSelector {
    fn select(&self, keys: &[String]) -> Result<Intent, PickError> {
        let rendered: Vec<String> = keys.iter().map(|key| display_name(key)).collect();
        let search_path = self.search_path();
        let program = self.locate(&search_path);
        tracing::debug!(program = %program.display(), items = rendered.len(), "launching selector");

        let mut child = Command::new(&program)
            .args(self.args())
            .env("PATH", &search_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    PickError::tool_not_found(FZF, &search_path.to_string_lossy(), &program, &e)
                } else {
                    PickError::Selector(e.to_string())
                }
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(rendered.join("\n").as_bytes()) {
                // fzf may exit before reading everything.
                Err(e) if e.kind() != ErrorKind::BrokenPipe => {
                    drop(stdin);
                    abort(&mut child);
                    return Err(PickError::Selector(e.to_string()));
                }
                _ => {}
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| PickError::Selector(e.to_string()))?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let intent = interpret(output.status.code(), &stdout, &rendered, keys);
        tracing::debug!(code = ?output.status.code(), intent = intent.kind(), "selector finished");
        Ok(intent)
    }
}
