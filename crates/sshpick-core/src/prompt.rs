use crate::error::PickError;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::process::Command;
use zeroize::Zeroizing;

const TTY_PATH: &str = "/dev/tty";
const CONTINUE_PROMPT: &str = "\nPress Enter to continue...";

/// Interactive line input and user-facing messages.
pub trait Prompter {
    /// Reads one line, trimmed.
    fn read_line(&self, prompt: &str) -> Result<String, PickError>;
    /// Reads one line without echo.
    fn read_secret(&self, prompt: &str) -> Result<Zeroizing<String>, PickError>;
    fn say(&self, message: &str);

    fn pause(&self) -> Result<(), PickError> {
        self.read_line(CONTINUE_PROMPT).map(|_| ())
    }
}

/// Prompts and reads on the controlling terminal, so redirected standard
/// streams are left alone. Falls back to stderr and stdin without one.
#[derive(Clone, Copy, Debug, Default)]
pub struct TtyPrompter;

impl TtyPrompter {
    fn ask(
        out: &mut impl Write,
        input: &mut impl BufRead,
        prompt: &str,
    ) -> Result<String, PickError> {
        out.write_all(prompt.as_bytes())?;
        out.flush()?;
        Self::read_from(input)
    }

    fn read_from(reader: &mut impl BufRead) -> Result<String, PickError> {
        let mut line = String::new();
        let read = reader.read_line(&mut line).map_err(PickError::from_prompt)?;
        if read == 0 {
            return Err(PickError::Interrupted);
        }
        Ok(line.trim().to_string())
    }
}

impl Prompter for TtyPrompter {
    fn read_line(&self, prompt: &str) -> Result<String, PickError> {
        match OpenOptions::new().read(true).write(true).open(TTY_PATH) {
            Ok(tty) => {
                let mut out = tty.try_clone()?;
                Self::ask(&mut out, &mut BufReader::new(tty), prompt)
            }
            Err(e) => {
                tracing::debug!(error = %e, "no controlling terminal, using stdin and stderr");
                Self::ask(&mut io::stderr(), &mut io::stdin().lock(), prompt)
            }
        }
    }

    fn read_secret(&self, prompt: &str) -> Result<Zeroizing<String>, PickError> {
        rpassword::prompt_password(prompt)
            .map(Zeroizing::new)
            .map_err(PickError::from_prompt)
    }

    fn say(&self, message: &str) {
        eprintln!("{message}");
    }
}

/// Turns terminal echo back on after a masked read was cut short.
pub fn restore_terminal() {
    if let Ok(tty) = File::open(TTY_PATH) {
        if let Err(e) = Command::new("stty").arg("echo").stdin(tty).status() {
            tracing::debug!(error = %e, "could not restore terminal echo");
        }
    }
}
