use crate::clipboard::Clipboard;
use crate::codec::{decode, encode, Profile};
use crate::error::PickError;
use crate::prompt::Prompter;
use crate::selector::{Intent, Selector};
use sshpick_config::LauncherConfig;
use sshpick_keychain::SecretStore;

const DELETE_PROMPT: &str = "\nPress Enter to DELETE, or type 'no' to cancel: ";

/// One pass of pick → create / connect / delete, wired to its collaborators.
pub struct PickFlow<'a> {
    store: &'a dyn SecretStore,
    selector: &'a dyn Selector,
    prompter: &'a dyn Prompter,
    clipboard: Option<&'a dyn Clipboard>,
    launcher: &'a LauncherConfig,
}

impl<'a> PickFlow<'a> {
    pub fn new(
        store: &'a dyn SecretStore,
        selector: &'a dyn Selector,
        prompter: &'a dyn Prompter,
        launcher: &'a LauncherConfig,
    ) -> Self {
        Self {
            store,
            selector,
            prompter,
            clipboard: None,
            launcher,
        }
    }

    pub fn with_clipboard(mut self, clipboard: Option<&'a dyn Clipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    /// Runs the flow and reports any failure to the user. Always returns the
    /// action string, empty when there is nothing to run.
    pub fn run_to_completion(&self) -> String {
        match self.run() {
            Ok(action) => action,
            Err(PickError::Interrupted) => {
                tracing::debug!("pick flow interrupted");
                String::new()
            }
            Err(err) => {
                tracing::warn!(error = %err, expected = err.is_expected(), "pick flow failed");
                if err.is_expected() {
                    self.prompter.say(&format!("\n❌ Error: {err}"));
                } else {
                    self.prompter.say(&format!("\n❌ Unexpected error: {err}"));
                }
                if let Err(e) = self.prompter.pause() {
                    tracing::debug!(error = %e, "acknowledgment skipped");
                }
                String::new()
            }
        }
    }

    pub fn run(&self) -> Result<String, PickError> {
        let keys = self.store.list_keys()?;
        let intent = self.selector.select(&keys)?;
        tracing::debug!(intent = intent.kind(), "selection made");
        match intent {
            Intent::Cancel => Ok(String::new()),
            Intent::Connect(key) => self.connect(&key),
            Intent::Create(name) if name.is_empty() => Ok(String::new()),
            Intent::Create(name) => self.create(&name),
            Intent::Delete(key) if key.is_empty() => Ok(String::new()),
            Intent::Delete(key) => self.delete(&key, &keys),
        }
    }

    fn connect(&self, key: &str) -> Result<String, PickError> {
        let profile = decode(key);
        if profile.is_malformed() {
            tracing::warn!(key, "stored key does not decode to user@host");
            return Err(PickError::MalformedEntry(key.to_string()));
        }
        let secret = self.store.get_secret(key)?;
        self.prompter.say(&format!(
            "✓ Connecting to '{}' ({})",
            profile.name,
            profile.target()
        ));
        if let Some(clipboard) = self.clipboard {
            clipboard.copy(&secret)?;
            self.prompter
                .say("✓ Password copied to clipboard - paste it when prompted");
        }
        Ok(self.launcher.render(&profile.username, &profile.hostname))
    }

    fn create(&self, name: &str) -> Result<String, PickError> {
        self.prompter
            .say(&format!("\n Creating new SSH connection: {name}"));

        let username = self.prompter.read_line("Enter SSH username: ")?;
        if username.is_empty() {
            return Err(PickError::Validation("Username cannot be empty".to_string()));
        }
        let hostname = self.prompter.read_line("Enter SSH hostname: ")?;
        if hostname.is_empty() {
            return Err(PickError::Validation("Hostname cannot be empty".to_string()));
        }
        let profile = Profile::new(name, username, hostname);
        let key = encode(&profile.name, &profile.username, &profile.hostname);
        if decode(&key) != profile {
            return Err(PickError::Validation(format!(
                "'{key}' would not read back as the same connection; avoid '|' in the name and '@' in the username"
            )));
        }

        let secret = self.prompter.read_secret("Enter SSH password (hidden): ")?;
        if secret.is_empty() {
            return Err(PickError::Validation("Password cannot be empty".to_string()));
        }
        let confirm = self.prompter.read_secret("Confirm password: ")?;
        if *secret != *confirm {
            return Err(PickError::Validation("Passwords do not match".to_string()));
        }

        self.store.add_entry(&key, &secret)?;
        self.prompter.say(&format!(
            "✓ SSH connection '{}' ({}) added successfully",
            profile.name,
            profile.target()
        ));
        self.prompter.pause()?;
        Ok(String::new())
    }

    fn delete(&self, key: &str, keys: &[String]) -> Result<String, PickError> {
        if !keys.iter().any(|existing| existing == key) {
            return Err(PickError::UnknownEntry(key.to_string()));
        }
        let profile = decode(key);
        self.prompter
            .say("\n⚠️  WARNING: About to DELETE SSH connection:");
        self.prompter.say(&format!("  Name: {}", profile.name));
        self.prompter
            .say(&format!("  Connection: {}", profile.target()));
        self.prompter.say("This action cannot be undone!");

        let answer = self.prompter.read_line(DELETE_PROMPT)?;
        if confirms_delete(&answer) {
            self.store.delete_entry(key)?;
            self.prompter.say(&format!(
                "✓ SSH connection '{}' ({}) deleted successfully",
                profile.name,
                profile.target()
            ));
        } else {
            tracing::debug!("deletion declined");
            self.prompter.say("❌ Deletion cancelled.");
        }
        self.prompter.pause()?;
        Ok(String::new())
    }
}

/// Anything other than an explicit no, including an empty line, confirms.
fn confirms_delete(answer: &str) -> bool {
    !matches!(answer.trim().to_lowercase().as_str(), "no" | "n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sshpick_keychain::SecretError;
    use std::cell::RefCell;
    use std::collections::{HashMap, VecDeque};
    use zeroize::Zeroizing;

    #[derive(Default)]
    struct FakeStore {
        keys: Vec<String>,
        secrets: HashMap<String, String>,
        fail_list: bool,
        added: RefCell<Vec<(String, String)>>,
        deleted: RefCell<Vec<String>>,
    }

    impl FakeStore {
        fn with_keys(keys: &[&str]) -> Self {
            Self {
                keys: keys.iter().map(|k| k.to_string()).collect(),
                ..Default::default()
            }
        }
    }

    impl SecretStore for FakeStore {
        fn list_keys(&self) -> Result<Vec<String>, SecretError> {
            if self.fail_list {
                return Err(SecretError::Query("dump failed".to_string()));
            }
            Ok(self.keys.clone())
        }

        fn add_entry(&self, key: &str, secret: &Zeroizing<String>) -> Result<(), SecretError> {
            if self.keys.iter().any(|k| k == key) {
                return Err(SecretError::Duplicate(key.to_string()));
            }
            self.added
                .borrow_mut()
                .push((key.to_string(), secret.to_string()));
            Ok(())
        }

        fn get_secret(&self, key: &str) -> Result<Zeroizing<String>, SecretError> {
            self.secrets
                .get(key)
                .map(|s| Zeroizing::new(s.clone()))
                .ok_or_else(|| SecretError::NotFound(key.to_string()))
        }

        fn delete_entry(&self, key: &str) -> Result<(), SecretError> {
            self.deleted.borrow_mut().push(key.to_string());
            Ok(())
        }
    }

    struct FixedSelector(Intent);

    impl Selector for FixedSelector {
        fn select(&self, _keys: &[String]) -> Result<Intent, PickError> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct ScriptedPrompter {
        lines: RefCell<VecDeque<String>>,
        secrets: RefCell<VecDeque<String>>,
        asked: RefCell<Vec<String>>,
        said: RefCell<Vec<String>>,
    }

    impl ScriptedPrompter {
        fn new(lines: &[&str], secrets: &[&str]) -> Self {
            Self {
                lines: RefCell::new(lines.iter().map(|s| s.to_string()).collect()),
                secrets: RefCell::new(secrets.iter().map(|s| s.to_string()).collect()),
                ..Default::default()
            }
        }

        fn paused(&self) -> bool {
            self.asked
                .borrow()
                .iter()
                .any(|p| p.contains("Press Enter to continue"))
        }

        fn said_line_containing(&self, needle: &str) -> bool {
            self.said.borrow().iter().any(|m| m.contains(needle))
        }
    }

    impl Prompter for ScriptedPrompter {
        fn read_line(&self, prompt: &str) -> Result<String, PickError> {
            self.asked.borrow_mut().push(prompt.to_string());
            self.lines
                .borrow_mut()
                .pop_front()
                .ok_or(PickError::Interrupted)
        }

        fn read_secret(&self, prompt: &str) -> Result<Zeroizing<String>, PickError> {
            self.asked.borrow_mut().push(prompt.to_string());
            self.secrets
                .borrow_mut()
                .pop_front()
                .map(Zeroizing::new)
                .ok_or(PickError::Interrupted)
        }

        fn say(&self, message: &str) {
            self.said.borrow_mut().push(message.to_string());
        }
    }

    #[derive(Default)]
    struct RecordingClipboard {
        copied: RefCell<Vec<String>>,
    }

    impl Clipboard for RecordingClipboard {
        fn copy(&self, text: &str) -> Result<(), PickError> {
            self.copied.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    fn launcher() -> LauncherConfig {
        LauncherConfig {
            command: "ssh {user}@{host}".to_string(),
        }
    }

    #[test]
    fn create_stores_encoded_key_and_returns_nothing() {
        let store = FakeStore::with_keys(&["home|bob@h1"]);
        let selector = FixedSelector(Intent::Create("office".to_string()));
        let prompter = ScriptedPrompter::new(&["carol", "h2", ""], &["s3cr3t", "s3cr3t"]);
        let launcher = launcher();
        let flow = PickFlow::new(&store, &selector, &prompter, &launcher);

        assert_eq!(flow.run().unwrap(), "");
        assert_eq!(
            *store.added.borrow(),
            vec![("office|carol@h2".to_string(), "s3cr3t".to_string())]
        );
        assert!(prompter.said_line_containing("added successfully"));
        assert!(prompter.paused());
    }

    #[test]
    fn create_rejects_empty_fields() {
        let store = FakeStore::default();
        let selector = FixedSelector(Intent::Create("office".to_string()));
        let launcher = launcher();

        let prompter = ScriptedPrompter::new(&[""], &[]);
        let flow = PickFlow::new(&store, &selector, &prompter, &launcher);
        assert!(matches!(flow.run(), Err(PickError::Validation(_))));

        let prompter = ScriptedPrompter::new(&["carol", ""], &[]);
        let flow = PickFlow::new(&store, &selector, &prompter, &launcher);
        assert!(matches!(flow.run(), Err(PickError::Validation(_))));

        let prompter = ScriptedPrompter::new(&["carol", "h2"], &[""]);
        let flow = PickFlow::new(&store, &selector, &prompter, &launcher);
        assert!(matches!(flow.run(), Err(PickError::Validation(_))));

        assert!(store.added.borrow().is_empty());
    }

    #[test]
    fn create_rejects_mismatched_confirmation() {
        let store = FakeStore::default();
        let selector = FixedSelector(Intent::Create("office".to_string()));
        let prompter = ScriptedPrompter::new(&["carol", "h2"], &["s3cr3t", "s3cr3T"]);
        let launcher = launcher();
        let flow = PickFlow::new(&store, &selector, &prompter, &launcher);

        let err = flow.run().unwrap_err();
        assert_eq!(err.to_string(), "Passwords do not match");
        assert!(store.added.borrow().is_empty());
    }

    #[test]
    fn create_rejects_fields_that_break_the_key() {
        let store = FakeStore::default();
        let selector = FixedSelector(Intent::Create("a|b".to_string()));
        let prompter = ScriptedPrompter::new(&["carol", "h2"], &["pw", "pw"]);
        let launcher = launcher();
        let flow = PickFlow::new(&store, &selector, &prompter, &launcher);

        assert!(matches!(flow.run(), Err(PickError::Validation(_))));
        assert!(store.added.borrow().is_empty());
    }

    #[test]
    fn duplicate_create_surfaces_store_error() {
        let store = FakeStore::with_keys(&["office|carol@h2"]);
        let selector = FixedSelector(Intent::Create("office".to_string()));
        let prompter = ScriptedPrompter::new(&["carol", "h2"], &["pw", "pw"]);
        let launcher = launcher();
        let flow = PickFlow::new(&store, &selector, &prompter, &launcher);

        assert!(matches!(
            flow.run(),
            Err(PickError::Store(SecretError::Duplicate(_)))
        ));
    }

    #[test]
    fn connect_copies_secret_and_builds_command() {
        let mut store = FakeStore::with_keys(&["home|bob@h1"]);
        store
            .secrets
            .insert("home|bob@h1".to_string(), "pw1".to_string());
        let selector = FixedSelector(Intent::Connect("home|bob@h1".to_string()));
        let prompter = ScriptedPrompter::default();
        let clipboard = RecordingClipboard::default();
        let launcher = launcher();
        let flow = PickFlow::new(&store, &selector, &prompter, &launcher)
            .with_clipboard(Some(&clipboard));

        let action = flow.run_to_completion();
        assert_eq!(action, "ssh bob@h1");
        assert!(action.contains("bob@h1"));
        assert_eq!(*clipboard.copied.borrow(), vec!["pw1".to_string()]);
        assert!(prompter.said_line_containing("Connecting to 'home'"));
    }

    #[test]
    fn connect_without_clipboard_still_returns_command() {
        let mut store = FakeStore::with_keys(&["home|bob@h1"]);
        store
            .secrets
            .insert("home|bob@h1".to_string(), "pw1".to_string());
        let selector = FixedSelector(Intent::Connect("home|bob@h1".to_string()));
        let prompter = ScriptedPrompter::default();
        let launcher = launcher();
        let flow = PickFlow::new(&store, &selector, &prompter, &launcher).with_clipboard(None);

        assert_eq!(flow.run().unwrap(), "ssh bob@h1");
        assert!(!prompter.said_line_containing("clipboard"));
    }

    #[test]
    fn connect_to_malformed_entry_fails_before_reading_secret() {
        let store = FakeStore::with_keys(&["broken"]);
        let selector = FixedSelector(Intent::Connect("broken".to_string()));
        let prompter = ScriptedPrompter::default();
        let launcher = launcher();
        let flow = PickFlow::new(&store, &selector, &prompter, &launcher);

        assert!(matches!(flow.run(), Err(PickError::MalformedEntry(k)) if k == "broken"));
    }

    #[test]
    fn missing_secret_is_reported_and_flow_exits_cleanly() {
        let store = FakeStore::with_keys(&["home|bob@h1"]);
        let selector = FixedSelector(Intent::Connect("home|bob@h1".to_string()));
        let prompter = ScriptedPrompter::new(&[""], &[]);
        let launcher = launcher();
        let flow = PickFlow::new(&store, &selector, &prompter, &launcher);

        assert_eq!(flow.run_to_completion(), "");
        assert!(prompter.said_line_containing("❌ Error:"));
        assert!(prompter.paused());
    }

    #[test]
    fn delete_confirms_on_empty_input() {
        let store = FakeStore::with_keys(&["home|bob@h1"]);
        let selector = FixedSelector(Intent::Delete("home|bob@h1".to_string()));
        let prompter = ScriptedPrompter::new(&["", ""], &[]);
        let launcher = launcher();
        let flow = PickFlow::new(&store, &selector, &prompter, &launcher);

        assert_eq!(flow.run().unwrap(), "");
        assert_eq!(*store.deleted.borrow(), vec!["home|bob@h1".to_string()]);
        assert!(prompter.said_line_containing("deleted successfully"));
    }

    #[test]
    fn delete_declined_by_explicit_no() {
        for answer in ["no", "N", " No "] {
            let store = FakeStore::with_keys(&["home|bob@h1"]);
            let selector = FixedSelector(Intent::Delete("home|bob@h1".to_string()));
            let prompter = ScriptedPrompter::new(&[answer, ""], &[]);
            let launcher = launcher();
            let flow = PickFlow::new(&store, &selector, &prompter, &launcher);

            assert_eq!(flow.run().unwrap(), "");
            assert!(store.deleted.borrow().is_empty(), "answer {answer:?}");
            assert!(prompter.said_line_containing("Deletion cancelled"));
        }
    }

    #[test]
    fn delete_of_unknown_entry_fails() {
        let store = FakeStore::with_keys(&["home|bob@h1"]);
        let selector = FixedSelector(Intent::Delete("ghost".to_string()));
        let prompter = ScriptedPrompter::default();
        let launcher = launcher();
        let flow = PickFlow::new(&store, &selector, &prompter, &launcher);

        assert!(matches!(flow.run(), Err(PickError::UnknownEntry(k)) if k == "ghost"));
        assert!(store.deleted.borrow().is_empty());
    }

    #[test]
    fn cancel_and_empty_intents_do_nothing() {
        let store = FakeStore::with_keys(&["home|bob@h1"]);
        let prompter = ScriptedPrompter::default();
        let launcher = launcher();
        for intent in [
            Intent::Cancel,
            Intent::Create(String::new()),
            Intent::Delete(String::new()),
        ] {
            let selector = FixedSelector(intent);
            let flow = PickFlow::new(&store, &selector, &prompter, &launcher);
            assert_eq!(flow.run().unwrap(), "");
        }
        assert!(prompter.asked.borrow().is_empty());
    }

    #[test]
    fn list_failure_is_reported_once() {
        let store = FakeStore {
            fail_list: true,
            ..Default::default()
        };
        let selector = FixedSelector(Intent::Cancel);
        let prompter = ScriptedPrompter::new(&[""], &[]);
        let launcher = launcher();
        let flow = PickFlow::new(&store, &selector, &prompter, &launcher);

        assert_eq!(flow.run_to_completion(), "");
        assert_eq!(prompter.said.borrow().len(), 1);
        assert!(prompter.said_line_containing("dump failed"));
    }

    #[test]
    fn interrupt_exits_without_pause() {
        let store = FakeStore::default();
        let selector = FixedSelector(Intent::Create("office".to_string()));
        let prompter = ScriptedPrompter::default();
        let launcher = launcher();
        let flow = PickFlow::new(&store, &selector, &prompter, &launcher);

        assert_eq!(flow.run_to_completion(), "");
        assert!(!prompter.paused());
        assert!(!prompter.said_line_containing("Error"));
    }

    #[test]
    fn unexpected_errors_are_labelled() {
        struct BrokenSelector;
        impl Selector for BrokenSelector {
            fn select(&self, _keys: &[String]) -> Result<Intent, PickError> {
                Err(std::io::Error::other("pipe closed").into())
            }
        }
        let store = FakeStore::default();
        let prompter = ScriptedPrompter::new(&[""], &[]);
        let launcher = launcher();
        let flow = PickFlow::new(&store, &BrokenSelector, &prompter, &launcher);

        assert_eq!(flow.run_to_completion(), "");
        assert!(prompter.said_line_containing("❌ Unexpected error: io error: pipe closed"));
        assert!(prompter.paused());
    }

    #[test]
    fn confirmation_defaults_to_delete() {
        assert!(confirms_delete(""));
        assert!(confirms_delete("yes"));
        assert!(confirms_delete("nope"));
        assert!(!confirms_delete("n"));
        assert!(!confirms_delete("NO"));
    }
}
