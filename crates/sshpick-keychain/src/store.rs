use crate::dump::parse_dump;
use keyring::Entry;
use std::process::Command;
use zeroize::Zeroizing;

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("error retrieving keychain keys: {0}")]
    Query(String),
    #[error("error adding SSH connection to keychain: {0}")]
    Write(String),
    #[error("an entry named '{0}' already exists")]
    Duplicate(String),
    #[error("could not retrieve password for '{key}': {reason}")]
    Read { key: String, reason: String },
    #[error("no password stored for '{0}'")]
    NotFound(String),
    #[error("error deleting SSH connection from keychain: {0}")]
    Delete(String),
}

/// Storage for profile secrets, keyed by encoded service key.
pub trait SecretStore {
    /// Every stored key under the configured account. No entries is `Ok(vec![])`.
    fn list_keys(&self) -> Result<Vec<String>, SecretError>;
    fn add_entry(&self, key: &str, secret: &Zeroizing<String>) -> Result<(), SecretError>;
    fn get_secret(&self, key: &str) -> Result<Zeroizing<String>, SecretError>;
    fn delete_entry(&self, key: &str) -> Result<(), SecretError>;
}

#[derive(Clone, Debug)]
pub struct KeychainStore {
    account: String,
    dump_program: String,
}

impl KeychainStore {
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            dump_program: "security".to_string(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry, keyring::Error> {
        Entry::new(key, &self.account)
    }
}

impl SecretStore for KeychainStore {
    fn list_keys(&self) -> Result<Vec<String>, SecretError> {
        let output = Command::new(&self.dump_program)
            .arg("dump-keychain")
            .output()
            .map_err(|e| SecretError::Query(format!("{}: {}", self.dump_program, e)))?;
        if !output.status.success() {
            return Err(SecretError::Query(format!(
                "{} dump-keychain exited with {}: {}",
                self.dump_program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        let dump = String::from_utf8_lossy(&output.stdout);
        let keys = parse_dump(&dump, &self.account);
        tracing::debug!(account = %self.account, count = keys.len(), "listed keychain entries");
        Ok(keys)
    }

    fn add_entry(&self, key: &str, secret: &Zeroizing<String>) -> Result<(), SecretError> {
        let entry = self
            .entry(key)
            .map_err(|e| SecretError::Write(e.to_string()))?;
        match entry.get_password() {
            Ok(_) => return Err(SecretError::Duplicate(key.to_string())),
            Err(keyring::Error::NoEntry) => {}
            Err(e) => return Err(SecretError::Write(e.to_string())),
        }
        entry
            .set_password(secret)
            .map_err(|e| SecretError::Write(e.to_string()))?;
        tracing::info!(account = %self.account, key, "added keychain entry");
        Ok(())
    }

    fn get_secret(&self, key: &str) -> Result<Zeroizing<String>, SecretError> {
        let read_err = |e: keyring::Error| SecretError::Read {
            key: key.to_string(),
            reason: e.to_string(),
        };
        let entry = self.entry(key).map_err(read_err)?;
        match entry.get_password() {
            Ok(value) => Ok(Zeroizing::new(value)),
            Err(keyring::Error::NoEntry) => Err(SecretError::NotFound(key.to_string())),
            Err(e) => Err(read_err(e)),
        }
    }

    fn delete_entry(&self, key: &str) -> Result<(), SecretError> {
        let entry = self
            .entry(key)
            .map_err(|e| SecretError::Delete(e.to_string()))?;
        entry.delete_password().map_err(|e| match e {
            keyring::Error::NoEntry => SecretError::Delete(format!("'{}' does not exist", key)),
            other => SecretError::Delete(other.to_string()),
        })?;
        tracing::info!(account = %self.account, key, "deleted keychain entry");
        Ok(())
    }
}
