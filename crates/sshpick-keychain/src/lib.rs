pub mod dump;
pub mod store;

pub use dump::parse_dump;
pub use store::{KeychainStore, SecretError, SecretStore};
