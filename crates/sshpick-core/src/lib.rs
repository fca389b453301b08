pub mod clipboard;
pub mod codec;
pub mod error;
pub mod flow;
pub mod prompt;
pub mod selector;

pub use clipboard::{Clipboard, SystemClipboard};
pub use codec::{decode, display_name, encode, Profile};
pub use error::PickError;
pub use flow::PickFlow;
pub use prompt::{restore_terminal, Prompter, TtyPrompter};
pub use selector::{interpret, FzfSelector, Intent, Selector};
