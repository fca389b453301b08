use crate::error::PickError;

pub trait Clipboard {
    fn copy(&self, text: &str) -> Result<(), PickError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn copy(&self, text: &str) -> Result<(), PickError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| PickError::Clipboard(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| PickError::Clipboard(e.to_string()))
    }
}
