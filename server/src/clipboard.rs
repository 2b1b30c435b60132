use crate::error::ClipboardError;
use std::sync::{Mutex, PoisonError};

/// Destination for the copy action.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Keeps the most recently copied text. The HTTP surface returns that text to
/// the browser, which performs the actual system copy.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    last: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn last(&self) -> Option<String> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(text.to_owned());
        Ok(())
    }
}

/// Always refuses, like a browser that has not granted clipboard permission.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeniedClipboard;

impl Clipboard for DeniedClipboard {
    fn write_text(&self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::PermissionDenied)
    }
}
