use arboard::Clipboard;
use tracing::{debug, trace};

use crate::domain::PVError;

/// Destination for copied cell text.
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<(), PVError>;
}

/// System clipboard. Opened on first use, so a missing clipboard only
/// affects copying.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<Clipboard>,
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), PVError> {
        let mut clipboard = match self.inner.take() {
            Some(c) => c,
            None => Clipboard::new()?,
        };
        let result = clipboard.set_text(text.to_string());
        // Keep the handle alive, on X11 the content is owned by this process.
        self.inner = Some(clipboard);
        result.map_err(PVError::from)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied(String),
    Failed(String),
}

/// Best effort copy, errors end up in the outcome.
pub fn copy_text(sink: &mut dyn ClipboardSink, text: &str) -> CopyOutcome {
    trace!("Cell content: {}", text);
    match sink.set_text(text) {
        Ok(_) => {
            trace!("Copied cell content to clipboard.");
            CopyOutcome::Copied(text.to_string())
        }
        Err(e) => {
            debug!("Error copying to clipboard: {}", e);
            CopyOutcome::Failed(e.to_string())
        }
    }
}
