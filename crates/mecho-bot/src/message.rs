use std::path::PathBuf;

use mecho_catalog::AwaitKey;
use mecho_fetch::ImageSource;

/// A chat message as seen by the bot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundMessage {
    pub conversation_id: String,
    pub user_id: String,
    /// Plain text of the message, images stripped.
    pub text: String,
    /// Attached images in message order.
    pub images: Vec<ImageSource>,
}

impl InboundMessage {
    pub fn text(
        conversation_id: impl Into<String>,
        user_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            user_id: user_id.into(),
            text: text.into(),
            images: Vec::new(),
        }
    }

    pub fn with_image(mut self, image: ImageSource) -> Self {
        self.images.push(image);
        self
    }

    pub fn first_image(&self) -> Option<&ImageSource> {
        self.images.first()
    }

    pub(crate) fn await_key(&self) -> AwaitKey {
        AwaitKey::new(&self.conversation_id, &self.user_id)
    }
}

/// What the bot wants sent back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    /// A stored blob to send as an image.
    Image(PathBuf),
}

/// Outcome of handling one message.
///
/// `Handled*` means the host should stop passing the event to other handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleResult {
    Handled(Reply),
    /// The message was ours but the operation failed; the text says why.
    HandledWithError(String),
    NotHandled,
}

impl HandleResult {
    pub fn text(text: impl Into<String>) -> Self {
        HandleResult::Handled(Reply::Text(text.into()))
    }

    pub fn is_handled(&self) -> bool {
        !matches!(self, HandleResult::NotHandled)
    }

    /// The reply or error text, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            HandleResult::Handled(Reply::Text(text)) | HandleResult::HandledWithError(text) => {
                Some(text)
            }
            _ => None,
        }
    }
}
