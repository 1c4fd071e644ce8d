//! Floating assistant: open/closed flag plus an append-only transcript.

use retention_client::{ApiError, Backend};
use retention_core::ChatMessage;
use tracing::{debug, error};

pub const GREETING: &str =
    "Hello! I am RetentionAI. How can I help you analyze the workforce today?";
pub const CHAT_ERROR_REPLY: &str = "Sorry, I encountered an error connecting to the AI.";
pub const DEFAULT_HISTORY_WINDOW: usize = 5;

/// A request ready to go out: the new message and the context sent with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTurn {
    pub message: String,
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Clone)]
pub struct ChatWidget {
    open: bool,
    messages: Vec<ChatMessage>,
    input: String,
    busy: bool,
    window: usize,
}

impl ChatWidget {
    pub fn new() -> Self {
        Self::with_window(DEFAULT_HISTORY_WINDOW)
    }

    pub fn with_window(window: usize) -> Self {
        Self {
            open: false,
            messages: vec![ChatMessage::assistant(GREETING)],
            input: String::new(),
            busy: false,
            window,
        }
    }

    /// Continue a saved transcript. An empty one starts from the greeting.
    pub fn resume(window: usize, messages: Vec<ChatMessage>) -> Self {
        let mut widget = Self::with_window(window);
        if !messages.is_empty() {
            widget.messages = messages;
        }
        widget
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn can_send(&self) -> bool {
        !self.busy && !self.input.trim().is_empty()
    }

    /// The bounded suffix of the transcript sent as context. The transcript
    /// itself is never pruned.
    pub fn trailing_context(&self) -> &[ChatMessage] {
        let start = self.messages.len().saturating_sub(self.window);
        &self.messages[start..]
    }

    /// Append the user's message and lock input. Context is taken before the
    /// append, so it never includes the message being sent.
    pub fn begin_send(&mut self) -> Option<PendingTurn> {
        if !self.can_send() {
            return None;
        }
        let history = self.trailing_context().to_vec();
        let message = std::mem::take(&mut self.input);
        self.messages.push(ChatMessage::user(message.clone()));
        self.busy = true;
        debug!(context = history.len(), "Chat turn started");
        Some(PendingTurn { message, history })
    }

    pub fn finish(&mut self, reply: Result<String, ApiError>) {
        self.busy = false;
        match reply {
            Ok(text) => self.messages.push(ChatMessage::assistant(text)),
            Err(e) => {
                error!(error = %e, "Chat request failed");
                self.messages.push(ChatMessage::assistant(CHAT_ERROR_REPLY));
            }
        }
    }

    /// Send the current input. Returns `false` for a no-op (empty input or busy).
    pub async fn send(&mut self, backend: &dyn Backend) -> bool {
        let Some(turn) = self.begin_send() else {
            return false;
        };
        let reply = backend.chat(&turn.message, &turn.history).await;
        self.finish(reply);
        true
    }
}

impl Default for ChatWidget {
    fn default() -> Self {
        Self::new()
    }
}
