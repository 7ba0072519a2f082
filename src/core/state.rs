use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// How a raw line of input is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    Command,
    Chat,
}

impl PromptMode {
    pub fn label(self) -> &'static str {
        match self {
            PromptMode::Command => "RUN",
            PromptMode::Chat => "CHAT",
        }
    }
}

impl fmt::Display for PromptMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Status shared between the session loop, the key binding handler and the
/// busy indicator. The loop is the only writer of `busy`; the indicator
/// thread only reads it.
#[derive(Debug, Default)]
pub struct SessionContext {
    chat_mode: AtomicBool,
    mode_switched: AtomicBool,
    busy: AtomicBool,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> PromptMode {
        if self.chat_mode.load(Ordering::SeqCst) {
            PromptMode::Chat
        } else {
            PromptMode::Command
        }
    }

    pub fn set_mode(&self, mode: PromptMode) {
        self.chat_mode
            .store(mode == PromptMode::Chat, Ordering::SeqCst);
    }

    /// Flips the mode and remembers that the pending read was aborted for it.
    pub fn toggle_mode(&self) -> PromptMode {
        self.chat_mode.fetch_xor(true, Ordering::SeqCst);
        self.mode_switched.store(true, Ordering::SeqCst);
        self.mode()
    }

    /// True once per toggle, so an interrupted read can tell a mode switch
    /// apart from Ctrl-C.
    pub fn take_mode_switch(&self) -> bool {
        self.mode_switched.swap(false, Ordering::SeqCst)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn set_busy(&self, busy: bool) {
        self.busy.store(busy, Ordering::Release);
    }
}
