mod completer;
mod terminal;

pub use completer::{FileIndex, PromptHelper, PromptLine};
pub use terminal::Terminal;

use crate::core::{PromptMode, Settings};
use crate::error::CortexError;

/// Outcome of reading one prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptInput {
    Line(String),
    /// The mode key binding aborted the read.
    ModeSwitched,
    Interrupted,
    Eof,
}

/// Where the session reads from.
pub trait Console {
    fn read_prompt(&mut self, mode: PromptMode, settings: &Settings)
        -> Result<PromptInput, CortexError>;

    /// Blocking line read for a question. `None` once input is closed.
    fn read_answer(&mut self, question: &str) -> Result<Option<String>, CortexError>;
}
