mod path;

use std::borrow::Cow;

use rustyline::{
    completion::{Completer, Pair},
    highlight::Highlighter,
    hint::Hinter,
    validate::Validator,
    Context, Helper,
};

pub use path::FileIndex;

use crate::core::PromptMode;
use crate::highlight::Palette;

/// The parts of a prompt: mode label, git branch and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptLine {
    pub mode: PromptMode,
    pub branch: Option<String>,
    pub cwd: String,
}

impl PromptLine {
    pub fn plain(&self) -> String {
        match &self.branch {
            Some(branch) => format!("{} ({}) {}> ", self.mode, branch, self.cwd),
            None => format!("{} {}> ", self.mode, self.cwd),
        }
    }

    pub fn styled(&self, palette: &Palette) -> String {
        let branch = self
            .branch
            .as_ref()
            .map(|b| format!("{} ", palette.success(&format!("({b})"))))
            .unwrap_or_default();
        format!(
            "{} {}{}{} ",
            palette.mode(self.mode.label()),
            branch,
            palette.muted(&self.cwd),
            palette.success(">")
        )
    }
}

#[derive(Clone)]
pub struct PromptHelper {
    palette: Palette,
    prompt: Option<PromptLine>,
    files: FileIndex,
}

impl PromptHelper {
    pub fn new(palette: Palette) -> Self {
        PromptHelper {
            palette,
            prompt: None,
            files: FileIndex::empty(),
        }
    }

    pub fn set_prompt(&mut self, prompt: PromptLine) {
        self.prompt = Some(prompt);
    }

    pub fn set_files(&mut self, files: FileIndex) {
        self.files = files;
    }
}

/// Byte offset where the word ending at `pos` starts.
fn word_start(line: &str, pos: usize) -> usize {
    line[..pos]
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0)
}

impl Helper for PromptHelper {}

impl Highlighter for PromptHelper {
    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        _default: bool,
    ) -> Cow<'b, str> {
        match &self.prompt {
            Some(line) if line.plain() == prompt => Cow::Owned(line.styled(&self.palette)),
            _ => Cow::Borrowed(prompt),
        }
    }
}

impl Hinter for PromptHelper {
    type Hint = String;
}

impl Validator for PromptHelper {}

impl Completer for PromptHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = word_start(line, pos);
        Ok((start, self.files.complete(&line[start..pos])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_with_branch() {
        let line = PromptLine {
            mode: PromptMode::Chat,
            branch: Some("main".to_string()),
            cwd: "/home/me/project".to_string(),
        };
        assert_eq!(line.plain(), "CHAT (main) /home/me/project> ");
        assert_eq!(line.styled(&Palette::plain()), line.plain());
    }

    #[test]
    fn prompt_outside_repository() {
        let line = PromptLine {
            mode: PromptMode::Command,
            branch: None,
            cwd: "/tmp".to_string(),
        };
        assert_eq!(line.plain(), "RUN /tmp> ");
        assert_eq!(line.styled(&Palette::plain()), line.plain());
    }

    #[test]
    fn word_start_finds_last_word() {
        assert_eq!(word_start("cat src/ma", 10), 4);
        assert_eq!(word_start("README", 6), 0);
        assert_eq!(word_start("ls ", 3), 3);
        let accented = "ls  déjà";
        assert_eq!(word_start(accented, accented.len()), 4);
    }
}
