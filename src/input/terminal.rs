use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use rustyline::{
    error::ReadlineError, history::DefaultHistory, Cmd, ConditionalEventHandler, Editor, Event,
    EventContext, EventHandler, KeyEvent, RepeatCount,
};
use tracing::{debug, warn};

use super::completer::{FileIndex, PromptHelper, PromptLine};
use super::{Console, PromptInput};
use crate::core::{PromptMode, SessionContext, Settings};
use crate::error::CortexError;
use crate::process::git;

/// Ctrl-W: flip between command and chat mode and abort the pending read.
struct ModeToggle {
    context: Arc<SessionContext>,
}

impl ConditionalEventHandler for ModeToggle {
    fn handle(
        &self,
        _evt: &Event,
        _n: RepeatCount,
        _positive: bool,
        _ctx: &EventContext,
    ) -> Option<Cmd> {
        let mode = self.context.toggle_mode();
        debug!(%mode, "prompt mode toggled");
        Some(Cmd::Interrupt)
    }
}

pub struct Terminal {
    editor: Editor<PromptHelper, DefaultHistory>,
    context: Arc<SessionContext>,
}

impl Terminal {
    pub fn new(context: Arc<SessionContext>, helper: PromptHelper) -> Result<Self, CortexError> {
        let mut editor = Editor::<PromptHelper, DefaultHistory>::new()?;
        editor.set_helper(Some(helper));
        editor.bind_sequence(
            KeyEvent::ctrl('W'),
            EventHandler::Conditional(Box::new(ModeToggle {
                context: Arc::clone(&context),
            })),
        );

        Ok(Terminal { editor, context })
    }

    fn prompt_line(mode: PromptMode) -> PromptLine {
        PromptLine {
            mode,
            branch: git::current_branch(),
            cwd: env::current_dir()
                .map(|dir| dir.display().to_string())
                .unwrap_or_default(),
        }
    }
}

impl Console for Terminal {
    fn read_prompt(
        &mut self,
        mode: PromptMode,
        settings: &Settings,
    ) -> Result<PromptInput, CortexError> {
        let prompt = Self::prompt_line(mode);
        let files = if mode == PromptMode::Command && settings.autocomplete {
            FileIndex::scan(Path::new("."))
        } else {
            FileIndex::empty()
        };

        if let Some(helper) = self.editor.helper_mut() {
            helper.set_prompt(prompt.clone());
            helper.set_files(files);
        }

        match self.editor.readline(&prompt.plain()) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(e) = self.editor.add_history_entry(line.as_str()) {
                        warn!("couldn't add to input history: {e}");
                    }
                }
                Ok(PromptInput::Line(line))
            }
            Err(ReadlineError::Interrupted) => {
                if self.context.take_mode_switch() {
                    Ok(PromptInput::ModeSwitched)
                } else {
                    Ok(PromptInput::Interrupted)
                }
            }
            Err(ReadlineError::Eof) => Ok(PromptInput::Eof),
            Err(e) => Err(e.into()),
        }
    }

    fn read_answer(&mut self, question: &str) -> Result<Option<String>, CortexError> {
        let mut stdout = io::stdout();
        write!(stdout, "{question}")?;
        stdout.flush()?;

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer)? == 0 {
            return Ok(None);
        }
        Ok(Some(answer))
    }
}
