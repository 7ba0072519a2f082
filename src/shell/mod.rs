use std::sync::Arc;

use tracing::{debug, error};

mod approval;

pub use approval::{parse_decision, Approval, CommandApproval};

use crate::{
    conversation::{ConversationHistory, Message},
    core::{Config, ConfigStore, PromptMode, SessionContext, Settings, SettingsPatch},
    error::{CortexError, ModelError},
    highlight::Palette,
    input::{Console, PromptInput},
    model::{RequestResponse, ResponseGateway, ResultResponse},
    process::{CommandRunner, Execution},
};

/// What a line of input asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action<'a> {
    Empty,
    Exit,
    DirectCommand(&'a str),
    ChatRequest(&'a str),
}

/// `exit` ends the session in either mode; everything else depends on the
/// prompt mode.
pub fn classify(line: &str, mode: PromptMode) -> Action<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Action::Empty;
    }
    if trimmed.eq_ignore_ascii_case("exit") {
        return Action::Exit;
    }
    match mode {
        PromptMode::Command => Action::DirectCommand(line),
        PromptMode::Chat => Action::ChatRequest(line),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Exit,
}

pub struct Session {
    console: Box<dyn Console>,
    runner: Box<dyn CommandRunner>,
    gateway: ResponseGateway,
    context: Arc<SessionContext>,
    history: ConversationHistory,
    /// Effective settings, including command line overrides.
    settings: Settings,
    /// Config as stored on disk.
    config: Config,
    store: ConfigStore,
    palette: Palette,
}

impl Session {
    pub fn new(
        config: Config,
        store: ConfigStore,
        gateway: ResponseGateway,
        context: Arc<SessionContext>,
        console: Box<dyn Console>,
        runner: Box<dyn CommandRunner>,
        palette: Palette,
    ) -> Self {
        Session {
            console,
            runner,
            gateway,
            context,
            history: ConversationHistory::new(),
            settings: config.settings.clone(),
            config,
            store,
            palette,
        }
    }

    /// Overrides the model for this session only.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.settings.model = model.into();
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn run(&mut self) -> Result<(), CortexError> {
        self.say("Welcome, I am your helpful shell assistant **Cortex**!");
        self.say("Type `exit` to end the session!");

        while self.step()? == Step::Continue {}
        Ok(())
    }

    /// Reads one prompt and acts on it.
    pub fn step(&mut self) -> Result<Step, CortexError> {
        let mode = self.context.mode();
        match self.console.read_prompt(mode, &self.settings)? {
            PromptInput::Line(line) => Ok(self.handle_line(mode, &line)),
            PromptInput::ModeSwitched => Ok(Step::Continue),
            PromptInput::Interrupted | PromptInput::Eof => {
                self.farewell();
                Ok(Step::Exit)
            }
        }
    }

    pub fn handle_line(&mut self, mode: PromptMode, line: &str) -> Step {
        match classify(line, mode) {
            Action::Empty => Step::Continue,
            Action::Exit => {
                self.farewell();
                Step::Exit
            }
            Action::DirectCommand(command_line) => {
                self.run_command(command_line);
                Step::Continue
            }
            Action::ChatRequest(text) => {
                if let Err(e) = self.talk(text) {
                    self.report(&e);
                }
                Step::Continue
            }
        }
    }

    /// Runs a command, records it for the model and optionally has the model
    /// explain the result.
    pub fn run_command(&mut self, command_line: &str) -> Execution {
        let execution = self.runner.execute(self.settings.shell, command_line);
        self.record(Message::execution(command_line, &execution.output));

        if self.settings.explain {
            if let Err(e) = self.explain() {
                self.report(&CortexError::from(e));
            }
        }

        execution
    }

    fn talk(&mut self, text: &str) -> Result<(), CortexError> {
        self.record(Message::user(text));

        let response: RequestResponse = self
            .gateway
            .request(self.history.snapshot(), &self.settings)?;
        self.say(&response.message);

        if let Some(patch) = &response.settings_patch {
            self.apply_patch(patch);
        }

        self.propose_and_run(response.command_lines())?;
        Ok(())
    }

    fn explain(&mut self) -> Result<(), ModelError> {
        let response: ResultResponse = self
            .gateway
            .request(self.history.snapshot(), &self.settings)?;
        self.say(&response.message);
        Ok(())
    }

    fn apply_patch(&mut self, patch: &SettingsPatch) {
        if patch.is_empty() {
            return;
        }

        self.settings.apply(patch);
        self.config.settings.apply(patch);
        debug!(?patch, "settings patched by model");

        if let Err(e) = self.store.save(&self.config) {
            error!(
                path = %self.store.paths().config_path.display(),
                "failed to persist settings: {e}"
            );
            println!("{} {}", self.palette.error("Error:"), e);
        }

        let summary = self.settings.summary();
        println!("{}", self.palette.muted(&summary));
        self.record(Message::user(format!("Settings updated. {summary}")));
    }

    /// Appends to history, which never holds more than `history_size`
    /// messages afterwards.
    fn record(&mut self, message: Message) {
        self.history.append(message);
        self.history.trim(self.settings.history_size);
    }

    /// Prints an assistant message and records it.
    fn say(&mut self, message: &str) {
        if !message.is_empty() {
            println!(
                "{} {}",
                self.palette.assistant("CORTEX:"),
                self.palette.render_markdown(message)
            );
            self.record(Message::assistant(message));
        }
    }

    fn farewell(&self) {
        println!("{} Bye!", self.palette.assistant("CORTEX:"));
    }

    fn report(&self, e: &CortexError) {
        debug!("exchange failed: {e:?}");
        println!("{} {}", self.palette.error("Error:"), e);
    }
}
