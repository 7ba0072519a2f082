use tracing::debug;

use super::Session;
use crate::conversation::Message;
use crate::core::OnError;
use crate::error::CortexError;

/// Where a batch of suggested commands ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Approval {
    /// Nothing was suggested.
    None,
    Approved,
    Declined,
}

/// `Some(true)` for yes, `Some(false)` for no, `None` for anything else.
pub fn parse_decision(answer: &str) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

pub trait CommandApproval {
    /// Shows the suggested command lines, asks whether to run them and runs
    /// them in order if allowed.
    fn propose_and_run(&mut self, command_lines: &[String]) -> Result<Approval, CortexError>;
}

impl CommandApproval for Session {
    fn propose_and_run(&mut self, command_lines: &[String]) -> Result<Approval, CortexError> {
        if command_lines.is_empty() {
            return Ok(Approval::None);
        }

        println!("{}", command_lines.join("\n"));

        let count = command_lines.len();
        let plural = if count > 1 { "s" } else { "" };
        let question = format!(
            "Do you want to run these command{plural}? ({}/{}): ",
            self.palette.success("yes"),
            self.palette.success("no")
        );

        let approved = loop {
            match self.console.read_answer(&question)? {
                // input closed
                None => break false,
                Some(answer) => {
                    if let Some(decision) = parse_decision(&answer) {
                        break decision;
                    }
                }
            }
        };

        if !approved {
            debug!(count, "suggested commands declined");
            self.record(Message::declined(count));
            if self.settings.explain {
                self.explain()?;
            }
            return Ok(Approval::Declined);
        }

        for (index, command_line) in command_lines.iter().enumerate() {
            let execution = self.run_command(command_line);

            if execution.is_error && self.config.session.on_error == OnError::Stop {
                let skipped = &command_lines[index + 1..];
                if !skipped.is_empty() {
                    let note = format!(
                        "Stopped after a failing command, skipped: {}",
                        skipped.join("; ")
                    );
                    println!("{}", self.palette.muted(&note));
                    self.record(Message::user(note));
                }
                break;
            }
        }

        Ok(Approval::Approved)
    }
}
