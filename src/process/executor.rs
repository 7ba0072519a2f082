use std::env;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tracing::{debug, warn};

use super::{CommandRunner, Execution};
use crate::core::ShellKind;
use crate::highlight::Palette;

/// Marks the line carrying the shell's final working directory.
pub const DIRECTORY_MARKER: &str = "__CORTEX_PWD__";

/// Runs command lines through the configured shell and follows the shell's
/// working directory.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    palette: Palette,
}

impl ShellExecutor {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    /// Appends a blank line and a marked line with the shell's working
    /// directory. The line is missing when the command ends the shell early.
    fn with_directory_report(shell: ShellKind, command_line: &str) -> String {
        match shell {
            ShellKind::Bash => format!(
                "{command_line}\nprintf '\\n{DIRECTORY_MARKER}%s\\n' \"$PWD\""
            ),
            ShellKind::Powershell => format!(
                "{command_line}\nWrite-Output ''\nWrite-Output \"{DIRECTORY_MARKER}$((Get-Location).Path)\""
            ),
        }
    }

    fn spawn(shell: ShellKind, command_line: &str) -> std::io::Result<Output> {
        Command::new(shell.program())
            .arg(shell.switch())
            .arg(Self::with_directory_report(shell, command_line))
            .stdin(Stdio::inherit())
            .output()
    }

    fn follow_directory(dir: &str) {
        let path = Path::new(dir);
        if env::current_dir().is_ok_and(|cwd| cwd == path) {
            return;
        }
        match env::set_current_dir(path) {
            Ok(()) => debug!(dir, "working directory changed"),
            Err(e) => warn!(dir, "failed to follow shell directory: {e}"),
        }
    }
}

impl CommandRunner for ShellExecutor {
    fn execute(&mut self, shell: ShellKind, command_line: &str) -> Execution {
        println!("{} {}", self.palette.success(">"), command_line);

        let output = match Self::spawn(shell, command_line) {
            Ok(output) => output,
            Err(e) => {
                warn!(shell = %shell, "failed to run command: {e}");
                println!("{} {}", self.palette.error("EXECUTION ERROR:"), e);
                return Execution {
                    output: format!("Execution error: {e}"),
                    is_error: true,
                };
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let (command_output, directory) = split_output(&stdout);

        if let Some(dir) = directory {
            Self::follow_directory(&dir);
        }

        if !command_output.is_empty() {
            println!("{command_output}");
        }

        let stderr = stderr.trim_end();
        if stderr.is_empty() {
            Execution {
                output: command_output,
                is_error: false,
            }
        } else {
            println!("{}", self.palette.stderr(stderr));
            Execution {
                output: stderr.to_string(),
                is_error: true,
            }
        }
    }
}

/// Splits shell stdout into the command's own output and the directory
/// report. Without a marked last line all of stdout is output.
pub fn split_output(stdout: &str) -> (String, Option<String>) {
    let mut lines: Vec<&str> = stdout.trim_end().lines().collect();

    let Some(directory) = lines
        .last()
        .and_then(|line| line.strip_prefix(DIRECTORY_MARKER))
        .map(str::to_string)
    else {
        return (lines.join("\n"), None);
    };
    lines.pop();

    // separator written before the directory
    if lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }

    (lines.join("\n"), Some(directory))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marked(dir: &str) -> String {
        format!("{DIRECTORY_MARKER}{dir}")
    }

    #[test]
    fn directory_only_output_is_empty() {
        let (output, dir) = split_output(&format!("{}\n", marked("/tmp")));
        assert_eq!(output, "");
        assert_eq!(dir.as_deref(), Some("/tmp"));
    }

    #[test]
    fn separator_and_directory_are_removed() {
        let stdout = format!("a.txt\nb.txt\n\n{}\n", marked("/home/me"));
        let (output, dir) = split_output(&stdout);
        assert_eq!(output, "a.txt\nb.txt");
        assert_eq!(dir.as_deref(), Some("/home/me"));
    }

    #[test]
    fn output_without_trailing_newline_is_kept() {
        let (output, dir) = split_output(&format!("no newline\n{}\n", marked("/srv")));
        assert_eq!(output, "no newline");
        assert_eq!(dir.as_deref(), Some("/srv"));
    }

    #[test]
    fn empty_stdout_has_no_directory() {
        assert_eq!(split_output(""), (String::new(), None));
        assert_eq!(split_output("\n\n  \n"), (String::new(), None));
    }

    #[test]
    fn unmarked_last_line_stays_in_output() {
        let (output, dir) = split_output("a.txt\nzzz\n");
        assert_eq!(output, "a.txt\nzzz");
        assert_eq!(dir, None);
    }

    #[test]
    fn windows_line_endings() {
        let stdout = format!("one\r\ntwo\r\n\r\n{}\r\n", marked("C:\\Users\\me"));
        let (output, dir) = split_output(&stdout);
        assert_eq!(output, "one\ntwo");
        assert_eq!(dir.as_deref(), Some("C:\\Users\\me"));
    }

    #[test]
    fn bash_suffix_reports_marked_pwd() {
        let wrapped = ShellExecutor::with_directory_report(ShellKind::Bash, "ls");
        assert_eq!(wrapped, "ls\nprintf '\\n__CORTEX_PWD__%s\\n' \"$PWD\"");
    }

    #[test]
    fn powershell_suffix_reports_marked_location() {
        let wrapped = ShellExecutor::with_directory_report(ShellKind::Powershell, "dir");
        assert!(wrapped.starts_with("dir\n"));
        assert!(wrapped.ends_with("\"__CORTEX_PWD__$((Get-Location).Path)\""));
    }
}
