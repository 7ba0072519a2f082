#![cfg(unix)]

// Changes the process working directory, so it lives in its own test binary.

use std::env;
use std::path::Path;

use cortex::core::ShellKind;
use cortex::highlight::Palette;
use cortex::process::{CommandRunner, ShellExecutor};

#[test]
fn cd_is_followed_by_later_commands() {
    let mut executor = ShellExecutor::new(Palette::plain());

    let changed = executor.execute(ShellKind::Bash, "cd /");
    assert_eq!(changed.output, "");
    assert!(!changed.is_error);
    assert_eq!(env::current_dir().expect("cwd"), Path::new("/"));

    let listed = executor.execute(ShellKind::Bash, "pwd");
    assert_eq!(listed.output, "/");
}
