use std::fmt;
use std::io::Write;
use std::process::{Command, Stdio};

use tracing::debug;

/// External programs that accept clipboard contents on stdin, tried in order.
#[cfg(target_os = "macos")]
const CLIPBOARD_PROGRAMS: &[(&str, &[&str])] = &[("pbcopy", &[])];
#[cfg(target_os = "windows")]
const CLIPBOARD_PROGRAMS: &[(&str, &[&str])] = &[("cmd", &["/C", "clip"])];
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const CLIPBOARD_PROGRAMS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    NoProgram,
    Failed(String),
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardError::NoProgram => {
                write!(f, "No clipboard program found (install wl-copy, xclip, or xsel)")
            }
            ClipboardError::Failed(program) => write!(f, "Clipboard program `{program}` failed"),
        }
    }
}

impl std::error::Error for ClipboardError {}

pub fn copy_to_clipboard(text: &str) -> Result<(), ClipboardError> {
    copy_with(CLIPBOARD_PROGRAMS, text)
}

fn copy_with(programs: &[(&str, &[&str])], text: &str) -> Result<(), ClipboardError> {
    let mut last_failure = None;
    for (program, args) in programs {
        match pipe_into(program, args, text) {
            Ok(true) => return Ok(()),
            Ok(false) => last_failure = Some(ClipboardError::Failed(program.to_string())),
            Err(err) => debug!(program, error = %err, "clipboard program unavailable"),
        }
    }
    Err(last_failure.unwrap_or(ClipboardError::NoProgram))
}

/// `Err` when the program cannot be spawned, `Ok(false)` when it ran and failed.
fn pipe_into(program: &str, args: &[&str], input: &str) -> std::io::Result<bool> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        // A program that exits early closes the pipe; its exit status decides.
        let _ = stdin.write_all(input.as_bytes());
    }
    Ok(child.wait()?.success())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_programs_report_no_program() {
        let programs: &[(&str, &[&str])] = &[("ponder-no-such-clipboard-tool", &[])];
        assert_eq!(copy_with(programs, "text"), Err(ClipboardError::NoProgram));
    }

    #[cfg(unix)]
    #[test]
    fn failing_program_is_named() {
        let programs: &[(&str, &[&str])] = &[("false", &[])];
        assert_eq!(
            copy_with(programs, "text"),
            Err(ClipboardError::Failed("false".to_string()))
        );
    }

    #[cfg(unix)]
    #[test]
    fn first_working_program_wins() {
        let programs: &[(&str, &[&str])] = &[("ponder-no-such-clipboard-tool", &[]), ("cat", &[])];
        assert_eq!(copy_with(programs, "text"), Ok(()));
    }
}
