use std::fmt;
use std::io::{self, BufRead, IsTerminal, Write};

use ratatui::crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::crossterm::terminal::{disable_raw_mode, enable_raw_mode};

const API_KEY_PROMPT: &str = "Enter your API key: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiError {
    message: String,
}

impl UiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for UiError {}

impl From<io::Error> for UiError {
    fn from(err: io::Error) -> Self {
        UiError::new(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationChoice {
    Yes,
    No,
}

pub fn parse_confirmation(input: &str) -> Result<ConfirmationChoice, UiError> {
    match input.trim().to_lowercase().as_str() {
        "" | "n" | "no" => Ok(ConfirmationChoice::No),
        "y" | "yes" => Ok(ConfirmationChoice::Yes),
        _ => Err(UiError::new("Invalid confirmation response")),
    }
}

pub fn prompt_confirmation(question: &str) -> Result<ConfirmationChoice, UiError> {
    print!("{question} [y/N]: ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    parse_confirmation(&input)
}

/// Read the API key, masking it when stdin is a terminal.
pub fn prompt_api_key() -> Result<String, UiError> {
    let key = if io::stdin().is_terminal() {
        prompt_masked_input()?
    } else {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        line
    };
    let key = key.trim().to_string();
    if key.is_empty() {
        return Err(UiError::new("API key cannot be empty"));
    }
    Ok(key)
}

fn prompt_masked_input() -> Result<String, UiError> {
    let mut stdout = io::stdout();
    write!(stdout, "{API_KEY_PROMPT}")?;
    stdout.flush()?;

    enable_raw_mode()?;
    let result = read_masked(&mut stdout);
    let _ = disable_raw_mode();
    writeln!(stdout)?;
    result
}

fn read_masked(stdout: &mut io::Stdout) -> Result<String, UiError> {
    let mut buffer = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Enter => return Ok(buffer),
            KeyCode::Esc => return Err(UiError::new("Cancelled")),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Err(UiError::new("Cancelled"));
            }
            KeyCode::Backspace => {
                if buffer.pop().is_some() {
                    write!(stdout, "\u{8} \u{8}")?;
                }
            }
            KeyCode::Char(c) => {
                buffer.push(c);
                write!(stdout, "*")?;
            }
            _ => continue,
        }
        stdout.flush()?;
    }
}
