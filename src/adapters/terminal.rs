use crate::domain::ports::Terminal;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::collections::VecDeque;
use std::io::{self, BufRead, IsTerminal, Write};

/// The process's own stdin/stdout.
#[derive(Debug, Default)]
pub struct StdTerminal;

impl StdTerminal {
    pub fn new() -> Self {
        Self
    }
}

impl Terminal for StdTerminal {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        print!("{}: ", prompt);
        io::stdout().flush().ok()?;
        read_stdin_line()
    }

    fn read_secret(&mut self, prompt: &str) -> Option<String> {
        print!("{}: ", prompt);
        io::stdout().flush().ok()?;

        // Piped input has no keys to hide.
        if !io::stdin().is_terminal() {
            return read_stdin_line();
        }
        let Ok(guard) = RawMode::enable() else {
            return read_stdin_line();
        };
        let secret = read_hidden_keys(|| event::read().ok());
        drop(guard);

        println!();
        secret
    }

    fn write_line(&mut self, text: &str) {
        println!("{}", text);
    }
}

fn read_stdin_line() -> Option<String> {
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => {
            println!();
            None
        }
        Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
    }
}

/// Raw mode for the lifetime of the guard, so keys are not echoed.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Collects typed characters until Enter. Ctrl+C, Ctrl+D or a read error end input.
fn read_hidden_keys(mut next_event: impl FnMut() -> Option<Event>) -> Option<String> {
    let mut secret = String::new();
    loop {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            ..
        }) = next_event()?
        else {
            continue;
        };
        if kind != KeyEventKind::Press {
            continue;
        }
        if modifiers.contains(KeyModifiers::CONTROL) {
            match code {
                KeyCode::Char('c') | KeyCode::Char('d') => return None,
                _ => continue,
            }
        }
        match code {
            KeyCode::Enter => return Some(secret),
            KeyCode::Backspace => {
                secret.pop();
            }
            KeyCode::Char(c) => secret.push(c),
            _ => {}
        }
    }
}

/// Replays a fixed list of inputs and records everything shown.
///
/// Reads past the end of the script behave like the user closing input.
#[derive(Debug, Default, Clone)]
pub struct ScriptedTerminal {
    inputs: VecDeque<String>,
    transcript: String,
}

impl ScriptedTerminal {
    pub fn new<I, T>(inputs: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        Self {
            inputs: inputs.into_iter().map(|i| i.to_string()).collect(),
            transcript: String::new(),
        }
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn remaining_inputs(&self) -> usize {
        self.inputs.len()
    }
}

impl Terminal for ScriptedTerminal {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        let input = self.inputs.pop_front();
        match &input {
            Some(text) => self.transcript.push_str(&format!("{}: {}\n", prompt, text)),
            None => self.transcript.push_str(&format!("{}: \n", prompt)),
        }
        input
    }

    fn read_secret(&mut self, prompt: &str) -> Option<String> {
        let input = self.inputs.pop_front();
        self.transcript.push_str(&format!("{}: \n", prompt));
        input
    }

    fn write_line(&mut self, text: &str) {
        self.transcript.push_str(text);
        self.transcript.push('\n');
    }
}
