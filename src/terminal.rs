//! Line-oriented terminal I/O.
//!
//! Everything the browser needs from the terminal goes through the
//! [`Terminal`] trait so that paging, prompting and commands can be driven
//! by a scripted terminal in tests.

use std::io::{self, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{self, disable_raw_mode, enable_raw_mode, SetTitle};

use crate::app::Result;

const FALLBACK_SIZE: (usize, usize) = (80, 24);

pub trait Terminal {
    /// Read one line after showing `prompt`.
    ///
    /// Returns `Ok(None)` when the user interrupts with Ctrl-C or Ctrl-D.
    /// With `masked` set, typed characters are not echoed.
    fn read_line(&self, prompt: &str, masked: bool) -> Result<Option<String>>;

    /// Terminal size as (columns, rows).
    fn size(&self) -> (usize, usize);

    /// Write already-styled text as is.
    fn write(&self, text: &str) -> Result<()>;

    fn set_title(&self, title: &str) -> Result<()>;

    fn writeln(&self, line: &str) -> Result<()> {
        self.write(line)?;
        self.write("\n")
    }
}

/// The real terminal, driven through crossterm.
#[derive(Debug, Default)]
pub struct CrosstermTerminal;

impl CrosstermTerminal {
    pub fn new() -> Self {
        Self
    }

    fn read_raw(&self, masked: bool) -> Result<Option<String>> {
        let mut stdout = io::stdout();
        let mut line = String::new();

        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match LineKey::from(key) {
                LineKey::Submit => {
                    write!(stdout, "\r\n")?;
                    stdout.flush()?;
                    return Ok(Some(line));
                }
                LineKey::Cancel => {
                    write!(stdout, "\r\n")?;
                    stdout.flush()?;
                    return Ok(None);
                }
                LineKey::Erase => {
                    if line.pop().is_some() {
                        write!(stdout, "\x08 \x08")?;
                    }
                }
                LineKey::Insert(c) => {
                    line.push(c);
                    if masked {
                        write!(stdout, "*")?;
                    } else {
                        write!(stdout, "{}", c)?;
                    }
                }
                LineKey::Ignore => {}
            }
            stdout.flush()?;
        }
    }
}

impl Terminal for CrosstermTerminal {
    fn read_line(&self, prompt: &str, masked: bool) -> Result<Option<String>> {
        self.write(prompt)?;
        enable_raw_mode()?;
        let result = self.read_raw(masked);
        disable_raw_mode()?;
        result
    }

    fn size(&self) -> (usize, usize) {
        terminal::size()
            .map(|(cols, rows)| (cols as usize, rows as usize))
            .unwrap_or(FALLBACK_SIZE)
    }

    fn write(&self, text: &str) -> Result<()> {
        let mut stdout = io::stdout();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }

    fn set_title(&self, title: &str) -> Result<()> {
        execute!(io::stdout(), SetTitle(title))?;
        Ok(())
    }
}

/// What a key press does to the line being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKey {
    Submit,
    Cancel,
    Erase,
    Insert(char),
    Ignore,
}

impl From<KeyEvent> for LineKey {
    fn from(key: KeyEvent) -> Self {
        match key.code {
            KeyCode::Enter => LineKey::Submit,
            KeyCode::Char('c') | KeyCode::Char('d')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                LineKey::Cancel
            }
            KeyCode::Esc => LineKey::Cancel,
            KeyCode::Backspace => LineKey::Erase,
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => LineKey::Insert(c),
            _ => LineKey::Ignore,
        }
    }
}
