//! Key input and scrollback-safe redraw accounting.
//!
//! The selector renders into the normal scrollback (no alternate
//! screen), so each frame counts the terminal rows it printed and
//! erases exactly that many before the next one. Raw mode is held only
//! while blocking on a key, which keeps ordinary line output working
//! between frames.

use std::collections::VecDeque;
use std::io::{stderr, Write};

use crossterm::cursor::{MoveToColumn, MoveUp};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, disable_raw_mode, enable_raw_mode, Clear, ClearType};
use crossterm::queue;

use sidekick_core::error::Result;

/// A key event the selector dispatches on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Up,
    Down,
}

impl Key {
    /// Label used in the help screen.
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Key::Char(c) => c.to_string(),
            Key::Enter => "<Enter>".to_string(),
            Key::Backspace => "<Backspace>".to_string(),
            Key::Up => "<Arrow Up>".to_string(),
            Key::Down => "<Arrow Down>".to_string(),
        }
    }
}

struct RawModeGuard;

impl RawModeGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Blocks until one usable key event arrives.
///
/// Ctrl-C is fail-fast: the whole process exits with code 1.
pub fn read_key() -> Result<Key> {
    let _guard = RawModeGuard::new()?;
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            let _ = disable_raw_mode();
            std::process::exit(1);
        }
        match key.code {
            KeyCode::Char(c) => return Ok(Key::Char(c)),
            KeyCode::Enter => return Ok(Key::Enter),
            KeyCode::Backspace => return Ok(Key::Backspace),
            KeyCode::Up => return Ok(Key::Up),
            KeyCode::Down => return Ok(Key::Down),
            _ => {}
        }
    }
}

/// Where frames take their keys from: a pre-recorded sequence first,
/// then the real terminal.
pub struct KeySource {
    queue: VecDeque<Key>,
}

impl KeySource {
    #[must_use]
    pub fn new(sequence: &str) -> Self {
        let queue = sequence
            .chars()
            .map(|c| match c {
                '\r' | '\n' => Key::Enter,
                '\x08' | '\x7f' => Key::Backspace,
                c => Key::Char(c),
            })
            .collect();
        Self { queue }
    }

    /// Rendering is suppressed while scripted keys remain.
    #[must_use]
    pub fn scripted(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn next(&mut self) -> Result<Key> {
        match self.queue.pop_front() {
            Some(key) => Ok(key),
            None => read_key(),
        }
    }
}

/// Current terminal width in columns, with a fallback for non-TTYs.
#[must_use]
pub fn window_width() -> usize {
    terminal::size().map_or(80, |(w, _)| w as usize).max(1)
}

/// Terminal rows one printed line occupies after wrapping. `len` is the
/// length of the *unformatted* text, so color escapes never distort the
/// count.
#[must_use]
pub fn wrapped_rows(len: usize, width: usize) -> usize {
    let mut rows = 1 + len / width;
    if len % width == 0 {
        rows -= 1;
    }
    rows
}

/// Erases the rows the previous frame printed: cursor up, then clear
/// from the line start downwards.
pub fn erase_rows(rows: usize) -> Result<()> {
    let mut err = stderr();
    if rows > 0 {
        queue!(err, MoveUp(rows.min(u16::MAX as usize) as u16))?;
    }
    queue!(err, MoveToColumn(0), Clear(ClearType::FromCursorDown))?;
    err.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_rows() {
        assert_eq!(wrapped_rows(0, 80), 0);
        assert_eq!(wrapped_rows(1, 80), 1);
        assert_eq!(wrapped_rows(79, 80), 1);
        assert_eq!(wrapped_rows(80, 80), 1);
        assert_eq!(wrapped_rows(81, 80), 2);
        assert_eq!(wrapped_rows(160, 80), 2);
        assert_eq!(wrapped_rows(161, 80), 3);
    }

    #[test]
    fn test_key_source_playback_then_exhaustion() {
        let mut keys = KeySource::new("aj\r\x7f");
        assert!(keys.scripted());
        assert_eq!(keys.next().unwrap(), Key::Char('a'));
        assert_eq!(keys.next().unwrap(), Key::Char('j'));
        assert_eq!(keys.next().unwrap(), Key::Enter);
        assert_eq!(keys.next().unwrap(), Key::Backspace);
        assert!(!keys.scripted());
    }

    #[test]
    fn test_key_labels() {
        assert_eq!(Key::Char('d').label(), "d");
        assert_eq!(Key::Enter.label(), "<Enter>");
        assert_eq!(Key::Up.label(), "<Arrow Up>");
    }
}
