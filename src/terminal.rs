//! # Terminal
//!
//! Raw-mode lifecycle, escape-sequence decoding and window-size queries.
//! The low-level syscalls live in `sys` (the `unix` module); this module
//! turns them into the logical key vocabulary the rest of the editor
//! consumes.

use std::io::{self, BufRead, Read, Write};

use crate::ansi_escape::{CLEAR_SCREEN, DEVICE_STATUS_REPORT, MOVE_CURSOR_TO_START, REPOSITION_CURSOR_END};
use crate::error::Error;
use crate::sys;

/// A decoded keypress. Ctrl-letter combinations and Enter/Backspace arrive
/// as their raw byte value via `Char`, mirroring how a POSIX terminal
/// actually presents them (see `editor::ctrl_key`).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Key {
    Arrow(AKey),
    Page(PageKey),
    Home,
    End,
    Delete,
    Escape,
    Char(u8),
}

/// Enum of arrow keys.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AKey {
    Left,
    Right,
    Up,
    Down,
}

/// Enum of page keys.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PageKey {
    Up,
    Down,
}

/// Owns the raw-mode guard: restores the terminal's original mode (and
/// clears the screen) when dropped, on every exit path.
pub struct Terminal {
    orig_mode: sys::TermMode,
}

impl Terminal {
    /// Enter raw, character-at-a-time mode.
    pub fn enable_raw_mode() -> Result<Self, Error> { Ok(Self { orig_mode: sys::enable_raw_mode()? }) }

    /// Block until one byte arrives, then decode it (and, for an escape
    /// sequence, however many further bytes the sequence needs) into a
    /// logical key.
    pub fn read_key(&self) -> Result<Key, Error> {
        loop {
            let mut bytes = sys::stdin()?.bytes();
            match bytes.next().transpose()? {
                Some(b'\x1b') => return Self::decode_escape(&mut bytes),
                Some(a) => return Ok(Key::Char(a)),
                None => continue,
            }
        }
    }

    /// Decode the bytes following a leading ESC. A malformed or
    /// unrecognized sequence (including a bare ESC with nothing following
    /// within the read timeout) decodes as `Key::Escape`.
    fn decode_escape(bytes: &mut impl Iterator<Item = io::Result<u8>>) -> Result<Key, Error> {
        Ok(match bytes.next().transpose()? {
            Some(b'[') => match bytes.next().transpose()? {
                Some(b'A') => Key::Arrow(AKey::Up),
                Some(b'B') => Key::Arrow(AKey::Down),
                Some(b'C') => Key::Arrow(AKey::Right),
                Some(b'D') => Key::Arrow(AKey::Left),
                Some(b'H') => Key::Home,
                Some(b'F') => Key::End,
                Some(d @ b'0'..=b'8') => match (d, bytes.next().transpose()?) {
                    (c, Some(b'~')) if c == b'1' || c == b'7' => Key::Home,
                    (c, Some(b'~')) if c == b'4' || c == b'8' => Key::End,
                    (b'3', Some(b'~')) => Key::Delete,
                    (b'5', Some(b'~')) => Key::Page(PageKey::Up),
                    (b'6', Some(b'~')) => Key::Page(PageKey::Down),
                    _ => Key::Escape,
                },
                _ => Key::Escape,
            },
            Some(b'O') => match bytes.next().transpose()? {
                Some(b'H') => Key::Home,
                Some(b'F') => Key::End,
                _ => Key::Escape,
            },
            _ => Key::Escape,
        })
    }

    /// Query the window size as `(rows, cols)`. Prefers the `TIOCGWINSZ`
    /// ioctl; falls back to the cursor-position trick if that fails.
    pub fn window_size(&self) -> Result<(usize, usize), Error> {
        sys::get_window_size().or_else(|_| get_window_size_using_cursor())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = sys::set_term_mode(&self.orig_mode);
        print!("{CLEAR_SCREEN}{MOVE_CURSOR_TO_START}");
        let _ = io::stdout().flush();
    }
}

/// Obtain the window size using the cursor position.
///
/// This function moves the cursor to the bottom-right using ANSI escape
/// sequence `\x1b[999C\x1b[999B`, then requests the cursor position using
/// ANSI escape sequence `\x1b[6n`. After this sequence is sent, the next
/// characters on stdin should be `\x1b[{row};{column}R`.
///
/// It is used as an alternative method if `sys::get_window_size()` returns
/// an error.
fn get_window_size_using_cursor() -> Result<(usize, usize), Error> {
    print!("{REPOSITION_CURSOR_END}{DEVICE_STATUS_REPORT}");
    io::stdout().flush()?;
    let mut prefix_buffer = [0u8; 2];
    sys::stdin()?.read_exact(&mut prefix_buffer)?;
    if prefix_buffer != [b'\x1b', b'['] {
        return Err(Error::CursorPosition);
    }
    Ok((read_value_until(b';')?, read_value_until(b'R')?))
}

/// Read value until a certain stop byte is reached, and parse the result
/// (pre-stop byte).
fn read_value_until<T: std::str::FromStr>(stop_byte: u8) -> Result<T, Error> {
    let mut buf = Vec::new();
    sys::stdin()?.read_until(stop_byte, &mut buf)?;
    // Check that we have reached `stop_byte`, not EOF.
    buf.pop().filter(|u| *u == stop_byte).ok_or(Error::CursorPosition)?;
    std::str::from_utf8(&buf).or(Err(Error::CursorPosition))?.parse().or(Err(Error::CursorPosition))
}
