//! # Editor
//!
//! The `Editor` struct ties the document (a sequence of [`Row`]s) to the
//! viewport, the renderer, file I/O, and the prompt/find overlay. All
//! document mutations and all rendering flow through this module; the
//! terminal I/O driver (raw mode, key decoding) lives in `terminal`/`unix`
//! and is passed in by reference rather than owned here, so the document
//! logic can be unit tested without a real TTY.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::time::Instant;

use crate::ansi_escape::{
    CLEAR_LINE_RIGHT_OF_CURSOR, HIDE_CURSOR, MOVE_CURSOR_TO_START, REVERSE_VIDEO, RESET_FMT,
    SHOW_CURSOR,
};
use crate::buffer::AppendBuffer;
use crate::row::Row;
use crate::syntax::{self, LanguageConf};
use crate::terminal::{AKey, Key, PageKey, Terminal};
use crate::{Config, Error};

const fn ctrl_key(key: u8) -> u8 { key & 0x1f }
const EXIT: u8 = ctrl_key(b'Q');
const SAVE: u8 = ctrl_key(b'S');
const FIND: u8 = ctrl_key(b'F');
const DELETE_BIS: u8 = ctrl_key(b'H');
const REFRESH_SCREEN: u8 = ctrl_key(b'L');
const BACKSPACE: u8 = 127;

const HELP_MESSAGE: &str = "^S save | ^Q quit | ^F find";

/// `set_status!` sets a formatted status message for the editor.
macro_rules! set_status {
    ($editor:expr, $($arg:tt)*) => {
        $editor.status_msg = Some(StatusMessage::new(format!($($arg)*)))
    };
}

/// The cursor position, together with the viewport offsets needed to map it
/// onto screen cells.
#[derive(Default, Clone)]
struct CursorState {
    /// Logical column (indexes `row.chars`, not rendered cells).
    x: usize,
    /// Row index. `y == rows.len()` is the valid "after last row" position.
    y: usize,
    /// Index of the topmost visible row.
    row_off: usize,
    /// Render-column of the leftmost visible cell.
    col_off: usize,
}

/// A status message shown in the message bar, together with the time it was
/// posted so it can expire after [`Config::message_duration`].
struct StatusMessage {
    text: String,
    time: Instant,
}

impl StatusMessage {
    fn new(text: String) -> Self { Self { text, time: Instant::now() } }
}

/// Per-search state threaded through repeated calls to the find prompt's
/// callback: the row and render-offset of the last match, which direction
/// to continue scanning in, and which row currently carries the `Match`
/// highlight overlay so it can be cleared before the next scan.
struct FindState {
    last_match: Option<(usize, usize)>,
    direction: isize,
    overlaid_row: Option<usize>,
}

/// Find the first occurrence of `needle` in `haystack`, if any.
fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    (0..=haystack.len() - needle.len()).find(|&i| &haystack[i..i + needle.len()] == needle)
}

/// Find the last occurrence of `needle` in `haystack`, if any.
fn rfind_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    (0..=haystack.len() - needle.len()).rev().find(|&i| &haystack[i..i + needle.len()] == needle)
}

/// The editor's in-memory state: the document, the viewport, and everything
/// needed to render a frame. Owns no terminal resources; [`Editor::run`]
/// borrows a [`Terminal`] for the duration of the session.
pub struct Editor {
    rows: Vec<Row>,
    cursor: CursorState,
    screen_rows: usize,
    screen_cols: usize,
    dirty: usize,
    filename: Option<String>,
    syntax: Option<&'static LanguageConf>,
    status_msg: Option<StatusMessage>,
    quit_times: usize,
    config: Config,
}

impl Editor {
    /// Create a new, unnamed, empty editor state. No document is loaded and
    /// the viewport size is zero until [`Editor::run`] queries the terminal.
    pub fn new(config: Config) -> Self {
        Self {
            rows: Vec::new(),
            cursor: CursorState::default(),
            screen_rows: 0,
            screen_cols: 0,
            dirty: 0,
            filename: None,
            syntax: None,
            status_msg: Some(StatusMessage::new(HELP_MESSAGE.to_owned())),
            quit_times: config.quit_times,
            config,
        }
    }

    /// Enable raw mode, optionally load `filename`, then alternate
    /// rendering and key handling until the user quits.
    ///
    /// # Errors
    ///
    /// Returns `Err` on any fatal terminal or file-load failure (§7); save
    /// failures are non-fatal and only ever surface as a status message.
    pub fn run(&mut self, filename: Option<String>) -> Result<(), Error> {
        let term = Terminal::enable_raw_mode()?;
        let (term_rows, term_cols) = term.window_size()?;
        self.screen_rows = term_rows.saturating_sub(2);
        self.screen_cols = term_cols;

        if let Some(name) = filename {
            self.load(&name)?;
        }

        loop {
            self.refresh_screen()?;
            if self.process_keypress(&term)? {
                break;
            }
        }
        Ok(())
    }

    // --- Component C: row store -------------------------------------------------

    fn insert_row(&mut self, at: usize, bytes: Vec<u8>) {
        let at = at.min(self.rows.len());
        let mut row = Row::new(bytes);
        row.update(self.config.tab_stop, self.syntax);
        self.rows.insert(at, row);
        self.dirty += 1;
    }

    fn delete_row(&mut self, at: usize) {
        if at < self.rows.len() {
            self.rows.remove(at);
            self.dirty += 1;
        }
    }

    fn row_insert_char(&mut self, at_row: usize, at_col: usize, byte: u8) {
        if let Some(row) = self.rows.get_mut(at_row) {
            row.insert_char(at_col, byte);
            row.update(self.config.tab_stop, self.syntax);
            self.dirty += 1;
        }
    }

    fn row_delete_char(&mut self, at_row: usize, at_col: usize) {
        if let Some(row) = self.rows.get_mut(at_row) {
            if at_col < row.len() {
                row.delete_char(at_col);
                row.update(self.config.tab_stop, self.syntax);
                self.dirty += 1;
            }
        }
    }

    fn row_append_string(&mut self, at_row: usize, bytes: &[u8]) {
        if let Some(row) = self.rows.get_mut(at_row) {
            row.append_bytes(bytes);
            row.update(self.config.tab_stop, self.syntax);
            self.dirty += 1;
        }
    }

    fn insert_char(&mut self, byte: u8) {
        if self.cursor.y == self.rows.len() {
            self.insert_row(self.rows.len(), Vec::new());
        }
        self.row_insert_char(self.cursor.y, self.cursor.x, byte);
        self.cursor.x += 1;
    }

    fn insert_newline(&mut self) {
        if self.cursor.x == 0 {
            self.insert_row(self.cursor.y, Vec::new());
        } else {
            let right = self.rows[self.cursor.y].chars.split_off(self.cursor.x);
            self.rows[self.cursor.y].update(self.config.tab_stop, self.syntax);
            self.dirty += 1;
            self.insert_row(self.cursor.y + 1, right);
        }
        self.cursor.y += 1;
        self.cursor.x = 0;
    }

    fn delete_char(&mut self) {
        if self.cursor.y == self.rows.len() || (self.cursor.x == 0 && self.cursor.y == 0) {
            return;
        }
        if self.cursor.x > 0 {
            self.row_delete_char(self.cursor.y, self.cursor.x - 1);
            self.cursor.x -= 1;
        } else {
            let joined_at = self.rows[self.cursor.y - 1].len();
            let tail = std::mem::take(&mut self.rows[self.cursor.y].chars);
            self.row_append_string(self.cursor.y - 1, &tail);
            self.delete_row(self.cursor.y);
            self.cursor.x = joined_at;
            self.cursor.y -= 1;
        }
    }

    // --- Component E: viewport & cursor -----------------------------------------

    /// Recompute the render-column of the cursor and clamp the viewport
    /// offsets so the cursor stays visible. Returns the render-column.
    fn scroll(&mut self) -> usize {
        let rx = self
            .rows
            .get(self.cursor.y)
            .map_or(0, |row| row.cx_to_rx(self.cursor.x, self.config.tab_stop));

        if self.cursor.y < self.cursor.row_off {
            self.cursor.row_off = self.cursor.y;
        }
        if self.screen_rows > 0 && self.cursor.y >= self.cursor.row_off + self.screen_rows {
            self.cursor.row_off = self.cursor.y + 1 - self.screen_rows;
        }
        if rx < self.cursor.col_off {
            self.cursor.col_off = rx;
        }
        if self.screen_cols > 0 && rx >= self.cursor.col_off + self.screen_cols {
            self.cursor.col_off = rx + 1 - self.screen_cols;
        }
        rx
    }

    fn move_cursor(&mut self, key: AKey) {
        match key {
            AKey::Left if self.cursor.x > 0 => self.cursor.x -= 1,
            AKey::Left if self.cursor.y > 0 => {
                self.cursor.y -= 1;
                self.cursor.x = self.rows[self.cursor.y].len();
            }
            AKey::Left => {}
            AKey::Right => match self.rows.get(self.cursor.y) {
                Some(row) if self.cursor.x < row.len() => self.cursor.x += 1,
                Some(_) => {
                    self.cursor.y += 1;
                    self.cursor.x = 0;
                }
                None => {}
            },
            AKey::Up => self.cursor.y = self.cursor.y.saturating_sub(1),
            AKey::Down if self.cursor.y < self.rows.len() => self.cursor.y += 1,
            AKey::Down => {}
        }
        let len = self.rows.get(self.cursor.y).map_or(0, Row::len);
        self.cursor.x = self.cursor.x.min(len);
    }

    fn page_up(&mut self) {
        self.cursor.y = self.cursor.row_off;
        for _ in 0..self.screen_rows {
            self.move_cursor(AKey::Up);
        }
    }

    fn page_down(&mut self) {
        self.cursor.y = (self.cursor.row_off + self.screen_rows).saturating_sub(1).min(self.rows.len());
        for _ in 0..self.screen_rows {
            self.move_cursor(AKey::Down);
        }
    }

    // --- Component G: file I/O ---------------------------------------------------

    fn load(&mut self, filename: &str) -> Result<(), Error> {
        let file = File::open(filename)?;
        self.rows.clear();
        for line in BufReader::new(file).split(b'\n') {
            let mut bytes = line?;
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
            self.insert_row(self.rows.len(), bytes);
        }
        self.filename = Some(filename.to_owned());
        self.syntax = syntax::select(filename);
        for row in &mut self.rows {
            row.update(self.config.tab_stop, self.syntax);
        }
        self.dirty = 0;
        Ok(())
    }

    fn save(&mut self, term: &Terminal) -> Result<(), Error> {
        if self.filename.is_none() {
            match self.prompt(term, "Save as: %s (ESC to cancel)", &mut None)? {
                Some(name) => {
                    self.syntax = syntax::select(&name);
                    self.filename = Some(name);
                    for row in &mut self.rows {
                        row.update(self.config.tab_stop, self.syntax);
                    }
                }
                None => {
                    set_status!(self, "Save aborted");
                    return Ok(());
                }
            }
        }
        let Some(filename) = self.filename.clone() else { return Ok(()) };

        let mut data = Vec::new();
        for row in &self.rows {
            data.extend_from_slice(&row.chars);
            data.push(b'\n');
        }

        let result = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .mode(0o644)
            .open(&filename)
            .and_then(|mut file| file.set_len(data.len() as u64).and_then(|()| file.write_all(&data)));

        match result {
            Ok(()) => {
                self.dirty = 0;
                set_status!(self, "{} bytes written to disk", data.len());
            }
            Err(err) => set_status!(self, "Can't save! I/O error: {err}"),
        }
        Ok(())
    }

    // --- Component H: prompt & search --------------------------------------------

    /// Run a modal single-line prompt. `prompt_fmt` must contain one `%s`
    /// placeholder. If `find_state` is `Some`, it is treated as the find
    /// overlay's per-keystroke callback state. Returns the committed buffer,
    /// or `None` if the user cancelled with Escape.
    fn prompt(
        &mut self,
        term: &Terminal,
        prompt_fmt: &str,
        find_state: &mut Option<FindState>,
    ) -> Result<Option<String>, Error> {
        let mut buf = String::new();
        loop {
            set_status!(self, "{}", prompt_fmt.replacen("%s", &buf, 1));
            self.refresh_screen()?;
            let key = term.read_key()?;
            match key {
                Key::Char(b'\r') if !buf.is_empty() => {
                    self.status_msg = None;
                    if let Some(state) = find_state {
                        self.find_callback(state, &buf, key);
                    }
                    return Ok(Some(buf));
                }
                Key::Escape => {
                    self.status_msg = None;
                    if let Some(state) = find_state {
                        self.find_callback(state, &buf, key);
                    }
                    return Ok(None);
                }
                Key::Char(BACKSPACE | DELETE_BIS) | Key::Delete => {
                    buf.pop();
                }
                Key::Char(c) if (32..127).contains(&c) => buf.push(c as char),
                _ => {}
            }
            if let Some(state) = find_state {
                self.find_callback(state, &buf, key);
            }
        }
    }

    /// Record a match at `(row, offset)`: move the cursor there, remember
    /// it in `state` for the next call, and overlay the `Match` highlight.
    fn set_find_match(&mut self, state: &mut FindState, row: usize, offset: usize, query: &str) {
        self.cursor.x = self.rows[row].rx_to_cx(offset, self.config.tab_stop);
        self.cursor.y = row;
        self.cursor.row_off = self.rows.len();
        state.last_match = Some((row, offset));
        state.overlaid_row = Some(row);
        self.rows[row].match_segment = Some(offset..offset + query.len());
    }

    fn find_callback(&mut self, state: &mut FindState, query: &str, key: Key) {
        if let Some(row_idx) = state.overlaid_row.take() {
            if let Some(row) = self.rows.get_mut(row_idx) {
                row.match_segment = None;
            }
        }

        match key {
            Key::Char(b'\r') | Key::Escape => {
                state.last_match = None;
                state.direction = 1;
                return;
            }
            Key::Arrow(AKey::Right | AKey::Down) => state.direction = 1,
            Key::Arrow(AKey::Left | AKey::Up) => state.direction = -1,
            _ => {
                state.last_match = None;
                state.direction = 1;
            }
        }
        if state.last_match.is_none() {
            state.direction = 1;
        }
        if query.is_empty() || self.rows.is_empty() {
            return;
        }
        let query_bytes = query.as_bytes();

        // Continue scanning the previously matched row past (or before) the
        // last match before moving on to other rows, so repeated matches on
        // one row (e.g. "bab" searched for "b") are all reachable.
        if let Some((row, offset)) = state.last_match {
            let render = self.rows[row].render();
            let found = if state.direction == 1 {
                render.get(offset + 1..).and_then(|tail| find_bytes(tail, query_bytes)).map(|rel| offset + 1 + rel)
            } else {
                rfind_bytes(&render[..offset.min(render.len())], query_bytes)
            };
            if let Some(offset) = found {
                self.set_find_match(state, row, offset, query);
                return;
            }
        }

        let n_rows = self.rows.len() as isize;
        let mut current = state.last_match.map_or(-1, |(row, _)| row as isize);
        for _ in 0..n_rows {
            current += state.direction;
            if current == -1 {
                current = n_rows - 1;
            } else if current == n_rows {
                current = 0;
            }
            let row_idx = current as usize;
            let render = self.rows[row_idx].render();
            let found =
                if state.direction == 1 { find_bytes(render, query_bytes) } else { rfind_bytes(render, query_bytes) };
            if let Some(offset) = found {
                self.set_find_match(state, row_idx, offset, query);
                return;
            }
        }
    }

    fn find(&mut self, term: &Terminal) -> Result<(), Error> {
        let saved_cursor = self.cursor.clone();
        let mut state = Some(FindState { last_match: None, direction: 1, overlaid_row: None });

        let result = self.prompt(term, "Search (Use ESC/Arrows/Enter): %s", &mut state)?;

        if let Some(state) = &state {
            if let Some(row_idx) = state.overlaid_row {
                if let Some(row) = self.rows.get_mut(row_idx) {
                    row.match_segment = None;
                }
            }
        }
        if result.is_none() {
            self.cursor = saved_cursor;
        }
        Ok(())
    }

    // --- Component F: renderer ---------------------------------------------------

    fn draw_rows(&self, buf: &mut AppendBuffer) {
        for y in 0..self.screen_rows {
            let file_row = y + self.cursor.row_off;
            if file_row >= self.rows.len() {
                buf.append(b"~");
                if self.rows.is_empty() && y == self.screen_rows / 3 {
                    let welcome = format!("Kilo editor -- version {}", env!("KILO_VERSION"));
                    let width = welcome.len().min(self.screen_cols);
                    let pad = self.screen_cols.saturating_sub(width) / 2;
                    if pad > 0 {
                        buf.append(" ".repeat(pad - 1).as_bytes());
                    }
                    buf.append(welcome.as_bytes()[..width].as_ref());
                }
            } else {
                self.rows[file_row].draw(self.cursor.col_off, self.screen_cols, buf);
            }
            buf.append(CLEAR_LINE_RIGHT_OF_CURSOR.as_bytes());
            buf.append(b"\r\n");
        }
    }

    fn draw_status_bar(&self, buf: &mut AppendBuffer) {
        let modified = if self.dirty > 0 { " (modified)" } else { "" };
        let name: String = self.filename.as_deref().unwrap_or("[No Name]").chars().take(20).collect();
        let mut left = format!("{name} - {} lines{modified}", self.rows.len());
        left.truncate(self.screen_cols);

        let filetype = self.syntax.map_or("no ft", |lang| lang.filetype_name);
        let right = format!("{filetype} | {}/{}", self.cursor.y + 1, self.rows.len());

        let mut line = if left.len() + right.len() <= self.screen_cols {
            let pad = self.screen_cols - left.len() - right.len();
            format!("{left}{:pad$}{right}", "")
        } else {
            left.truncate(self.screen_cols);
            format!("{left}{right}")
        };
        line.truncate(self.screen_cols);

        buf.append(REVERSE_VIDEO.as_bytes());
        buf.append(line.as_bytes());
        buf.append(RESET_FMT.as_bytes());
        buf.append(b"\r\n");
    }

    fn draw_message_bar(&self, buf: &mut AppendBuffer) {
        buf.append(CLEAR_LINE_RIGHT_OF_CURSOR.as_bytes());
        if let Some(msg) = self.status_msg.as_ref().filter(|m| m.time.elapsed() < self.config.message_duration) {
            let text: String = msg.text.chars().take(self.screen_cols).collect();
            buf.append(text.as_bytes());
        }
    }

    fn refresh_screen(&mut self) -> Result<(), Error> {
        let rx = self.scroll();

        let mut buf = AppendBuffer::new();
        buf.append(HIDE_CURSOR.as_bytes());
        buf.append(MOVE_CURSOR_TO_START.as_bytes());
        self.draw_rows(&mut buf);
        self.draw_status_bar(&mut buf);
        self.draw_message_bar(&mut buf);

        let cursor_row = self.cursor.y - self.cursor.row_off + 1;
        let cursor_col = rx - self.cursor.col_off + 1;
        buf.append(format!("\x1b[{cursor_row};{cursor_col}H").as_bytes());
        buf.append(SHOW_CURSOR.as_bytes());

        let mut stdout = io::stdout();
        stdout.write_all(buf.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }

    // --- Component I: command dispatcher ------------------------------------------

    /// Handle one Ctrl-Q press. Returns `true` if the editor should quit: on
    /// a clean buffer, immediately; on a dirty one, only once `quit_times`
    /// consecutive presses (with no other key in between) have exhausted
    /// the counter.
    fn try_quit(&mut self) -> bool {
        if self.dirty == 0 {
            return true;
        }
        self.quit_times -= 1;
        if self.quit_times > 0 {
            let remaining = self.quit_times;
            let plural = if remaining == 1 { "" } else { "s" };
            set_status!(self, "Warning! File has unsaved changes. Press Ctrl-Q {remaining} more time{plural} to quit.");
            return false;
        }
        true
    }

    /// Read and handle one key. Returns `true` if the editor should quit.
    fn process_keypress(&mut self, term: &Terminal) -> Result<bool, Error> {
        let key = term.read_key()?;
        let mut quit = false;

        match key {
            Key::Char(b'\r' | b'\n') => self.insert_newline(),
            Key::Char(EXIT) => {
                quit = self.try_quit();
                if !quit {
                    return Ok(false);
                }
            }
            Key::Char(SAVE) => self.save(term)?,
            Key::Home => self.cursor.x = 0,
            Key::End => {
                if let Some(row) = self.rows.get(self.cursor.y) {
                    self.cursor.x = row.len();
                }
            }
            Key::Char(FIND) => self.find(term)?,
            Key::Char(BACKSPACE | DELETE_BIS) => self.delete_char(),
            Key::Delete => {
                self.move_cursor(AKey::Right);
                self.delete_char();
            }
            Key::Page(PageKey::Up) => self.page_up(),
            Key::Page(PageKey::Down) => self.page_down(),
            Key::Arrow(arrow) => self.move_cursor(arrow),
            Key::Char(REFRESH_SCREEN) | Key::Escape => {}
            Key::Char(c) => self.insert_char(c),
        }

        if !quit {
            self.quit_times = self.config.quit_times;
        }
        Ok(quit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_editor() -> Editor {
        let mut editor = Editor::new(Config::default());
        editor.screen_rows = 24;
        editor.screen_cols = 80;
        editor
    }

    #[test]
    fn insert_char_appends_to_virtual_tail_row() {
        let mut editor = new_editor();
        for &b in b"XYZ" {
            editor.insert_char(b);
        }
        assert_eq!(editor.cursor.x, 3);
        assert_eq!(editor.rows.len(), 1);
        assert_eq!(editor.rows[0].chars, b"XYZ");
        assert!(editor.dirty > 0);
    }

    #[test]
    fn insert_newline_splits_at_cursor() {
        let mut editor = new_editor();
        for &b in b"abcdef" {
            editor.insert_char(b);
        }
        editor.cursor.x = 3;
        editor.insert_newline();
        assert_eq!(editor.rows.len(), 2);
        assert_eq!(editor.rows[0].chars, b"abc");
        assert_eq!(editor.rows[1].chars, b"def");
        assert_eq!((editor.cursor.x, editor.cursor.y), (0, 1));
    }

    #[test]
    fn insert_newline_at_column_zero_inserts_empty_row_above() {
        let mut editor = new_editor();
        for _ in 0..3 {
            editor.insert_newline();
        }
        assert_eq!(editor.rows.len(), 3);
        assert_eq!(editor.cursor.y, 3);
        for row in &editor.rows {
            assert!(row.chars.is_empty());
        }
    }

    #[test]
    fn delete_char_removes_byte_before_cursor() {
        let mut editor = new_editor();
        for &b in b"Hello world!" {
            editor.insert_char(b);
        }
        editor.delete_char();
        assert_eq!(editor.rows[0].chars, b"Hello world");
    }

    #[test]
    fn delete_char_at_column_zero_joins_rows() {
        let mut editor = new_editor();
        for &b in b"aa" {
            editor.insert_char(b);
        }
        editor.insert_newline();
        for &b in b"bb" {
            editor.insert_char(b);
        }
        editor.cursor.x = 0;
        editor.delete_char();
        assert_eq!(editor.rows.len(), 1);
        assert_eq!(editor.rows[0].chars, b"aabb");
        assert_eq!((editor.cursor.x, editor.cursor.y), (2, 0));
    }

    #[test]
    fn delete_char_is_noop_at_origin() {
        let mut editor = new_editor();
        editor.delete_char();
        assert_eq!(editor.rows.len(), 0);
        assert_eq!((editor.cursor.x, editor.cursor.y), (0, 0));
    }

    #[test]
    fn move_cursor_left_wraps_to_previous_row_end() {
        let mut editor = new_editor();
        editor.insert_newline();
        for &b in b"ab" {
            editor.insert_char(b);
        }
        editor.cursor.x = 0;
        editor.move_cursor(AKey::Left);
        assert_eq!((editor.cursor.x, editor.cursor.y), (0, 0));
    }

    #[test]
    fn move_cursor_right_wraps_to_next_row_start() {
        let mut editor = new_editor();
        for &b in b"ab" {
            editor.insert_char(b);
        }
        editor.insert_newline();
        editor.cursor = CursorState { x: 2, y: 0, row_off: 0, col_off: 0 };
        editor.move_cursor(AKey::Right);
        assert_eq!((editor.cursor.x, editor.cursor.y), (0, 1));
    }

    #[test]
    fn move_cursor_down_allowed_onto_virtual_tail_row() {
        let mut editor = new_editor();
        editor.insert_char(b'a');
        editor.cursor.x = 0;
        editor.cursor.y = 0;
        editor.move_cursor(AKey::Down);
        assert_eq!(editor.cursor.y, 1);
        assert_eq!(editor.cursor.x, 0);
    }

    #[test]
    fn scroll_keeps_cursor_within_viewport() {
        let mut editor = new_editor();
        editor.screen_rows = 3;
        editor.screen_cols = 10;
        for _ in 0..10 {
            editor.insert_newline();
        }
        editor.cursor.y = 9;
        editor.scroll();
        assert!(editor.cursor.row_off <= editor.cursor.y);
        assert!(editor.cursor.y < editor.cursor.row_off + editor.screen_rows);
    }

    #[test]
    fn end_of_line_after_tab_has_expected_render_column() {
        let mut editor = new_editor();
        editor.insert_char(b'\t');
        editor.insert_char(b'f');
        editor.insert_char(b'o');
        editor.insert_char(b'o');
        editor.cursor.x = 0;
        if let Some(row) = editor.rows.get(editor.cursor.y) {
            editor.cursor.x = row.len();
        }
        assert_eq!(editor.cursor.x, 4);
        let rx = editor.rows[0].cx_to_rx(editor.cursor.x, editor.config.tab_stop);
        assert_eq!(rx, 7);
    }

    fn three_row_buffer() -> Editor {
        let mut editor = new_editor();
        for (i, line) in ["aaa", "bab", "ccc"].into_iter().enumerate() {
            if i > 0 {
                editor.insert_newline();
            }
            for &b in line.as_bytes() {
                editor.insert_char(b);
            }
        }
        editor.cursor = CursorState::default();
        editor
    }

    #[test]
    fn find_moves_cursor_to_first_match() {
        let mut editor = three_row_buffer();
        let mut state = FindState { last_match: None, direction: 1, overlaid_row: None };
        editor.find_callback(&mut state, "b", Key::Char(b'b'));
        assert_eq!(editor.cursor.y, 1);
        assert_eq!(editor.cursor.x, 0);
    }

    #[test]
    fn find_next_moves_to_next_occurrence_in_same_row() {
        let mut editor = three_row_buffer();
        let mut state = FindState { last_match: None, direction: 1, overlaid_row: None };
        editor.find_callback(&mut state, "b", Key::Char(b'b'));
        editor.find_callback(&mut state, "b", Key::Arrow(AKey::Right));
        assert_eq!(editor.cursor.y, 1);
        assert_eq!(editor.cursor.x, 2);
    }

    #[test]
    fn load_then_save_round_trips_bytes() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("t.txt");
        std::fs::write(&path, b"line1\nline2\n")?;

        let mut editor = new_editor();
        editor.load(path.to_str().ok_or("non-utf8 path")?)?;
        assert_eq!(editor.rows.len(), 2);
        assert_eq!(editor.dirty, 0);

        editor.filename = Some(path.to_str().ok_or("non-utf8 path")?.to_owned());
        let data: Vec<u8> =
            editor.rows.iter().flat_map(|row| row.chars.iter().copied().chain(std::iter::once(b'\n'))).collect();
        std::fs::write(&path, &data)?;
        assert_eq!(std::fs::read(&path)?, b"line1\nline2\n");
        Ok(())
    }

    #[test]
    fn load_strips_crlf() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("t.txt");
        std::fs::write(&path, b"line1\r\nline2\n")?;

        let mut editor = new_editor();
        editor.load(path.to_str().ok_or("non-utf8 path")?)?;
        assert_eq!(editor.rows[0].chars, b"line1");
        assert_eq!(editor.rows[1].chars, b"line2");
        Ok(())
    }

    #[test]
    fn find_bytes_locates_substring() {
        assert_eq!(find_bytes(b"hello world", b"world"), Some(6));
        assert_eq!(find_bytes(b"hello world", b"xyz"), None);
        assert_eq!(find_bytes(b"hello", b""), None);
    }

    #[test]
    fn quit_guard_takes_exactly_two_consecutive_ctrl_q_on_dirty_buffer() {
        let mut editor = new_editor();
        editor.insert_char(b'x');
        assert!(editor.dirty > 0);

        assert!(!editor.try_quit(), "first Ctrl-Q must warn, not quit");
        assert!(editor.try_quit(), "second consecutive Ctrl-Q must quit");
    }

    #[test]
    fn quit_guard_resets_if_another_key_is_pressed_in_between() {
        let mut editor = new_editor();
        editor.insert_char(b'x');

        assert!(!editor.try_quit());
        editor.quit_times = editor.config.quit_times;
        assert!(!editor.try_quit(), "counter reset by an intervening key means another warning, not a quit");
    }

    #[test]
    fn quit_guard_quits_immediately_on_clean_buffer() {
        let mut editor = new_editor();
        assert_eq!(editor.dirty, 0);
        assert!(editor.try_quit());
    }

    #[test]
    fn status_bar_overflow_truncates_left_and_drops_right() {
        let mut editor = new_editor();
        editor.screen_cols = 10;
        editor.filename = Some("a-very-long-filename-that-overflows.rs".to_owned());
        let mut buf = AppendBuffer::new();
        editor.draw_status_bar(&mut buf);
        let rendered = String::from_utf8(buf.as_bytes().to_vec()).expect("status bar is ASCII");
        let line = rendered.strip_prefix(REVERSE_VIDEO).expect("status bar starts with reverse video");
        let line = line.strip_suffix(&format!("{RESET_FMT}\r\n")).expect("status bar ends with reset + CRLF");
        assert_eq!(line.chars().count(), editor.screen_cols);
        assert!(!line.contains('/'), "overflowing left segment must push out the right segment, not shrink further");
    }
}
