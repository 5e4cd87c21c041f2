//! # Row
//!
//! A single logical line of the document, in its three representations:
//! the logical bytes the user typed, the rendered bytes (tabs expanded),
//! and a highlight class per rendered byte.

use std::ops::Range;

use crate::ansi_escape::{RESET_FMT, REVERSE_VIDEO};
use crate::buffer::AppendBuffer;
use crate::syntax::{HlType, LanguageConf};

/// Return whether `c` is a separator: it terminates a keyword or number scan.
const fn is_sep(c: u8) -> bool {
    c.is_ascii_whitespace() || matches!(c, b',' | b'.' | b'(' | b')' | b'+' | b'-' | b'/' | b'*' | b'=' | b'~' | b'%' | b'<' | b'>' | b'[' | b']' | b';')
}

/// One row of the document.
#[derive(Default)]
pub struct Row {
    /// The logical bytes of the row, as typed/loaded (tabs preserved as `\t`).
    pub chars: Vec<u8>,
    /// The rendered bytes: tabs expanded to spaces, everything else copied.
    render: Vec<u8>,
    /// One highlight class per byte of `render`.
    highlight: Vec<HlType>,
    /// The render-space range currently overlaid with `HlType::Match`, if a
    /// find is in progress and matched this row.
    pub match_segment: Option<Range<usize>>,
}

impl Row {
    /// Create a new row from its logical bytes. `render`/`highlight` are
    /// empty until [`Row::update`] is called.
    pub fn new(chars: Vec<u8>) -> Self { Self { chars, ..Self::default() } }

    /// Number of logical bytes in the row.
    pub fn len(&self) -> usize { self.chars.len() }

    /// Whether the row has no logical bytes.
    pub fn is_empty(&self) -> bool { self.chars.is_empty() }

    /// The rendered bytes (tabs expanded).
    pub fn render(&self) -> &[u8] { &self.render }

    /// Insert `byte` at logical column `at`, clamped to `[0, len]`.
    pub fn insert_char(&mut self, at: usize, byte: u8) {
        let at = at.min(self.chars.len());
        self.chars.insert(at, byte);
    }

    /// Remove the byte at logical column `at`. No-op if out of range.
    pub fn delete_char(&mut self, at: usize) {
        if at < self.chars.len() {
            self.chars.remove(at);
        }
    }

    /// Append `bytes` to the end of the row's logical bytes.
    pub fn append_bytes(&mut self, bytes: &[u8]) { self.chars.extend_from_slice(bytes); }

    /// Recompute `render` and `highlight` from `chars`. Must be called after
    /// every mutation of `chars`.
    pub fn update(&mut self, tab_stop: usize, lang: Option<&LanguageConf>) {
        self.update_render(tab_stop);
        self.update_highlight(lang);
    }

    /// Expand tabs into spaces up to the next multiple of `tab_stop`; copy
    /// every other byte verbatim.
    fn update_render(&mut self, tab_stop: usize) {
        self.render.clear();
        for &c in &self.chars {
            if c == b'\t' {
                let spaces = tab_stop - (self.render.len() % tab_stop);
                self.render.extend(std::iter::repeat(b' ').take(spaces));
            } else {
                self.render.push(c);
            }
        }
    }

    /// Render-column for logical column `cx`: the sum, over bytes `0..cx`, of
    /// `TAB_STOP - (rx mod TAB_STOP)` for a tab and 1 for any other byte.
    pub fn cx_to_rx(&self, cx: usize, tab_stop: usize) -> usize {
        let mut rx = 0;
        for &c in self.chars.iter().take(cx) {
            rx += if c == b'\t' { tab_stop - (rx % tab_stop) } else { 1 };
        }
        rx
    }

    /// Logical column for render-column `rx_target`: the first `cx` whose
    /// accumulated render-column exceeds `rx_target`, or `len(chars)` if
    /// none does.
    pub fn rx_to_cx(&self, rx_target: usize, tab_stop: usize) -> usize {
        let mut rx = 0;
        for (cx, &c) in self.chars.iter().enumerate() {
            rx += if c == b'\t' { tab_stop - (rx % tab_stop) } else { 1 };
            if rx > rx_target {
                return cx;
            }
        }
        self.chars.len()
    }

    /// Single-pass left-to-right scan over `render`, producing one
    /// [`HlType`] per rendered byte.
    fn update_highlight(&mut self, lang: Option<&LanguageConf>) {
        self.highlight.clear();
        self.highlight.resize(self.render.len(), HlType::Normal);

        let len = self.render.len();
        let mut prev_sep = true;
        let mut in_string: u8 = 0;
        let mut i = 0;

        while i < len {
            let c = self.render[i];

            if in_string == 0 {
                if let Some(prefix) = lang.map(|l| l.single_line_comment_prefix.as_bytes()) {
                    if !prefix.is_empty() && self.render[i..].starts_with(prefix) {
                        for h in &mut self.highlight[i..] {
                            *h = HlType::Comment;
                        }
                        break;
                    }
                }
            }

            if lang.is_some_and(|l| l.flags.highlight_strings) {
                if in_string != 0 {
                    self.highlight[i] = HlType::String;
                    if c == b'\\' && i + 1 < len {
                        self.highlight[i + 1] = HlType::String;
                        i += 2;
                    } else {
                        if c == in_string {
                            in_string = 0;
                        }
                        i += 1;
                    }
                    prev_sep = true;
                    continue;
                } else if c == b'"' || c == b'\'' {
                    in_string = c;
                    self.highlight[i] = HlType::String;
                    i += 1;
                    continue;
                }
            }

            if lang.is_some_and(|l| l.flags.highlight_numbers)
                && ((c.is_ascii_digit() && (prev_sep || self.highlight[i - 1] == HlType::Number))
                    || (c == b'.' && i > 0 && self.highlight[i - 1] == HlType::Number))
            {
                self.highlight[i] = HlType::Number;
                prev_sep = false;
                i += 1;
                continue;
            }

            if prev_sep {
                let matched = lang.and_then(|l| {
                    l.keywords.iter().find(|kw| {
                        let bare = kw.strip_suffix('|').unwrap_or(kw);
                        self.render[i..].starts_with(bare.as_bytes())
                            && self.render.get(i + bare.len()).is_none_or(|b| is_sep(*b))
                    })
                });
                if let Some(kw) = matched {
                    let bare = kw.strip_suffix('|').unwrap_or(kw);
                    let hl = if kw.ends_with('|') { HlType::Keyword2 } else { HlType::Keyword1 };
                    for h in &mut self.highlight[i..i + bare.len()] {
                        *h = hl;
                    }
                    i += bare.len();
                    prev_sep = false;
                    continue;
                }
            }

            prev_sep = is_sep(c);
            i += 1;
        }
    }

    /// Write the visible slice `render[offset..offset+max_len]` to `buffer`,
    /// applying highlight-to-SGR color transitions and rendering control
    /// bytes as a visible glyph in inverted video. Does not reposition the
    /// cursor or erase the rest of the line; the caller does that.
    pub fn draw(&self, offset: usize, max_len: usize, buffer: &mut AppendBuffer) {
        let start = offset.min(self.render.len());
        let end = (offset + max_len).min(self.render.len());
        let mut current = HlType::Normal;

        for rx in start..end {
            let c = self.render[rx];
            let mut hl = self.highlight[rx];

            if let Some(m) = &self.match_segment {
                if m.contains(&rx) {
                    hl = HlType::Match;
                } else if rx == m.end {
                    buffer.append(RESET_FMT.as_bytes());
                }
            }

            if c.is_ascii_control() {
                let glyph = if c <= 26 { b'@' + c } else { b'?' };
                buffer.append(REVERSE_VIDEO.as_bytes());
                buffer.append(&[glyph]);
                buffer.append(RESET_FMT.as_bytes());
                if current != HlType::Normal {
                    buffer.append(current.to_string().as_bytes());
                }
            } else {
                if current != hl {
                    buffer.append(hl.to_string().as_bytes());
                    current = hl;
                }
                buffer.append(&[c]);
            }
        }
        buffer.append(RESET_FMT.as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_expands_tabs_to_next_stop() {
        let mut row = Row::new(b"\tfoo".to_vec());
        row.update(4, None);
        assert_eq!(row.render(), b"    foo");
    }

    #[test]
    fn update_leaves_non_tab_bytes_verbatim() {
        let mut row = Row::new(b"x = 42;".to_vec());
        row.update(4, None);
        assert_eq!(row.render(), b"x = 42;");
    }

    #[test]
    fn highlight_len_matches_render_len() {
        let mut row = Row::new(b"\thello\tworld".to_vec());
        row.update(4, None);
        assert_eq!(row.highlight.len(), row.render().len());
    }

    #[test]
    fn cx_to_rx_accounts_for_tab_expansion() {
        let mut row = Row::new(b"\tfoo".to_vec());
        row.update(4, None);
        assert_eq!(row.cx_to_rx(0, 4), 0);
        assert_eq!(row.cx_to_rx(4, 4), 7);
    }

    #[test]
    fn rx_to_cx_is_inverse_of_cx_to_rx() {
        let mut row = Row::new(b"\tfoo".to_vec());
        row.update(4, None);
        for cx in 0..=row.len() {
            let rx = row.cx_to_rx(cx, 4);
            assert_eq!(row.rx_to_cx(rx, 4), cx);
        }
    }

    #[test]
    fn insert_then_delete_char_restores_row() {
        let mut row = Row::new(b"hello".to_vec());
        row.update(4, None);
        let before_render = row.render().to_vec();
        row.insert_char(2, b'X');
        row.update(4, None);
        row.delete_char(2);
        row.update(4, None);
        assert_eq!(row.chars, b"hello");
        assert_eq!(row.render(), before_render.as_slice());
    }

    #[test]
    fn c_highlighting_marks_numbers_and_trailing_comment() {
        let lang = crate::syntax::select("main.c").expect("C descriptor present");
        let mut row = Row::new(b"x = 42; // note".to_vec());
        row.update(4, Some(lang));
        let expect_comment_from = row.render().iter().position(|&b| b == b'/').unwrap();
        for (i, &hl) in row.highlight.iter().enumerate() {
            let expected = match row.render()[i] {
                b'4' | b'2' => HlType::Number,
                _ if i >= expect_comment_from => HlType::Comment,
                _ => HlType::Normal,
            };
            assert_eq!(hl, expected, "byte {i} ({:?})", row.render()[i] as char);
        }
    }

    #[test]
    fn keyword_with_pipe_suffix_highlights_as_keyword2() {
        let lang = crate::syntax::select("main.c").expect("C descriptor present");
        let mut row = Row::new(b"int x;".to_vec());
        row.update(4, Some(lang));
        assert_eq!(row.highlight[0], HlType::Keyword2);
        assert_eq!(row.highlight[1], HlType::Keyword2);
        assert_eq!(row.highlight[2], HlType::Keyword2);
    }

    #[test]
    fn keyword_without_pipe_suffix_highlights_as_keyword1() {
        let lang = crate::syntax::select("main.c").expect("C descriptor present");
        let mut row = Row::new(b"return 0;".to_vec());
        row.update(4, Some(lang));
        assert_eq!(row.highlight[0], HlType::Keyword1);
    }

    #[test]
    fn is_sep_matches_whitespace_and_punctuation_set() {
        assert!(is_sep(b' '));
        assert!(is_sep(b';'));
        assert!(is_sep(b'['));
        assert!(!is_sep(b'_'));
        assert!(!is_sep(b'a'));
    }
}
