//! # Syntax highlighting configuration
//!
//! Language descriptors are a compiled-in table rather than files read from
//! disk: there is no `syntax.d` directory and no INI format to parse.

use std::fmt::{self, Display, Formatter};

/// Type of syntax highlighting for a single rendered byte.
///
/// Each `HlType` is associated with an SGR color code, via its discriminant.
/// The colors are described here:
/// <https://en.wikipedia.org/wiki/ANSI_escape_code#Colors>
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HlType {
    Normal = 39,   // Default foreground color
    Number = 31,   // Red
    Match = 34,    // Blue
    String = 35,   // Magenta
    Comment = 36,  // Cyan
    Keyword1 = 33, // Yellow
    Keyword2 = 32, // Green
}

impl Display for HlType {
    /// Write the ANSI color escape sequence for the `HlType` using the given formatter.
    fn fmt(&self, f: &mut Formatter) -> fmt::Result { write!(f, "\x1b[{}m", *self as u32) }
}

/// Bitmask flags controlling which classes of tokens a language highlights.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct HlFlags {
    pub(crate) highlight_numbers: bool,
    pub(crate) highlight_strings: bool,
}

/// A language descriptor: filename patterns, keyword lists and comment
/// syntax used to drive [`crate::row::Row::update_highlight`].
#[derive(Clone, Copy, Debug)]
pub struct LanguageConf {
    /// Human-readable name shown in the status bar, e.g. "c".
    pub(crate) filetype_name: &'static str,
    /// Filename patterns: a leading `.` matches the extension exactly,
    /// otherwise the pattern matches anywhere in the filename.
    pub(crate) filename_patterns: &'static [&'static str],
    /// Keywords to highlight. A trailing `|` marks a KEYWORD2 (type name).
    pub(crate) keywords: &'static [&'static str],
    /// Prefix that starts a single-line comment, e.g. "//".
    pub(crate) single_line_comment_prefix: &'static str,
    /// Which optional highlight classes are active for this language.
    pub(crate) flags: HlFlags,
}

/// The static language table. Initially one entry, for C/C++ sources and
/// headers.
pub(crate) static LANGUAGES: &[LanguageConf] = &[LanguageConf {
    filetype_name: "c",
    filename_patterns: &[".c", ".h", ".cpp", ".hpp", ".cc", ".cxx"],
    keywords: &[
        "switch", "if", "while", "for", "break", "continue", "return", "else", "struct", "union",
        "typedef", "static", "enum", "class", "case", "namespace", "using", "template", "public",
        "private", "protected", "const", "volatile", "register", "sizeof", "goto", "default",
        "int|", "long|", "double|", "float|", "char|", "unsigned|", "signed|", "void|", "bool|",
        "size_t|", "auto|",
    ],
    single_line_comment_prefix: "//",
    flags: HlFlags { highlight_numbers: true, highlight_strings: true },
}];

/// Find the language descriptor matching `filename`, if any.
///
/// Walks the static table in order, returning the first descriptor that has
/// a matching filename pattern. A pattern starting with `.` must equal the
/// filename's extension; any other pattern matches as a substring of the
/// whole filename.
pub(crate) fn select(filename: &str) -> Option<&'static LanguageConf> {
    LANGUAGES.iter().find(|lang| {
        lang.filename_patterns.iter().any(|pattern| {
            pattern.strip_prefix('.').map_or_else(
                || filename.contains(pattern),
                |ext| filename.rsplit('.').next().is_some_and(|actual| actual == ext),
            )
        })
    })
}
