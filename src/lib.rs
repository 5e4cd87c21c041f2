//! # Kilo
//!
//! A minimal terminal text editor with syntax highlighting, incremental
//! search, and save, for byte-oriented source files.

pub use crate::{config::Config, editor::Editor, error::Error};

pub mod ansi_escape;
mod buffer;
mod config;
mod editor;
mod error;
mod row;
mod syntax;
mod terminal;
mod unix;
use unix as sys;
