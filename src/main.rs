//! # Kilo

use kilo::{Config, Editor, Error};

/// Parse the command line, then initialize and run the editor, optionally
/// opening a file if one was given.
///
/// # Errors
///
/// Any error that occurs during the execution of the program is returned by
/// this function.
fn main() -> Result<(), Error> {
    let mut args = std::env::args();
    match (args.nth(1), /*remaining_args=*/ args.len()) {
        (Some(arg), 0) if arg == "--version" => println!("kilo {}", env!("KILO_VERSION")),
        (Some(arg), 0) if arg.starts_with('-') => return Err(Error::UnrecognizedOption(arg)),
        (file_name, 0) => Editor::new(Config::default()).run(file_name)?,
        (_, n_remaining_args) => return Err(Error::TooManyArguments(n_remaining_args + 1)),
    }
    Ok(())
}
