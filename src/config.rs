//! # Configuration
//!
//! Static editor configuration. Unlike file-backed configuration formats,
//! these values are compiled into the binary.

use std::time::Duration;

/// Number of columns a tab character advances the cursor by.
pub(crate) const TAB_STOP: usize = 4;

/// Number of times Ctrl-Q must be pressed in a row to quit with unsaved changes.
pub(crate) const QUIT_TIMES: usize = 2;

/// How long a status message stays on screen before being cleared.
pub(crate) const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(5);

/// The global Kilo configuration.
pub struct Config {
    /// The size of a tab. Must be > 0.
    pub(crate) tab_stop: usize,
    /// The number of confirmations needed before quitting, when changes have been made since the
    /// file was last saved.
    pub(crate) quit_times: usize,
    /// The duration for which messages are shown in the status bar.
    pub(crate) message_duration: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self { tab_stop: TAB_STOP, quit_times: QUIT_TIMES, message_duration: STATUS_MESSAGE_TTL }
    }
}
