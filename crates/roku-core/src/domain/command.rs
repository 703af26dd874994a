//! ECP command vocabulary.
//!
//! Every remote-control action the bridge can perform is a [`Command`].  A
//! command knows only its *path* relative to the device (for example
//! `keypress/home`); the full URL is produced by [`format_command`] once the
//! device's base address is known.

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::domain::channel::Channel;

/// Characters left untouched inside a `Lit_` keystroke: the RFC 3986
/// unreserved set.  Everything else is percent-encoded as UTF-8.
const LITERAL_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Path of the reserved space keystroke.
pub const LITERAL_SPACE_PATH: &str = "keypress/Lit_%20";

/// A named remote-control button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Home,
    Up,
    Down,
    Left,
    Right,
    Select,
    Back,
    Info,
    Play,
    Rev,
    Fwd,
    InstantReplay,
    Power,
}

impl Key {
    /// The key name as it appears in an ECP `keypress/` path.
    pub fn as_str(self) -> &'static str {
        match self {
            Key::Home => "home",
            Key::Up => "up",
            Key::Down => "down",
            Key::Left => "left",
            Key::Right => "right",
            Key::Select => "select",
            Key::Back => "back",
            Key::Info => "info",
            Key::Play => "Play",
            Key::Rev => "rev",
            Key::Fwd => "fwd",
            Key::InstantReplay => "instantreplay",
            Key::Power => "Power",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ECP command, addressed relative to the device base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Press a named button: `keypress/<key>`.
    Keypress(Key),
    /// Type one character: `keypress/Lit_<char>`.
    Literal(char),
    /// Type a space through the reserved `keypress/Lit_%20` endpoint.
    LiteralSpace,
    /// Launch an installed channel: `launch/<id>`.
    Launch(Channel),
    /// A path supplied verbatim, e.g. by a user-defined routine.
    Raw(String),
}

impl Command {
    /// Renders the command path relative to the device base address.
    ///
    /// # Example
    ///
    /// ```rust
    /// use roku_core::{Channel, Command, Key};
    ///
    /// assert_eq!(Command::Keypress(Key::Home).path(), "keypress/home");
    /// assert_eq!(Command::Launch(Channel::Netflix).path(), "launch/12");
    /// assert_eq!(Command::Literal('?').path(), "keypress/Lit_%3F");
    /// ```
    pub fn path(&self) -> String {
        match self {
            Command::Keypress(key) => format!("keypress/{key}"),
            Command::Literal(c) => {
                let mut buf = [0u8; 4];
                let encoded = utf8_percent_encode(c.encode_utf8(&mut buf), LITERAL_ESCAPE);
                format!("keypress/Lit_{encoded}")
            }
            Command::LiteralSpace => LITERAL_SPACE_PATH.to_string(),
            Command::Launch(channel) => format!("launch/{}", channel.id()),
            Command::Raw(path) => path.trim_start_matches('/').to_string(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Joins a device base address and a command path into a full URL.
///
/// Exactly one `/` separates the two parts regardless of whether `base` ends
/// with a slash (SSDP `LOCATION` headers usually do) or `path` starts with one.
///
/// ```rust
/// use roku_core::format_command;
///
/// let url = format_command("http://192.168.1.20:8060/", "keypress/home");
/// assert_eq!(url, "http://192.168.1.20:8060/keypress/home");
/// ```
pub fn format_command(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────
