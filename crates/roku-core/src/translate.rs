//! Text-to-keystroke translation.
//!
//! ECP has no "type this string" command.  Text is entered one character at a
//! time through `keypress/Lit_<char>`, with a short pause after each so the
//! on-screen keyboard keeps up.
//!
//! The translator does not change case or filter characters.  Callers that
//! feed it voice-assistant text lower-case it first; anything else is passed
//! through and percent-encoded when the command path is rendered (see
//! [`Command::path`]).

use crate::domain::command::Command;
use crate::domain::sequence::{Sequence, Step};

/// Pause inserted after every typed character, in milliseconds.
pub const TYPE_DELAY_MS: u64 = 100;

/// Converts `text` into one literal keystroke per character, each followed by
/// a [`TYPE_DELAY_MS`] pause.
///
/// The space character is routed to the reserved space endpoint
/// ([`Command::LiteralSpace`]) rather than to `Lit_` with a raw space.
///
/// ```rust
/// use roku_core::{translate, Command, Step};
///
/// let seq = translate("ab");
/// assert_eq!(
///     seq.steps(),
///     &[
///         Step::Action(Command::Literal('a')),
///         Step::Delay(100),
///         Step::Action(Command::Literal('b')),
///         Step::Delay(100),
///     ]
/// );
/// ```
pub fn translate(text: &str) -> Sequence {
    text.chars()
        .flat_map(|c| {
            let command = match c {
                ' ' => Command::LiteralSpace,
                other => Command::Literal(other),
            };
            [Step::Action(command), Step::Delay(TYPE_DELAY_MS)]
        })
        .collect()
}
