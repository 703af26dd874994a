//! Steps and sequences: the unit of work the command sequencer drains.
//!
//! A [`Sequence`] is an ordered, immutable list of [`Step`]s.  Each step is
//! either an ECP action or a pause.  Pauses exist because an ECP request
//! returns as soon as the HTTP exchange completes, long before the player has
//! finished animating to the next screen; routines therefore hard-code
//! experimentally tuned delays between button presses.

use std::ops::Add;
use std::time::Duration;

use crate::domain::channel::Channel;
use crate::domain::command::{Command, Key};
use crate::translate::translate;

/// One unit of a [`Sequence`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Send one ECP command to the device.
    Action(Command),
    /// Pause this sequence for the given number of milliseconds.
    Delay(u64),
}

impl Step {
    /// Shorthand for `Step::Action(Command::Keypress(key))`.
    pub fn key(key: Key) -> Self {
        Step::Action(Command::Keypress(key))
    }

    /// Returns the pause length for a `Delay` step.
    pub fn duration(&self) -> Option<Duration> {
        match self {
            Step::Delay(ms) => Some(Duration::from_millis(*ms)),
            Step::Action(_) => None,
        }
    }

    pub fn is_action(&self) -> bool {
        matches!(self, Step::Action(_))
    }
}

/// An ordered, finite list of steps.
///
/// Sequences are built once and never mutated.  Concatenating two sequences
/// (`a + b`) keeps every step of `a`, in order, ahead of every step of `b`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sequence {
    steps: Vec<Step>,
}

impl Sequence {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// The sequence with no steps.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// Number of `Action` steps.
    pub fn action_count(&self) -> usize {
        self.steps.iter().filter(|s| s.is_action()).count()
    }

    /// Sum of every `Delay` step; a lower bound on how long the sequence takes.
    pub fn total_delay(&self) -> Duration {
        self.steps.iter().filter_map(Step::duration).sum()
    }

    /// Appends `other` after this sequence.
    pub fn concat(mut self, other: Sequence) -> Sequence {
        self.steps.extend(other.steps);
        self
    }
}

impl Add for Sequence {
    type Output = Sequence;

    fn add(self, rhs: Sequence) -> Sequence {
        self.concat(rhs)
    }
}

impl From<Vec<Step>> for Sequence {
    fn from(steps: Vec<Step>) -> Self {
        Self::new(steps)
    }
}

impl FromIterator<Step> for Sequence {
    fn from_iter<I: IntoIterator<Item = Step>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for Sequence {
    type Item = Step;
    type IntoIter = std::vec::IntoIter<Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}

/// Fluent builder for the hand-tuned routines in the route table.
///
/// ```rust
/// use roku_core::{Key, SequenceBuilder, Step};
///
/// let seq = SequenceBuilder::new()
///     .key(Key::Home)
///     .wait(3000)
///     .repeat(Key::Down, 2, 100)
///     .build();
///
/// assert_eq!(seq.len(), 6);
/// assert_eq!(seq.get(1), Some(&Step::Delay(3000)));
/// ```
#[derive(Debug, Default)]
pub struct SequenceBuilder {
    steps: Vec<Step>,
}

impl SequenceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an arbitrary command.
    pub fn command(mut self, command: Command) -> Self {
        self.steps.push(Step::Action(command));
        self
    }

    /// Appends a single button press.
    pub fn key(self, key: Key) -> Self {
        self.command(Command::Keypress(key))
    }

    /// Appends a channel launch.
    pub fn launch(self, channel: Channel) -> Self {
        self.command(Command::Launch(channel))
    }

    /// Appends a pause.
    pub fn wait(mut self, ms: u64) -> Self {
        self.steps.push(Step::Delay(ms));
        self
    }

    /// Appends `times` presses of `key`, each followed by a `delay_ms` pause.
    pub fn repeat(mut self, key: Key, times: usize, delay_ms: u64) -> Self {
        for _ in 0..times {
            self = self.key(key).wait(delay_ms);
        }
        self
    }

    /// Appends the keystrokes for `text` (see [`translate`]).
    pub fn text(self, text: &str) -> Self {
        self.sequence(translate(text))
    }

    /// Appends every step of an existing sequence.
    pub fn sequence(mut self, sequence: Sequence) -> Self {
        self.steps.extend(sequence);
        self
    }

    pub fn build(self) -> Sequence {
        Sequence::new(self.steps)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
