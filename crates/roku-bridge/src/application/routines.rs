//! Route name → [`Sequence`] table.
//!
//! Every inbound request names a routine.  A routine is either a fixed
//! sequence, or a text routine whose body text is typed out between a fixed
//! prefix and suffix.  The built-in table covers the remote's buttons, a few
//! multi-step navigation macros, free-text search, and one launch routine per
//! [`Channel`].  Configuration can add more routines or override built-ins.

use std::collections::HashMap;

use roku_core::{translate, Channel, Command, Key, Sequence, SequenceBuilder, Step};
use thiserror::Error;
use tracing::debug;

/// Error type for user-defined routines.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoutineError {
    /// A step is neither a command path nor a non-negative delay.
    #[error("routine {routine:?}: step {index} has unsupported shape {found}")]
    UnknownStepShape {
        routine: String,
        index: usize,
        found: String,
    },
    /// A command path was empty.
    #[error("routine {routine:?}: step {index} is an empty command path")]
    EmptyCommand { routine: String, index: usize },
}

/// What a route name does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routine {
    /// Runs the same steps on every request; the body is ignored.
    Fixed(Sequence),
    /// Types the lower-cased request body between `prefix` and `suffix`.
    Text { prefix: Sequence, suffix: Sequence },
}

impl Routine {
    /// A text routine with nothing around the typed text.
    pub fn text_only() -> Self {
        Routine::Text {
            prefix: Sequence::empty(),
            suffix: Sequence::empty(),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Routine::Text { .. })
    }

    /// Produces the sequence to run for a request with the given body.
    pub fn build(&self, body: &str) -> Sequence {
        match self {
            Routine::Fixed(sequence) => sequence.clone(),
            Routine::Text { prefix, suffix } => prefix
                .clone()
                .concat(translate(&body.to_lowercase()))
                .concat(suffix.clone()),
        }
    }
}

/// Lookup table from route name to [`Routine`].
#[derive(Debug, Clone, Default)]
pub struct RoutineTable {
    routines: HashMap<String, Routine>,
}

impl RoutineTable {
    /// A table with no routines at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in routine set.
    pub fn builtin() -> Self {
        let mut table = Self::new();

        // Single buttons.
        for (name, key) in [
            ("playpause", Key::Play),
            ("power", Key::Power),
            ("rewind", Key::Rev),
            ("fastforward", Key::Fwd),
            ("up", Key::Up),
            ("down", Key::Down),
            ("back", Key::Back),
            ("left", Key::Left),
            ("instantreplay", Key::InstantReplay),
            ("right", Key::Right),
            ("select", Key::Select),
            ("home", Key::Home),
        ] {
            table.insert(name, Routine::Fixed(SequenceBuilder::new().key(key).build()));
        }

        // Repeated arrows.  Down and the first up repeat are quicker.
        let counts = [("two", 2), ("three", 3), ("four", 4), ("five", 5)];
        for (suffix, times) in counts {
            table.insert_repeat(&format!("down{suffix}"), Key::Down, times, 100);
            table.insert_repeat(&format!("right{suffix}"), Key::Right, times, 150);
            table.insert_repeat(&format!("left{suffix}"), Key::Left, times, 150);
            let up_delay = if times == 2 { 100 } else { 150 };
            table.insert_repeat(&format!("up{suffix}"), Key::Up, times, up_delay);
        }

        table.insert("playlast", Routine::Fixed(play_last()));
        table.insert("captionson", Routine::Fixed(captions(Key::Right)));
        table.insert("captionsoff", Routine::Fixed(captions(Key::Left)));
        table.insert("nextepisode", Routine::Fixed(episode(Key::Right)));
        table.insert("lastepisode", Routine::Fixed(episode(Key::Left)));
        table.insert("playlastyoutube", Routine::Fixed(play_last_youtube()));

        table.insert("type", Routine::text_only());
        table.insert("search", Routine::text_only());
        table.insert("searchroku", search_roku());
        table.insert("searchplex", search_plex());

        for channel in Channel::ALL {
            table.insert(
                channel.route_name(),
                Routine::Fixed(SequenceBuilder::new().launch(channel).build()),
            );
        }

        table
    }

    /// Adds or replaces a routine.  Returns the routine it replaced, if any.
    pub fn insert(&mut self, name: impl Into<String>, routine: Routine) -> Option<Routine> {
        self.routines.insert(name.into(), routine)
    }

    fn insert_repeat(&mut self, name: &str, key: Key, times: usize, delay_ms: u64) {
        self.insert(
            name,
            Routine::Fixed(SequenceBuilder::new().repeat(key, times, delay_ms).build()),
        );
    }

    /// Parses a user-defined routine and adds it, overriding any built-in of
    /// the same name.  On error the table is left unchanged.
    pub fn insert_custom(&mut self, name: &str, steps: &[toml::Value]) -> Result<(), RoutineError> {
        let sequence = parse_steps(name, steps)?;
        if self.insert(name, Routine::Fixed(sequence)).is_some() {
            debug!(routine = name, "custom routine overrides built-in");
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Routine> {
        self.routines.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.routines.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.routines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routines.is_empty()
    }

    /// Route names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.routines.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Turns config steps into a sequence: strings are command paths relative to
/// the device base URL, non-negative integers are delays in milliseconds.
pub fn parse_steps(routine: &str, steps: &[toml::Value]) -> Result<Sequence, RoutineError> {
    steps
        .iter()
        .enumerate()
        .map(|(index, value)| match value {
            toml::Value::String(path) => {
                let path = path.trim_start_matches('/');
                if path.is_empty() {
                    Err(RoutineError::EmptyCommand {
                        routine: routine.to_string(),
                        index,
                    })
                } else {
                    Ok(Step::Action(Command::Raw(path.to_string())))
                }
            }
            toml::Value::Integer(ms) if *ms >= 0 => Ok(Step::Delay(*ms as u64)),
            other => Err(RoutineError::UnknownStepShape {
                routine: routine.to_string(),
                index,
                found: other.to_string(),
            }),
        })
        .collect()
}

// ── Built-in macros ───────────────────────────────────────────────────────────

fn play_last() -> Sequence {
    SequenceBuilder::new()
        .key(Key::Home)
        .key(Key::Home)
        .wait(3000)
        .launch(Channel::Netflix)
        .wait(7000)
        .key(Key::Down)
        .key(Key::Right)
        .wait(1000)
        .key(Key::Select)
        .wait(3000)
        .key(Key::Play)
        .build()
}

/// Roku TV caption menu; `toggle` picks on (right) or off (left).
fn captions(toggle: Key) -> Sequence {
    SequenceBuilder::new()
        .key(Key::Info)
        .wait(150)
        .repeat(Key::Down, 5, 150)
        .key(toggle)
        .wait(150)
        .key(Key::Info)
        .wait(150)
        .build()
}

fn episode(direction: Key) -> Sequence {
    SequenceBuilder::new()
        .key(Key::Back)
        .wait(1000)
        .repeat(Key::Down, 2, 100)
        .key(Key::Select)
        .wait(2000)
        .key(direction)
        .wait(100)
        .key(Key::Select)
        .wait(1000)
        .key(Key::Play)
        .build()
}

fn play_last_youtube() -> Sequence {
    SequenceBuilder::new()
        .key(Key::Home)
        .wait(500)
        .launch(Channel::YouTube)
        .wait(20000)
        .repeat(Key::Up, 2, 400)
        .key(Key::Select)
        .wait(800)
        .key(Key::Up)
        .wait(800)
        .repeat(Key::Select, 2, 3200)
        .key(Key::Select)
        .wait(3000)
        .build()
}

fn search_roku() -> Routine {
    let prefix = SequenceBuilder::new()
        .key(Key::Home)
        .key(Key::Home)
        .wait(2200)
        .repeat(Key::Down, 5, 150)
        .key(Key::Select)
        .wait(800)
        .build();
    let suffix = SequenceBuilder::new()
        .repeat(Key::Right, 5, 150)
        .key(Key::Right)
        .wait(500)
        .key(Key::Select)
        .wait(1700)
        .key(Key::Select)
        .wait(4000)
        .build();
    Routine::Text { prefix, suffix }
}

fn search_plex() -> Routine {
    let prefix = SequenceBuilder::new()
        .key(Key::Home)
        .key(Key::Home)
        .wait(2000)
        .launch(Channel::Plex)
        .wait(7250)
        .key(Key::Up)
        .wait(250)
        .key(Key::Select)
        .wait(250)
        .build();
    let suffix = SequenceBuilder::new()
        .repeat(Key::Right, 4, 250)
        .key(Key::Right)
        .wait(1500)
        .key(Key::Right)
        .wait(1200)
        .repeat(Key::Select, 2, 750)
        .build();
    Routine::Text { prefix, suffix }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn paths(sequence: &Sequence) -> Vec<String> {
        sequence
            .steps()
            .iter()
            .filter_map(|s| match s {
                Step::Action(c) => Some(c.path()),
                Step::Delay(_) => None,
            })
            .collect()
    }

    fn fixed(table: &RoutineTable, name: &str) -> Sequence {
        match table.get(name) {
            Some(Routine::Fixed(s)) => s.clone(),
            other => panic!("{name}: expected fixed routine, got {other:?}"),
        }
    }

    #[test]
    fn test_builtin_table_size() {
        // 12 buttons, 16 repeats, 6 macros, 4 text routines, 13 channels
        assert_eq!(RoutineTable::builtin().len(), 51);
    }

    #[test]
    fn test_single_button_routines_use_ecp_key_names() {
        let table = RoutineTable::builtin();
        let cases = [
            ("playpause", "keypress/Play"),
            ("power", "keypress/Power"),
            ("rewind", "keypress/rev"),
            ("fastforward", "keypress/fwd"),
            ("instantreplay", "keypress/instantreplay"),
            ("home", "keypress/home"),
            ("select", "keypress/select"),
        ];
        for (name, path) in cases {
            let seq = fixed(&table, name);
            assert_eq!(seq.len(), 1, "{name}");
            assert_eq!(paths(&seq), vec![path], "{name}");
        }
    }

    #[test]
    fn test_repeat_delays() {
        let table = RoutineTable::builtin();

        let down = fixed(&table, "downthree");
        assert_eq!(down.action_count(), 3);
        assert_eq!(down.total_delay(), Duration::from_millis(300));

        let up_two = fixed(&table, "uptwo");
        assert_eq!(up_two.total_delay(), Duration::from_millis(200));

        let up_four = fixed(&table, "upfour");
        assert_eq!(up_four.total_delay(), Duration::from_millis(600));

        let left = fixed(&table, "leftfive");
        assert_eq!(paths(&left), vec!["keypress/left"; 5]);
        assert_eq!(left.total_delay(), Duration::from_millis(750));
    }

    #[test]
    fn test_play_last_steps() {
        let seq = fixed(&RoutineTable::builtin(), "playlast");

        assert_eq!(
            paths(&seq),
            vec![
                "keypress/home",
                "keypress/home",
                "launch/12",
                "keypress/down",
                "keypress/right",
                "keypress/select",
                "keypress/Play",
            ]
        );
        assert_eq!(seq.get(2), Some(&Step::Delay(3000)));
        assert_eq!(seq.total_delay(), Duration::from_millis(14_000));
    }

    #[test]
    fn test_captions_differ_only_in_toggle_direction() {
        let table = RoutineTable::builtin();
        let on = paths(&fixed(&table, "captionson"));
        let off = paths(&fixed(&table, "captionsoff"));

        assert_eq!(on.len(), 8);
        assert_eq!(on[6], "keypress/right");
        assert_eq!(off[6], "keypress/left");
        assert_eq!(on[..6], off[..6]);
        assert_eq!(on[7], "keypress/info");
    }

    #[test]
    fn test_play_last_youtube_launches_youtube() {
        let seq = fixed(&RoutineTable::builtin(), "playlastyoutube");

        assert_eq!(paths(&seq)[1], "launch/837");
        assert_eq!(seq.get(3), Some(&Step::Delay(20000)));
        assert_eq!(seq.action_count(), 9);
    }

    #[test]
    fn test_channel_routines_launch_by_id() {
        let table = RoutineTable::builtin();
        for channel in Channel::ALL {
            let seq = fixed(&table, channel.route_name());
            assert_eq!(paths(&seq), vec![format!("launch/{}", channel.id())]);
        }
        assert!(table.contains("NowTV"));
        assert!(!table.contains("nowtv"));
    }

    #[test]
    fn test_text_routine_lowercases_and_translates_body() {
        let seq = RoutineTable::builtin().get("type").unwrap().build("Hi U");

        assert_eq!(
            paths(&seq),
            vec![
                "keypress/Lit_h",
                "keypress/Lit_i",
                "keypress/Lit_%20",
                "keypress/Lit_u",
            ]
        );
        assert_eq!(seq.len(), 8);
    }

    #[test]
    fn test_search_roku_splices_text_between_prefix_and_suffix() {
        // Arrange
        let routine = RoutineTable::builtin().get("searchroku").cloned().unwrap();

        // Act
        let seq = routine.build("x");
        let p = paths(&seq);

        // Assert
        assert!(routine.is_text());
        assert_eq!(&p[..2], &["keypress/home", "keypress/home"]);
        let typed = p.iter().position(|s| s == "keypress/Lit_x").unwrap();
        assert_eq!(typed, 8);
        assert_eq!(p[typed - 1], "keypress/select");
        assert_eq!(p[typed + 1], "keypress/right");
        assert_eq!(p.len(), 8 + 1 + 8);
    }

    #[test]
    fn test_search_plex_with_empty_body_is_prefix_plus_suffix() {
        let seq = RoutineTable::builtin().get("searchplex").unwrap().build("");
        let p = paths(&seq);

        assert_eq!(p[2], "launch/13535");
        assert!(!p.iter().any(|s| s.starts_with("keypress/Lit_")));
        assert_eq!(p.last().map(String::as_str), Some("keypress/select"));
    }

    #[test]
    fn test_fixed_routine_ignores_body() {
        let routine = RoutineTable::builtin().get("up").cloned().unwrap();
        assert_eq!(routine.build("ignored"), routine.build(""));
    }

    // ── custom routines ──────────────────────────────────────────────────────

    #[test]
    fn test_custom_routine_parses_paths_and_delays() {
        // Arrange
        let mut table = RoutineTable::new();
        let steps = vec![
            toml::Value::String("keypress/home".into()),
            toml::Value::Integer(3000),
            toml::Value::String("/launch/12".into()),
        ];

        // Act
        table.insert_custom("netflixhome", &steps).unwrap();

        // Assert
        let seq = fixed(&table, "netflixhome");
        assert_eq!(paths(&seq), vec!["keypress/home", "launch/12"]);
        assert_eq!(seq.get(1), Some(&Step::Delay(3000)));
    }

    #[test]
    fn test_custom_routine_overrides_builtin() {
        let mut table = RoutineTable::builtin();
        table
            .insert_custom("home", &[toml::Value::String("keypress/back".into())])
            .unwrap();

        assert_eq!(paths(&fixed(&table, "home")), vec!["keypress/back"]);
        assert_eq!(table.len(), 51);
    }

    #[test]
    fn test_custom_routine_rejects_unknown_step_shape() {
        // Arrange
        let mut table = RoutineTable::new();
        let steps = vec![
            toml::Value::String("keypress/up".into()),
            toml::Value::Boolean(true),
        ];

        // Act
        let err = table.insert_custom("broken", &steps).unwrap_err();

        // Assert
        assert!(matches!(
            err,
            RoutineError::UnknownStepShape { ref routine, index: 1, .. } if routine == "broken"
        ));
        assert!(table.is_empty());
    }

    #[test]
    fn test_custom_routine_rejects_negative_delay_and_empty_path() {
        assert!(matches!(
            parse_steps("r", &[toml::Value::Integer(-5)]),
            Err(RoutineError::UnknownStepShape { index: 0, .. })
        ));
        assert_eq!(
            parse_steps("r", &[toml::Value::String("/".into())]),
            Err(RoutineError::EmptyCommand {
                routine: "r".into(),
                index: 0
            })
        );
    }

    #[test]
    fn test_names_are_sorted() {
        let table = RoutineTable::builtin();
        let names = table.names();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }
}
