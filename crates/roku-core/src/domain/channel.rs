//! Well-known channel ids for `launch/<id>` commands.

use std::fmt;

/// An installable Roku channel that the bridge knows how to launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Amazon,
    Pandora,
    Hulu,
    NowTv,
    Plex,
    /// Live TV input; only present on Roku TVs.
    Tv,
    /// 4K Spotlight channel.
    FourK,
    Hbo,
    Fx,
    YouTube,
    Netflix,
    Shudder,
    IPlayer,
}

impl Channel {
    /// Every channel, in the order the route table lists them.
    pub const ALL: [Channel; 13] = [
        Channel::Amazon,
        Channel::Plex,
        Channel::Pandora,
        Channel::Hulu,
        Channel::NowTv,
        Channel::Tv,
        Channel::FourK,
        Channel::Hbo,
        Channel::YouTube,
        Channel::Netflix,
        Channel::Shudder,
        Channel::IPlayer,
        Channel::Fx,
    ];

    /// The ECP channel id used in `launch/<id>`.
    pub fn id(self) -> &'static str {
        match self {
            Channel::Amazon => "13",
            Channel::Pandora => "28",
            Channel::Hulu => "2285",
            Channel::NowTv => "20242",
            Channel::Plex => "13535",
            Channel::Tv => "tvinput.dtv",
            Channel::FourK => "69091",
            Channel::Hbo => "8378",
            Channel::Fx => "47389",
            Channel::YouTube => "837",
            Channel::Netflix => "12",
            Channel::Shudder => "59997",
            Channel::IPlayer => "11703",
        }
    }

    /// The route name under which the bridge exposes a launch of this channel.
    pub fn route_name(self) -> &'static str {
        match self {
            Channel::Amazon => "amazon",
            Channel::Pandora => "pandora",
            Channel::Hulu => "hulu",
            Channel::NowTv => "NowTV",
            Channel::Plex => "plex",
            Channel::Tv => "tv",
            Channel::FourK => "fourk",
            Channel::Hbo => "hbo",
            Channel::Fx => "fx",
            Channel::YouTube => "youtube",
            Channel::Netflix => "netflix",
            Channel::Shudder => "shudder",
            Channel::IPlayer => "iplayer",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.route_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_netflix_id_is_12() {
        assert_eq!(Channel::Netflix.id(), "12");
    }

    #[test]
    fn test_all_channel_ids_are_unique() {
        let ids: HashSet<_> = Channel::ALL.iter().map(|c| c.id()).collect();
        assert_eq!(ids.len(), Channel::ALL.len());
    }

    #[test]
    fn test_all_route_names_are_unique() {
        let names: HashSet<_> = Channel::ALL.iter().map(|c| c.route_name()).collect();
        assert_eq!(names.len(), Channel::ALL.len());
    }

    #[test]
    fn test_now_tv_route_name_keeps_mixed_case() {
        // Existing voice-assistant integrations call `/roku/NowTV` verbatim.
        assert_eq!(Channel::NowTv.route_name(), "NowTV");
    }
}
