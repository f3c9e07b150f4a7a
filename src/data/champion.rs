use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Affinity class of a champion. Declaration order is the index space of the
/// per-team category count vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Cosmic,
    Tech,
    Mutant,
    Skill,
    Science,
    Mystic,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Cosmic,
        Category::Tech,
        Category::Mutant,
        Category::Skill,
        Category::Science,
        Category::Mystic,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cosmic => "cosmic",
            Self::Tech => "tech",
            Self::Mutant => "mutant",
            Self::Skill => "skill",
            Self::Science => "science",
            Self::Mystic => "mystic",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}

/// Game mode a team is built for. Determines the default team size, which
/// champions are eligible and whether the winning team is written back to the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    Arena,
    Quest,
    AllianceWarAttack,
    AllianceWarDefense,
    AllianceQuest,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::Arena,
        Mode::Quest,
        Mode::AllianceWarAttack,
        Mode::AllianceWarDefense,
        Mode::AllianceQuest,
    ];

    /// Modes whose teams are saved as roster role assignments.
    pub const ALLIANCE: [Mode; 3] = [
        Mode::AllianceWarAttack,
        Mode::AllianceWarDefense,
        Mode::AllianceQuest,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Arena => "arena",
            Self::Quest => "quest",
            Self::AllianceWarAttack => "alliance-war-attack",
            Self::AllianceWarDefense => "alliance-war-defense",
            Self::AllianceQuest => "alliance-quest",
        }
    }

    pub fn default_size(self) -> usize {
        match self {
            Self::AllianceWarDefense => 5,
            _ => 3,
        }
    }

    /// Arena and quest results are never persisted to the roster.
    pub fn is_read_only(self) -> bool {
        matches!(self, Self::Arena | Self::Quest)
    }

    /// Whether a champion restricted to `role` may be used when building for this mode.
    pub fn accepts_role(self, role: Option<Mode>) -> bool {
        match (self, role) {
            (Mode::Arena, _) => true,
            (_, None) | (_, Some(Mode::Arena)) => true,
            (mode, Some(role)) => mode == role,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown mode '{s}'"))
    }
}

/// Stable identity of a roster entry: the same hero at different star levels
/// is a different champion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChampionId {
    pub uid: String,
    pub stars: u8,
}

impl ChampionId {
    pub fn new(uid: impl Into<String>, stars: u8) -> Self {
        Self {
            uid: uid.into(),
            stars,
        }
    }
}

impl fmt::Display for ChampionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.uid, self.stars)
    }
}

impl FromStr for ChampionId {
    type Err = String;

    /// Parses `"{uid}-{stars}"`. Uids may themselves contain dashes, so the
    /// star count is taken after the last one.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (uid, stars) = s
            .rsplit_once('-')
            .ok_or_else(|| format!("champion id '{s}' is missing a star suffix"))?;
        let stars = stars
            .parse::<u8>()
            .map_err(|_| format!("champion id '{s}' has an invalid star count"))?;
        if uid.is_empty() {
            return Err(format!("champion id '{s}' has an empty uid"));
        }
        Ok(Self::new(uid, stars))
    }
}

fn one() -> u8 {
    1
}

/// A champion as held in the user's roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterChampion {
    pub uid: String,
    pub stars: u8,
    #[serde(rename = "type")]
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Mode>,
    #[serde(default = "one")]
    pub rank: u8,
    #[serde(default = "one")]
    pub level: u8,
    #[serde(default)]
    pub awakened: u16,
    /// User-entered power index. 0 means unknown; the catalog value is used instead.
    #[serde(default)]
    pub pi: u32,
}

impl RosterChampion {
    pub fn new(uid: impl Into<String>, stars: u8, category: Category) -> Self {
        Self {
            uid: uid.into(),
            stars,
            category,
            role: None,
            rank: 1,
            level: 1,
            awakened: 0,
            pi: 0,
        }
    }

    pub fn with_pi(mut self, pi: u32) -> Self {
        self.pi = pi;
        self
    }

    pub fn with_role(mut self, role: Option<Mode>) -> Self {
        self.role = role;
        self
    }

    pub fn id(&self) -> ChampionId {
        ChampionId::new(self.uid.clone(), self.stars)
    }

    pub fn is(&self, id: &ChampionId) -> bool {
        self.uid == id.uid && self.stars == id.stars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn champion_id_round_trips_through_display() {
        let id = ChampionId::new("spider-man-2099", 4);
        assert_eq!(id.to_string(), "spider-man-2099-4");
        assert_eq!("spider-man-2099-4".parse::<ChampionId>(), Ok(id));
    }

    #[test]
    fn champion_id_rejects_missing_stars() {
        assert!("blackpanther".parse::<ChampionId>().is_err());
        assert!("-3".parse::<ChampionId>().is_err());
    }

    #[test]
    fn arena_accepts_every_role() {
        assert!(Mode::Arena.accepts_role(Some(Mode::AllianceWarDefense)));
        assert!(Mode::AllianceQuest.accepts_role(None));
        assert!(Mode::AllianceQuest.accepts_role(Some(Mode::Arena)));
        assert!(Mode::AllianceQuest.accepts_role(Some(Mode::AllianceQuest)));
        assert!(!Mode::AllianceQuest.accepts_role(Some(Mode::AllianceWarAttack)));
    }

    #[test]
    fn mode_parses_kebab_names() {
        assert_eq!("alliance-war-defense".parse::<Mode>(), Ok(Mode::AllianceWarDefense));
        assert_eq!(Mode::AllianceWarDefense.default_size(), 5);
        assert!("raid".parse::<Mode>().is_err());
    }

    #[test]
    fn category_indices_follow_declaration_order() {
        for (index, category) in Category::ALL.iter().enumerate() {
            assert_eq!(category.index(), index);
        }
    }
}
