//! Calendar, pools, rounds ("journées") and calendar matches.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a calendar.
pub type CalendarId = Uuid;

/// Which side forfeited a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Forfeit {
    Home,
    Away,
}

/// A fixture inside a round. Teams are referenced by name, never owned.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CalendarMatch {
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub home_score: Option<u32>,
    #[serde(default)]
    pub away_score: Option<u32>,
    #[serde(default)]
    pub forfeit: Option<Forfeit>,
}

impl CalendarMatch {
    pub fn new(home_team: impl Into<String>, away_team: impl Into<String>) -> Self {
        Self {
            home_team: home_team.into(),
            away_team: away_team.into(),
            home_score: None,
            away_score: None,
            forfeit: None,
        }
    }

    /// True once a score or a forfeit has been recorded.
    pub fn is_played(&self) -> bool {
        self.forfeit.is_some() || (self.home_score.is_some() && self.away_score.is_some())
    }

    pub fn involves(&self, team: &str) -> bool {
        self.home_team == team || self.away_team == team
    }

    /// Same unordered pair of teams, regardless of home/away.
    pub fn same_pairing(&self, other: &CalendarMatch) -> bool {
        (self.home_team == other.home_team && self.away_team == other.away_team)
            || (self.home_team == other.away_team && self.away_team == other.home_team)
    }
}

/// One round ("journée") of a round-robin.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Round {
    /// 1-based, contiguous within a pool.
    pub n: u32,
    pub matches: Vec<CalendarMatch>,
    /// Team sitting out this round (odd-sized pools only).
    #[serde(default)]
    pub exempt: Option<String>,
}

/// A pool ("poule") of teams with its own round-robin.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub name: String,
    pub teams: Vec<String>,
    pub rounds: Vec<Round>,
}

/// Pooled categories hold named pools; poolless categories hold a single round list.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalendarStructure {
    Pooled { pools: Vec<Pool> },
    Single { teams: Vec<String>, rounds: Vec<Round> },
}

impl CalendarStructure {
    /// Number of round-robin groups (1 for a poolless category).
    pub fn pool_count(&self) -> usize {
        match self {
            CalendarStructure::Pooled { pools } => pools.len(),
            CalendarStructure::Single { .. } => 1,
        }
    }

    /// Pool label, `None` for a poolless category or an unknown index.
    pub fn pool_name(&self, pool_index: usize) -> Option<&str> {
        match self {
            CalendarStructure::Pooled { pools } => pools.get(pool_index).map(|p| p.name.as_str()),
            CalendarStructure::Single { .. } => None,
        }
    }

    pub fn teams(&self, pool_index: usize) -> Option<&[String]> {
        match self {
            CalendarStructure::Pooled { pools } => pools.get(pool_index).map(|p| p.teams.as_slice()),
            CalendarStructure::Single { teams, .. } if pool_index == 0 => Some(teams.as_slice()),
            CalendarStructure::Single { .. } => None,
        }
    }

    pub fn rounds(&self, pool_index: usize) -> Option<&[Round]> {
        match self {
            CalendarStructure::Pooled { pools } => pools.get(pool_index).map(|p| p.rounds.as_slice()),
            CalendarStructure::Single { rounds, .. } if pool_index == 0 => Some(rounds.as_slice()),
            CalendarStructure::Single { .. } => None,
        }
    }

    pub fn rounds_mut(&mut self, pool_index: usize) -> Option<&mut Vec<Round>> {
        match self {
            CalendarStructure::Pooled { pools } => pools.get_mut(pool_index).map(|p| &mut p.rounds),
            CalendarStructure::Single { rounds, .. } if pool_index == 0 => Some(rounds),
            CalendarStructure::Single { .. } => None,
        }
    }

    /// Every team of every pool, in pool order.
    pub fn all_teams(&self) -> Vec<&str> {
        (0..self.pool_count())
            .filter_map(|i| self.teams(i))
            .flatten()
            .map(String::as_str)
            .collect()
    }
}

/// A manually built post-season round (no round-robin structure).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayoffRound {
    pub name: String,
    pub matches: Vec<CalendarMatch>,
}

/// Full calendar of one category.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Calendar {
    pub id: CalendarId,
    pub category: String,
    pub structure: CalendarStructure,
    #[serde(default)]
    pub playoffs: Vec<PlayoffRound>,
    /// 0 while generated (not yet saved); bumped on every saved edit.
    #[serde(default)]
    pub version: u32,
}

impl Calendar {
    pub fn new(category: impl Into<String>, structure: CalendarStructure) -> Self {
        Self {
            id: Uuid::new_v4(),
            category: category.into(),
            structure,
            playoffs: Vec::new(),
            version: 0,
        }
    }

    pub fn has_poules(&self) -> bool {
        matches!(self.structure, CalendarStructure::Pooled { .. })
    }
}

/// Non-fatal problems met while building or editing calendars.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalendarWarning {
    /// Fewer than 2 teams: the pool was emitted without rounds.
    PoolSkipped {
        category: String,
        pool: Option<String>,
        team_count: usize,
    },
    /// Team of a pooled category with no (or an unknown) pool label.
    TeamWithoutPool { category: String, team: String },
    /// The stored exempt order was not a permutation of the pool; the generated order was used.
    ExemptOrderRebuilt { category: String, pool: Option<String> },
}

impl std::fmt::Display for CalendarWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalendarWarning::PoolSkipped {
                category,
                pool: Some(pool),
                team_count,
            } => write!(f, "{} pool {}: {} team(s), no rounds generated", category, pool, team_count),
            CalendarWarning::PoolSkipped {
                category,
                pool: None,
                team_count,
            } => write!(f, "{}: {} team(s), no rounds generated", category, team_count),
            CalendarWarning::TeamWithoutPool { category, team } => {
                write!(f, "{}: team {} has no valid pool", category, team)
            }
            CalendarWarning::ExemptOrderRebuilt { category, .. } => {
                write!(f, "{}: exempt order was inconsistent and has been rebuilt", category)
            }
        }
    }
}

/// Output of calendar generation: calendars plus anything skipped along the way.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CalendarGeneration {
    pub calendars: Vec<Calendar>,
    pub warnings: Vec<CalendarWarning>,
}
