//! Errors returned by league operations.

use thiserror::Error;
use uuid::Uuid;

use crate::models::MatchStatus;

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum LeagueError {
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("A category with this name already exists")]
    DuplicateCategory,

    #[error("Pool {0} is listed more than once")]
    DuplicatePool(String),

    #[error("Category {0} still has teams")]
    CategoryInUse(String),

    #[error("Team not found")]
    TeamNotFound(Uuid),

    #[error("A team with this name already exists in the category")]
    DuplicateTeam,

    #[error("Pool {pool} does not exist in category {category}")]
    UnknownPool { category: String, pool: String },

    #[error("Name must not be empty")]
    EmptyName,

    #[error("Calendar not found")]
    CalendarNotFound(Uuid),

    #[error("A calendar already exists for category {0}")]
    DuplicateCalendar(String),

    #[error("Calendar was modified by someone else (expected version {expected}, found {found})")]
    VersionConflict { expected: u32, found: u32 },

    #[error("Pool index {0} is out of range")]
    PoolNotFound(usize),

    #[error("Round {0} is out of range")]
    RoundNotFound(usize),

    #[error("Match {0} is out of range")]
    CalendarMatchNotFound(usize),

    #[error("Team {0} is not a member of this pool")]
    TeamNotInPool(String),

    #[error("Pool has an even number of teams: no exempt to reassign")]
    EvenPool,

    #[error("A team cannot play against itself ({0})")]
    SelfMatch(String),

    #[error("Basketball matches cannot end in a tie")]
    TiedScore,

    #[error("Score {0} is above the maximum of {max}", max = crate::logic::MAX_SCORE)]
    ScoreOutOfRange(u32),

    #[error("Round {found} should be numbered {expected}")]
    InvalidRoundNumber { expected: u32, found: u32 },

    #[error("{home} vs {away} appears more than once in the pool")]
    RepeatedPairing { home: String, away: String },

    #[error("Exempt team {0} also plays in its round")]
    ExemptPlaying(String),

    #[error("Schedule conflict: {0}")]
    ScheduleConflict(String),

    #[error("Invalid scheduling options: {0}")]
    InvalidSchedulingOptions(String),

    #[error("Weekly schedule not found")]
    ScheduleNotFound(Uuid),

    #[error("Weekly schedule has already been turned into matches")]
    AlreadyMaterialized,

    #[error("Match not found")]
    MatchNotFound(Uuid),

    #[error("Cannot change match status from {from:?} to {to:?}")]
    InvalidStatusTransition { from: MatchStatus, to: MatchStatus },

    #[error("A score is required to finish a match")]
    MissingScore,

    #[error("Invalid CSV: {0}")]
    Csv(String),

    #[error("Export failed: {0}")]
    Export(String),
}

impl LeagueError {
    /// Whether the error means "the thing you asked for does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LeagueError::CategoryNotFound(_)
                | LeagueError::TeamNotFound(_)
                | LeagueError::CalendarNotFound(_)
                | LeagueError::ScheduleNotFound(_)
                | LeagueError::MatchNotFound(_)
        )
    }
}
