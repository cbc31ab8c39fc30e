//! Data structures for the league: teams, categories, calendars, weekly schedules, matches.

mod calendar;
mod error;
mod league;
mod matches;
mod schedule;
mod team;

pub use calendar::{
    Calendar, CalendarGeneration, CalendarId, CalendarMatch, CalendarStructure, CalendarWarning,
    Forfeit, PlayoffRound, Pool, Round,
};
pub use error::LeagueError;
pub use league::League;
pub use matches::{LeagueMatch, MatchId, MatchStatus};
pub use schedule::{
    AllocationOptions, AllocationOutcome, Fixture, ScheduleId, ScheduledFixture,
    UnscheduledFixture, UnscheduledReason, WeeklySchedule,
};
pub use team::{Category, CategoryId, Team, TeamId};
