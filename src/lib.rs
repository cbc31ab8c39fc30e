//! Basketball league web app: library with models and scheduling logic.

pub mod config;
pub mod logic;
pub mod models;

pub use config::AppConfig;
pub use logic::{
    add_playoff_round, calendar_standings, calendar_to_json, collect_unscheduled_fixtures,
    compute_standings, generate_complete_calendar_structure, generate_round_robin,
    reassign_exempt, record_result, schedule_matches_with_constraints, schedule_to_csv,
    shuffle_roster, teams_from_csv, validate_calendar, ExemptReassignment, MatchResult,
    PoolStandings, StandingRow, TeamRow, MAX_SCORE,
};
pub use models::{
    AllocationOptions, AllocationOutcome, Calendar, CalendarGeneration, CalendarId, CalendarMatch,
    CalendarStructure, CalendarWarning, Category, CategoryId, Fixture, Forfeit, League,
    LeagueError, LeagueMatch, MatchId, MatchStatus, PlayoffRound, Pool, Round, ScheduleId,
    ScheduledFixture, Team, TeamId, UnscheduledFixture, UnscheduledReason, WeeklySchedule,
};
