//! League business logic: round-robin generation, calendars, exempt changes, weekly allocation.

mod allocator;
mod calendar_builder;
mod exempt;
mod export;
mod fixtures;
mod import;
mod playoffs;
mod round_robin;
mod standings;

pub(crate) use allocator::check_schedule_conflicts;
pub use allocator::schedule_matches_with_constraints;
pub use calendar_builder::{generate_complete_calendar_structure, shuffle_roster, validate_calendar};
pub use exempt::{reassign_exempt, ExemptReassignment};
pub use export::{calendar_to_json, schedule_to_csv};
pub use fixtures::collect_unscheduled_fixtures;
pub use import::{teams_from_csv, TeamRow};
pub use playoffs::add_playoff_round;
pub use round_robin::generate_round_robin;
pub use standings::{
    calendar_standings, compute_standings, record_result, MatchResult, PoolStandings, StandingRow,
    FORFEIT_SCORE, MAX_SCORE, POINTS_FORFEIT, POINTS_LOSS, POINTS_WIN,
};
