//! Downloadable calendar JSON and printable weekly schedule CSV.

use crate::models::{Calendar, LeagueError, WeeklySchedule};

/// Pretty-printed JSON of a calendar, for download.
pub fn calendar_to_json(calendar: &Calendar) -> Result<String, LeagueError> {
    serde_json::to_string_pretty(calendar).map_err(|e| LeagueError::Export(e.to_string()))
}

/// One line per scheduled fixture, already in date/time order.
pub fn schedule_to_csv(schedule: &WeeklySchedule) -> Result<String, LeagueError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["date", "time", "venue", "category", "pool", "journee", "home", "away"])
        .map_err(|e| LeagueError::Export(e.to_string()))?;

    for s in &schedule.fixtures {
        let f = &s.fixture;
        writer
            .write_record([
                s.date.format("%Y-%m-%d").to_string(),
                s.time.format("%H:%M").to_string(),
                s.venue.clone(),
                f.category.clone(),
                f.pool.clone().unwrap_or_default(),
                f.journee.map(|j| j.to_string()).unwrap_or_default(),
                f.home_team.clone(),
                f.away_team.clone(),
            ])
            .map_err(|e| LeagueError::Export(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| LeagueError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| LeagueError::Export(e.to_string()))
}
