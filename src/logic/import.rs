//! Team roster import from CSV (`name,category,pool`).

use crate::models::LeagueError;
use serde::Deserialize;
use std::io::Read;

/// One roster line. `pool` may be left empty.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct TeamRow {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub pool: Option<String>,
}

/// Parse a headed CSV roster. Fields are trimmed; an empty pool becomes `None`.
pub fn teams_from_csv<R: Read>(reader: R) -> Result<Vec<TeamRow>, LeagueError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader
        .deserialize::<TeamRow>()
        .map(|row| {
            let mut row = row.map_err(|e| LeagueError::Csv(e.to_string()))?;
            row.pool = row.pool.filter(|p| !p.is_empty());
            if row.name.is_empty() || row.category.is_empty() {
                return Err(LeagueError::EmptyName);
            }
            Ok(row)
        })
        .collect()
}
