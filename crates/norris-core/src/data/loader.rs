// Loading per-season tables and concatenating them across seasons.

use csv::StringRecord;
use serde::de::DeserializeOwned;
use std::io::Read;
use tracing::{debug, info, warn};

use crate::data::records::{
    RawSkater, RawStanding, RawVote, SkaterRecord, TeamRecord, VoteRecord,
};
use crate::data::source::{Family, TableSource};
use crate::season::Season;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("missing {family} table for season {season} at {location}")]
    MissingData {
        family: Family,
        season: Season,
        location: String,
    },

    #[error("failed to read {location}: {source}")]
    Io {
        location: String,
        source: std::io::Error,
    },

    #[error("CSV error in {family} table for season {season}: {source}")]
    Csv {
        family: Family,
        season: Season,
        source: csv::Error,
    },
}

// ---------------------------------------------------------------------------
// Table containers
// ---------------------------------------------------------------------------

/// Rows of one family for one season.
#[derive(Debug, Clone)]
pub struct SeasonTable<R> {
    pub season: Season,
    pub rows: Vec<R>,
}

/// Every family's per-season tables, each in catalog order.
#[derive(Debug, Clone, Default)]
pub struct SeasonTables {
    pub standings: Vec<SeasonTable<TeamRecord>>,
    pub skater_stats: Vec<SeasonTable<SkaterRecord>>,
    pub voting: Vec<SeasonTable<VoteRecord>>,
}

/// Every family concatenated across seasons.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub standings: Vec<TeamRecord>,
    pub skaters: Vec<SkaterRecord>,
    pub votes: Vec<VoteRecord>,
}

// ---------------------------------------------------------------------------
// Reader-based parsing
// ---------------------------------------------------------------------------

/// Column whose value repeats its own header on the scraped pages' inline
/// header rows.
const PLAYER_HEADER: &str = "Player";

/// Inline copy of the header row, repeated every few dozen players in the
/// scraped tables.
fn is_repeated_header(record: &StringRecord, headers: &StringRecord) -> bool {
    headers
        .iter()
        .zip(record.iter())
        .any(|(header, value)| header == PLAYER_HEADER && value.trim() == PLAYER_HEADER)
}

/// Deserialize every row of a CSV table.
///
/// Files written by the collector carry an unlabeled leading index column,
/// so their data rows have one more field than the header; that field is
/// dropped. Repeated header rows are skipped. Any other row that does not
/// fit the expected shape fails the whole table.
fn read_rows<T: DeserializeOwned, R: Read>(
    rdr: R,
    family: Family,
    season: Season,
) -> Result<Vec<T>, LoadError> {
    let csv_error = |source: csv::Error| LoadError::Csv {
        family,
        season,
        source,
    };
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
    let headers = reader.headers().map_err(csv_error)?.clone();

    let mut rows = Vec::new();
    for result in reader.records() {
        let mut record = result.map_err(csv_error)?;
        if record.len() == headers.len() + 1 {
            record = record.iter().skip(1).collect();
        }
        if is_repeated_header(&record, &headers) {
            continue;
        }
        rows.push(record.deserialize(Some(&headers)).map_err(csv_error)?);
    }
    Ok(rows)
}

pub fn read_standings<R: Read>(rdr: R, season: Season) -> Result<Vec<TeamRecord>, LoadError> {
    let raw: Vec<RawStanding> = read_rows(rdr, Family::Standings, season)?;
    Ok(raw.into_iter().map(|r| r.into_record(season)).collect())
}

pub fn read_skaters<R: Read>(rdr: R, season: Season) -> Result<Vec<SkaterRecord>, LoadError> {
    let raw: Vec<RawSkater> = read_rows(rdr, Family::SkaterStats, season)?;
    Ok(raw.into_iter().map(|r| r.into_record(season)).collect())
}

pub fn read_votes<R: Read>(rdr: R, season: Season) -> Result<Vec<VoteRecord>, LoadError> {
    let raw: Vec<RawVote> = read_rows(rdr, Family::Voting, season)?;
    Ok(raw.into_iter().map(|r| r.into_record(season)).collect())
}

// ---------------------------------------------------------------------------
// Loading across the catalog
// ---------------------------------------------------------------------------

/// Load every family for every season.
///
/// A missing voting table is expected for the season in progress and only
/// drops that season from the voting family. Every other failure aborts.
pub fn create_tables(
    source: &dyn TableSource,
    seasons: &[Season],
) -> Result<SeasonTables, LoadError> {
    let mut tables = SeasonTables::default();

    for &season in seasons {
        let rows = read_standings(source.open(Family::Standings, season)?, season)?;
        debug!("loaded {} standings rows for {season}", rows.len());
        tables.standings.push(SeasonTable { season, rows });

        let rows = read_skaters(source.open(Family::SkaterStats, season)?, season)?;
        debug!("loaded {} skater rows for {season}", rows.len());
        tables.skater_stats.push(SeasonTable { season, rows });

        match source.open(Family::Voting, season) {
            Ok(rdr) => {
                let rows = read_votes(rdr, season)?;
                debug!("loaded {} voting rows for {season}", rows.len());
                tables.voting.push(SeasonTable { season, rows });
            }
            Err(LoadError::MissingData { location, .. }) => {
                warn!("no voting table for {season} ({location}); treating season as unvoted");
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        "loaded tables for {} seasons ({} with voting)",
        tables.standings.len(),
        tables.voting.len()
    );
    Ok(tables)
}

fn concat<R>(tables: Vec<SeasonTable<R>>) -> Vec<R> {
    tables.into_iter().flat_map(|t| t.rows).collect()
}

/// Concatenate each family's per-season tables in season order.
pub fn aggregate(tables: SeasonTables) -> Tables {
    Tables {
        standings: concat(tables.standings),
        skaters: concat(tables.skater_stats),
        votes: concat(tables.voting),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
