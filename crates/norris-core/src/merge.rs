// Merge stage: one row per defenseman-season carrying his team's standings
// and, when he received any, his award votes.

use std::collections::HashMap;
use tracing::info;

use crate::data::loader::Tables;
use crate::data::records::{SkaterRecord, TeamRecord, VoteRecord};
use crate::season::Season;

#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("no standings for team `{team}` in season {season} (needed by {player})")]
    Integrity {
        team: String,
        season: Season,
        player: String,
    },
}

/// Voting fields carried into the merged row. Identity columns (age, team,
/// position) are already on the skater side and are left out.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VoteStats {
    pub placement: Option<f64>,
    pub votes: Option<f64>,
    pub first_place_votes: Option<f64>,
}

impl From<&VoteRecord> for VoteStats {
    fn from(row: &VoteRecord) -> Self {
        VoteStats {
            placement: row.placement,
            votes: row.votes,
            first_place_votes: row.first_place_votes,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergedRow {
    pub skater: SkaterRecord,
    pub team: TeamRecord,
    /// `None` when the player received no votes that season.
    pub votes: Option<VoteStats>,
}

/// Join skaters to standings by (season, team) and to votes by
/// (season, player). Skater order is preserved.
///
/// A skater whose team has no standings row, or whose standings row has no
/// metrics at all, means the code tables are out of step and is an error.
pub fn merge(tables: Tables) -> Result<Vec<MergedRow>, MergeError> {
    let Tables {
        standings,
        skaters,
        votes,
    } = tables;

    let standings: HashMap<(Season, String), TeamRecord> = standings
        .into_iter()
        .map(|row| ((row.season, row.team.clone()), row))
        .collect();

    let votes: HashMap<(Season, String), VoteStats> = votes
        .iter()
        .map(|row| ((row.season, row.player.clone()), VoteStats::from(row)))
        .collect();

    let mut merged = Vec::with_capacity(skaters.len());
    for skater in skaters {
        let team = standings
            .get(&(skater.season, skater.team.clone()))
            .filter(|team| !team.metrics_all_null())
            .cloned()
            .ok_or_else(|| MergeError::Integrity {
                team: skater.team.clone(),
                season: skater.season,
                player: skater.player.clone(),
            })?;
        let votes = votes.get(&(skater.season, skater.player.clone())).copied();
        merged.push(MergedRow {
            skater,
            team,
            votes,
        });
    }

    info!(
        "merged {} player-seasons ({} with votes)",
        merged.len(),
        merged.iter().filter(|row| row.votes.is_some()).count()
    );
    Ok(merged)
}
