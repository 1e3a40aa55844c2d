// Normalization stage: consistent names, team codes, defensemen only, and
// one row per player-season.

pub mod teams;
pub mod trades;

use tracing::info;

use crate::data::loader::Tables;
use crate::season::Season;

/// Roster position the ranking covers.
pub const DEFENSE_POSITION: &str = "D";

#[derive(Debug, thiserror::Error)]
pub enum NormalizationError {
    #[error("team name `{name}` in season {season} has no code")]
    UnmappedTeam { name: String, season: Season },

    #[error("team code `{code}` for {player} in season {season} is not a known code")]
    UnknownTeamCode {
        code: String,
        player: String,
        season: Season,
    },

    #[error("{player} has a multi-team row in season {season} but no single-team rows")]
    EmptyTradeGroup { player: String, season: Season },

    #[error("{player} has tied stints in season {season}; no single team can be credited")]
    AmbiguousTradeGroup { player: String, season: Season },
}

/// Run every normalization step over the aggregated tables.
///
/// Standings names become codes, names lose their decoration marks, skaters
/// are limited to defensemen and traded players collapse to a single row.
pub fn normalize(tables: Tables) -> Result<Tables, NormalizationError> {
    let Tables {
        standings,
        skaters,
        votes,
    } = tables;

    let standings = standings
        .into_iter()
        .map(|mut row| {
            let code = teams::resolve_team_code(&row.team, row.season).ok_or_else(|| {
                NormalizationError::UnmappedTeam {
                    name: row.team.clone(),
                    season: row.season,
                }
            })?;
            row.team = code.to_string();
            Ok(row)
        })
        .collect::<Result<Vec<_>, NormalizationError>>()?;

    let total_skaters = skaters.len();
    let defensemen: Vec<_> = skaters
        .into_iter()
        .map(|mut row| {
            row.player = teams::strip_markers(&row.player);
            row.team = teams::strip_markers(&row.team);
            row
        })
        .filter(|row| row.position == DEFENSE_POSITION)
        .collect();
    let filtered = defensemen.len();

    let skaters = trades::resolve_trades(defensemen)?;
    if let Some(row) = skaters.iter().find(|row| !teams::is_known_code(&row.team)) {
        return Err(NormalizationError::UnknownTeamCode {
            code: row.team.clone(),
            player: row.player.clone(),
            season: row.season,
        });
    }

    let votes = votes
        .into_iter()
        .map(|mut row| {
            row.player = teams::strip_markers(&row.player);
            row.team = row.team.map(|t| teams::strip_markers(&t));
            row
        })
        .collect::<Vec<_>>();

    info!(
        "normalized {} standings rows; {} of {} skater rows are defensemen, {} after trade resolution",
        standings.len(),
        filtered,
        total_skaters,
        skaters.len()
    );

    Ok(Tables {
        standings,
        skaters,
        votes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{read_skaters, read_standings, read_votes};

    fn tables(standings: &str, skaters: &str, votes: &str) -> Tables {
        let season = Season::new(1990);
        Tables {
            standings: read_standings(standings.as_bytes(), season).unwrap(),
            skaters: read_skaters(skaters.as_bytes(), season).unwrap(),
            votes: read_votes(votes.as_bytes(), season).unwrap(),
        }
    }

    const STANDINGS: &str = "\
Team,GP,W,L,T,PTS
Boston Bruins*,80,46,25,9,101
Winnipeg Jets,80,37,32,11,85
Chicago Black Hawks*,80,41,33,6,88";

    const SKATERS: &str = "\
Rk,Player,Age,Tm,Pos,GP,G,A,PTS,+/-
1,Ray Bourque*,29,BOS,D,76,19,65,84,31
2,Cam Neely*,24,BOS,RW,76,55,37,92,10
3,Dave Ellett,25,WIN,D,77,17,29,46,-15
4,Doug Wilson,32,CHI,D,70,23,50,73,13";

    const VOTES: &str = "\
Place,Player,Age,Tm,Pos,Votes
1,Ray Bourque*,29,BOS,D,300";

    #[test]
    fn maps_names_filters_positions_and_strips_markers() {
        let out = normalize(tables(STANDINGS, SKATERS, VOTES)).unwrap();

        let codes: Vec<&str> = out.standings.iter().map(|t| t.team.as_str()).collect();
        assert_eq!(codes, vec!["BOS", "WIN", "CHI"]);

        let players: Vec<&str> = out.skaters.iter().map(|s| s.player.as_str()).collect();
        assert_eq!(players, vec!["Ray Bourque", "Dave Ellett", "Doug Wilson"]);
        assert!(out.skaters.iter().all(|s| s.position == DEFENSE_POSITION));
        assert!(out.skaters.iter().all(|s| teams::is_known_code(&s.team)));

        assert_eq!(out.votes[0].player, "Ray Bourque");
    }

    #[test]
    fn unmapped_team_name_is_an_error() {
        let standings = "Team,GP,W,L,PTS\nQuebec Bulldogs,80,30,40,60";
        match normalize(tables(standings, SKATERS, VOTES)) {
            Err(NormalizationError::UnmappedTeam { name, .. }) => {
                assert_eq!(name, "Quebec Bulldogs")
            }
            other => panic!("expected unmapped team, got {other:?}"),
        }
    }

    #[test]
    fn unknown_skater_code_is_an_error() {
        let skaters = "Player,Tm,Pos,GP,G,A,PTS,+/-\nSomeone,XYZ,D,10,0,0,0,0";
        assert!(matches!(
            normalize(tables(STANDINGS, skaters, VOTES)),
            Err(NormalizationError::UnknownTeamCode { .. })
        ));
    }

    #[test]
    fn traded_defenseman_resolved_after_filtering() {
        let skaters = "\
Player,Tm,Pos,GP,G,A,PTS,+/-
Paul Coffey,TOT,D,80,20,60,80,-5
Paul Coffey,PIT,D,55,15,40,55,-3
Paul Coffey,LAK,D,25,5,20,25,-2";
        let out = normalize(tables(STANDINGS, skaters, VOTES)).unwrap();
        assert_eq!(out.skaters.len(), 1);
        assert_eq!(out.skaters[0].team, "PIT");
        assert!((out.skaters[0].points - 80.0).abs() < f64::EPSILON);
    }
}
