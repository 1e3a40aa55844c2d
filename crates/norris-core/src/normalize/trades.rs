// Traded-player resolution: one row per player-season.
//
// A player who changed teams mid-season appears once per team stint plus
// once with a multi-team placeholder code carrying the season totals. The
// totals row is kept and credited to the team where the player spent the
// most games.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::data::records::SkaterRecord;
use crate::normalize::teams::is_multi_team;
use crate::normalize::NormalizationError;
use crate::season::Season;

type PlayerSeason = (String, Season);

fn key(row: &SkaterRecord) -> PlayerSeason {
    (row.player.clone(), row.season)
}

/// Games played, then plus/minus, then points.
fn stint_rank(row: &SkaterRecord) -> (f64, f64, f64) {
    (row.games_played, row.plus_minus, row.points)
}

/// Pick the stint that defines a traded player's team.
///
/// There must be a single best stint: an empty group and a full tie on
/// games, plus/minus and points are both errors.
pub fn primary_stint<'a>(
    player: &str,
    season: Season,
    stints: &[&'a SkaterRecord],
) -> Result<&'a SkaterRecord, NormalizationError> {
    let (first, rest) =
        stints
            .split_first()
            .ok_or_else(|| NormalizationError::EmptyTradeGroup {
                player: player.to_string(),
                season,
            })?;
    let mut best = *first;
    let mut tied = false;
    for &stint in rest {
        match stint_rank(stint).partial_cmp(&stint_rank(best)) {
            Some(Ordering::Greater) => {
                best = stint;
                tied = false;
            }
            Some(Ordering::Equal) => tied = true,
            _ => {}
        }
    }
    if tied {
        return Err(NormalizationError::AmbiguousTradeGroup {
            player: player.to_string(),
            season,
        });
    }
    Ok(best)
}

/// Replace each multi-team totals row's team with its primary stint's team
/// and drop that player's per-team stint rows.
pub fn resolve_trades(
    skaters: Vec<SkaterRecord>,
) -> Result<Vec<SkaterRecord>, NormalizationError> {
    let mut order: Vec<PlayerSeason> = Vec::new();
    let mut groups: HashMap<PlayerSeason, Vec<usize>> = HashMap::new();
    for (i, row) in skaters.iter().enumerate() {
        let k = key(row);
        let entry = groups.entry(k.clone()).or_default();
        if entry.is_empty() {
            order.push(k);
        }
        entry.push(i);
    }

    let mut keep = vec![true; skaters.len()];
    let mut reassigned: Vec<(usize, String)> = Vec::new();

    for k in &order {
        let Some(indices) = groups.get(k) else {
            continue;
        };
        let Some(&totals) = indices
            .iter()
            .rev()
            .find(|&&i| is_multi_team(&skaters[i].team))
        else {
            continue;
        };

        let stints: Vec<&SkaterRecord> = indices
            .iter()
            .map(|&i| &skaters[i])
            .filter(|row| !is_multi_team(&row.team))
            .collect();
        let winner = primary_stint(&k.0, k.1, &stints)?;

        reassigned.push((totals, winner.team.clone()));
        for &i in indices {
            if i != totals {
                keep[i] = false;
            }
        }
    }

    let mut skaters = skaters;
    for (i, team) in reassigned {
        skaters[i].team = team;
    }

    let resolved = skaters
        .into_iter()
        .zip(keep)
        .filter_map(|(row, kept)| kept.then_some(row))
        .collect();
    Ok(dedupe_keep_last(resolved))
}

/// Drop repeated (player, season) rows, keeping the last one listed.
pub fn dedupe_keep_last(rows: Vec<SkaterRecord>) -> Vec<SkaterRecord> {
    let mut last: HashMap<PlayerSeason, usize> = HashMap::new();
    for (i, row) in rows.iter().enumerate() {
        last.insert(key(row), i);
    }
    rows.into_iter()
        .enumerate()
        .filter(|(i, row)| last.get(&key(row)) == Some(i))
        .map(|(_, row)| row)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stint(player: &str, team: &str, gp: f64, pm: f64, pts: f64) -> SkaterRecord {
        SkaterRecord {
            season: Season::new(2015),
            rank: None,
            player: player.into(),
            age: Some(28.0),
            team: team.into(),
            position: "D".into(),
            games_played: gp,
            goals: 0.0,
            assists: pts,
            points: pts,
            plus_minus: pm,
            penalty_minutes: None,
            point_shares: None,
            game_winning_goals: None,
            shots: None,
            shot_pct: None,
            toi: None,
            atoi: None,
            blocks: None,
            hits: None,
            faceoff_wins: None,
            faceoff_losses: None,
            faceoff_pct: None,
        }
    }

    fn teams_of(rows: &[SkaterRecord]) -> Vec<(&str, &str)> {
        rows.iter()
            .map(|r| (r.player.as_str(), r.team.as_str()))
            .collect()
    }

    #[test]
    fn most_games_wins() {
        let rows = vec![
            stint("Traded", "TOT", 80.0, 5.0, 30.0),
            stint("Traded", "BOS", 30.0, 10.0, 20.0),
            stint("Traded", "NYR", 50.0, -5.0, 10.0),
            stint("Stayed", "BOS", 82.0, 0.0, 12.0),
        ];
        let resolved = resolve_trades(rows).unwrap();
        assert_eq!(teams_of(&resolved), vec![("Traded", "NYR"), ("Stayed", "BOS")]);
        // The kept row carries the season totals.
        assert!((resolved[0].games_played - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn games_tie_broken_by_plus_minus() {
        let rows = vec![
            stint("Traded", "2TM", 80.0, 5.0, 30.0),
            stint("Traded", "BOS", 40.0, -2.0, 20.0),
            stint("Traded", "NYR", 40.0, 7.0, 10.0),
        ];
        let resolved = resolve_trades(rows).unwrap();
        assert_eq!(teams_of(&resolved), vec![("Traded", "NYR")]);
    }

    #[test]
    fn plus_minus_tie_broken_by_points() {
        let rows = vec![
            stint("Traded", "TOT", 80.0, 4.0, 30.0),
            stint("Traded", "BOS", 40.0, 2.0, 21.0),
            stint("Traded", "NYR", 40.0, 2.0, 9.0),
        ];
        let resolved = resolve_trades(rows).unwrap();
        assert_eq!(teams_of(&resolved), vec![("Traded", "BOS")]);
    }

    #[test]
    fn full_tie_is_ambiguous() {
        let rows = vec![
            stint("Traded", "TOT", 2.0, 0.0, 0.0),
            stint("Traded", "CHI", 1.0, 0.0, 0.0),
            stint("Traded", "DET", 1.0, 0.0, 0.0),
        ];
        match resolve_trades(rows) {
            Err(NormalizationError::AmbiguousTradeGroup { player, season }) => {
                assert_eq!(player, "Traded");
                assert_eq!(season, Season::new(2015));
            }
            other => panic!("expected ambiguous trade group, got {other:?}"),
        }
    }

    #[test]
    fn tie_below_the_leader_is_not_ambiguous() {
        let rows = vec![
            stint("Traded", "3TM", 80.0, 0.0, 10.0),
            stint("Traded", "CHI", 15.0, 0.0, 2.0),
            stint("Traded", "DET", 15.0, 0.0, 2.0),
            stint("Traded", "EDM", 50.0, 0.0, 6.0),
        ];
        let resolved = resolve_trades(rows).unwrap();
        assert_eq!(teams_of(&resolved), vec![("Traded", "EDM")]);
    }

    #[test]
    fn totals_without_stints_is_an_error() {
        let rows = vec![stint("Ghost", "TOT", 10.0, 0.0, 0.0)];
        match resolve_trades(rows) {
            Err(NormalizationError::EmptyTradeGroup { player, .. }) => assert_eq!(player, "Ghost"),
            other => panic!("expected empty trade group, got {other:?}"),
        }
    }

    #[test]
    fn plain_duplicates_keep_last() {
        let rows = vec![
            stint("Same Name", "BOS", 10.0, 0.0, 1.0),
            stint("Other", "BOS", 10.0, 0.0, 1.0),
            stint("Same Name", "DAL", 70.0, 0.0, 9.0),
        ];
        let resolved = resolve_trades(rows).unwrap();
        assert_eq!(teams_of(&resolved), vec![("Other", "BOS"), ("Same Name", "DAL")]);
    }

    #[test]
    fn exactly_one_row_per_player_season() {
        let rows = vec![
            stint("A", "TOT", 70.0, 1.0, 10.0),
            stint("A", "BOS", 35.0, 1.0, 5.0),
            stint("A", "MTL", 35.0, 0.0, 5.0),
            stint("B", "3TM", 60.0, 1.0, 10.0),
            stint("B", "TOR", 20.0, 1.0, 5.0),
            stint("B", "OTT", 20.0, 1.0, 3.0),
            stint("B", "BUF", 20.0, 1.0, 2.0),
            stint("C", "PIT", 82.0, 1.0, 10.0),
        ];
        let resolved = resolve_trades(rows).unwrap();
        let mut keys: Vec<PlayerSeason> = resolved.iter().map(key).collect();
        let before = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(before, keys.len());
        assert_eq!(teams_of(&resolved), vec![("A", "BOS"), ("B", "TOR"), ("C", "PIT")]);
    }
}
