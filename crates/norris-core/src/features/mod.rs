// Feature engineering: merged player-seasons to a model-ready table.
//
// Continuous features are min-max scaled within each season, so a value
// describes a player's standing among that season's defensemen rather than
// an absolute number comparable across eras.

pub mod frame;

use std::collections::BTreeSet;
use tracing::info;

use crate::data::records::parse_minutes;
use crate::merge::MergedRow;
use crate::season::Season;
use crate::split::{split_by_season, DatasetSplit};

pub use frame::{Column, FeatureFrame};

/// Regression target: the player's share of the season's award votes.
pub const TARGET: &str = "norris_point_pct";

/// Integer-encoded team code.
pub const TEAM: &str = "team";

/// Counting stats that get per-game and per-60 rates.
pub const RATE_STATS: &[&str] = &["goals", "assists", "points", "blocks", "hits"];

/// Raw columns with no predictive use: ranks and placements, faceoffs,
/// era-dependent standings columns, and the team's games played (always
/// equal within a season).
const DROPPED: &[&str] = &[
    "Rk", "FOW", "FOL", "FO%", "GP_team", "T", "OL", "Place", "1st",
];

const RENAMED: &[(&str, &str)] = &[
    ("Age", "age"),
    ("GP", "games_played"),
    ("G", "goals"),
    ("A", "assists"),
    ("PTS", "points"),
    ("PLUSMINUS", "plus_minus"),
    ("PIM", "penalty_minutes"),
    ("PS", "point_shares"),
    ("GW", "game_winning_goals"),
    ("S", "shots"),
    ("S%", "shot_pct"),
    ("TOI", "toi"),
    ("ATOI", "avg_toi"),
    ("BLK", "blocks"),
    ("HIT", "hits"),
    ("W", "team_wins"),
    ("L", "team_losses"),
    ("PTS_team", "team_points"),
    ("PTS%", "team_points_pct"),
    ("GF", "team_goals_for"),
    ("GA", "team_goals_against"),
    ("SRS", "team_srs"),
    ("SOS", "team_sos"),
    ("Votes", TARGET),
];

/// Codes folded into the franchise's current code: two renames and the
/// league's spelling of the Vegas code.
const CODE_COLLAPSE: &[(&str, &str)] = &[("MDA", "ANA"), ("PHX", "ARI"), ("VEG", "VGK")];

/// Continuous columns scaled within each season (rate columns are added by
/// `rescaled_columns`).
const RESCALED: &[&str] = &[
    "age",
    "games_played",
    "goals",
    "assists",
    "points",
    "plus_minus",
    "penalty_minutes",
    "point_shares",
    "game_winning_goals",
    "shots",
    "shot_pct",
    "toi",
    "avg_toi",
    "blocks",
    "hits",
    "team_wins",
    "team_losses",
    "team_points",
    "team_points_pct",
    "team_goals_for",
    "team_goals_against",
    "team_srs",
    "team_sos",
];

const RANGE_EPSILON: f64 = 1e-12;

#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    #[error("no player-season rows to engineer")]
    EmptyTable,
}

// ---------------------------------------------------------------------------
// Frame construction
// ---------------------------------------------------------------------------

/// Build a frame whose columns carry the raw source names. Standings
/// columns that collide with skater columns get a `_team` suffix.
pub fn frame_from_merged(rows: &[MergedRow]) -> FeatureFrame {
    let mut frame = FeatureFrame::new(
        rows.iter().map(|r| r.skater.player.clone()).collect(),
        rows.iter().map(|r| r.skater.season).collect(),
        rows.iter().map(|r| r.skater.team.clone()).collect(),
    );

    type Getter = fn(&MergedRow) -> Option<f64>;
    let columns: &[(&str, Getter)] = &[
        ("Rk", |r| r.skater.rank),
        ("Age", |r| r.skater.age),
        ("GP", |r| Some(r.skater.games_played)),
        ("G", |r| Some(r.skater.goals)),
        ("A", |r| Some(r.skater.assists)),
        ("PTS", |r| Some(r.skater.points)),
        ("PLUSMINUS", |r| Some(r.skater.plus_minus)),
        ("PIM", |r| r.skater.penalty_minutes),
        ("PS", |r| r.skater.point_shares),
        ("GW", |r| r.skater.game_winning_goals),
        ("S", |r| r.skater.shots),
        ("S%", |r| r.skater.shot_pct),
        ("TOI", |r| r.skater.toi),
        ("ATOI", |r| r.skater.atoi.as_deref().and_then(parse_minutes)),
        ("BLK", |r| r.skater.blocks),
        ("HIT", |r| r.skater.hits),
        ("FOW", |r| r.skater.faceoff_wins),
        ("FOL", |r| r.skater.faceoff_losses),
        ("FO%", |r| r.skater.faceoff_pct),
        ("GP_team", |r| r.team.games_played),
        ("W", |r| r.team.wins),
        ("L", |r| r.team.losses),
        ("T", |r| r.team.ties),
        ("OL", |r| r.team.ot_losses),
        ("PTS_team", |r| r.team.points),
        ("PTS%", |r| r.team.points_pct),
        ("GF", |r| r.team.goals_for),
        ("GA", |r| r.team.goals_against),
        ("SRS", |r| r.team.srs),
        ("SOS", |r| r.team.sos),
        ("Place", |r| r.votes.and_then(|v| v.placement)),
        ("Votes", |r| r.votes.and_then(|v| v.votes)),
        ("1st", |r| r.votes.and_then(|v| v.first_place_votes)),
    ];
    for (name, get) in columns {
        frame.set_column(name, rows.iter().map(get).collect());
    }
    frame
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// `numerator / denominator * scale`; a zero denominator gives 0 and a
/// missing operand gives `None`.
fn rate(numerator: Option<f64>, denominator: Option<f64>, scale: f64) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d > 0.0 => Some(n / d * scale),
        (Some(_), Some(_)) => Some(0.0),
        _ => None,
    }
}

fn column_or_nulls(frame: &FeatureFrame, name: &str) -> Vec<Option<f64>> {
    frame
        .column(name)
        .map(<[Option<f64>]>::to_vec)
        .unwrap_or_else(|| vec![None; frame.len()])
}

/// Average ice time per game from total ice time, replacing the scraped
/// text value.
pub fn recompute_avg_toi(frame: &mut FeatureFrame) {
    let toi = column_or_nulls(frame, "toi");
    let games = column_or_nulls(frame, "games_played");
    let avg = toi
        .iter()
        .zip(&games)
        .map(|(&t, &g)| rate(t, g, 1.0))
        .collect();
    frame.set_column("avg_toi", avg);
}

pub fn collapse_team_codes(frame: &mut FeatureFrame) {
    for team in frame.teams_mut() {
        if let Some((_, current)) = CODE_COLLAPSE.iter().find(|(old, _)| *old == team.as_str()) {
            *team = current.to_string();
        }
    }
}

/// Fill nulls that mean zero.
///
/// Blocked shots are only zero-filled when hits were recorded for the
/// player; both stats were introduced together, so a null block next to a
/// null hit means the stat was not tracked yet.
pub fn impute_missing(frame: &mut FeatureFrame) {
    let hits = column_or_nulls(frame, "hits");
    if let Some(blocks) = frame.column_mut("blocks") {
        for (block, hit) in blocks.iter_mut().zip(&hits) {
            if block.is_none() && hit.is_some() {
                *block = Some(0.0);
            }
        }
    }
    for name in ["shot_pct", TARGET] {
        let filled = column_or_nulls(frame, name)
            .into_iter()
            .map(|v| Some(v.unwrap_or(0.0)))
            .collect();
        frame.set_column(name, filled);
    }
}

/// Turn raw vote counts into each player's share of the season's votes.
/// The in-progress season has no result yet, so its target is zero.
pub fn votes_to_share(frame: &mut FeatureFrame, current: Season) {
    let groups = frame.rows_by_season();
    let Some(target) = frame.column_mut(TARGET) else {
        return;
    };
    for (season, rows) in groups {
        if season == current {
            for &i in &rows {
                target[i] = Some(0.0);
            }
            continue;
        }
        let total: f64 = rows.iter().filter_map(|&i| target[i]).sum();
        for &i in &rows {
            let votes = target[i].unwrap_or(0.0);
            target[i] = Some(if total > 0.0 { votes / total } else { 0.0 });
        }
    }
}

pub fn rate_column_names() -> Vec<String> {
    RATE_STATS
        .iter()
        .flat_map(|stat| [format!("{stat}_per_game"), format!("{stat}_per_60")])
        .collect()
}

/// Per-game and per-60-minutes rates for each counting stat.
pub fn derive_rates(frame: &mut FeatureFrame) {
    let games = column_or_nulls(frame, "games_played");
    let toi = column_or_nulls(frame, "toi");
    for stat in RATE_STATS {
        let values = column_or_nulls(frame, stat);
        let per_game = values
            .iter()
            .zip(&games)
            .map(|(&v, &g)| rate(v, g, 1.0))
            .collect();
        let per_60 = values
            .iter()
            .zip(&toi)
            .map(|(&v, &t)| rate(v, t, 60.0))
            .collect();
        frame.set_column(&format!("{stat}_per_game"), per_game);
        frame.set_column(&format!("{stat}_per_60"), per_60);
    }
}

/// Every column scaled by `rescale_by_season`.
pub fn rescaled_columns() -> Vec<String> {
    RESCALED
        .iter()
        .map(|s| s.to_string())
        .chain(rate_column_names())
        .collect()
}

/// Min-max scale each listed column to [0, 1] within every season. A column
/// that is constant within a season becomes 0 there; nulls stay null.
pub fn rescale_by_season(frame: &mut FeatureFrame, columns: &[String]) {
    let groups = frame.rows_by_season();
    for name in columns {
        let Some(values) = frame.column_mut(name) else {
            continue;
        };
        for rows in groups.values() {
            let present = rows.iter().filter_map(|&i| values[i]);
            let (min, max) = present.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
            let range = max - min;
            for &i in rows {
                if let Some(v) = values[i] {
                    values[i] = Some(if range > RANGE_EPSILON {
                        (v - min) / range
                    } else {
                        0.0
                    });
                }
            }
        }
    }
}

/// Add the `team` column: each code's index among the sorted distinct codes.
pub fn encode_teams(frame: &mut FeatureFrame) {
    let codes: BTreeSet<&str> = frame.teams().iter().map(String::as_str).collect();
    let encoded = frame
        .teams()
        .iter()
        .map(|team| {
            codes
                .iter()
                .position(|code| *code == team.as_str())
                .map(|i| i as f64)
        })
        .collect();
    frame.set_column(TEAM, encoded);
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Run every feature step and split into historical and current tables.
pub fn engineer(merged: &[MergedRow]) -> Result<DatasetSplit, FeatureError> {
    let mut frame = frame_from_merged(merged);
    let current = frame.latest_season().ok_or(FeatureError::EmptyTable)?;

    frame.drop_columns(DROPPED);
    frame.rename_columns(RENAMED);
    recompute_avg_toi(&mut frame);
    collapse_team_codes(&mut frame);
    impute_missing(&mut frame);
    votes_to_share(&mut frame, current);
    derive_rates(&mut frame);
    rescale_by_season(&mut frame, &rescaled_columns());
    encode_teams(&mut frame);

    info!(
        "engineered {} rows x {} columns; current season {}",
        frame.len(),
        frame.columns().len(),
        current
    );
    split_by_season(&frame)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::records::{SkaterRecord, TeamRecord};
    use crate::merge::VoteStats;

    fn row(player: &str, team: &str, start_year: i32, gp: f64, points: f64, votes: Option<f64>) -> MergedRow {
        let season = Season::new(start_year);
        MergedRow {
            skater: SkaterRecord {
                season,
                rank: Some(1.0),
                player: player.into(),
                age: Some(25.0 + points / 10.0),
                team: team.into(),
                position: "D".into(),
                games_played: gp,
                goals: points / 4.0,
                assists: points * 3.0 / 4.0,
                points,
                plus_minus: points / 5.0,
                penalty_minutes: Some(20.0),
                point_shares: Some(points / 8.0),
                game_winning_goals: Some(1.0),
                shots: Some(100.0 + points),
                shot_pct: None,
                toi: if gp > 0.0 { Some(gp * 20.0 + points) } else { Some(0.0) },
                atoi: Some("20:00".into()),
                blocks: None,
                hits: Some(points),
                faceoff_wins: None,
                faceoff_losses: None,
                faceoff_pct: None,
            },
            team: TeamRecord {
                season,
                team: team.into(),
                games_played: Some(82.0),
                wins: Some(30.0 + points / 2.0),
                losses: Some(30.0),
                ties: None,
                ot_losses: Some(10.0),
                points: Some(80.0 + points / 3.0),
                points_pct: Some(0.5),
                goals_for: Some(230.0),
                goals_against: Some(220.0),
                srs: Some(0.1),
                sos: Some(0.0),
            },
            votes: votes.map(|v| VoteStats {
                placement: Some(1.0),
                votes: Some(v),
                first_place_votes: Some(1.0),
            }),
        }
    }

    fn two_seasons() -> Vec<MergedRow> {
        vec![
            row("A", "BOS", 2018, 82.0, 60.0, Some(600.0)),
            row("B", "MDA", 2018, 70.0, 40.0, Some(200.0)),
            row("C", "PHX", 2018, 50.0, 10.0, None),
            row("A", "BOS", 2019, 80.0, 55.0, None),
            row("D", "VEG", 2019, 0.0, 0.0, None),
            row("E", "NYR", 2019, 60.0, 30.0, None),
        ]
    }

    #[test]
    fn raw_columns_renamed_or_dropped() {
        let mut frame = frame_from_merged(&two_seasons());
        frame.drop_columns(DROPPED);
        frame.rename_columns(RENAMED);
        let renamed: Vec<&str> = RENAMED.iter().map(|(_, to)| *to).collect();
        for name in frame.column_names() {
            assert!(renamed.contains(&name), "column `{name}` not renamed");
        }
        assert!(!frame.has_column("FO%"));
        assert!(!frame.has_column("Place"));
    }

    #[test]
    fn avg_toi_recomputed_from_total() {
        let mut frame = frame_from_merged(&two_seasons());
        frame.rename_columns(RENAMED);
        recompute_avg_toi(&mut frame);
        let avg = frame.column("avg_toi").unwrap();
        assert!((avg[0].unwrap() - (82.0 * 20.0 + 60.0) / 82.0).abs() < 1e-9);
        // Zero games played yields zero, not a fault.
        assert_eq!(avg[4], Some(0.0));
    }

    #[test]
    fn collapses_obsolete_codes() {
        let mut frame = frame_from_merged(&two_seasons());
        collapse_team_codes(&mut frame);
        let teams: Vec<&str> = frame.teams().iter().map(String::as_str).collect();
        assert_eq!(teams, vec!["BOS", "ANA", "ARI", "BOS", "VGK", "NYR"]);
    }

    #[test]
    fn blocks_imputed_only_when_hits_recorded() {
        let mut rows = two_seasons();
        rows[1].skater.hits = None;
        let mut frame = frame_from_merged(&rows);
        frame.rename_columns(RENAMED);
        impute_missing(&mut frame);
        let blocks = frame.column("blocks").unwrap();
        assert_eq!(blocks[0], Some(0.0));
        assert_eq!(blocks[1], None);
        assert!(frame.column("shot_pct").unwrap().iter().all(|v| *v == Some(0.0)));
    }

    #[test]
    fn unvoted_player_gets_zero_share() {
        let split = engineer(&two_seasons()).unwrap();
        let historical = &split.historical;
        let c = historical.names().iter().position(|n| n == "C").unwrap();
        assert_eq!(historical.column(TARGET).unwrap()[c], Some(0.0));
    }

    #[test]
    fn vote_shares_sum_to_one_in_past_seasons() {
        let split = engineer(&two_seasons()).unwrap();
        let shares = split.historical.column(TARGET).unwrap();
        let total: f64 = shares.iter().map(|v| v.unwrap()).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!((shares[0].unwrap() - 0.75).abs() < 1e-9);
        assert!(split
            .current
            .column(TARGET)
            .unwrap()
            .iter()
            .all(|v| *v == Some(0.0)));
    }

    #[test]
    fn current_season_target_is_zero_even_with_votes() {
        let mut rows = two_seasons();
        rows[3].votes = rows[0].votes;
        rows[5].votes = rows[1].votes;
        let mut frame = frame_from_merged(&rows);
        frame.rename_columns(RENAMED);
        votes_to_share(&mut frame, Season::new(2019));

        let target = frame.column(TARGET).unwrap();
        assert_eq!(&target[3..], &[Some(0.0), Some(0.0), Some(0.0)]);
        assert!((target[0].unwrap() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn unvoted_past_season_shares_are_zero() {
        let mut rows = two_seasons();
        for r in rows.iter_mut() {
            r.votes = None;
        }
        let split = engineer(&rows).unwrap();
        let shares = split.historical.column(TARGET).unwrap();
        assert!(shares.iter().all(|v| *v == Some(0.0)));
    }

    #[test]
    fn zero_games_played_rates_are_defined() {
        let mut frame = frame_from_merged(&two_seasons());
        frame.rename_columns(RENAMED);
        impute_missing(&mut frame);
        derive_rates(&mut frame);
        for name in rate_column_names() {
            let values = frame.column(&name).unwrap();
            assert_eq!(values[4], Some(0.0), "{name}");
            assert!(values.iter().flatten().all(|v| v.is_finite()));
        }
        let per_60 = frame.column("points_per_60").unwrap();
        assert!((per_60[0].unwrap() - 60.0 / (82.0 * 20.0 + 60.0) * 60.0).abs() < 1e-9);
    }

    #[test]
    fn rescaled_columns_span_unit_interval_per_season() {
        let split = engineer(&two_seasons()).unwrap();
        for frame in [&split.historical, &split.current] {
            for name in rescaled_columns() {
                let values: Vec<f64> = frame.column(&name).unwrap().iter().flatten().copied().collect();
                if values.is_empty() {
                    continue;
                }
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                assert!(min.abs() < 1e-9, "{name} min {min}");
                let constant = values.iter().all(|v| (v - values[0]).abs() < 1e-9);
                if !constant {
                    assert!((max - 1.0).abs() < 1e-9, "{name} max {max}");
                }
            }
        }
    }

    #[test]
    fn teams_encoded_from_sorted_codes() {
        let split = engineer(&two_seasons()).unwrap();
        // Sorted codes after collapse: ANA, ARI, BOS, NYR, VGK.
        let historical = split.historical.column(TEAM).unwrap();
        assert_eq!(historical, &[Some(2.0), Some(0.0), Some(1.0)]);
        let current = split.current.column(TEAM).unwrap();
        assert_eq!(current, &[Some(2.0), Some(4.0), Some(3.0)]);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(engineer(&[]), Err(FeatureError::EmptyTable)));
    }
}
