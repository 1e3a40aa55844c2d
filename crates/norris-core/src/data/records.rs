// Season-tagged table rows and the raw CSV shapes they are read from.
//
// Column names in the raw structs are the ones written by the collection
// layer (hockey-reference table headers) and must stay verbatim.

use serde::Deserialize;

use crate::season::Season;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One team's standings line for a season.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamRecord {
    pub season: Season,
    /// Display name before normalization, three-letter code after.
    pub team: String,
    pub games_played: Option<f64>,
    pub wins: Option<f64>,
    pub losses: Option<f64>,
    pub ties: Option<f64>,
    pub ot_losses: Option<f64>,
    pub points: Option<f64>,
    pub points_pct: Option<f64>,
    pub goals_for: Option<f64>,
    pub goals_against: Option<f64>,
    pub srs: Option<f64>,
    pub sos: Option<f64>,
}

impl TeamRecord {
    /// True when no standings metric carries a value.
    pub fn metrics_all_null(&self) -> bool {
        [
            self.games_played,
            self.wins,
            self.losses,
            self.ties,
            self.ot_losses,
            self.points,
            self.points_pct,
            self.goals_for,
            self.goals_against,
            self.srs,
            self.sos,
        ]
        .iter()
        .all(Option::is_none)
    }
}

/// One skater's stat line for a season (one team stint, or a multi-team
/// total before trade resolution).
#[derive(Debug, Clone, PartialEq)]
pub struct SkaterRecord {
    pub season: Season,
    pub rank: Option<f64>,
    pub player: String,
    pub age: Option<f64>,
    pub team: String,
    pub position: String,
    pub games_played: f64,
    pub goals: f64,
    pub assists: f64,
    pub points: f64,
    pub plus_minus: f64,
    pub penalty_minutes: Option<f64>,
    pub point_shares: Option<f64>,
    pub game_winning_goals: Option<f64>,
    pub shots: Option<f64>,
    pub shot_pct: Option<f64>,
    /// Total ice time in minutes.
    pub toi: Option<f64>,
    /// Average ice time as scraped, `MM:SS`.
    pub atoi: Option<String>,
    pub blocks: Option<f64>,
    pub hits: Option<f64>,
    pub faceoff_wins: Option<f64>,
    pub faceoff_losses: Option<f64>,
    pub faceoff_pct: Option<f64>,
}

/// One player's line in the season's award voting.
#[derive(Debug, Clone, PartialEq)]
pub struct VoteRecord {
    pub season: Season,
    pub placement: Option<f64>,
    pub player: String,
    pub age: Option<f64>,
    pub team: Option<String>,
    pub position: Option<String>,
    pub votes: Option<f64>,
    pub first_place_votes: Option<f64>,
}

/// Parse an `MM:SS` ice-time string into minutes.
pub fn parse_minutes(text: &str) -> Option<f64> {
    let (mins, secs) = text.trim().split_once(':')?;
    let mins: f64 = mins.trim().parse().ok()?;
    let secs: f64 = secs.trim().parse().ok()?;
    Some(mins + secs / 60.0)
}

// ---------------------------------------------------------------------------
// Raw CSV serde structs
// ---------------------------------------------------------------------------

/// Standings row. The first column holds the team display name; some
/// exports label it `Tm`.
#[derive(Debug, Deserialize)]
pub(crate) struct RawStanding {
    #[serde(rename = "Team", alias = "Tm")]
    team: String,
    #[serde(rename = "GP", default, deserialize_with = "csv::invalid_option")]
    games_played: Option<f64>,
    #[serde(rename = "W", default, deserialize_with = "csv::invalid_option")]
    wins: Option<f64>,
    #[serde(rename = "L", default, deserialize_with = "csv::invalid_option")]
    losses: Option<f64>,
    #[serde(rename = "T", default, deserialize_with = "csv::invalid_option")]
    ties: Option<f64>,
    #[serde(rename = "OL", alias = "OTL", default, deserialize_with = "csv::invalid_option")]
    ot_losses: Option<f64>,
    #[serde(rename = "PTS", default, deserialize_with = "csv::invalid_option")]
    points: Option<f64>,
    #[serde(rename = "PTS%", default, deserialize_with = "csv::invalid_option")]
    points_pct: Option<f64>,
    #[serde(rename = "GF", default, deserialize_with = "csv::invalid_option")]
    goals_for: Option<f64>,
    #[serde(rename = "GA", default, deserialize_with = "csv::invalid_option")]
    goals_against: Option<f64>,
    #[serde(rename = "SRS", default, deserialize_with = "csv::invalid_option")]
    srs: Option<f64>,
    #[serde(rename = "SOS", default, deserialize_with = "csv::invalid_option")]
    sos: Option<f64>,
}

impl RawStanding {
    pub(crate) fn into_record(self, season: Season) -> TeamRecord {
        TeamRecord {
            season,
            team: self.team.trim().to_string(),
            games_played: self.games_played,
            wins: self.wins,
            losses: self.losses,
            ties: self.ties,
            ot_losses: self.ot_losses,
            points: self.points,
            points_pct: self.points_pct,
            goals_for: self.goals_for,
            goals_against: self.goals_against,
            srs: self.srs,
            sos: self.sos,
        }
    }
}

/// Skater row. The scraped table repeats `EV`/`PP`/`SH` for goals and
/// assists; those columns are not read.
#[derive(Debug, Deserialize)]
pub(crate) struct RawSkater {
    #[serde(rename = "Rk", default, deserialize_with = "csv::invalid_option")]
    rank: Option<f64>,
    #[serde(rename = "Player")]
    player: String,
    #[serde(rename = "Age", default, deserialize_with = "csv::invalid_option")]
    age: Option<f64>,
    #[serde(rename = "Tm", alias = "Team")]
    team: String,
    #[serde(rename = "Pos")]
    position: String,
    #[serde(rename = "GP")]
    games_played: f64,
    #[serde(rename = "G")]
    goals: f64,
    #[serde(rename = "A")]
    assists: f64,
    #[serde(rename = "PTS")]
    points: f64,
    #[serde(rename = "PLUSMINUS", alias = "+/-")]
    plus_minus: f64,
    #[serde(rename = "PIM", default, deserialize_with = "csv::invalid_option")]
    penalty_minutes: Option<f64>,
    #[serde(rename = "PS", default, deserialize_with = "csv::invalid_option")]
    point_shares: Option<f64>,
    #[serde(rename = "GW", default, deserialize_with = "csv::invalid_option")]
    game_winning_goals: Option<f64>,
    #[serde(rename = "S", alias = "SOG", default, deserialize_with = "csv::invalid_option")]
    shots: Option<f64>,
    #[serde(rename = "S%", default, deserialize_with = "csv::invalid_option")]
    shot_pct: Option<f64>,
    #[serde(rename = "TOI", default, deserialize_with = "csv::invalid_option")]
    toi: Option<f64>,
    #[serde(rename = "ATOI", default)]
    atoi: Option<String>,
    #[serde(rename = "BLK", default, deserialize_with = "csv::invalid_option")]
    blocks: Option<f64>,
    #[serde(rename = "HIT", default, deserialize_with = "csv::invalid_option")]
    hits: Option<f64>,
    #[serde(rename = "FOW", default, deserialize_with = "csv::invalid_option")]
    faceoff_wins: Option<f64>,
    #[serde(rename = "FOL", default, deserialize_with = "csv::invalid_option")]
    faceoff_losses: Option<f64>,
    #[serde(rename = "FO%", default, deserialize_with = "csv::invalid_option")]
    faceoff_pct: Option<f64>,
}

impl RawSkater {
    pub(crate) fn into_record(self, season: Season) -> SkaterRecord {
        SkaterRecord {
            season,
            rank: self.rank,
            player: self.player.trim().to_string(),
            age: self.age,
            team: self.team.trim().to_string(),
            position: self.position.trim().to_string(),
            games_played: self.games_played,
            goals: self.goals,
            assists: self.assists,
            points: self.points,
            plus_minus: self.plus_minus,
            penalty_minutes: self.penalty_minutes,
            point_shares: self.point_shares,
            game_winning_goals: self.game_winning_goals,
            shots: self.shots,
            shot_pct: self.shot_pct,
            toi: self.toi,
            atoi: self.atoi.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            blocks: self.blocks,
            hits: self.hits,
            faceoff_wins: self.faceoff_wins,
            faceoff_losses: self.faceoff_losses,
            faceoff_pct: self.faceoff_pct,
        }
    }
}

/// Award voting row.
#[derive(Debug, Deserialize)]
pub(crate) struct RawVote {
    #[serde(rename = "Place", alias = "Rk", default, deserialize_with = "csv::invalid_option")]
    placement: Option<f64>,
    #[serde(rename = "Player")]
    player: String,
    #[serde(rename = "Age", default, deserialize_with = "csv::invalid_option")]
    age: Option<f64>,
    #[serde(rename = "Tm", alias = "Team", default)]
    team: Option<String>,
    #[serde(rename = "Pos", default)]
    position: Option<String>,
    #[serde(rename = "Votes", default, deserialize_with = "csv::invalid_option")]
    votes: Option<f64>,
    #[serde(rename = "1st", default, deserialize_with = "csv::invalid_option")]
    first_place_votes: Option<f64>,
}

impl RawVote {
    pub(crate) fn into_record(self, season: Season) -> VoteRecord {
        VoteRecord {
            season,
            placement: self.placement,
            player: self.player.trim().to_string(),
            age: self.age,
            team: self.team.map(|s| s.trim().to_string()),
            position: self.position.map(|s| s.trim().to_string()),
            votes: self.votes,
            first_place_votes: self.first_place_votes,
        }
    }
}
