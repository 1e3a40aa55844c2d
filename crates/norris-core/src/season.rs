// Season identifiers and the season catalog.
//
// A season token is the eight-digit form used by the data files, e.g.
// `19791980`. The catalog runs from the first configured season through the
// in-progress one, which depends on the date supplied by a `Clock`.

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::SeasonConfig;

// ---------------------------------------------------------------------------
// Season
// ---------------------------------------------------------------------------

/// A two-year league season, identified by its starting calendar year.
///
/// Ordering follows the start year, so sorting seasons sorts them
/// chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Season {
    start_year: i32,
}

impl Season {
    pub fn new(start_year: i32) -> Self {
        Season { start_year }
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    pub fn end_year(&self) -> i32 {
        self.start_year + 1
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:04}", self.start_year, self.end_year())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid season token `{token}`: expected eight digits spanning consecutive years")]
pub struct SeasonParseError {
    pub token: String,
}

impl FromStr for Season {
    type Err = SeasonParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        let err = || SeasonParseError {
            token: s.to_string(),
        };
        if token.len() != 8 || !token.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let start: i32 = token[..4].parse().map_err(|_| err())?;
        let end: i32 = token[4..].parse().map_err(|_| err())?;
        if end != start + 1 {
            return Err(err());
        }
        Ok(Season::new(start))
    }
}

impl TryFrom<String> for Season {
    type Error = SeasonParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Season> for String {
    fn from(season: Season) -> Self {
        season.to_string()
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of "today" for catalog generation.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Reads the local system date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always reports the same date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// End year of the in-progress season on `today`.
///
/// On or after the season-start month the upcoming season has begun, so it
/// ends next calendar year; before it, the season that ends this year is
/// still the latest one.
pub fn current_season_end_year(today: NaiveDate, season_start_month: u32) -> i32 {
    if today.month() >= season_start_month {
        today.year() + 1
    } else {
        today.year()
    }
}

/// Generate every known season in ascending order, ending with the season
/// in progress according to `clock`. Excluded seasons are skipped.
pub fn generate_seasons(clock: &dyn Clock, config: &SeasonConfig) -> Vec<Season> {
    let end_year = current_season_end_year(clock.today(), config.season_start_month);
    (config.first_start_year..end_year)
        .map(Season::new)
        .filter(|season| !config.excluded.contains(season))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn lockout() -> Season {
        "20042005".parse().unwrap()
    }

    #[test]
    fn token_roundtrip() {
        let season: Season = "19992000".parse().unwrap();
        assert_eq!(season.start_year(), 1999);
        assert_eq!(season.end_year(), 2000);
        assert_eq!(season.to_string(), "19992000");
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!("1999200".parse::<Season>().is_err());
        assert!("19992001".parse::<Season>().is_err());
        assert!("abcd2000".parse::<Season>().is_err());
    }

    #[test]
    fn before_start_month_ends_this_year() {
        let clock = FixedClock(date(2021, 3, 15));
        let seasons = generate_seasons(&clock, &SeasonConfig::default());
        assert_eq!(seasons.first().unwrap().to_string(), "19791980");
        assert_eq!(seasons.last().unwrap().to_string(), "20202021");
    }

    #[test]
    fn on_start_month_rolls_forward() {
        let clock = FixedClock(date(2026, 10, 1));
        let seasons = generate_seasons(&clock, &SeasonConfig::default());
        assert_eq!(seasons.last().unwrap().end_year(), 2027);
    }

    #[test]
    fn lockout_season_excluded_and_order_strict() {
        for month in 1..=12 {
            let clock = FixedClock(date(2024, month, 1));
            let seasons = generate_seasons(&clock, &SeasonConfig::default());
            assert!(!seasons.contains(&lockout()));
            assert!(seasons.windows(2).all(|w| w[0] < w[1]));
            let expected_end = if month < 10 { 2024 } else { 2025 };
            assert_eq!(seasons.last().unwrap().end_year(), expected_end);
        }
    }

    #[test]
    fn contiguous_except_excluded() {
        let clock = FixedClock(date(2010, 1, 1));
        let seasons = generate_seasons(&clock, &SeasonConfig::default());
        // 1979-80 through 2009-10 is 31 seasons, minus the lockout.
        assert_eq!(seasons.len(), 30);
        for pair in seasons.windows(2) {
            let gap = pair[1].start_year() - pair[0].start_year();
            if pair[1].start_year() == 2005 {
                assert_eq!(gap, 2);
            } else {
                assert_eq!(gap, 1);
            }
        }
    }
}
