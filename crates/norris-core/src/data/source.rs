// Where per-season tables come from.
//
// `CsvDirectory` reads the CSV files written by the collection layer;
// `MemorySource` serves CSV text held in memory.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::PathBuf;

use crate::config::{DataConfig, FamilyLayout};
use crate::data::loader::LoadError;
use crate::season::Season;

/// The three table families the pipeline consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Standings,
    SkaterStats,
    Voting,
}

impl Family {
    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Standings => "standings",
            Family::SkaterStats => "skater_stats",
            Family::Voting => "voting",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opens the raw CSV for one family and season.
///
/// Implementations must report an absent table as `LoadError::MissingData`
/// and nothing else, since that is the one condition callers may tolerate.
pub trait TableSource: Send + Sync {
    fn open(&self, family: Family, season: Season) -> Result<Box<dyn Read + '_>, LoadError>;
}

// ---------------------------------------------------------------------------
// Filesystem
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CsvDirectory {
    root: PathBuf,
    layout: DataConfig,
}

impl CsvDirectory {
    /// `root` replaces `layout.root`, so callers can resolve it against a
    /// base directory first.
    pub fn new(root: impl Into<PathBuf>, layout: DataConfig) -> Self {
        CsvDirectory {
            root: root.into(),
            layout,
        }
    }

    fn family_layout(&self, family: Family) -> &FamilyLayout {
        match family {
            Family::Standings => &self.layout.standings,
            Family::SkaterStats => &self.layout.skater_stats,
            Family::Voting => &self.layout.voting,
        }
    }

    pub fn path_for(&self, family: Family, season: Season) -> PathBuf {
        self.root.join(self.family_layout(family).relative_path(season))
    }
}

impl TableSource for CsvDirectory {
    fn open(&self, family: Family, season: Season) -> Result<Box<dyn Read + '_>, LoadError> {
        let path = self.path_for(family, season);
        match std::fs::File::open(&path) {
            Ok(file) => Ok(Box::new(std::io::BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(LoadError::MissingData {
                family,
                season,
                location: path.display().to_string(),
            }),
            Err(e) => Err(LoadError::Io {
                location: path.display().to_string(),
                source: e,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: HashMap<(Family, Season), String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, family: Family, season: Season, csv_text: impl Into<String>) {
        self.tables.insert((family, season), csv_text.into());
    }

    pub fn with(mut self, family: Family, season: Season, csv_text: impl Into<String>) -> Self {
        self.insert(family, season, csv_text);
        self
    }
}

impl TableSource for MemorySource {
    fn open(&self, family: Family, season: Season) -> Result<Box<dyn Read + '_>, LoadError> {
        match self.tables.get(&(family, season)) {
            Some(text) => Ok(Box::new(text.as_bytes())),
            None => Err(LoadError::MissingData {
                family,
                season,
                location: format!("memory:{family}/{season}"),
            }),
        }
    }
}
