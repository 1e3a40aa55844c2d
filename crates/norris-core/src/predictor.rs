// Serving-side holder for the latest fitted model and the table it ranks.
//
// The model and the current-season table are published together as one
// snapshot, so a reader never pairs a model with a table from another run.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::{info, warn};

use crate::features::FeatureFrame;
use crate::model::{ModelError, RankedPlayer, RankingModel};
use crate::pipeline::{Pipeline, PipelineError};
use crate::season::Season;

/// A fitted model with the current-season table it was built alongside.
pub struct ModelSnapshot {
    pub model: RankingModel,
    pub current: FeatureFrame,
    pub season: Option<Season>,
}

/// One rendered line of a ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    /// 1-indexed position.
    pub rank: usize,
    pub name: String,
    pub predicted_share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    pub season: Option<Season>,
    pub entries: Vec<RankingEntry>,
}

impl Ranking {
    pub fn new(season: Option<Season>, players: Vec<RankedPlayer>) -> Self {
        let entries = players
            .into_iter()
            .enumerate()
            .map(|(i, p)| RankingEntry {
                rank: i + 1,
                name: p.name,
                predicted_share: p.predicted_share,
            })
            .collect();
        Ranking { season, entries }
    }
}

pub struct Predictor {
    pipeline: Pipeline,
    snapshot: RwLock<Option<Arc<ModelSnapshot>>>,
    refresh_lock: Mutex<()>,
}

impl Predictor {
    pub fn new(pipeline: Pipeline) -> Self {
        Predictor {
            pipeline,
            snapshot: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Current snapshot, if any refresh has succeeded.
    pub fn snapshot(&self) -> Option<Arc<ModelSnapshot>> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn refresh_guard(&self) -> MutexGuard<'_, ()> {
        self.refresh_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Rebuild the tables, fit a new model and publish both together.
    ///
    /// Refreshes run one at a time. On failure the previous snapshot stays
    /// in place and the error is returned.
    pub fn refresh(&self) -> Result<Arc<ModelSnapshot>, PipelineError> {
        let _guard = self.refresh_guard();
        let (model, split) = match self.pipeline.fit() {
            Ok(fitted) => fitted,
            Err(e) => {
                warn!(
                    "refresh failed; {} previous model: {e}",
                    if self.snapshot().is_some() {
                        "keeping"
                    } else {
                        "still no"
                    }
                );
                return Err(e);
            }
        };

        let snapshot = Arc::new(ModelSnapshot {
            model,
            season: split.current_season(),
            current: split.current,
        });
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&snapshot));
        info!(
            "published model for {} ({} candidates)",
            snapshot
                .season
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown season".into()),
            snapshot.current.len()
        );
        Ok(snapshot)
    }

    /// Rank the current season with the published model.
    pub fn predict(&self) -> Result<Ranking, ModelError> {
        let snapshot = self.snapshot().ok_or(ModelError::NotFit)?;
        let players = snapshot.model.predict(&snapshot.current)?;
        Ok(Ranking::new(snapshot.season, players))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranking_is_one_indexed() {
        let ranking = Ranking::new(
            Some(Season::new(2023)),
            vec![
                RankedPlayer {
                    name: "Quinn Hughes".into(),
                    predicted_share: 0.4,
                },
                RankedPlayer {
                    name: "Cale Makar".into(),
                    predicted_share: 0.3,
                },
            ],
        );
        let ranks: Vec<(usize, &str)> = ranking
            .entries
            .iter()
            .map(|e| (e.rank, e.name.as_str()))
            .collect();
        assert_eq!(ranks, vec![(1, "Quinn Hughes"), (2, "Cale Makar")]);
    }
}
