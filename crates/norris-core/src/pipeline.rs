// Explicit pipeline: catalog, load, normalize, merge, engineer, split.
//
// Nothing runs at construction time. The table source and the clock are
// injected so a run is reproducible against fixed data and a fixed date.

use std::path::Path;
use tracing::info;

use crate::config::Config;
use crate::data::loader::{aggregate, create_tables, LoadError};
use crate::data::source::{CsvDirectory, TableSource};
use crate::features::{engineer, FeatureError};
use crate::merge::{merge, MergeError};
use crate::model::{ModelError, RankingModel};
use crate::normalize::{normalize, NormalizationError};
use crate::season::{generate_seasons, Clock, Season, SystemClock};
use crate::split::DatasetSplit;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Normalization(#[from] NormalizationError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub struct Pipeline {
    config: Config,
    source: Box<dyn TableSource>,
    clock: Box<dyn Clock>,
}

impl Pipeline {
    pub fn new(config: Config, source: Box<dyn TableSource>, clock: Box<dyn Clock>) -> Self {
        Pipeline {
            config,
            source,
            clock,
        }
    }

    /// Read CSVs from `{base_dir}/{data.root}` and date the catalog by the
    /// system clock.
    pub fn from_config(config: Config, base_dir: &Path) -> Self {
        let root = base_dir.join(&config.data.root);
        let source = CsvDirectory::new(root, config.data.clone());
        Pipeline::new(config, Box::new(source), Box::new(SystemClock))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn seasons(&self) -> Vec<Season> {
        generate_seasons(self.clock.as_ref(), &self.config.seasons)
    }

    /// Build the historical and current feature tables.
    pub fn run(&self) -> Result<DatasetSplit, PipelineError> {
        let seasons = self.seasons();
        info!(
            "running pipeline over {} seasons ({}..={})",
            seasons.len(),
            seasons.first().map(Season::to_string).unwrap_or_default(),
            seasons.last().map(Season::to_string).unwrap_or_default()
        );

        let tables = aggregate(create_tables(self.source.as_ref(), &seasons)?);
        let tables = normalize(tables)?;
        let merged = merge(tables)?;
        Ok(engineer(&merged)?)
    }

    /// Run the pipeline and fit a fresh model on the historical table.
    pub fn fit(&self) -> Result<(RankingModel, DatasetSplit), PipelineError> {
        let split = self.run()?;
        let mut model = RankingModel::new(&self.config.model);
        model.fit(&split.historical)?;
        Ok((model, split))
    }
}
