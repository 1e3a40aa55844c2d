// Ranking model: a regression estimator trained on completed seasons'
// vote shares, queried for the current season's top defensemen.

use linfa::prelude::*;
use linfa_elasticnet::{ElasticNet, ElasticNetError};
use ndarray::{Array1, Array2, Axis};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::ModelConfig;
use crate::features::{FeatureFrame, TARGET};

/// Columns whose spread is below this are left out of the fit.
const MIN_VARIANCE: f64 = 1e-12;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model has not been fit")]
    NotFit,

    #[error("feature column `{0}` is missing from the table")]
    MissingFeature(String),

    #[error("training table has no rows")]
    EmptyTrainingSet,

    #[error("estimator failed to fit: {0}")]
    Fit(#[from] ElasticNetError),
}

/// One entry of a ranking, best first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPlayer {
    pub name: String,
    pub predicted_share: f64,
}

// ---------------------------------------------------------------------------
// Estimator seam
// ---------------------------------------------------------------------------

/// A regressor from a dense feature matrix to one target per row.
pub trait Estimator: Send + Sync {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError>;

    /// Fails with `ModelError::NotFit` before a successful `fit`.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError>;
}

enum Fitted {
    /// Every training column was constant; the target mean is all there is.
    Constant(f64),
    Linear {
        model: ElasticNet<f64>,
        kept: Vec<usize>,
    },
}

/// Elastic-net linear regression over the columns that vary in training.
pub struct ElasticNetEstimator {
    config: ModelConfig,
    fitted: Option<Fitted>,
}

impl ElasticNetEstimator {
    pub fn new(config: ModelConfig) -> Self {
        ElasticNetEstimator {
            config,
            fitted: None,
        }
    }
}

fn varying_columns(x: &Array2<f64>) -> Vec<usize> {
    x.axis_iter(Axis(1))
        .enumerate()
        .filter(|(_, column)| column.var(0.0) > MIN_VARIANCE)
        .map(|(i, _)| i)
        .collect()
}

impl Estimator for ElasticNetEstimator {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        if x.nrows() == 0 {
            return Err(ModelError::EmptyTrainingSet);
        }
        let kept = varying_columns(x);
        debug!(
            "fitting on {} rows, {} of {} columns vary",
            x.nrows(),
            kept.len(),
            x.ncols()
        );
        if kept.is_empty() {
            self.fitted = Some(Fitted::Constant(y.mean().unwrap_or(0.0)));
            return Ok(());
        }

        let dataset = Dataset::new(x.select(Axis(1), &kept), y.clone());
        let model = ElasticNet::params()
            .penalty(self.config.penalty)
            .l1_ratio(self.config.l1_ratio)
            .max_iterations(self.config.max_iterations)
            .tolerance(self.config.tolerance)
            .fit(&dataset)?;
        self.fitted = Some(Fitted::Linear { model, kept });
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        match &self.fitted {
            None => Err(ModelError::NotFit),
            Some(Fitted::Constant(mean)) => Ok(Array1::from_elem(x.nrows(), *mean)),
            Some(Fitted::Linear { model, kept }) => Ok(model.predict(&x.select(Axis(1), kept))),
        }
    }
}

// ---------------------------------------------------------------------------
// Ranking model
// ---------------------------------------------------------------------------

/// Dense matrix of the named columns in the given order; nulls read as 0.
pub fn design_matrix(frame: &FeatureFrame, features: &[String]) -> Result<Array2<f64>, ModelError> {
    let mut x = Array2::<f64>::zeros((frame.len(), features.len()));
    for (j, name) in features.iter().enumerate() {
        let values = frame
            .column(name)
            .ok_or_else(|| ModelError::MissingFeature(name.clone()))?;
        for (i, value) in values.iter().enumerate() {
            x[(i, j)] = value.unwrap_or(0.0);
        }
    }
    Ok(x)
}

pub struct RankingModel {
    estimator: Box<dyn Estimator>,
    /// Feature order recorded at fit; `None` while unfit.
    features: Option<Vec<String>>,
    top_n: usize,
}

impl RankingModel {
    pub fn new(config: &ModelConfig) -> Self {
        let top_n = config.top_n;
        RankingModel::with_estimator(Box::new(ElasticNetEstimator::new(config.clone())), top_n)
    }

    pub fn with_estimator(estimator: Box<dyn Estimator>, top_n: usize) -> Self {
        RankingModel {
            estimator,
            features: None,
            top_n,
        }
    }

    pub fn is_fit(&self) -> bool {
        self.features.is_some()
    }

    pub fn features(&self) -> Option<&[String]> {
        self.features.as_deref()
    }

    /// Train on every numeric column except the vote-share target.
    ///
    /// A failed fit leaves the model unfit.
    pub fn fit(&mut self, historical: &FeatureFrame) -> Result<(), ModelError> {
        if historical.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        let features: Vec<String> = historical
            .column_names()
            .filter(|name| *name != TARGET)
            .map(str::to_string)
            .collect();
        let x = design_matrix(historical, &features)?;
        let y: Array1<f64> = historical
            .column(TARGET)
            .ok_or_else(|| ModelError::MissingFeature(TARGET.to_string()))?
            .iter()
            .map(|v| v.unwrap_or(0.0))
            .collect();

        self.features = None;
        self.estimator.fit(&x, &y)?;
        info!(
            "fit ranking model on {} rows x {} features",
            x.nrows(),
            features.len()
        );
        self.features = Some(features);
        Ok(())
    }

    /// Top players of `current` by predicted vote share, highest first.
    /// Equal predictions keep table order.
    pub fn predict(&self, current: &FeatureFrame) -> Result<Vec<RankedPlayer>, ModelError> {
        let features = self.features.as_ref().ok_or(ModelError::NotFit)?;
        let x = design_matrix(current, features)?;
        let predictions = self.estimator.predict(&x)?;

        let mut ranked: Vec<RankedPlayer> = current
            .names()
            .iter()
            .zip(predictions.iter())
            .map(|(name, &share)| RankedPlayer {
                name: name.clone(),
                predicted_share: share,
            })
            .collect();
        ranked.sort_by(|a, b| b.predicted_share.total_cmp(&a.predicted_share));
        ranked.truncate(self.top_n);
        Ok(ranked)
    }
}
