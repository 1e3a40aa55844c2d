// Train/predict split: completed seasons train the model, the latest
// season is the one being ranked.

use tracing::info;

use crate::features::{FeatureError, FeatureFrame};
use crate::season::Season;

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSplit {
    /// Every season before the latest one, with known vote shares.
    pub historical: FeatureFrame,
    /// The latest season only.
    pub current: FeatureFrame,
}

impl DatasetSplit {
    /// Season being ranked, `None` when the current table is empty.
    pub fn current_season(&self) -> Option<Season> {
        self.current.latest_season()
    }
}

/// Partition rows by whether they belong to the latest season present.
/// Row order is preserved within each side.
pub fn split_by_season(frame: &FeatureFrame) -> Result<DatasetSplit, FeatureError> {
    let latest = frame.latest_season().ok_or(FeatureError::EmptyTable)?;
    let (current, historical): (Vec<usize>, Vec<usize>) =
        (0..frame.len()).partition(|&i| frame.seasons()[i] == latest);

    info!(
        "split {} historical rows and {} rows for {}",
        historical.len(),
        current.len(),
        latest
    );
    Ok(DatasetSplit {
        historical: frame.select_rows(&historical),
        current: frame.select_rows(&current),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(years: &[i32]) -> FeatureFrame {
        let mut frame = FeatureFrame::new(
            (0..years.len()).map(|i| format!("P{i}")).collect(),
            years.iter().map(|&y| Season::new(y)).collect(),
            vec!["BOS".to_string(); years.len()],
        );
        frame.set_column("x", (0..years.len()).map(|i| Some(i as f64)).collect());
        frame
    }

    #[test]
    fn latest_season_is_current() {
        let split = split_by_season(&frame(&[2020, 2022, 2021, 2022])).unwrap();
        assert_eq!(split.current_season(), Some(Season::new(2022)));
        assert_eq!(split.current.names(), &["P1".to_string(), "P3".to_string()]);
        assert_eq!(split.historical.names(), &["P0".to_string(), "P2".to_string()]);
        assert_eq!(split.historical.column("x").unwrap(), &[Some(0.0), Some(2.0)]);
    }

    #[test]
    fn sides_are_disjoint_and_complete() {
        let input = frame(&[2019, 2020, 2020, 2018, 2020]);
        let split = split_by_season(&input).unwrap();
        assert_eq!(split.historical.len() + split.current.len(), input.len());
        assert!(split
            .historical
            .seasons()
            .iter()
            .all(|s| *s < Season::new(2020)));
    }

    #[test]
    fn single_season_has_empty_history() {
        let split = split_by_season(&frame(&[2023, 2023])).unwrap();
        assert!(split.historical.is_empty());
        assert_eq!(split.current.len(), 2);
    }

    #[test]
    fn empty_frame_is_an_error() {
        assert!(matches!(
            split_by_season(&frame(&[])),
            Err(FeatureError::EmptyTable)
        ));
    }
}
