// Column-oriented table of engineered features.
//
// Each row is a player-season identified by name and season. Numeric
// columns are kept in insertion order and hold `None` for missing values.

use std::collections::BTreeMap;

use crate::season::Season;

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureFrame {
    names: Vec<String>,
    seasons: Vec<Season>,
    teams: Vec<String>,
    columns: Vec<Column>,
}

impl FeatureFrame {
    /// Create a frame with identity fields and no numeric columns.
    ///
    /// All three vectors describe the same rows and must be equally long.
    pub fn new(names: Vec<String>, seasons: Vec<Season>, teams: Vec<String>) -> Self {
        assert!(
            names.len() == seasons.len() && names.len() == teams.len(),
            "identity vectors must have equal length"
        );
        FeatureFrame {
            names,
            seasons,
            teams,
            columns: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn seasons(&self) -> &[Season] {
        &self.seasons
    }

    /// Team codes as text (the numeric encoding lives in its own column).
    pub fn teams(&self) -> &[String] {
        &self.teams
    }

    pub fn teams_mut(&mut self) -> &mut [String] {
        &mut self.teams
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut [Option<f64>]> {
        self.columns
            .iter_mut()
            .find(|c| c.name == name)
            .map(|c| c.values.as_mut_slice())
    }

    /// Replace the named column, or append it if absent.
    pub fn set_column(&mut self, name: &str, values: Vec<Option<f64>>) {
        assert_eq!(values.len(), self.len(), "column `{name}` has wrong length");
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(column) => column.values = values,
            None => self.columns.push(Column {
                name: name.to_string(),
                values,
            }),
        }
    }

    /// Remove every listed column that exists.
    pub fn drop_columns(&mut self, names: &[&str]) {
        self.columns.retain(|c| !names.contains(&c.name.as_str()));
    }

    /// Rename columns per `(from, to)` pairs; pairs whose source is absent
    /// are ignored.
    pub fn rename_columns(&mut self, mapping: &[(&str, &str)]) {
        for column in &mut self.columns {
            if let Some((_, to)) = mapping.iter().find(|(from, _)| *from == column.name) {
                column.name = to.to_string();
            }
        }
    }

    /// Row indices grouped by season, seasons ascending.
    pub fn rows_by_season(&self) -> BTreeMap<Season, Vec<usize>> {
        let mut groups: BTreeMap<Season, Vec<usize>> = BTreeMap::new();
        for (i, season) in self.seasons.iter().enumerate() {
            groups.entry(*season).or_default().push(i);
        }
        groups
    }

    pub fn latest_season(&self) -> Option<Season> {
        self.seasons.iter().max().copied()
    }

    /// Copy of the frame restricted to `indices`, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> FeatureFrame {
        FeatureFrame {
            names: indices.iter().map(|&i| self.names[i].clone()).collect(),
            seasons: indices.iter().map(|&i| self.seasons[i]).collect(),
            teams: indices.iter().map(|&i| self.teams[i].clone()).collect(),
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    values: indices.iter().map(|&i| c.values[i]).collect(),
                })
                .collect(),
        }
    }
}
