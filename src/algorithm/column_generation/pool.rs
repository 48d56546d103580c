//! # Column pool
//!
//! Owns all columns of a column generation run. Columns are never removed, so indices stay valid
//! for the whole run.
use std::ops::{Index, IndexMut};
use std::slice;

use serde::{Deserialize, Serialize};

use crate::algorithm::column_generation::column::Column;

/// Upper bounds at or below this value count as fixed to zero.
const ZERO_BOUND: f64 = 1e-9;

/// A column index together with its reduced cost.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColumnScore {
    /// Index in the pool.
    pub index: usize,
    /// Reduced cost under the duals the score was computed for.
    pub reduced_cost: f64,
}

/// Append-only store of columns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnPool {
    columns: Vec<Column>,
}

impl ColumnPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column unless an equal one is already present.
    ///
    /// # Return value
    ///
    /// The index of the new column, or `None` if it was a duplicate.
    pub fn add(&mut self, column: Column) -> Option<usize> {
        // TODO(PERFORMANCE): Hash the coefficients to avoid the linear scan.
        if self.columns.contains(&column) {
            return None;
        }

        self.columns.push(column);
        Some(self.columns.len() - 1)
    }

    /// Number of columns, including fixed ones.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether no column was added yet.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The column at an index, if it exists.
    pub fn get(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Mutable access to the column at an index, if it exists.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Column> {
        self.columns.get_mut(index)
    }

    /// Columns in order of addition.
    pub fn iter(&self) -> slice::Iter<'_, Column> {
        self.columns.iter()
    }

    /// Mutable columns in order of addition.
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, Column> {
        self.columns.iter_mut()
    }

    /// Number of columns that are not fixed to zero.
    pub fn allowed_len(&self) -> usize {
        self.columns.iter().filter(|column| column.upper_bound() > ZERO_BOUND).count()
    }

    /// Columns with a negative reduced cost, most negative first.
    ///
    /// Columns fixed to zero are skipped.
    ///
    /// # Arguments
    ///
    /// * `duals`: Dual value of every row.
    /// * `max_count`: If positive, at most this many columns are returned.
    pub fn sorted_by_reduced_cost(&self, duals: &[f64], max_count: usize) -> Vec<ColumnScore> {
        let mut scores = self.columns.iter()
            .enumerate()
            .filter(|(_, column)| column.upper_bound() > ZERO_BOUND)
            .map(|(index, column)| ColumnScore { index, reduced_cost: column.reduced_cost(duals) })
            .filter(|score| score.reduced_cost < 0.0)
            .collect::<Vec<_>>();
        scores.sort_by(|left, right| left.reduced_cost.total_cmp(&right.reduced_cost));

        if max_count > 0 {
            scores.truncate(max_count);
        }
        scores
    }

    /// Remove all columns.
    pub fn clear(&mut self) {
        self.columns.clear();
    }
}

impl Index<usize> for ColumnPool {
    type Output = Column;

    fn index(&self, index: usize) -> &Self::Output {
        &self.columns[index]
    }
}

impl IndexMut<usize> for ColumnPool {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.columns[index]
    }
}

impl<'a> IntoIterator for &'a ColumnPool {
    type Item = &'a Column;
    type IntoIter = slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for &'a mut ColumnPool {
    type Item = &'a mut Column;
    type IntoIter = slice::IterMut<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(test)]
mod test {
    use crate::algorithm::column_generation::column::Column;
    use crate::algorithm::column_generation::pool::ColumnPool;

    fn unit(row: usize, coefficient: f64) -> Column {
        let mut column = Column::new(0.0, 0.0, 1.0);
        column.add_coefficient(row, coefficient);
        column
    }

    #[test]
    fn small() {
        let mut original = ColumnPool::new();
        assert_eq!(original.add(unit(0, 1.0)), Some(0));
        assert_eq!(original.add(unit(1, 1.0)), Some(1));
        assert_eq!(original.add(unit(2, -1.0)), Some(2));

        let json = serde_json::to_string(&original).unwrap();
        original.clear();
        assert!(original.is_empty());
        let mut pool: ColumnPool = serde_json::from_str(&json).unwrap();
        assert_eq!(pool.len(), 3);

        let duals = [1.0, 10.0, 100.0];
        let sorted = pool.sorted_by_reduced_cost(&duals, 0);
        assert_eq!(
            sorted.iter().map(|score| (score.index, score.reduced_cost)).collect::<Vec<_>>(),
            vec![(1, -10.0), (0, -1.0)],
        );
        assert_eq!(pool.sorted_by_reduced_cost(&duals, 1), sorted[..1]);
        assert_eq!(pool.iter().count(), 3);

        // Columns fixed to zero are not returned
        pool[0].fix(0).unwrap();
        pool[1].fix(0).unwrap();
        assert!(pool.sorted_by_reduced_cost(&duals, 0).is_empty());
        assert_eq!(pool.allowed_len(), 1);
    }

    #[test]
    fn duplicates() {
        let mut pool = ColumnPool::new();
        pool.add(unit(0, 1.0));
        pool.add(unit(1, 1.0));
        assert_eq!(pool.add(unit(0, 1.0)), None);

        let mut different_cost = Column::new(5.0, 0.0, 1.0);
        different_cost.add_coefficient(0, 1.0);
        pool.add(different_cost);
        let mut different_lower = Column::new(0.0, 0.5, 1.0);
        different_lower.add_coefficient(0, 1.0);
        pool.add(different_lower);
        let mut different_upper = Column::new(0.0, 0.0, 0.5);
        different_upper.add_coefficient(0, 1.0);
        pool.add(different_upper);

        assert_eq!(pool.len(), 5);
    }
}
