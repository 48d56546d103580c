//! # Dense tables
//!
//! Flat, row-major storage for the tables of the dynamic programs. Indexing is done with tuples,
//! `table[(i, c)]` or `table[(i, c, d)]`.
use std::ops::{Index, IndexMut};

/// A `rows × columns` table.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    values: Vec<T>,
    rows: usize,
    columns: usize,
}

impl<T: Clone> Grid<T> {
    /// Create a table with every cell set to `value`.
    pub fn new(rows: usize, columns: usize, value: T) -> Self {
        Self {
            values: vec![value; rows * columns],
            rows,
            columns,
        }
    }
}

impl<T> Grid<T> {
    /// Create a table with cell `(i, j)` set to `f(i, j)`.
    pub fn from_fn(rows: usize, columns: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let values = (0..rows)
            .flat_map(|i| (0..columns).map(move |j| (i, j)))
            .map(|(i, j)| f(i, j))
            .collect();

        Self { values, rows, columns }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// One row as a slice.
    pub fn row(&self, i: usize) -> &[T] {
        debug_assert!(i < self.rows);

        &self.values[i * self.columns..(i + 1) * self.columns]
    }

    /// One row as a mutable slice.
    pub fn row_mut(&mut self, i: usize) -> &mut [T] {
        debug_assert!(i < self.rows);

        &mut self.values[i * self.columns..(i + 1) * self.columns]
    }

    /// All cells, row after row.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.values.iter_mut()
    }
}

impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        debug_assert!(i < self.rows && j < self.columns);

        &self.values[i * self.columns + j]
    }
}

impl<T> IndexMut<(usize, usize)> for Grid<T> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Self::Output {
        debug_assert!(i < self.rows && j < self.columns);

        &mut self.values[i * self.columns + j]
    }
}

/// A three dimensional table.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid3<T> {
    values: Vec<T>,
    shape: [usize; 3],
}

impl<T: Clone> Grid3<T> {
    /// Create a table with every cell set to `value`.
    pub fn new(shape: [usize; 3], value: T) -> Self {
        Self {
            values: vec![value; shape.iter().product()],
            shape,
        }
    }
}

impl<T> Grid3<T> {
    /// Create a table with cell `(i, j, k)` set to `f(i, j, k)`.
    pub fn from_fn(shape: [usize; 3], mut f: impl FnMut(usize, usize, usize) -> T) -> Self {
        let mut values = Vec::with_capacity(shape.iter().product());
        for i in 0..shape[0] {
            for j in 0..shape[1] {
                for k in 0..shape[2] {
                    values.push(f(i, j, k));
                }
            }
        }

        Self { values, shape }
    }

    /// Size in each dimension.
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    fn offset(&self, (i, j, k): (usize, usize, usize)) -> usize {
        debug_assert!(i < self.shape[0] && j < self.shape[1] && k < self.shape[2]);

        (i * self.shape[1] + j) * self.shape[2] + k
    }
}

impl<T> Index<(usize, usize, usize)> for Grid3<T> {
    type Output = T;

    fn index(&self, index: (usize, usize, usize)) -> &Self::Output {
        &self.values[self.offset(index)]
    }
}

impl<T> IndexMut<(usize, usize, usize)> for Grid3<T> {
    fn index_mut(&mut self, index: (usize, usize, usize)) -> &mut Self::Output {
        let offset = self.offset(index);
        &mut self.values[offset]
    }
}
