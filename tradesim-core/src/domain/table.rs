//! Row-major date × instrument tables.

use serde::{Deserialize, Serialize};

/// A dense table with one row per date and one column per instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Copy> Table<T> {
    /// A `rows × cols` table with every cell set to `value`.
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Build from nested rows. Returns `None` if the rows are ragged.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Option<Self> {
        let cols = rows.first().map_or(0, |r| r.len());
        if rows.iter().any(|r| r.len() != cols) {
            return None;
        }
        let n = rows.len();
        let data = rows.into_iter().flatten().collect();
        Some(Self {
            rows: n,
            cols,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row(&self, i: usize) -> &[T] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[row * self.cols + col]
    }

    pub fn set_row(&mut self, i: usize, values: &[T]) {
        assert_eq!(values.len(), self.cols, "row width mismatch");
        self.data[i * self.cols..(i + 1) * self.cols].copy_from_slice(values);
    }

    /// Borrow rows `[start, end)`.
    pub fn view(&self, start: usize, end: usize) -> TableView<'_, T> {
        TableView {
            data: &self.data[start * self.cols..end * self.cols],
            cols: self.cols,
        }
    }
}

/// Borrowed row range of a [`Table`].
#[derive(Debug, Clone, Copy)]
pub struct TableView<'a, T> {
    data: &'a [T],
    cols: usize,
}

impl<'a, T: Copy> TableView<'a, T> {
    /// Number of rows in the view.
    pub fn len(&self) -> usize {
        if self.cols == 0 {
            0
        } else {
            self.data.len() / self.cols
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row(&self, i: usize) -> &'a [T] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn last_row(&self) -> Option<&'a [T]> {
        let n = self.len();
        (n > 0).then(|| self.row(n - 1))
    }

    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[row * self.cols + col]
    }

    /// Values of one instrument column, oldest first.
    pub fn column(&self, col: usize) -> Vec<T> {
        (0..self.len()).map(|r| self.get(r, col)).collect()
    }

    pub fn rows_iter(&self) -> impl Iterator<Item = &'a [T]> + 'a {
        let cols = self.cols.max(1);
        self.data.chunks(cols)
    }
}
