// ============================================================
// Layer 3 — Classifier Weight Matrix
// ============================================================
// Backend-free copy of a linear classification head's weights,
// laid out one row per class:
//
//   row i = weight vector of class i  (length = feature dim)
//
// The ML layer converts burn's [features, classes] parameter
// into this layout and back; everything in between is plain Rust.

use crate::domain::error::TrainError;

#[derive(Debug, Clone, PartialEq)]
pub struct WeightMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl WeightMatrix {
    /// Build from row-major data of shape `[rows, cols]`.
    pub fn from_rows(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self, TrainError> {
        if data.len() != rows * cols {
            return Err(TrainError::Shape {
                expected: format!("{rows}x{cols} = {} values", rows * cols),
                found: format!("{} values", data.len()),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Number of classes.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Feature dimension.
    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row(&self, class: usize) -> &[f32] {
        &self.data[class * self.cols..(class + 1) * self.cols]
    }

    pub fn row_mut(&mut self, class: usize) -> &mut [f32] {
        &mut self.data[class * self.cols..(class + 1) * self.cols]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_contiguous_slices() {
        let m = WeightMatrix::from_rows(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(m.row(0), &[1.0, 2.0, 3.0]);
        assert_eq!(m.row(1), &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn rejects_wrong_length() {
        let err = WeightMatrix::from_rows(2, 3, vec![0.0; 5]).unwrap_err();
        assert!(matches!(err, TrainError::Shape { .. }));
    }
}
