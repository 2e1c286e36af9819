use crate::traits::Scalar;

use super::DynMatrix;

impl<T: Scalar> DynMatrix<T> {
    /// Copy the sub-matrix of size `rows x cols` starting at `(i, j)`.
    ///
    /// Panics if the block extends beyond the matrix bounds.
    ///
    /// ```
    /// use densvd::DynMatrix;
    /// let m = DynMatrix::from_fn(3, 3, |i, j| (i * 3 + j) as f64);
    /// let b = m.block(1, 1, 2, 2);
    /// assert_eq!(b[(0, 0)], 4.0);
    /// assert_eq!(b[(1, 1)], 8.0);
    /// ```
    pub fn block(&self, i: usize, j: usize, rows: usize, cols: usize) -> Self {
        assert!(
            i + rows <= self.nrows && j + cols <= self.ncols,
            "block ({},{}) size {}x{} out of bounds for {}x{} matrix",
            i, j, rows, cols, self.nrows, self.ncols,
        );
        DynMatrix::from_fn(rows, cols, |r, c| self[(i + r, j + c)])
    }

    /// Copy columns `start..end` (all rows).
    ///
    /// ```
    /// use densvd::DynMatrix;
    /// let m = DynMatrix::from_rows(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    /// let c = m.columns_range(1, 3);
    /// assert_eq!(c.shape(), (2, 2));
    /// assert_eq!(c[(1, 0)], 5.0);
    /// ```
    pub fn columns_range(&self, start: usize, end: usize) -> Self {
        assert!(
            start <= end && end <= self.ncols,
            "columns_range {}..{} out of bounds for {} columns",
            start, end, self.ncols,
        );
        // Columns are contiguous in storage
        let n = self.nrows;
        DynMatrix::from_slice(n, end - start, &self.data[start * n..end * n])
    }

    /// Copy rows `start..end` (all columns).
    pub fn rows_range(&self, start: usize, end: usize) -> Self {
        assert!(start <= end, "rows_range: start {} > end {}", start, end);
        self.block(start, 0, end - start, self.ncols)
    }
}
