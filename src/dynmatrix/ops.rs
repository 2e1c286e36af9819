use alloc::vec;
use core::ops::Mul;

use crate::traits::{LinalgScalar, Scalar};

use super::DynMatrix;

// ── Matrix multiplication: (M×N) * (N×P) → (M×P) ──────────────────

impl<T: Scalar> Mul<&DynMatrix<T>> for &DynMatrix<T> {
    type Output = DynMatrix<T>;

    fn mul(self, rhs: &DynMatrix<T>) -> DynMatrix<T> {
        assert_eq!(
            self.ncols, rhs.nrows,
            "dimension mismatch: {}x{} * {}x{}",
            self.nrows, self.ncols, rhs.nrows, rhs.ncols,
        );
        let m = self.nrows;
        let n = self.ncols;
        let p = rhs.ncols;
        let mut data = vec![T::zero(); m * p];
        // Column-major: C[:, j] += A[:, k] * B[k, j]
        for j in 0..p {
            for k in 0..n {
                let b_kj = rhs.data[j * n + k];
                for i in 0..m {
                    data[j * m + i] = data[j * m + i] + self.data[k * m + i] * b_kj;
                }
            }
        }
        DynMatrix {
            data,
            nrows: m,
            ncols: p,
        }
    }
}

// ── Scalar multiplication: matrix * scalar ──────────────────────────

impl<T: Scalar> Mul<T> for &DynMatrix<T> {
    type Output = DynMatrix<T>;

    fn mul(self, rhs: T) -> DynMatrix<T> {
        self.map(|x| x * rhs)
    }
}

// ── Transpose / adjoint ─────────────────────────────────────────────

impl<T: Copy> DynMatrix<T> {
    /// Transpose: (M×N) → (N×M).
    ///
    /// ```
    /// use densvd::DynMatrix;
    /// let a = DynMatrix::from_rows(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    /// let t = a.transpose();
    /// assert_eq!(t.nrows(), 3);
    /// assert_eq!(t.ncols(), 2);
    /// assert_eq!(t[(1, 0)], 2.0);
    /// ```
    pub fn transpose(&self) -> Self {
        let m = self.nrows;
        DynMatrix::from_fn(self.ncols, m, |i, j| self.data[i * m + j])
    }
}

impl<T: LinalgScalar> DynMatrix<T> {
    /// Conjugate transpose `A^H`: (M×N) → (N×M).
    ///
    /// Equal to [`transpose`](Self::transpose) for real element types.
    ///
    /// ```
    /// use densvd::{Complex, DynMatrix};
    ///
    /// let a = DynMatrix::from_rows(1, 2, &[Complex::new(1.0_f64, 2.0), Complex::new(3.0, -1.0)]);
    /// let ah = a.adjoint();
    /// assert_eq!(ah.nrows(), 2);
    /// assert_eq!(ah[(0, 0)], Complex::new(1.0, -2.0));
    /// assert_eq!(ah[(1, 0)], Complex::new(3.0, 1.0));
    /// ```
    pub fn adjoint(&self) -> Self {
        let m = self.nrows;
        DynMatrix::from_fn(self.ncols, m, |i, j| self.data[i * m + j].conj())
    }
}
