use num_traits::{Float, One, Zero};

use crate::linalg::householder::SumSquares;
use crate::traits::LinalgScalar;

use super::DynMatrix;

// ── Matrix norms ────────────────────────────────────────────────────

impl<T: LinalgScalar> DynMatrix<T> {
    /// Frobenius norm: `sqrt(sum |a_ij|^2)`, accumulated with scaling so it
    /// is finite for any finite matrix.
    ///
    /// ```
    /// use densvd::DynMatrix;
    /// let m = DynMatrix::from_rows(2, 2, &[3.0_f64, 0.0, 0.0, 4.0]);
    /// assert!((m.frobenius_norm() - 5.0).abs() < 1e-12);
    /// ```
    pub fn frobenius_norm(&self) -> T::Real {
        let mut sum = SumSquares::new();
        for &x in &self.data {
            sum.add_scalar(x);
        }
        sum.norm()
    }

    /// Largest element-wise modulus of `self - other`.
    ///
    /// Panics if the shapes differ.
    pub fn max_abs_diff(&self, other: &Self) -> T::Real {
        assert_eq!(
            self.shape(),
            other.shape(),
            "dimension mismatch: {}x{} vs {}x{}",
            self.nrows, self.ncols, other.nrows, other.ncols,
        );
        self.data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| (a - b).modulus())
            .fold(<T::Real as Zero>::zero(), |acc, d| acc.max(d))
    }

    /// Approximate equality with the element type's default tolerance.
    ///
    /// Shapes must match and every `|a_ij - b_ij|` must be within
    /// `T::approx_tolerance() · max(1, ‖self‖_F)`.
    ///
    /// ```
    /// use densvd::DynMatrix;
    /// let a = DynMatrix::from_rows(1, 2, &[1.0_f64, 2.0]);
    /// let b = DynMatrix::from_rows(1, 2, &[1.0 + 1e-13, 2.0]);
    /// assert!(a.approx_eq(&b));
    /// assert!(!a.approx_eq(&DynMatrix::from_rows(1, 2, &[1.0, 2.1])));
    /// ```
    pub fn approx_eq(&self, other: &Self) -> bool {
        self.approx_eq_tol(other, T::approx_tolerance())
    }

    /// Approximate equality with an explicit tolerance, scaled like
    /// [`approx_eq`](Self::approx_eq). Different shapes compare unequal.
    pub fn approx_eq_tol(&self, other: &Self, tol: T::Real) -> bool {
        if self.shape() != other.shape() {
            return false;
        }
        let scale = self.frobenius_norm().max(<T::Real as One>::one());
        self.max_abs_diff(other) <= tol * scale
    }

    /// Whether the rows or columns of `self` are orthonormal.
    ///
    /// Checks `A A^H = I` when `nrows ≤ ncols` and `A^H A = I` when
    /// `ncols ≤ nrows` (both for square matrices).
    ///
    /// ```
    /// use densvd::DynMatrix;
    /// let q: DynMatrix<f64> = DynMatrix::identity(3, 2);
    /// assert!(q.is_unitary());
    /// let not_q = DynMatrix::from_rows(2, 2, &[1.0_f64, 1.0, 0.0, 1.0]);
    /// assert!(!not_q.is_unitary());
    /// ```
    pub fn is_unitary(&self) -> bool {
        let ah = self.adjoint();
        if self.nrows <= self.ncols
            && !(self * &ah).approx_eq(&DynMatrix::eye(self.nrows, T::zero()))
        {
            return false;
        }
        if self.ncols <= self.nrows
            && !(&ah * self).approx_eq(&DynMatrix::eye(self.ncols, T::zero()))
        {
            return false;
        }
        true
    }
}
