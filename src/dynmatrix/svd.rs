use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use num_traits::{Float, Zero};

use crate::linalg::svd::range_scale;
use crate::linalg::{bidiagonal_qr, bidiagonalize, LinalgError};
use crate::traits::LinalgScalar;

use super::DynMatrix;

/// QR sweep budget per unit of the larger dimension.
const SWEEPS_PER_DIM: usize = 30;

// ── SvdMode ─────────────────────────────────────────────────────────

/// Shape of the factors returned by [`DynSvd::new`].
///
/// With `k = min(m, n)` for an `m x n` input:
///
/// | Mode      | U     | V^H   |
/// |-----------|-------|-------|
/// | `Economy` | m × k | k × n |
/// | `Full`    | m × m | n × n |
///
/// Singular values are the same `k` values in both modes.
///
/// ```
/// use densvd::SvdMode;
///
/// assert_eq!(SvdMode::default(), SvdMode::Economy);
/// assert_eq!("full".parse::<SvdMode>().unwrap(), SvdMode::Full);
/// assert_eq!("econ".parse::<SvdMode>().unwrap(), SvdMode::Economy);
/// assert_eq!(SvdMode::from(false), SvdMode::Full);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SvdMode {
    /// Trim the factor on the larger side to `min(m, n)` vectors.
    #[default]
    Economy,
    /// Square unitary U and V^H.
    Full,
}

impl fmt::Display for SvdMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SvdMode::Economy => write!(f, "economy"),
            SvdMode::Full => write!(f, "full"),
        }
    }
}

/// `true` selects [`SvdMode::Economy`].
impl From<bool> for SvdMode {
    fn from(economy: bool) -> Self {
        if economy {
            SvdMode::Economy
        } else {
            SvdMode::Full
        }
    }
}

/// Error returned when a string does not name an [`SvdMode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSvdModeError {
    input: String,
}

impl fmt::Display for ParseSvdModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown SVD mode '{}' (expected 'economy', 'econ', 'thin' or 'full')",
            self.input
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseSvdModeError {}

impl FromStr for SvdMode {
    type Err = ParseSvdModeError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        if ["econ", "economy", "thin"]
            .iter()
            .any(|name| key.eq_ignore_ascii_case(name))
        {
            Ok(SvdMode::Economy)
        } else if key.eq_ignore_ascii_case("full") {
            Ok(SvdMode::Full)
        } else {
            Err(ParseSvdModeError {
                input: s.to_string(),
            })
        }
    }
}

// ── Driver ──────────────────────────────────────────────────────────

/// Full factorization of a tall (`rows >= cols`) work matrix.
struct TallFactors<T: LinalgScalar> {
    u: DynMatrix<T>,
    values: Vec<T::Real>,
    v: DynMatrix<T>,
}

/// Bidiagonalize and diagonalize `work`, accumulating U and V when
/// `vectors` is set. A failed QR phase is retried once from scratch with
/// twice the sweep budget.
///
/// Input whose largest entry lies outside the range where squares stay
/// representable is divided by that entry first; the singular values are
/// multiplied back at the end and U, V are unaffected.
fn factor_tall<T: LinalgScalar>(
    work: &DynMatrix<T>,
    vectors: bool,
) -> Result<TallFactors<T>, LinalgError> {
    let (rows, cols) = work.shape();
    debug_assert!(rows >= cols && cols > 0);

    let amax = work
        .data
        .iter()
        .fold(<T::Real as Zero>::zero(), |acc, &x| acc.max(x.modulus()));
    let scaling = range_scale(amax);
    let scaled;
    let work = match scaling {
        Some(f) => {
            log::debug!("scaling {}x{} input by 1/{:?}", rows, cols, f);
            scaled = work.map(|x| x.div_real(f));
            &scaled
        }
        None => work,
    };

    let mut budget = SWEEPS_PER_DIM * rows;
    let mut retried = false;
    loop {
        let mut a = work.clone();
        let (mut u, mut v) = if vectors {
            (
                DynMatrix::zeros(rows, rows, T::zero()),
                DynMatrix::zeros(cols, cols, T::zero()),
            )
        } else {
            (
                DynMatrix::zeros(0, 0, T::zero()),
                DynMatrix::zeros(0, 0, T::zero()),
            )
        };
        let mut values = vec![<T::Real as Zero>::zero(); cols];
        let mut off_diag = vec![<T::Real as Zero>::zero(); cols - 1];

        bidiagonalize(&mut a, &mut values, &mut off_diag, &mut u, &mut v, vectors, vectors);
        match bidiagonal_qr::<T>(&mut values, &mut off_diag, &mut u, &mut v, vectors, vectors, budget) {
            Ok(sweeps) => {
                log::debug!(
                    "bidiagonal QR converged for {}x{} in {} sweeps (vectors: {})",
                    rows,
                    cols,
                    sweeps,
                    vectors
                );
                if let Some(f) = scaling {
                    for x in values.iter_mut() {
                        *x = *x * f;
                    }
                }
                return Ok(TallFactors { u, values, v });
            }
            Err(err) if retried => {
                log::warn!("SVD of {}x{} failed to converge", rows, cols);
                return Err(err);
            }
            Err(_) => {
                log::warn!(
                    "SVD of {}x{} did not converge in {} sweeps, retrying with {}",
                    rows,
                    cols,
                    budget,
                    2 * budget
                );
                budget *= 2;
                retried = true;
            }
        }
    }
}

fn assert_non_empty<T>(a: &DynMatrix<T>) {
    assert!(
        !a.is_empty(),
        "SVD requires a non-empty matrix, got {}x{}",
        a.nrows(),
        a.ncols()
    );
}

// ── DynSvd ──────────────────────────────────────────────────────────

/// Singular value decomposition `A = U · Σ · V^H` of a dynamically-sized
/// real or complex matrix.
///
/// Singular values are real, non-negative and sorted descending. Their
/// number is always `k = min(m, n)`; the shapes of U and V^H follow
/// [`SvdMode`]. The full factorization is always computed and then
/// trimmed, so the singular values do not depend on the mode.
///
/// Wide matrices (`m < n`) are handled by factoring `A^H` and swapping
/// the roles of U and V.
///
/// Any finite input magnitude is accepted. Matrices with entries near the
/// overflow or underflow threshold are rescaled internally and the
/// singular values are scaled back.
///
/// # Example
///
/// ```
/// use densvd::{DynMatrix, DynSvd, SvdMode};
///
/// let a = DynMatrix::from_rows(3, 2, &[
///     1.0_f64, 0.0,
///     0.0, 1.0,
///     0.0, 0.0,
/// ]);
/// let svd = DynSvd::new(&a, SvdMode::Economy).unwrap();
/// assert_eq!(svd.singular_values(), &[1.0, 1.0]);
/// assert_eq!(svd.u(), &a);
/// assert_eq!(svd.vt(), &DynMatrix::eye(2, 0.0));
///
/// let full = DynSvd::new(&a, SvdMode::Full).unwrap();
/// assert_eq!(full.u().shape(), (3, 3));
/// assert_eq!(full.vt().shape(), (2, 2));
/// ```
#[derive(Debug, Clone)]
pub struct DynSvd<T: LinalgScalar> {
    u: DynMatrix<T>,
    singular_values: Vec<T::Real>,
    vt: DynMatrix<T>,
    mode: SvdMode,
}

impl<T: LinalgScalar> DynSvd<T> {
    /// Compute the SVD of `a`.
    ///
    /// # Panics
    ///
    /// If `a` has zero rows or zero columns.
    ///
    /// # Errors
    ///
    /// [`LinalgError::ConvergenceFailure`] if the bidiagonal QR iteration
    /// does not converge, even after one retry with a doubled budget.
    pub fn new(a: &DynMatrix<T>, mode: SvdMode) -> Result<Self, LinalgError> {
        assert_non_empty(a);
        let (m, n) = a.shape();
        let k = m.min(n);

        let transposed = m < n;
        let work = if transposed { a.adjoint() } else { a.clone() };
        let TallFactors { u, values, v } = factor_tall(&work, true)?;

        // A^H = U' Σ V'^H  =>  A = V' Σ U'^H
        let (u, vt) = if transposed {
            (v, u.adjoint())
        } else {
            (u, v.adjoint())
        };

        let (u, vt) = match mode {
            SvdMode::Full => (u, vt),
            SvdMode::Economy => (u.columns_range(0, k), vt.rows_range(0, k)),
        };

        log::debug!(
            "SVD of {}x{} ({} mode): U {}x{}, V^H {}x{}",
            m,
            n,
            mode,
            u.nrows(),
            u.ncols(),
            vt.nrows(),
            vt.ncols()
        );

        Ok(Self {
            u,
            singular_values: values,
            vt,
            mode,
        })
    }

    /// Compute only the singular values, descending.
    ///
    /// No orthogonal transformations are accumulated. The result equals
    /// [`singular_values`](Self::singular_values) of [`DynSvd::new`].
    ///
    /// # Panics
    ///
    /// If `a` has zero rows or zero columns.
    pub fn singular_values_only(a: &DynMatrix<T>) -> Result<Vec<T::Real>, LinalgError> {
        assert_non_empty(a);
        let work = if a.nrows() < a.ncols() {
            a.adjoint()
        } else {
            a.clone()
        };
        Ok(factor_tall(&work, false)?.values)
    }

    /// Left singular vectors U: `m x k` (economy) or `m x m` (full).
    #[inline]
    pub fn u(&self) -> &DynMatrix<T> {
        &self.u
    }

    /// Conjugate-transposed right singular vectors V^H: `k x n` (economy)
    /// or `n x n` (full). Rows are the right singular vectors.
    #[inline]
    pub fn vt(&self) -> &DynMatrix<T> {
        &self.vt
    }

    /// Right singular vectors V as columns.
    pub fn v(&self) -> DynMatrix<T> {
        self.vt.adjoint()
    }

    /// The singular values, non-negative and sorted descending.
    #[inline]
    pub fn singular_values(&self) -> &[T::Real] {
        &self.singular_values
    }

    /// Mode the factors were computed in.
    #[inline]
    pub fn mode(&self) -> SvdMode {
        self.mode
    }

    /// Σ as a `U.ncols() x V^H.nrows()` rectangular diagonal matrix.
    pub fn sigma(&self) -> DynMatrix<T> {
        let values: Vec<T> = self
            .singular_values
            .iter()
            .map(|&s| T::from_real(s))
            .collect();
        DynMatrix::diagonal_rect(&values, self.u.ncols(), self.vt.nrows())
    }

    /// Rebuild `U · Σ · V^H`.
    ///
    /// ```
    /// use densvd::{DynMatrix, SvdMode};
    /// let a = DynMatrix::from_rows(2, 3, &[1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0]);
    /// let svd = a.svd(SvdMode::Full).unwrap();
    /// assert!(svd.reconstruct().approx_eq(&a));
    /// ```
    pub fn reconstruct(&self) -> DynMatrix<T> {
        &(&self.u * &self.sigma()) * &self.vt
    }

    /// Numerical rank: number of singular values above `tol`.
    pub fn rank(&self, tol: T::Real) -> usize {
        self.singular_values.iter().filter(|&&s| s > tol).count()
    }

    /// Spectral norm `σ_max`.
    pub fn norm2(&self) -> T::Real {
        self.singular_values
            .first()
            .copied()
            .unwrap_or_else(<T::Real as Zero>::zero)
    }

    /// Condition number `σ_max / σ_min`.
    ///
    /// Infinite when the smallest singular value is zero.
    pub fn condition_number(&self) -> T::Real {
        let zero = <T::Real as Zero>::zero();
        match (self.singular_values.first(), self.singular_values.last()) {
            (Some(&s_max), Some(&s_min)) if s_min > zero => s_max / s_min,
            _ => <T::Real as Float>::infinity(),
        }
    }

    /// Consume the decomposition, returning `(U, σ, V^H)`.
    pub fn into_parts(self) -> (DynMatrix<T>, Vec<T::Real>, DynMatrix<T>) {
        (self.u, self.singular_values, self.vt)
    }
}

// ── Free functions ──────────────────────────────────────────────────

/// Singular value decomposition of `a`; see [`DynSvd::new`].
///
/// ```
/// use densvd::{svd, DynMatrix, SvdMode};
/// let a = DynMatrix::from_rows(2, 2, &[3.0_f64, 2.0, 2.0, 3.0]);
/// let f = svd(&a, SvdMode::Economy).unwrap();
/// assert!((f.singular_values()[0] - 5.0).abs() < 1e-12);
/// assert!((f.singular_values()[1] - 1.0).abs() < 1e-12);
/// ```
pub fn svd<T: LinalgScalar>(a: &DynMatrix<T>, mode: SvdMode) -> Result<DynSvd<T>, LinalgError> {
    DynSvd::new(a, mode)
}

/// Singular values of `a`, descending; see [`DynSvd::singular_values_only`].
pub fn singular_values<T: LinalgScalar>(a: &DynMatrix<T>) -> Result<Vec<T::Real>, LinalgError> {
    DynSvd::singular_values_only(a)
}

// ── Convenience methods on DynMatrix ────────────────────────────────

impl<T: LinalgScalar> DynMatrix<T> {
    /// Singular value decomposition.
    ///
    /// ```
    /// use densvd::{DynMatrix, SvdMode};
    /// let a = DynMatrix::from_rows(2, 3, &[1.0_f64, 0.0, 0.0, 0.0, 1.0, 0.0]);
    /// let svd = a.svd(SvdMode::Full).unwrap();
    /// assert_eq!(svd.u(), &DynMatrix::eye(2, 0.0));
    /// assert_eq!(svd.vt(), &DynMatrix::eye(3, 0.0));
    /// ```
    pub fn svd(&self, mode: SvdMode) -> Result<DynSvd<T>, LinalgError> {
        DynSvd::new(self, mode)
    }

    /// Singular values only (no U/V accumulation).
    ///
    /// ```
    /// use densvd::DynMatrix;
    /// let a = DynMatrix::from_rows(2, 2, &[3.0_f64, 0.0, 0.0, 4.0]);
    /// let sv = a.singular_values().unwrap();
    /// assert!((sv[0] - 4.0).abs() < 1e-10);
    /// assert!((sv[1] - 3.0).abs() < 1e-10);
    /// ```
    pub fn singular_values(&self) -> Result<Vec<T::Real>, LinalgError> {
        DynSvd::singular_values_only(self)
    }
}
