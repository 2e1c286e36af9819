use crate::linalg::householder::{make_reflector, SumSquares};
use crate::linalg::LinalgError;
use crate::traits::{LinalgScalar, MatrixMut};
use num_traits::{Float, One, Zero};

// ── Householder bidiagonalization ───────────────────────────────────

/// Householder bidiagonalization: reduce an M×N matrix (M ≥ N) to a **real**
/// upper bidiagonal form via orthogonal/unitary transforms.
///
/// On return:
/// - `diag[0..n]` contains the bidiagonal diagonal
/// - `off_diag[0..n-1]` contains the bidiagonal superdiagonal
/// - `u` (M×M) accumulates the left orthogonal/unitary transform
/// - `v` (N×N) accumulates the right orthogonal/unitary transform
/// - `a` is overwritten with the packed Householder vectors
///
/// The result satisfies `A = U · B · V^H` where B = bidiag(diag, off_diag).
/// For complex input the phase of every pivot is absorbed into the
/// reflectors, so B is real even though U and V are complex.
///
/// `u` and `v` are only touched when `compute_u` / `compute_v` are set;
/// pass empty matrices otherwise.
pub fn bidiagonalize<T: LinalgScalar>(
    a: &mut impl MatrixMut<T>,
    diag: &mut [T::Real],
    off_diag: &mut [T::Real],
    u: &mut impl MatrixMut<T>,
    v: &mut impl MatrixMut<T>,
    compute_u: bool,
    compute_v: bool,
) {
    let m = a.nrows();
    let n = a.ncols();
    assert!(m >= n, "bidiagonalize requires M >= N");
    assert!(diag.len() >= n);
    assert!(off_diag.len() + 1 >= n);

    // Initialize U = I_m, V = I_n
    if compute_u {
        assert!(u.nrows() == m && u.ncols() == m, "U must be {}x{}", m, m);
        for i in 0..m {
            for j in 0..m {
                *u.get_mut(i, j) = if i == j { T::one() } else { T::zero() };
            }
        }
    }
    if compute_v {
        assert!(v.nrows() == n && v.ncols() == n, "V must be {}x{}", n, n);
        for i in 0..n {
            for j in 0..n {
                *v.get_mut(i, j) = if i == j { T::one() } else { T::zero() };
            }
        }
    }

    for k in 0..n {
        // ── Left Householder: zero out a[k+1:m, k] ──
        let mut tail = SumSquares::new();
        for i in (k + 1)..m {
            tail.add_scalar(*a.get(i, k));
        }

        let akk = *a.get(k, k);
        match make_reflector(akk, tail.norm()) {
            Some(h) => {
                // Store v[1..] below the diagonal (v[0] = 1 implicit)
                for i in (k + 1)..m {
                    let val = *a.get(i, k) * h.scale;
                    *a.get_mut(i, k) = val;
                }

                // Apply H^H to trailing columns: A[k:m, j] -= conj(tau) * v * (v^H * A[k:m, j])
                let tau_h = h.tau.conj();
                for j in (k + 1)..n {
                    let mut dot = *a.get(k, j);
                    for i in (k + 1)..m {
                        dot = dot + (*a.get(i, k)).conj() * *a.get(i, j);
                    }
                    dot = dot * tau_h;

                    *a.get_mut(k, j) = *a.get(k, j) - dot;
                    for i in (k + 1)..m {
                        let vi = *a.get(i, k);
                        *a.get_mut(i, j) = *a.get(i, j) - dot * vi;
                    }
                }

                // Accumulate U: U = U * H = U * (I - tau * v * v^H)
                if compute_u {
                    for row in 0..m {
                        let mut dot = *u.get(row, k);
                        for i in (k + 1)..m {
                            dot = dot + *u.get(row, i) * *a.get(i, k);
                        }
                        dot = dot * h.tau;

                        *u.get_mut(row, k) = *u.get(row, k) - dot;
                        for i in (k + 1)..m {
                            let vi_conj = (*a.get(i, k)).conj();
                            *u.get_mut(row, i) = *u.get(row, i) - dot * vi_conj;
                        }
                    }
                }

                diag[k] = h.beta;
            }
            None => diag[k] = akk.re(),
        }

        // ── Right Householder: zero out a[k, k+2:n] ──
        // The row is reflected through its conjugate so that B[k, k+1] is real.
        if k + 1 < n {
            let mut tail = SumSquares::new();
            for j in (k + 2)..n {
                tail.add_scalar(*a.get(k, j));
            }

            let alpha = (*a.get(k, k + 1)).conj();
            match make_reflector(alpha, tail.norm()) {
                Some(g) => {
                    for j in (k + 2)..n {
                        let val = (*a.get(k, j)).conj() * g.scale;
                        *a.get_mut(k, j) = val;
                    }

                    // Apply G from the right to rows k+1..m: A = A * (I - tau * v * v^H)
                    for i in (k + 1)..m {
                        let mut dot = *a.get(i, k + 1);
                        for j in (k + 2)..n {
                            dot = dot + *a.get(i, j) * *a.get(k, j);
                        }
                        dot = dot * g.tau;

                        *a.get_mut(i, k + 1) = *a.get(i, k + 1) - dot;
                        for j in (k + 2)..n {
                            let vj_conj = (*a.get(k, j)).conj();
                            *a.get_mut(i, j) = *a.get(i, j) - dot * vj_conj;
                        }
                    }

                    // Accumulate V: V = V * G
                    if compute_v {
                        for row in 0..n {
                            let mut dot = *v.get(row, k + 1);
                            for j in (k + 2)..n {
                                dot = dot + *v.get(row, j) * *a.get(k, j);
                            }
                            dot = dot * g.tau;

                            *v.get_mut(row, k + 1) = *v.get(row, k + 1) - dot;
                            for j in (k + 2)..n {
                                let vj_conj = (*a.get(k, j)).conj();
                                *v.get_mut(row, j) = *v.get(row, j) - dot * vj_conj;
                            }
                        }
                    }

                    off_diag[k] = g.beta;
                }
                None => off_diag[k] = alpha.re(),
            }
        }
    }
}

// ── Scaling ─────────────────────────────────────────────────────────

/// `(small, big)` bounds on the largest entry inside which squaring and
/// the shift computation neither overflow nor lose everything to underflow.
///
/// `small = sqrt(min_positive) / eps`, `big = 1 / small`, as in LAPACK
/// `xGESVD`.
pub(crate) fn safe_range<R: Float>() -> (R, R) {
    let small = R::min_positive_value().sqrt() / R::epsilon();
    (small, R::one() / small)
}

/// Factor to divide by so that `amax` lands inside [`safe_range`], or
/// `None` when no scaling is needed.
pub(crate) fn range_scale<R: Float>(amax: R) -> Option<R> {
    let (small, big) = safe_range::<R>();
    if amax == R::zero() || !amax.is_finite() || (amax >= small && amax <= big) {
        None
    } else {
        Some(amax)
    }
}

// ── Givens rotations ────────────────────────────────────────────────

/// Compute a Givens rotation `(c, s)` such that
/// `[c s; -s c] · [a; b] = [r; 0]`.
pub(crate) fn givens<R: Float + Zero>(a: R, b: R) -> (R, R) {
    if b == R::zero() {
        (R::one(), R::zero())
    } else if b.abs() > a.abs() {
        let t = a / b;
        let s = R::one() / (R::one() + t * t).sqrt();
        (s * t, s)
    } else {
        let t = b / a;
        let c = R::one() / (R::one() + t * t).sqrt();
        (c, c * t)
    }
}

/// Rotate columns `(p, q)` of `m`: `m_p = c·m_p + s·m_q`, `m_q = c·m_q - s·m_p`.
#[inline]
fn rotate_cols<T: LinalgScalar>(
    m: &mut impl MatrixMut<T>,
    p: usize,
    q: usize,
    c: T::Real,
    s: T::Real,
) {
    let (c, s) = (T::from_real(c), T::from_real(s));
    for row in 0..m.nrows() {
        let mp = *m.get(row, p);
        let mq = *m.get(row, q);
        *m.get_mut(row, p) = c * mp + s * mq;
        *m.get_mut(row, q) = c * mq - s * mp;
    }
}

// ── Golub-Kahan bidiagonal QR ───────────────────────────────────────

/// Golub-Kahan implicit-shift QR iteration on a real bidiagonal matrix.
///
/// On entry:
/// - `diag[0..n]`: bidiagonal diagonal entries
/// - `off_diag[0..n-1]`: bidiagonal superdiagonal entries
/// - `u`, `v`: orthogonal/unitary matrices to accumulate rotations into
/// - `compute_u`, `compute_v`: whether to actually accumulate
/// - `max_iter`: budget of QR sweeps over the whole matrix
///
/// B is divided by its largest entry when that entry lies outside
/// `safe_range`, and the singular values are scaled back on return.
///
/// On return:
/// - `diag` contains non-negative singular values sorted descending
/// - `off_diag` is zeroed
/// - the number of sweeps performed
pub fn bidiagonal_qr<T: LinalgScalar>(
    diag: &mut [T::Real],
    off_diag: &mut [T::Real],
    u: &mut impl MatrixMut<T>,
    v: &mut impl MatrixMut<T>,
    compute_u: bool,
    compute_v: bool,
    max_iter: usize,
) -> Result<usize, LinalgError> {
    let zero = <T::Real as Zero>::zero();
    let n = diag.len();
    if n <= 1 {
        fix_signs_and_sort(diag, u, v, compute_u, compute_v);
        return Ok(0);
    }
    assert!(off_diag.len() + 1 >= n);

    // Bring B into the safe range; undone on the singular values at the end
    let mut bmax = zero;
    for i in 0..n {
        bmax = bmax.max(diag[i].abs());
        if i + 1 < n {
            bmax = bmax.max(off_diag[i].abs());
        }
    }
    let scaling = range_scale(bmax);
    if let Some(f) = scaling {
        log::debug!("bidiagonal QR: scaling B by 1/{:?}", f);
        for d in diag.iter_mut() {
            *d = *d / f;
        }
        for e in off_diag[..n - 1].iter_mut() {
            *e = *e / f;
        }
    }

    let eps = T::lepsilon();
    let mut anorm = zero;
    for i in 0..n {
        let e = if i + 1 < n { off_diag[i].abs() } else { zero };
        anorm = anorm.max(diag[i].abs() + e);
    }
    let tiny = eps * anorm;

    let mut iter = 0usize;
    let mut hi = n - 1;

    while hi > 0 {
        // Deflation: check if trailing off_diag is negligible
        {
            let threshold = eps * (diag[hi - 1].abs() + diag[hi].abs());
            if off_diag[hi - 1].abs() <= threshold {
                off_diag[hi - 1] = zero;
                hi -= 1;
                continue;
            }
        }

        // Find lo: start of unreduced block
        let mut lo = hi - 1;
        while lo > 0 {
            let threshold = eps * (diag[lo - 1].abs() + diag[lo].abs());
            if off_diag[lo - 1].abs() <= threshold {
                off_diag[lo - 1] = zero;
                break;
            }
            lo -= 1;
        }

        iter += 1;
        if iter > max_iter {
            log::warn!(
                "bidiagonal QR did not converge after {} sweeps (block {}..={})",
                max_iter,
                lo,
                hi
            );
            return Err(LinalgError::ConvergenceFailure);
        }
        log::trace!("bidiagonal QR sweep {} on block {}..={}", iter, lo, hi);

        // Zero at the bottom of the block: chase off_diag[hi-1] upward with
        // right rotations on columns (j, hi), which decouples d[hi].
        if diag[hi].abs() <= tiny {
            diag[hi] = zero;
            let mut z = off_diag[hi - 1];
            off_diag[hi - 1] = zero;
            for j in (lo..hi).rev() {
                let (c, s) = givens(diag[j], z);
                diag[j] = c * diag[j] + s * z;
                if j > lo {
                    z = zero - s * off_diag[j - 1];
                    off_diag[j - 1] = c * off_diag[j - 1];
                }
                if compute_v {
                    rotate_cols(v, j, hi, c, s);
                }
            }
            continue;
        }

        // Zero elsewhere in the block: chase off_diag[idx] off the bottom
        // using left rotations on rows (j, idx).
        {
            let mut found_zero = false;
            for idx in lo..hi {
                if diag[idx].abs() <= tiny {
                    diag[idx] = zero;
                    let mut z = off_diag[idx];
                    off_diag[idx] = zero;
                    for j in (idx + 1)..=hi {
                        let (c, s) = givens(diag[j], z);
                        diag[j] = c * diag[j] + s * z;
                        if j < hi {
                            z = zero - s * off_diag[j];
                            off_diag[j] = c * off_diag[j];
                        }
                        if compute_u {
                            rotate_cols(u, j, idx, c, s);
                        }
                    }
                    found_zero = true;
                    break;
                }
            }
            if found_zero {
                continue;
            }
        }

        // Wilkinson shift from trailing 2×2 of B^T B
        let d_hi = diag[hi];
        let d_hi1 = diag[hi - 1];
        let e_hi1 = off_diag[hi - 1];
        let e_hi2 = if hi >= 2 && hi - 2 >= lo {
            off_diag[hi - 2]
        } else {
            zero
        };

        let t11 = d_hi1 * d_hi1 + e_hi2 * e_hi2;
        let t12 = d_hi1 * e_hi1;
        let t22 = d_hi * d_hi + e_hi1 * e_hi1;

        let two = <T::Real as One>::one() + <T::Real as One>::one();
        let d = (t11 - t22) / two;
        let sign_d = if d >= zero {
            <T::Real as One>::one()
        } else {
            zero - <T::Real as One>::one()
        };
        let denom = d + sign_d * d.hypot(t12);
        let mu = if denom == zero {
            t22
        } else {
            t22 - t12 * (t12 / denom)
        };

        // Implicit QR chase
        let mut x = diag[lo] * diag[lo] - mu;
        let mut z = diag[lo] * off_diag[lo];

        for k in lo..hi {
            // Right Givens rotation: zero z
            let (c, s) = givens(x, z);

            if k > lo {
                off_diag[k - 1] = c * x + s * z;
            }

            // Right rotation on columns k, k+1 of B:
            // B[k, k] = c*dk + s*ek
            // B[k, k+1] = c*ek - s*dk
            // B[k+1, k] = s*dk1  (fill-in / bulge)
            // B[k+1, k+1] = c*dk1
            let dk = diag[k];
            let ek = off_diag[k];
            let dk1 = diag[k + 1];

            diag[k] = c * dk + s * ek;
            off_diag[k] = c * ek - s * dk;
            let bulge = s * dk1;
            diag[k + 1] = c * dk1;

            if compute_v {
                rotate_cols(v, k, k + 1, c, s);
            }

            // Left Givens rotation: zero the bulge at B[k+1, k]
            let (c2, s2) = givens(diag[k], bulge);

            // Left rotation on rows k, k+1:
            // B[k, k] = c2*d[k] + s2*bulge
            // B[k, k+1] = c2*e[k] + s2*d[k+1]
            // B[k+1, k+1] = c2*d[k+1] - s2*e[k]
            // B[k, k+2] = s2*e[k+1]  (new fill-in, drives next chase step)
            // B[k+1, k+2] = c2*e[k+1]
            diag[k] = c2 * diag[k] + s2 * bulge;
            let old_ek = off_diag[k];
            let old_dk1 = diag[k + 1];
            off_diag[k] = c2 * old_ek + s2 * old_dk1;
            diag[k + 1] = c2 * old_dk1 - s2 * old_ek;

            if k + 1 < hi {
                let old_ek1 = off_diag[k + 1];
                x = off_diag[k];
                z = s2 * old_ek1;
                off_diag[k + 1] = c2 * old_ek1;
            }

            if compute_u {
                rotate_cols(u, k, k + 1, c2, s2);
            }
        }
    }

    if let Some(f) = scaling {
        for d in diag.iter_mut() {
            *d = *d * f;
        }
    }
    fix_signs_and_sort(diag, u, v, compute_u, compute_v);
    Ok(iter)
}

/// Make all singular values non-negative (negating the matching U column),
/// then sort descending and permute U and V columns alongside.
///
/// Ties keep their original order.
fn fix_signs_and_sort<T: LinalgScalar>(
    diag: &mut [T::Real],
    u: &mut impl MatrixMut<T>,
    v: &mut impl MatrixMut<T>,
    compute_u: bool,
    compute_v: bool,
) {
    let zero = <T::Real as Zero>::zero();
    let n = diag.len();

    for i in 0..n {
        if diag[i] < zero {
            diag[i] = zero - diag[i];
            if compute_u {
                for row in 0..u.nrows() {
                    let val = *u.get(row, i);
                    *u.get_mut(row, i) = T::zero() - val;
                }
            }
        }
    }

    for i in 0..n {
        let mut max_idx = i;
        for j in (i + 1)..n {
            if diag[j] > diag[max_idx] {
                max_idx = j;
            }
        }
        if max_idx != i {
            // Rotate the run i..=max_idx right by one so equal values stay in order
            diag[i..=max_idx].rotate_right(1);
            if compute_u {
                rotate_col_run(u, i, max_idx);
            }
            if compute_v {
                rotate_col_run(v, i, max_idx);
            }
        }
    }
}

/// Move column `last` to position `first`, shifting `first..last` right by one.
fn rotate_col_run<T: LinalgScalar>(m: &mut impl MatrixMut<T>, first: usize, last: usize) {
    for row in 0..m.nrows() {
        let moved = *m.get(row, last);
        let mut j = last;
        while j > first {
            *m.get_mut(row, j) = *m.get(row, j - 1);
            j -= 1;
        }
        *m.get_mut(row, first) = moved;
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DynMatrix;

    const TOL: f64 = 1e-10;

    fn assert_near(a: f64, b: f64, tol: f64, msg: &str) {
        assert!(
            (a - b).abs() < tol,
            "{}: {} vs {} (diff {})",
            msg,
            a,
            b,
            (a - b).abs()
        );
    }

    fn empty() -> DynMatrix<f64> {
        DynMatrix::zeros(0, 0, 0.0)
    }

    /// Run both stages on a tall real matrix, returning (U, σ, V).
    fn full_svd(a: &DynMatrix<f64>) -> (DynMatrix<f64>, Vec<f64>, DynMatrix<f64>) {
        let (m, n) = (a.nrows(), a.ncols());
        let mut work = a.clone();
        let mut u = DynMatrix::zeros(m, m, 0.0);
        let mut v = DynMatrix::zeros(n, n, 0.0);
        let mut diag = vec![0.0; n];
        let mut off_diag = vec![0.0; n.saturating_sub(1)];
        bidiagonalize(&mut work, &mut diag, &mut off_diag, &mut u, &mut v, true, true);
        bidiagonal_qr::<f64>(&mut diag, &mut off_diag, &mut u, &mut v, true, true, 30 * m)
            .unwrap();
        (u, diag, v)
    }

    fn assert_reconstructs(a: &DynMatrix<f64>, u: &DynMatrix<f64>, sv: &[f64], v: &DynMatrix<f64>) {
        for i in 0..a.nrows() {
            for j in 0..a.ncols() {
                let mut sum = 0.0;
                for k in 0..sv.len() {
                    sum += u[(i, k)] * sv[k] * v[(j, k)];
                }
                assert_near(sum, a[(i, j)], 1e-9, &format!("UΣV^T[({},{})]", i, j));
            }
        }
    }

    fn assert_orthogonal(q: &DynMatrix<f64>, msg: &str) {
        let qtq = &q.transpose() * q;
        for i in 0..q.ncols() {
            for j in 0..q.ncols() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_near(qtq[(i, j)], expected, 1e-9, &format!("{}[({},{})]", msg, i, j));
            }
        }
    }

    #[test]
    fn givens_zeroes_second_component() {
        for &(a, b) in &[(3.0_f64, 4.0), (4.0, -3.0), (0.0, 2.0), (-1.0, 1e-8), (5.0, 0.0)] {
            let (c, s) = givens(a, b);
            assert_near(c * c + s * s, 1.0, 1e-14, "c²+s²");
            assert_near(-s * a + c * b, 0.0, 1e-14, "annihilated");
        }
    }

    #[test]
    fn bidiagonal_form_reconstructs() {
        let a = DynMatrix::from_rows(4, 3, &[
            1.0_f64, 2.0, 3.0,
            4.0, 5.0, 6.0,
            7.0, 8.0, 0.0,
            -1.0, 2.0, 5.0,
        ]);
        let mut work = a.clone();
        let mut u = DynMatrix::zeros(4, 4, 0.0);
        let mut v = DynMatrix::zeros(3, 3, 0.0);
        let mut diag = [0.0; 3];
        let mut off_diag = [0.0; 2];
        bidiagonalize(&mut work, &mut diag, &mut off_diag, &mut u, &mut v, true, true);

        let b = DynMatrix::from_fn(4, 3, |i, j| {
            if i == j {
                diag[i]
            } else if j == i + 1 {
                off_diag[i]
            } else {
                0.0
            }
        });
        let ubvt = &(&u * &b) * &v.transpose();
        for i in 0..4 {
            for j in 0..3 {
                assert_near(ubvt[(i, j)], a[(i, j)], 1e-12, &format!("UBV^T[({},{})]", i, j));
            }
        }
        assert_orthogonal(&u, "U^TU");
        assert_orthogonal(&v, "V^TV");
    }

    #[test]
    fn identity_is_untouched() {
        let a = DynMatrix::eye(3, 0.0_f64);
        let (u, sv, v) = full_svd(&a);
        assert_eq!(sv, vec![1.0, 1.0, 1.0]);
        assert_eq!(u, DynMatrix::eye(3, 0.0));
        assert_eq!(v, DynMatrix::eye(3, 0.0));
    }

    #[test]
    fn diagonal_matrix() {
        let a = DynMatrix::from_rows(3, 3, &[
            5.0_f64, 0.0, 0.0,
            0.0, 3.0, 0.0,
            0.0, 0.0, 1.0,
        ]);
        let (_, sv, _) = full_svd(&a);
        assert_near(sv[0], 5.0, TOL, "σ[0]");
        assert_near(sv[1], 3.0, TOL, "σ[1]");
        assert_near(sv[2], 1.0, TOL, "σ[2]");
    }

    #[test]
    fn diagonal_with_negative() {
        let a = DynMatrix::from_rows(2, 2, &[-3.0_f64, 0.0, 0.0, 2.0]);
        let (u, sv, v) = full_svd(&a);
        assert_near(sv[0], 3.0, TOL, "σ[0]");
        assert_near(sv[1], 2.0, TOL, "σ[1]");
        assert_reconstructs(&a, &u, &sv, &v);
    }

    #[test]
    fn unsorted_diagonal_is_sorted() {
        let a = DynMatrix::from_rows(3, 3, &[
            1.0_f64, 0.0, 0.0,
            0.0, 4.0, 0.0,
            0.0, 0.0, 2.0,
        ]);
        let (u, sv, v) = full_svd(&a);
        assert_eq!(sv, vec![4.0, 2.0, 1.0]);
        assert_reconstructs(&a, &u, &sv, &v);
    }

    #[test]
    fn known_2x2() {
        let a = DynMatrix::from_rows(2, 2, &[3.0_f64, 2.0, 2.0, 3.0]);
        let (_, sv, _) = full_svd(&a);
        // A^T A = [[13, 12], [12, 13]], eigenvalues 25 and 1
        assert_near(sv[0], 5.0, TOL, "σ[0]");
        assert_near(sv[1], 1.0, TOL, "σ[1]");
    }

    #[test]
    fn reconstruction_and_orthogonality_5x3() {
        let a = DynMatrix::from_rows(5, 3, &[
            1.0_f64, 2.0, 3.0,
            4.0, 5.0, 6.0,
            7.0, 8.0, 0.0,
            10.0, 11.0, 1.0,
            13.0, 14.0, 2.0,
        ]);
        let (u, sv, v) = full_svd(&a);
        assert_reconstructs(&a, &u, &sv, &v);
        assert_orthogonal(&u, "U^TU");
        assert_orthogonal(&v, "V^TV");
        for i in 0..2 {
            assert!(sv[i] >= sv[i + 1], "not descending at {}", i);
        }
    }

    #[test]
    fn rank_deficient() {
        let a = DynMatrix::from_rows(3, 3, &[
            1.0_f64, 2.0, 3.0,
            2.0, 4.0, 6.0,
            3.0, 6.0, 9.0,
        ]);
        let (u, sv, v) = full_svd(&a);
        assert!(sv[0] > 1.0, "σ[0] should be large");
        assert!(sv[1].abs() < 1e-9, "σ[1] should be ≈ 0");
        assert!(sv[2].abs() < 1e-9, "σ[2] should be ≈ 0");
        assert_reconstructs(&a, &u, &sv, &v);
    }

    #[test]
    fn zero_matrix() {
        let a = DynMatrix::zeros(3, 2, 0.0_f64);
        let (u, sv, v) = full_svd(&a);
        assert_eq!(sv, vec![0.0, 0.0]);
        assert_orthogonal(&u, "U^TU");
        assert_orthogonal(&v, "V^TV");
    }

    // B = [[1, 1, 0], [0, 2, 1], [0, 0, 0]]: zero at the bottom of the block
    #[test]
    fn zero_trailing_diagonal() {
        let mut diag = [1.0_f64, 2.0, 0.0];
        let mut off_diag = [1.0_f64, 1.0];
        let b = DynMatrix::from_rows(3, 3, &[1.0, 1.0, 0.0, 0.0, 2.0, 1.0, 0.0, 0.0, 0.0]);
        let mut u = DynMatrix::eye(3, 0.0_f64);
        let mut v = DynMatrix::eye(3, 0.0_f64);
        bidiagonal_qr::<f64>(&mut diag, &mut off_diag, &mut u, &mut v, true, true, 100).unwrap();
        assert!(diag[2].abs() < 1e-12);
        assert_reconstructs(&b, &u, &diag, &v);
        assert_orthogonal(&v, "V^TV");
    }

    // B = [[1, 1, 0], [0, 0, 1], [0, 0, 2]]: zero inside the block
    #[test]
    fn zero_interior_diagonal() {
        let mut diag = [1.0_f64, 0.0, 2.0];
        let mut off_diag = [1.0_f64, 1.0];
        let b = DynMatrix::from_rows(3, 3, &[1.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0]);
        let mut u = DynMatrix::eye(3, 0.0_f64);
        let mut v = DynMatrix::eye(3, 0.0_f64);
        bidiagonal_qr::<f64>(&mut diag, &mut off_diag, &mut u, &mut v, true, true, 100).unwrap();
        assert!(diag[2].abs() < 1e-12);
        assert_reconstructs(&b, &u, &diag, &v);
        assert_orthogonal(&u, "U^TU");
    }

    #[test]
    fn values_only_path_matches() {
        let a = DynMatrix::from_rows(4, 2, &[1.0_f64, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0]);
        let (_, with_vectors, _) = full_svd(&a);

        let mut work = a.clone();
        let mut diag = vec![0.0; 2];
        let mut off_diag = vec![0.0; 1];
        let (mut u, mut v) = (empty(), empty());
        bidiagonalize(&mut work, &mut diag, &mut off_diag, &mut u, &mut v, false, false);
        bidiagonal_qr::<f64>(&mut diag, &mut off_diag, &mut u, &mut v, false, false, 100)
            .unwrap();
        assert_eq!(diag, with_vectors);
    }

    #[test]
    fn exhausted_budget_is_an_error() {
        let mut diag = [1.0_f64, 2.0, 3.0];
        let mut off_diag = [1.0_f64, 1.0];
        let (mut u, mut v) = (empty(), empty());
        let result =
            bidiagonal_qr::<f64>(&mut diag, &mut off_diag, &mut u, &mut v, false, false, 0);
        assert_eq!(result, Err(LinalgError::ConvergenceFailure));
    }

    #[test]
    fn size_1x1_negative() {
        let a = DynMatrix::from_rows(1, 1, &[-5.0_f64]);
        let (u, sv, v) = full_svd(&a);
        assert_near(sv[0], 5.0, TOL, "σ[0]");
        assert_eq!(u[(0, 0)], -1.0);
        assert_eq!(v[(0, 0)], 1.0);
    }

    #[test]
    fn f32_support() {
        let a = DynMatrix::from_rows(2, 2, &[3.0_f32, 1.0, 1.0, 3.0]);
        let mut work = a.clone();
        let mut u = DynMatrix::zeros(2, 2, 0.0_f32);
        let mut v = DynMatrix::zeros(2, 2, 0.0_f32);
        let mut diag = [0.0_f32; 2];
        let mut off_diag = [0.0_f32; 1];
        bidiagonalize(&mut work, &mut diag, &mut off_diag, &mut u, &mut v, true, true);
        bidiagonal_qr::<f32>(&mut diag, &mut off_diag, &mut u, &mut v, true, true, 60).unwrap();
        assert!((diag[0] - 4.0).abs() < 1e-5);
        assert!((diag[1] - 2.0).abs() < 1e-5);
    }

    #[test]
    fn safe_range_bounds() {
        let (small, big) = safe_range::<f64>();
        assert!(small > 1e-139 && small < 1e-138, "small = {}", small);
        assert!(big > 1e138 && big < 1e139, "big = {}", big);
        let (small, big) = safe_range::<f32>();
        assert!(small > 1e-13 && small < 1e-12, "small = {}", small);
        assert!(big > 1e12 && big < 1e13, "big = {}", big);

        assert_eq!(range_scale(0.0_f64), None);
        assert_eq!(range_scale(1.0_f64), None);
        assert_eq!(range_scale(1e100_f64), None);
        assert_eq!(range_scale(1e200_f64), Some(1e200));
        assert_eq!(range_scale(1e-150_f64), Some(1e-150));
        assert_eq!(range_scale(f64::INFINITY), None);
        assert_eq!(range_scale(1e10_f32), None);
        assert_eq!(range_scale(1e13_f32), Some(1e13));
    }

    #[test]
    fn bidiagonal_qr_at_extreme_scales() {
        let run = |scale: f64| {
            let mut diag = [1.0 * scale, 2.0 * scale, 3.0 * scale];
            let mut off_diag = [1.0 * scale, 1.0 * scale];
            let mut u = DynMatrix::eye(3, 0.0_f64);
            let mut v = DynMatrix::eye(3, 0.0_f64);
            bidiagonal_qr::<f64>(&mut diag, &mut off_diag, &mut u, &mut v, true, true, 90)
                .unwrap();
            assert_eq!(off_diag, [0.0, 0.0]);
            (diag, u, v)
        };
        let (base, u0, v0) = run(1.0);
        for &scale in &[1e200, 1e300, 1e-200, 1e-300] {
            let (diag, u, v) = run(scale);
            for i in 0..3 {
                assert_near(diag[i] / scale, base[i], 1e-12, &format!("σ[{}] at {:e}", i, scale));
            }
            // Vectors agree up to the sign of each pair
            for i in 0..3 {
                for j in 0..3 {
                    assert_near(u[(i, j)].abs(), u0[(i, j)].abs(), 1e-12, "U");
                    assert_near(v[(i, j)].abs(), v0[(i, j)].abs(), 1e-12, "V");
                }
            }
        }
    }

    #[test]
    fn extreme_scale_3x3() {
        let base = DynMatrix::from_rows(3, 3, &[
            1.0_f64, 2.0, 0.0,
            0.0, 1.0, 3.0,
            1.0, 0.0, 1.0,
        ]);
        let (_, expected, _) = full_svd(&base);
        for &scale in &[1e77, 1e100, 1e200, 1e-100, 1e-160, 1e-200] {
            let a = DynMatrix::from_fn(3, 3, |i, j| base[(i, j)] * scale);
            let (u, sv, v) = full_svd(&a);
            let unit: Vec<f64> = sv.iter().map(|&x| x / scale).collect();
            for i in 0..3 {
                assert_near(unit[i], expected[i], 1e-12, &format!("σ[{}] at {:e}", i, scale));
            }
            assert_reconstructs(&base, &u, &unit, &v);
            assert_orthogonal(&u, "U^TU");
            assert_orthogonal(&v, "V^TV");
        }
    }

    #[test]
    fn f32_extreme_scales() {
        for &scale in &[1e10_f32, 1e18, 1e-10, 1e-18] {
            let a = DynMatrix::from_rows(2, 2, &[3.0 * scale, scale, scale, 3.0 * scale]);
            let mut work = a.clone();
            let mut u = DynMatrix::zeros(2, 2, 0.0_f32);
            let mut v = DynMatrix::zeros(2, 2, 0.0_f32);
            let mut diag = [0.0_f32; 2];
            let mut off_diag = [0.0_f32; 1];
            bidiagonalize(&mut work, &mut diag, &mut off_diag, &mut u, &mut v, true, true);
            bidiagonal_qr::<f32>(&mut diag, &mut off_diag, &mut u, &mut v, true, true, 60)
                .unwrap();
            assert!((diag[0] / scale - 4.0).abs() < 1e-4, "σ[0] at {:e}: {}", scale, diag[0]);
            assert!((diag[1] / scale - 2.0).abs() < 1e-4, "σ[1] at {:e}: {}", scale, diag[1]);
        }
    }
}
