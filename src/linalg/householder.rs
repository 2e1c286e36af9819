use crate::traits::LinalgScalar;
use num_traits::{Float, Zero};

/// Coefficients of an elementary reflector `H = I - tau · v · v^H`, `v[0] = 1`.
///
/// Built so that `H^H · [alpha; x] = [beta; 0]` with `beta` **real**, also
/// for complex input. The phase of `alpha` is folded into `tau`, which is
/// what keeps the bidiagonal form produced by [`super::bidiagonalize`] real.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Reflector<T: LinalgScalar> {
    /// Scalar factor of the reflector.
    pub tau: T,
    /// The value left in the pivot position after applying `H^H`.
    pub beta: T::Real,
    /// Multiplier turning the tail `x` into the stored `v[1..]`.
    pub scale: T,
}

/// Build the reflector annihilating a tail with Euclidean norm `tail_norm`
/// below the pivot `alpha`.
///
/// Returns `None` when the tail is already zero and the pivot is real:
/// `H = I` and the pivot is kept as is. Skipping the identity reflector
/// keeps already-reduced input (e.g. identity matrices) bit-exact.
///
/// No quantity of the size `|alpha|^2` is formed, so any finite input
/// gives finite coefficients.
pub(crate) fn make_reflector<T: LinalgScalar>(
    alpha: T,
    tail_norm: T::Real,
) -> Option<Reflector<T>> {
    let zero = <T::Real as Zero>::zero();

    if tail_norm == zero && alpha.im() == zero {
        return None;
    }

    let norm = alpha.modulus().hypot(tail_norm);
    // beta takes the sign opposite to Re(alpha) so that alpha - beta never cancels
    let beta = if alpha.re() >= zero { zero - norm } else { norm };
    let beta_t = T::from_real(beta);

    let tau = (beta_t - alpha).div_real(beta);
    // 1 / d as conj(d) / |d| / |d|
    let d = alpha - beta_t;
    let d_abs = d.modulus();
    let scale = d.conj().div_real(d_abs).div_real(d_abs);

    Some(Reflector { tau, beta, scale })
}

/// Running Euclidean norm in the LAPACK `lassq` form `scale · sqrt(ssq)`.
///
/// Every squared term is a ratio of at most one, so the norm of a vector
/// with entries near the overflow or underflow threshold is still finite
/// and accurate.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SumSquares<R> {
    scale: R,
    ssq: R,
}

impl<R: Float> SumSquares<R> {
    pub(crate) fn new() -> Self {
        Self {
            scale: R::zero(),
            ssq: R::one(),
        }
    }

    /// Accumulate a real value.
    pub(crate) fn add(&mut self, x: R) {
        if x == R::zero() {
            return;
        }
        let ax = x.abs();
        if self.scale < ax {
            let r = self.scale / ax;
            self.ssq = R::one() + self.ssq * r * r;
            self.scale = ax;
        } else {
            let r = ax / self.scale;
            self.ssq = self.ssq + r * r;
        }
    }

    /// Accumulate both components of a (possibly complex) element.
    pub(crate) fn add_scalar<T: LinalgScalar<Real = R>>(&mut self, z: T) {
        self.add(z.re());
        self.add(z.im());
    }

    pub(crate) fn norm(&self) -> R {
        self.scale * self.ssq.sqrt()
    }
}
