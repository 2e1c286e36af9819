//! Shared helpers for the SVD integration tests
#![allow(dead_code)]

use densvd::{DynMatrix, DynSvd, LinalgScalar, SvdMode};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[cfg(feature = "complex")]
use densvd::Complex;

/// Element types that can be drawn uniformly from the unit box.
pub trait RandomFill: LinalgScalar {
    fn random(rng: &mut StdRng) -> Self;
}

impl RandomFill for f64 {
    fn random(rng: &mut StdRng) -> Self {
        rng.random_range(-1.0..1.0)
    }
}

impl RandomFill for f32 {
    fn random(rng: &mut StdRng) -> Self {
        rng.random_range(-1.0..1.0)
    }
}

#[cfg(feature = "complex")]
impl RandomFill for Complex<f64> {
    fn random(rng: &mut StdRng) -> Self {
        Complex::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0))
    }
}

/// Deterministic generator for a given test case.
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// `m x n` matrix with independent uniform entries.
pub fn random_matrix<T: RandomFill>(rng: &mut StdRng, m: usize, n: usize) -> DynMatrix<T> {
    let data: Vec<T> = (0..m * n).map(|_| T::random(rng)).collect();
    DynMatrix::from_vec(m, n, data)
}

/// Check every documented property of an economy and a full SVD of `a`.
pub fn check_svd<T: LinalgScalar>(a: &DynMatrix<T>) {
    let (m, n) = a.shape();
    let k = m.min(n);

    let econ = DynSvd::new(a, SvdMode::Economy).unwrap();
    let full = DynSvd::new(a, SvdMode::Full).unwrap();

    assert_eq!(econ.u().shape(), (m, k), "economy U shape for {}x{}", m, n);
    assert_eq!(econ.vt().shape(), (k, n), "economy V^H shape for {}x{}", m, n);
    assert_eq!(full.u().shape(), (m, m), "full U shape for {}x{}", m, n);
    assert_eq!(full.vt().shape(), (n, n), "full V^H shape for {}x{}", m, n);

    let s = econ.singular_values();
    assert_eq!(s.len(), k);
    assert_eq!(s, full.singular_values(), "modes disagree for {}x{}", m, n);
    assert_eq!(s, &densvd::singular_values(a).unwrap()[..]);

    let zero = <T::Real as num_traits::Zero>::zero();
    for (i, &sigma) in s.iter().enumerate() {
        assert!(sigma >= zero, "negative singular value at {} for {}x{}", i, m, n);
        if i + 1 < k {
            assert!(sigma >= s[i + 1], "not descending at {} for {}x{}", i, m, n);
        }
    }

    for (svd, label) in [(&econ, "economy"), (&full, "full")] {
        assert!(svd.u().is_unitary(), "{} U not unitary for {}x{}", label, m, n);
        assert!(svd.vt().is_unitary(), "{} V^H not unitary for {}x{}", label, m, n);
        assert!(
            svd.reconstruct().approx_eq(a),
            "{} reconstruction failed for {}x{}",
            label,
            m,
            n
        );
    }
}

/// Decompose `a * scale` and check it against the decomposition of `a`.
///
/// The factorization must converge, reconstruct to within the element
/// tolerance relative to `‖a * scale‖_F`, keep unitary factors, and give
/// singular values equal to `scale` times those of `a`.
pub fn check_scaled<T: LinalgScalar>(a: &DynMatrix<T>, scale: T::Real) {
    use num_traits::Float;

    let (m, n) = a.shape();
    let tol = T::approx_tolerance();
    let base = DynSvd::new(a, SvdMode::Full).unwrap();
    let scaled = a.map(|x| x * T::from_real(scale));

    let svd = DynSvd::new(&scaled, SvdMode::Full)
        .unwrap_or_else(|err| panic!("{:?} for {}x{} at scale {:?}", err, m, n, scale));

    let residual = svd.reconstruct().max_abs_diff(&scaled);
    let norm = scaled.frobenius_norm();
    assert!(
        residual <= tol * norm,
        "residual {:?} vs norm {:?} for {}x{} at scale {:?}",
        residual,
        norm,
        m,
        n,
        scale
    );
    assert!(svd.u().is_unitary(), "U not unitary for {}x{} at scale {:?}", m, n, scale);
    assert!(svd.vt().is_unitary(), "V^H not unitary for {}x{} at scale {:?}", m, n, scale);

    let s0 = base.singular_values();
    for (i, (&s, &expected)) in svd.singular_values().iter().zip(s0).enumerate() {
        assert!(
            (s / scale - expected).abs() <= tol * s0[0],
            "sigma[{}] = {:?} at scale {:?}, expected {:?} x scale for {}x{}",
            i,
            s,
            scale,
            expected,
            m,
            n
        );
    }
}

/// Exact decomposition of the rectangular identity.
pub fn check_identity<T: LinalgScalar>(m: usize, n: usize) {
    let a: DynMatrix<T> = DynMatrix::identity(m, n);
    let k = m.min(n);
    let one = <T::Real as num_traits::One>::one();

    let econ = a.svd(SvdMode::Economy).unwrap();
    assert!(econ.singular_values().iter().all(|&s| s == one), "{}x{}", m, n);
    assert_eq!(econ.u(), &DynMatrix::identity(m, k), "economy U for {}x{}", m, n);
    assert_eq!(econ.vt(), &DynMatrix::identity(k, n), "economy V^H for {}x{}", m, n);

    let full = a.svd(SvdMode::Full).unwrap();
    assert!(full.singular_values().iter().all(|&s| s == one), "{}x{}", m, n);
    assert_eq!(full.u(), &DynMatrix::eye(m, T::zero()), "full U for {}x{}", m, n);
    assert_eq!(full.vt(), &DynMatrix::eye(n, T::zero()), "full V^H for {}x{}", m, n);
}
