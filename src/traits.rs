use core::fmt::Debug;
use num_traits::{Float, Num, One, Zero};

#[cfg(feature = "complex")]
use num_complex::Complex;

/// Trait for types that can be used as matrix elements.
///
/// Blanket-implemented for all types satisfying the bounds.
/// Covers `f32`, `f64`, complex numbers, and all integer types.
pub trait Scalar: Copy + PartialEq + Debug + Zero + One + Num {}

impl<T: Copy + PartialEq + Debug + Zero + One + Num> Scalar for T {}

/// Trait for real floating-point matrix elements.
///
/// Required by operations that need ordered comparisons, `sqrt`, `abs`, etc.
/// Implies `LinalgScalar<Real = Self>` since real floats are their own real type.
/// Singular values are always of this type.
pub trait FloatScalar: Scalar + Float + LinalgScalar<Real = Self> {}

impl<T: Scalar + Float + LinalgScalar<Real = T>> FloatScalar for T {}

/// Trait for matrix elements that support linear algebra operations.
///
/// Covers both real floats (`f32`, `f64`) and complex numbers (`Complex<f32>`,
/// `Complex<f64>`). The SVD engine, norms and approximate comparisons are
/// written once against this trait.
pub trait LinalgScalar: Scalar {
    /// The real component type (`Self` for reals, `T` for `Complex<T>`).
    type Real: FloatScalar;

    /// Absolute value / modulus: `|z|` for complex, `.abs()` for real.
    fn modulus(self) -> Self::Real;

    /// Complex conjugate (identity for reals).
    fn conj(self) -> Self;

    /// Real part.
    fn re(self) -> Self::Real;

    /// Imaginary part (zero for reals).
    fn im(self) -> Self::Real;

    /// Machine epsilon of the underlying real type.
    fn lepsilon() -> Self::Real;

    /// Default absolute tolerance for approximate matrix comparison.
    ///
    /// `1e-10` for double precision, `1e-4` for single precision.
    fn approx_tolerance() -> Self::Real;

    /// Promote a real value into `Self`.
    fn from_real(r: Self::Real) -> Self;

    /// Divide by a real value component-wise.
    ///
    /// Unlike `self / Self::from_real(r)` this never forms `|r|^2`, so it
    /// stays finite for any finite non-zero `r`.
    fn div_real(self, r: Self::Real) -> Self;
}

/// Real floats delegate to `Float`.
macro_rules! impl_linalg_scalar_real {
    ($($t:ty => $tol:expr),*) => {
        $(
            impl LinalgScalar for $t {
                type Real = $t;

                #[inline] fn modulus(self) -> $t { Float::abs(self) }
                #[inline] fn conj(self) -> $t { self }
                #[inline] fn re(self) -> $t { self }
                #[inline] fn im(self) -> $t { 0.0 }
                #[inline] fn lepsilon() -> $t { <$t as Float>::epsilon() }
                #[inline] fn approx_tolerance() -> $t { $tol }
                #[inline] fn from_real(r: $t) -> $t { r }
                #[inline] fn div_real(self, r: $t) -> $t { self / r }
            }
        )*
    };
}

impl_linalg_scalar_real!(f32 => 1e-4, f64 => 1e-10);

#[cfg(feature = "complex")]
impl<T: FloatScalar> LinalgScalar for Complex<T> {
    type Real = T;

    #[inline]
    fn modulus(self) -> T {
        self.norm()
    }

    #[inline]
    fn conj(self) -> Self {
        Complex::conj(&self)
    }

    #[inline]
    fn re(self) -> T {
        self.re
    }

    #[inline]
    fn im(self) -> T {
        self.im
    }

    #[inline]
    fn lepsilon() -> T {
        T::epsilon()
    }

    #[inline]
    fn approx_tolerance() -> T {
        T::approx_tolerance()
    }

    #[inline]
    fn from_real(r: T) -> Self {
        Complex::new(r, <T as Zero>::zero())
    }

    #[inline]
    fn div_real(self, r: T) -> Self {
        Complex::new(self.re / r, self.im / r)
    }
}

/// Read-only access to a matrix-like type.
///
/// Lets the decomposition kernels in [`crate::linalg`] run over any
/// dense storage, not only [`crate::DynMatrix`].
pub trait MatrixRef<T> {
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;
    fn get(&self, row: usize, col: usize) -> &T;
}

/// Mutable access to a matrix-like type.
///
/// Extends `MatrixRef` with mutable element access, enabling
/// in-place algorithms (bidiagonalization, rotation accumulation).
pub trait MatrixMut<T>: MatrixRef<T> {
    fn get_mut(&mut self, row: usize, col: usize) -> &mut T;
}
