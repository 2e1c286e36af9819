pub(crate) mod householder;
pub(crate) mod svd;

pub use svd::{bidiagonal_qr, bidiagonalize};

/// Errors from linear algebra operations.
///
/// Returned by [`crate::DynSvd::new`] and the convenience entry points
/// ([`crate::svd`], [`crate::singular_values`]). Invalid shapes are not
/// represented here: an empty input is a programming error and panics.
///
/// ```
/// use densvd::linalg::LinalgError;
///
/// let err = LinalgError::ConvergenceFailure;
/// assert_eq!(format!("{}", err), "iterative algorithm did not converge");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinalgError {
    /// Iterative algorithm did not converge within the iteration budget.
    ConvergenceFailure,
}

impl core::fmt::Display for LinalgError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LinalgError::ConvergenceFailure => write!(f, "iterative algorithm did not converge"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LinalgError {}
